use serde::{Deserialize, Serialize};

use crate::core::{Piece, RandomPiece};

use super::generator::PieceGenerator;

/// Number of piece slots in the tray.
pub const SLOT_COUNT: usize = 3;

/// The three-slot piece tray.
///
/// Slots empty one by one as pieces are placed and refill all at once when
/// the last one is consumed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PieceTray {
    slots: [Option<RandomPiece>; SLOT_COUNT],
}

impl PieceTray {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn slot(&self, slot: usize) -> Option<&RandomPiece> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Removes and returns the piece in `slot`, if any.
    pub fn remove(&mut self, slot: usize) -> Option<RandomPiece> {
        self.slots.get_mut(slot).and_then(Option::take)
    }

    #[must_use]
    pub fn is_all_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn occupied(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Iterates the pieces currently in the tray.
    pub fn pieces(&self) -> impl Iterator<Item = &RandomPiece> {
        self.slots.iter().flatten()
    }

    /// Whether every slot is occupied by the given shape.
    #[must_use]
    pub fn all_match(&self, piece: &Piece) -> bool {
        self.occupied() == SLOT_COUNT && self.pieces().all(|held| held.piece() == piece)
    }

    /// Refills every slot from the generator if the tray is empty.
    ///
    /// Returns whether a refill happened. Slots refill together, never
    /// individually, so the generator's slot-keyed draws stay aligned.
    pub fn refill_if_all_empty(&mut self, generator: &PieceGenerator, score: u32) -> bool {
        if !self.is_all_empty() {
            return false;
        }
        self.slots = std::array::from_fn(|slot| Some(generator.generate(slot, score)));
        true
    }

    pub(crate) fn set_slots(&mut self, slots: [Option<RandomPiece>; SLOT_COUNT]) {
        self.slots = slots;
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone as _, Utc};

    use super::*;

    fn generator() -> PieceGenerator {
        let date = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        PieceGenerator::new(date)
    }

    #[test]
    fn refill_only_fires_when_all_slots_are_empty() {
        let mut tray = PieceTray::empty();
        assert!(tray.refill_if_all_empty(&generator(), 0));
        assert_eq!(tray.occupied(), SLOT_COUNT);

        tray.remove(0);
        tray.remove(2);
        assert!(!tray.refill_if_all_empty(&generator(), 0));
        assert_eq!(tray.occupied(), 1);
        assert!(tray.slot(1).is_some());

        tray.remove(1);
        assert!(tray.refill_if_all_empty(&generator(), 0));
        assert_eq!(tray.occupied(), SLOT_COUNT);
    }

    #[test]
    fn refill_replays_for_the_same_score() {
        let generator = generator();
        let mut a = PieceTray::empty();
        let mut b = PieceTray::empty();
        a.refill_if_all_empty(&generator, 42);
        b.refill_if_all_empty(&generator, 42);
        for slot in 0..SLOT_COUNT {
            assert_eq!(
                a.slot(slot).map(RandomPiece::piece),
                b.slot(slot).map(RandomPiece::piece)
            );
        }
    }

    #[test]
    fn remove_empties_exactly_one_slot() {
        let mut tray = PieceTray::empty();
        tray.refill_if_all_empty(&generator(), 0);
        let removed = tray.remove(1).unwrap();
        assert!(tray.slot(1).is_none());
        assert_eq!(tray.occupied(), 2);
        assert!(tray.pieces().all(|held| held.id() != removed.id()));
        assert!(tray.remove(1).is_none());
        assert!(tray.remove(99).is_none());
    }

    #[test]
    fn all_match_requires_every_slot() {
        let mut tray = PieceTray::empty();
        let square = Piece::two_by_two();
        tray.set_slots(std::array::from_fn(|_| {
            Some(RandomPiece::spawned(square.clone()))
        }));
        assert!(tray.all_match(&square));
        assert!(!tray.all_match(&Piece::one_by_one()));
        tray.remove(0);
        assert!(!tray.all_match(&square));
    }
}
