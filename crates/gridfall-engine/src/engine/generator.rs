use chrono::{DateTime, Utc};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::core::{RandomPiece, SpawnTable};

/// Deterministic piece source seeded from the game's start date.
///
/// Each draw is keyed by the tray slot and the score at draw time, so
/// replaying a game from the same start date with the same move sequence
/// regenerates identical pieces. This is what lets undo restore a consumed
/// piece without storing it: re-drawing with the restored score yields the
/// same shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceGenerator {
    seed_material: u64,
}

impl PieceGenerator {
    #[must_use]
    #[expect(clippy::cast_sign_loss)]
    pub fn new(start_date: DateTime<Utc>) -> Self {
        Self {
            seed_material: start_date.timestamp_millis() as u64,
        }
    }

    /// Draws the piece for `slot` at the given score.
    ///
    /// The draw is a pure function of (start date, slot, score); only the
    /// identity attached to the returned piece is fresh.
    #[must_use]
    pub fn generate(&self, slot: usize, score: u32) -> RandomPiece {
        let seed = self
            .seed_material
            .wrapping_add(slot as u64)
            .wrapping_add(u64::from(score));
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut piece = SpawnTable::standard().draw(&mut rng);
        for _ in 0..rng.random_range(0..4u8) {
            piece = piece.rotated();
        }
        RandomPiece::spawned(piece)
    }

    /// An RNG for incidental draws (powerup type and position) that still
    /// replays deterministically for a given game state.
    pub(crate) fn state_rng(&self, score: u32, move_count: u32) -> Pcg32 {
        let seed = self.seed_material
            ^ (u64::from(score) << 32)
            ^ u64::from(move_count).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        Pcg32::seed_from_u64(seed)
    }
}
