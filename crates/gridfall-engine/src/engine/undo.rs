use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::core::{Board, Piece, Point, RandomPiece};

use super::powerup::PowerupState;
use super::tray::PieceTray;

/// Maximum number of moves kept for undo.
pub const UNDO_DEPTH: usize = 3;

/// Where a placed piece came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PieceSource {
    /// A tray slot, by index.
    Slot(usize),
    /// The bonus-piece slot.
    Bonus,
}

/// The move a snapshot rewinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UndoAction {
    #[serde(rename_all = "camelCase")]
    PlacePiece {
        piece: RandomPiece,
        point: Point,
        source: PieceSource,
    },
    #[serde(rename_all = "camelCase")]
    DeletePiece { slot: usize },
}

fn default_bonus_piece() -> RandomPiece {
    RandomPiece::spawned(Piece::one_by_one())
}

/// Full pre-move game state captured before every move.
///
/// Field names match the save schema so snapshots persist alongside the
/// game. Fields added after the first release carry defaults so old saves
/// still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoSnapshot {
    pub(crate) score: u32,
    #[serde(rename = "tiles")]
    pub(crate) board: Board,
    #[serde(rename = "availablePieces")]
    pub(crate) tray: PieceTray,
    #[serde(default = "default_bonus_piece")]
    pub(crate) bonus_piece: RandomPiece,
    #[serde(flatten)]
    pub(crate) powerups: PowerupState,
    #[serde(default)]
    pub(crate) move_count: u32,
    pub(crate) action: UndoAction,
}

impl UndoSnapshot {
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn action(&self) -> &UndoAction {
        &self.action
    }

    /// Whether this move may be undone while the game is still playable.
    ///
    /// Undoing a tray placement that emptied the last slot would have to
    /// rewind through a refill, so it is only allowed once the game is
    /// over. Bonus placements and deletions never trigger a refill race and
    /// are always undoable.
    #[must_use]
    pub fn can_be_undone_during_gameplay(&self) -> bool {
        match &self.action {
            UndoAction::PlacePiece {
                source: PieceSource::Slot(_),
                ..
            } => self.tray.occupied() > 1,
            UndoAction::PlacePiece {
                source: PieceSource::Bonus,
                ..
            }
            | UndoAction::DeletePiece { .. } => true,
        }
    }
}

/// A bounded stack of the most recent snapshots, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UndoHistory {
    snapshots: ArrayVec<UndoSnapshot, UNDO_DEPTH>,
}

impl UndoHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a snapshot, evicting the oldest when full.
    pub fn push(&mut self, snapshot: UndoSnapshot) {
        self.snapshots.truncate(UNDO_DEPTH - 1);
        self.snapshots.insert(0, snapshot);
    }

    /// Removes and returns the most recent snapshot.
    pub fn pop_front(&mut self) -> Option<UndoSnapshot> {
        if self.snapshots.is_empty() {
            None
        } else {
            Some(self.snapshots.remove(0))
        }
    }

    #[must_use]
    pub fn front(&self) -> Option<&UndoSnapshot> {
        self.snapshots.first()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn snapshots(&self) -> impl Iterator<Item = &UndoSnapshot> {
        self.snapshots.iter()
    }

    /// Rebuilds a history from persisted snapshots, newest first. Extra
    /// entries beyond the depth limit are dropped.
    pub(crate) fn from_snapshots(snapshots: Vec<UndoSnapshot>) -> Self {
        let mut history = Self::new();
        history
            .snapshots
            .extend(snapshots.into_iter().take(UNDO_DEPTH));
        history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(score: u32, occupied_slots: usize) -> UndoSnapshot {
        let mut tray = PieceTray::empty();
        let slots = std::array::from_fn(|slot| {
            (slot < occupied_slots).then(|| RandomPiece::spawned(Piece::one_by_one()))
        });
        tray.set_slots(slots);
        UndoSnapshot {
            score,
            board: Board::empty(),
            tray,
            bonus_piece: default_bonus_piece(),
            powerups: PowerupState::default(),
            move_count: 0,
            action: UndoAction::PlacePiece {
                piece: RandomPiece::spawned(Piece::one_by_one()),
                point: Point::new(0, 0),
                source: PieceSource::Slot(0),
            },
        }
    }

    #[test]
    fn history_keeps_the_three_newest_snapshots() {
        let mut history = UndoHistory::new();
        for score in 1..=5 {
            history.push(snapshot(score, 3));
        }
        assert_eq!(history.len(), UNDO_DEPTH);
        let scores: Vec<u32> = history.snapshots().map(UndoSnapshot::score).collect();
        assert_eq!(scores, [5, 4, 3]);

        assert_eq!(history.pop_front().unwrap().score(), 5);
        assert_eq!(history.front().unwrap().score(), 4);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn last_slot_placement_is_blocked_during_gameplay() {
        assert!(snapshot(0, 3).can_be_undone_during_gameplay());
        assert!(snapshot(0, 2).can_be_undone_during_gameplay());
        assert!(!snapshot(0, 1).can_be_undone_during_gameplay());
    }

    #[test]
    fn bonus_and_delete_moves_are_always_undoable() {
        let mut bonus = snapshot(0, 1);
        bonus.action = UndoAction::PlacePiece {
            piece: default_bonus_piece(),
            point: Point::new(0, 0),
            source: PieceSource::Bonus,
        };
        assert!(bonus.can_be_undone_during_gameplay());

        let mut delete = snapshot(0, 1);
        delete.action = UndoAction::DeletePiece { slot: 2 };
        assert!(delete.can_be_undone_during_gameplay());
    }

    #[test]
    fn restoring_truncates_to_depth() {
        let snapshots = (1..=5).map(|score| snapshot(score, 3)).collect();
        let history = UndoHistory::from_snapshots(snapshots);
        assert_eq!(history.len(), UNDO_DEPTH);
        assert_eq!(history.front().unwrap().score(), 1);
    }

    #[test]
    fn snapshot_serializes_with_schema_names() {
        let original = snapshot(7, 3);
        let json = serde_json::to_value(&original).unwrap();
        let object = json.as_object().unwrap();
        for key in [
            "score",
            "tiles",
            "availablePieces",
            "bonusPiece",
            "powerups",
            "powerupTurnsRemaining",
            "lastPowerupScore",
            "moveCount",
            "action",
        ] {
            assert!(object.contains_key(key), "missing {key}");
        }

        let restored: UndoSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(restored, original);
    }
}
