use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{Board, Piece, RandomPiece};

use super::game::Game;
use super::powerup::PowerupState;
use super::scoring::{Achievement, ScoreBoard};
use super::tray::{PieceTray, SLOT_COUNT};
use super::undo::{UndoHistory, UndoSnapshot};

/// Why a saved game failed to load.
///
/// Shape errors inside the tile grid surface as deserialization errors
/// before this type is ever reached; `LoadError` covers the checks that
/// run after the raw schema parses.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum LoadError {
    /// The save carried the wrong number of tray slots.
    #[display("save has {count} tray slots, expected {SLOT_COUNT}")]
    SlotCount { count: usize },
}

/// The on-disk schema for a [`Game`].
///
/// First-release saves carried only the first five fields; everything
/// later defaults, so old saves still load. Powerup fields flatten into
/// the top level rather than nesting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SavedGame {
    score: u32,
    high_score: u32,
    tiles: Board,
    available_pieces: Vec<Option<RandomPiece>>,
    start_date: DateTime<Utc>,
    #[serde(default)]
    achievements: Vec<Achievement>,
    #[serde(default)]
    undo_history: Vec<UndoSnapshot>,
    #[serde(default)]
    is_high_score: Option<bool>,
    #[serde(default)]
    bonus_piece: Option<RandomPiece>,
    #[serde(default)]
    move_count: u32,
    #[serde(flatten)]
    powerups: PowerupState,
}

impl From<Game> for SavedGame {
    fn from(game: Game) -> Self {
        Self {
            score: game.score(),
            high_score: game.high_score(),
            tiles: game.board().clone(),
            available_pieces: (0..SLOT_COUNT)
                .map(|slot| game.tray().slot(slot).cloned())
                .collect(),
            start_date: game.start_date(),
            achievements: game.achievements().to_vec(),
            undo_history: game.undo_history().snapshots().cloned().collect(),
            is_high_score: Some(game.is_high_score()),
            bonus_piece: Some(game.bonus_piece().clone()),
            move_count: game.move_count(),
            powerups: game.powerups().clone(),
        }
    }
}

impl TryFrom<SavedGame> for Game {
    type Error = LoadError;

    fn try_from(saved: SavedGame) -> Result<Self, Self::Error> {
        let count = saved.available_pieces.len();
        let slots: [Option<RandomPiece>; SLOT_COUNT] = saved
            .available_pieces
            .try_into()
            .map_err(|_| LoadError::SlotCount { count })?;
        let mut tray = PieceTray::empty();
        tray.set_slots(slots);

        // Saves predating the flag infer it: a score at (or above) the
        // recorded high means this run set it.
        let is_high_score = saved
            .is_high_score
            .unwrap_or(saved.high_score <= saved.score);
        let scoring = ScoreBoard::from_parts(
            saved.score,
            saved.high_score,
            is_high_score,
            saved.achievements,
        );
        let bonus_piece = saved
            .bonus_piece
            .unwrap_or_else(|| RandomPiece::spawned(Piece::one_by_one()));

        Ok(Game::from_parts(
            saved.start_date,
            saved.tiles,
            tray,
            bonus_piece,
            scoring,
            saved.powerups,
            UndoHistory::from_snapshots(saved.undo_history),
            saved.move_count,
        ))
    }
}
