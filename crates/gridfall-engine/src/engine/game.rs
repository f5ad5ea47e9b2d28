use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{Board, LineClear, Piece, Point, RandomPiece};

use super::generator::PieceGenerator;
use super::powerup::{Powerup, PowerupState};
use super::scoring::{Achievement, ScoreBoard};
use super::tray::PieceTray;
use super::undo::{PieceSource, UndoAction, UndoHistory, UndoSnapshot};

/// Everything that happened during one placement.
#[derive(Debug, Clone)]
pub struct Placement {
    /// The piece that was placed.
    pub piece: RandomPiece,
    /// Where its top-left cell landed.
    pub origin: Point,
    /// Lines cleared by the placement, with animation delays.
    pub clear: LineClear,
    /// Powerup collected because the sweep cleared its cell.
    pub collected_powerup: Option<Powerup>,
    /// Powerup freshly spawned on the board.
    pub spawned_powerup: Option<Point>,
    /// Whether the tray refilled after this placement.
    pub refilled: bool,
}

/// Result of requesting an undo.
#[derive(Debug, Clone, PartialEq)]
pub enum UndoOutcome {
    /// An undo began; the caller animates it and then calls
    /// [`Game::complete_undo`].
    Started(UndoStart),
    /// An undo is already settling; this request runs after it completes.
    Queued,
    /// Nothing to undo, or the most recent move is not undoable right now.
    Ignored,
}

/// The visible effect of an undo that has begun.
///
/// Between [`Game::undo`] and [`Game::complete_undo`] the board shows the
/// state just after the undone piece was placed, with any cleared lines
/// restored; completing the undo then lifts the piece off the board.
#[derive(Debug, Clone, PartialEq)]
pub struct UndoStart {
    /// The move being rewound.
    pub action: UndoAction,
    /// Points that reappear because the undone move had cleared them.
    pub unclear: Vec<Point>,
}

/// A complete game: board, tray, score, powerups, and undo state.
///
/// Serialization goes through the save schema, so a `Game` can be written
/// out and restored mid-session; see [`LoadError`](super::LoadError) for
/// what a restore can reject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    into = "crate::engine::save::SavedGame",
    try_from = "crate::engine::save::SavedGame"
)]
pub struct Game {
    start_date: DateTime<Utc>,
    generator: PieceGenerator,
    board: Board,
    tray: PieceTray,
    bonus_piece: RandomPiece,
    scoring: ScoreBoard,
    powerups: PowerupState,
    undo_history: UndoHistory,
    move_count: u32,
    delete_mode: bool,
    settling_board: Option<Board>,
    pending_undos: u32,
    unreported: Vec<Achievement>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Starts a game with no score history.
    #[must_use]
    pub fn new() -> Self {
        Self::with_high_score(0)
    }

    /// Starts a game against a previous high score.
    #[must_use]
    pub fn with_high_score(high_score: u32) -> Self {
        let start_date = Utc::now();
        let generator = PieceGenerator::new(start_date);
        let mut tray = PieceTray::empty();
        tray.refill_if_all_empty(&generator, 0);
        let mut game = Self {
            start_date,
            generator,
            board: Board::empty(),
            tray,
            bonus_piece: RandomPiece::spawned(Piece::one_by_one()),
            scoring: ScoreBoard::new(high_score),
            powerups: PowerupState::default(),
            undo_history: UndoHistory::new(),
            move_count: 0,
            delete_mode: false,
            settling_board: None,
            pending_undos: 0,
            unreported: Vec::new(),
        };
        game.award_refill_achievements();
        game
    }

    /// Starts a fresh game, carrying over only the high score.
    #[must_use]
    pub fn new_game(&self) -> Self {
        Self::with_high_score(self.high_score())
    }

    #[must_use]
    pub fn start_date(&self) -> DateTime<Utc> {
        self.start_date
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn tray(&self) -> &PieceTray {
        &self.tray
    }

    /// The piece offered by the bonus slot. Placeable only while a
    /// [`Powerup::BonusPiece`] is held.
    #[must_use]
    pub fn bonus_piece(&self) -> &RandomPiece {
        &self.bonus_piece
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.scoring.score()
    }

    #[must_use]
    pub fn high_score(&self) -> u32 {
        self.scoring.high_score()
    }

    #[must_use]
    pub fn is_high_score(&self) -> bool {
        self.scoring.is_high_score()
    }

    #[must_use]
    pub fn achievements(&self) -> &[Achievement] {
        self.scoring.achievements()
    }

    #[must_use]
    pub fn powerups(&self) -> &PowerupState {
        &self.powerups
    }

    #[must_use]
    pub fn undo_history(&self) -> &UndoHistory {
        &self.undo_history
    }

    #[must_use]
    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    #[must_use]
    pub fn is_delete_mode(&self) -> bool {
        self.delete_mode
    }

    /// Whether an undo is waiting for [`Game::complete_undo`].
    #[must_use]
    pub fn is_settling(&self) -> bool {
        self.settling_board.is_some()
    }

    /// Achievements earned since the last call, for one-shot presentation.
    pub fn take_unreported_achievements(&mut self) -> Vec<Achievement> {
        std::mem::take(&mut self.unreported)
    }

    /// Whether any held piece fits somewhere on the board.
    #[must_use]
    pub fn has_playable_move(&self) -> bool {
        let tray_fits = self.tray.pieces().any(|held| {
            Board::points().any(|point| self.board.can_place(held.piece(), point))
        });
        if tray_fits {
            return true;
        }
        self.powerups.count(Powerup::BonusPiece) > 0
            && Board::points().any(|point| self.board.can_place(self.bonus_piece.piece(), point))
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        !self.has_playable_move()
    }

    /// Places the piece in tray `slot` with its top-left cell at `origin`.
    ///
    /// Returns `None` when the slot is empty, the placement does not fit,
    /// or the game is mid-undo or in delete mode.
    pub fn place_piece(&mut self, slot: usize, origin: Point) -> Option<Placement> {
        if self.is_settling() || self.delete_mode {
            return None;
        }
        let held = self.tray.slot(slot)?.clone();
        if !self.board.can_place(held.piece(), origin) {
            return None;
        }

        self.record_snapshot(UndoAction::PlacePiece {
            piece: held.clone(),
            point: origin,
            source: PieceSource::Slot(slot),
        });
        let earned = self.scoring.increase(held.piece().point_value());
        self.unreported.extend(earned);
        self.tray.remove(slot);
        self.board.commit(held.piece(), origin);
        let refilled = self
            .tray
            .refill_if_all_empty(&self.generator, self.scoring.score());
        if refilled {
            self.award_refill_achievements();
        }
        let placed = held.piece().clone();
        let (clear, collected_powerup, spawned_powerup) = self.finish_placement(&placed, origin);

        Some(Placement {
            piece: held,
            origin,
            clear,
            collected_powerup,
            spawned_powerup,
            refilled,
        })
    }

    /// Places the bonus 1×1, spending one held [`Powerup::BonusPiece`].
    ///
    /// The bonus slot refreshes with a new piece identity afterwards. The
    /// tray is untouched, so no refill can happen.
    pub fn place_bonus_piece(&mut self, origin: Point) -> Option<Placement> {
        if self.is_settling() || self.delete_mode {
            return None;
        }
        if self.powerups.count(Powerup::BonusPiece) == 0 {
            return None;
        }
        let held = self.bonus_piece.clone();
        if !self.board.can_place(held.piece(), origin) {
            return None;
        }

        self.record_snapshot(UndoAction::PlacePiece {
            piece: held.clone(),
            point: origin,
            source: PieceSource::Bonus,
        });
        let earned = self.scoring.increase(held.piece().point_value());
        self.unreported.extend(earned);
        self.powerups.consume(Powerup::BonusPiece);
        self.board.commit(held.piece(), origin);
        self.bonus_piece = RandomPiece::spawned(Piece::one_by_one());
        let placed = held.piece().clone();
        let (clear, collected_powerup, spawned_powerup) = self.finish_placement(&placed, origin);

        Some(Placement {
            piece: held,
            origin,
            clear,
            collected_powerup,
            spawned_powerup,
            refilled: false,
        })
    }

    /// Clears lines for a committed placement and advances powerups.
    fn finish_placement(
        &mut self,
        piece: &Piece,
        origin: Point,
    ) -> (LineClear, Option<Powerup>, Option<Point>) {
        let clear = self.board.clear_filled_lines(piece, origin);
        if clear.lines() >= 1 && self.board.is_empty() {
            self.grant(Achievement::ClearEntireBoard);
        }
        if clear.lines() == 6 {
            self.grant(Achievement::SixClears);
        }
        let score = self.scoring.score();
        let mut rng = self.generator.state_rng(score, self.move_count);
        let collected = self.powerups.note_clear(&clear, score, &mut rng);
        let spawned = self.powerups.spawn_if_due(score, &self.board, &mut rng);
        self.move_count += 1;
        (clear, collected, spawned)
    }

    /// Enters delete mode. Requires a held [`Powerup::DeletePiece`].
    pub fn enter_delete_mode(&mut self) -> bool {
        if self.is_settling() || self.powerups.count(Powerup::DeletePiece) == 0 {
            return false;
        }
        self.delete_mode = true;
        true
    }

    pub fn exit_delete_mode(&mut self) {
        self.delete_mode = false;
    }

    /// Deletes the piece in tray `slot`, spending one
    /// [`Powerup::DeletePiece`] and leaving delete mode.
    ///
    /// Deleting the last tray piece refills the tray like a placement
    /// would.
    pub fn delete_piece(&mut self, slot: usize) -> bool {
        if !self.delete_mode
            || self.powerups.count(Powerup::DeletePiece) == 0
            || self.tray.slot(slot).is_none()
        {
            return false;
        }
        self.record_snapshot(UndoAction::DeletePiece { slot });
        self.powerups.consume(Powerup::DeletePiece);
        self.tray.remove(slot);
        self.delete_mode = false;
        self.move_count += 1;
        if self
            .tray
            .refill_if_all_empty(&self.generator, self.scoring.score())
        {
            self.award_refill_achievements();
        }
        true
    }

    /// Requests an undo of the most recent move.
    ///
    /// While a previous undo is settling the request queues and runs after
    /// [`Game::complete_undo`], first in first out. During gameplay a move
    /// is only undoable per
    /// [`UndoSnapshot::can_be_undone_during_gameplay`]; once the game is
    /// over every recorded move may be unwound in turn.
    pub fn undo(&mut self) -> UndoOutcome {
        if self.is_settling() {
            self.pending_undos += 1;
            return UndoOutcome::Queued;
        }
        if !self.can_undo() {
            self.pending_undos = 0;
            return UndoOutcome::Ignored;
        }
        let Some(snapshot) = self.undo_history.pop_front() else {
            return UndoOutcome::Ignored;
        };
        self.delete_mode = false;

        // Show the board as it looked right after the undone placement,
        // with any cleared lines restored; completing the undo lifts the
        // piece back off.
        let mut reveal = snapshot.board.clone();
        if let UndoAction::PlacePiece { piece, point, .. } = &snapshot.action {
            reveal.commit(piece.piece(), *point);
        }
        let unclear: Vec<Point> = Board::points()
            .filter(|&point| {
                self.board.tile(point).is_empty() && reveal.tile(point).is_filled()
            })
            .collect();
        self.board = reveal;
        self.settling_board = Some(snapshot.board.clone());

        self.scoring.restore_score(snapshot.score);
        self.tray = snapshot.tray;
        self.bonus_piece = snapshot.bonus_piece;
        self.powerups = snapshot.powerups;
        self.move_count = snapshot.move_count;

        UndoOutcome::Started(UndoStart {
            action: snapshot.action,
            unclear,
        })
    }

    /// Finishes a settling undo, restoring the pre-move board.
    ///
    /// If further undos queued while settling, the next one starts and its
    /// outcome is returned.
    pub fn complete_undo(&mut self) -> Option<UndoOutcome> {
        let board = self.settling_board.take()?;
        self.board = board;
        if self.pending_undos > 0 {
            self.pending_undos -= 1;
            return Some(self.undo());
        }
        None
    }

    /// Whether an undo request would start (rather than be ignored) right
    /// now.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.undo_history
            .front()
            .is_some_and(|snapshot| {
                snapshot.can_be_undone_during_gameplay() || !self.has_playable_move()
            })
    }

    fn record_snapshot(&mut self, action: UndoAction) {
        self.undo_history.push(UndoSnapshot {
            score: self.scoring.score(),
            board: self.board.clone(),
            tray: self.tray.clone(),
            bonus_piece: self.bonus_piece.clone(),
            powerups: self.powerups.clone(),
            move_count: self.move_count,
            action,
        });
    }

    fn grant(&mut self, achievement: Achievement) {
        if self.scoring.award(achievement) {
            self.unreported.push(achievement);
        }
    }

    fn award_refill_achievements(&mut self) {
        if self.tray.all_match(&Piece::three_by_three()) {
            self.grant(Achievement::AllThreeByThrees);
        }
        if self.tray.all_match(&Piece::one_by_one()) {
            self.grant(Achievement::AllOneByOnes);
        }
    }

    #[expect(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        start_date: DateTime<Utc>,
        board: Board,
        tray: PieceTray,
        bonus_piece: RandomPiece,
        scoring: ScoreBoard,
        powerups: PowerupState,
        undo_history: UndoHistory,
        move_count: u32,
    ) -> Self {
        Self {
            start_date,
            generator: PieceGenerator::new(start_date),
            board,
            tray,
            bonus_piece,
            scoring,
            powerups,
            undo_history,
            move_count,
            delete_mode: false,
            settling_board: None,
            pending_undos: 0,
            unreported: Vec::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn powerups_mut(&mut self) -> &mut PowerupState {
        &mut self.powerups
    }

    #[cfg(test)]
    pub(crate) fn set_available_pieces(&mut self, pieces: [Piece; super::tray::SLOT_COUNT]) {
        self.tray
            .set_slots(pieces.map(|piece| Some(RandomPiece::spawned(piece))));
        self.award_refill_achievements();
    }
}
