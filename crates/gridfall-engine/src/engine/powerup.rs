use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::{Board, LineClear, Point};

/// Collectible powerup kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Powerup {
    /// Grants a 1×1 bonus piece placement.
    BonusPiece,
    /// Grants one targeted tile-group deletion.
    DeletePiece,
}

const POWERUP_CATALOG: [Powerup; 2] = [Powerup::BonusPiece, Powerup::DeletePiece];

/// Score growth required before another powerup may spawn on the board.
pub const POWERUP_SPAWN_THRESHOLD: u32 = 500;

/// Placements a spawned powerup survives before it expires uncollected.
pub const POWERUP_TURN_LIMIT: u32 = 5;

/// Powerup bookkeeping: the (at most one) powerup sitting on the board and
/// the collected inventory.
///
/// A powerup spawns on a random empty cell once the score has grown by
/// [`POWERUP_SPAWN_THRESHOLD`] since the last spawn. It is collected by
/// clearing the line holding it, and disappears after
/// [`POWERUP_TURN_LIMIT`] placements otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerupState {
    #[serde(rename = "powerupPosition", default)]
    position: Option<Point>,
    #[serde(rename = "powerupTurnsRemaining", default)]
    turns_remaining: u32,
    #[serde(rename = "lastPowerupScore", default)]
    last_spawn_score: u32,
    #[serde(rename = "powerups", default)]
    inventory: BTreeMap<Powerup, u32>,
}

impl PowerupState {
    /// Where the uncollected powerup sits, if one is on the board.
    #[must_use]
    pub fn position(&self) -> Option<Point> {
        self.position
    }

    /// Placements left before the on-board powerup expires.
    #[must_use]
    pub fn turns_remaining(&self) -> u32 {
        self.turns_remaining
    }

    /// How many of `powerup` the player holds.
    #[must_use]
    pub fn count(&self, powerup: Powerup) -> u32 {
        self.inventory.get(&powerup).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn inventory(&self) -> &BTreeMap<Powerup, u32> {
        &self.inventory
    }

    pub(crate) fn add(&mut self, powerup: Powerup) {
        *self.inventory.entry(powerup).or_insert(0) += 1;
    }

    /// Spends one `powerup`. Returns whether one was available.
    pub(crate) fn consume(&mut self, powerup: Powerup) -> bool {
        match self.inventory.get_mut(&powerup) {
            Some(count) if *count > 0 => {
                *count -= 1;
                if *count == 0 {
                    self.inventory.remove(&powerup);
                }
                true
            }
            _ => false,
        }
    }

    /// Spawns a powerup on a random empty cell if the score has grown
    /// enough and none is on the board. Returns the spawn position.
    pub(crate) fn spawn_if_due<R: Rng + ?Sized>(
        &mut self,
        score: u32,
        board: &Board,
        rng: &mut R,
    ) -> Option<Point> {
        if self.position.is_some() || score < self.last_spawn_score.saturating_add(POWERUP_SPAWN_THRESHOLD)
        {
            return None;
        }
        let empty: Vec<Point> = board.empty_points().collect();
        if empty.is_empty() {
            return None;
        }
        let position = empty[rng.random_range(0..empty.len())];
        self.position = Some(position);
        self.turns_remaining = POWERUP_TURN_LIMIT;
        self.last_spawn_score = score;
        Some(position)
    }

    /// Advances the on-board powerup after a placement.
    ///
    /// If the sweep cleared the powerup's cell it is collected: a random
    /// kind joins the inventory and the spawn baseline resets to the
    /// current score. Otherwise its countdown ticks, expiring it at zero.
    pub(crate) fn note_clear<R: Rng + ?Sized>(
        &mut self,
        clear: &LineClear,
        score: u32,
        rng: &mut R,
    ) -> Option<Powerup> {
        let position = self.position?;
        if clear.contains(position) {
            let collected = POWERUP_CATALOG[rng.random_range(0..POWERUP_CATALOG.len())];
            self.add(collected);
            self.position = None;
            self.turns_remaining = 0;
            self.last_spawn_score = score;
            return Some(collected);
        }
        self.turns_remaining = self.turns_remaining.saturating_sub(1);
        if self.turns_remaining == 0 {
            self.position = None;
        }
        None
    }
}
