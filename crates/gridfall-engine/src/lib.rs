//! Rules engine for a 10×10 block-placement puzzle.
//!
//! Players drag pieces from a three-slot tray onto the board; full rows
//! and columns clear, score accrues per tile placed, and play continues
//! until nothing fits. The engine is deterministic given a game's start
//! date, supports a bounded undo history that replays cleanly through
//! tray refills, and serializes to a stable JSON schema for mid-session
//! saves.
//!
//! [`Game`] is the entry point; [`core`] holds the board and piece
//! primitives it is built from.

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;
