//! The game engine: trays, scoring, powerups, undo, and the [`Game`]
//! state machine that ties them together.

pub use self::save::LoadError;
pub use self::{game::*, generator::*, powerup::*, scoring::*, tray::*, undo::*};

mod game;
mod generator;
mod powerup;
mod save;
mod scoring;
mod tray;
mod undo;
