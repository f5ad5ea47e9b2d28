//! Domain primitives: the board grid, tiles, and the piece catalog.

pub use self::{board::*, grid::*, piece::*};

pub(crate) mod board;
pub(crate) mod grid;
pub(crate) mod piece;
