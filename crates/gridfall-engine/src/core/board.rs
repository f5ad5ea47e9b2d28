use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::grid::{BOARD_SIZE, Point, Tile};
use super::piece::Piece;

/// Seconds of clear-animation delay per unit of distance from the placed
/// piece.
pub const CLEAR_DELAY_PER_TILE: f64 = 0.025;

/// Error produced when loading a board whose tile grid is not 10×10.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("board must be {BOARD_SIZE}x{BOARD_SIZE}")]
pub struct BoardShapeError;

/// The 10×10 playing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Tile>>", into = "Vec<Vec<Tile>>")]
pub struct Board {
    rows: [[Tile; BOARD_SIZE]; BOARD_SIZE],
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl TryFrom<Vec<Vec<Tile>>> for Board {
    type Error = BoardShapeError;

    fn try_from(rows: Vec<Vec<Tile>>) -> Result<Self, Self::Error> {
        if rows.len() != BOARD_SIZE || rows.iter().any(|row| row.len() != BOARD_SIZE) {
            return Err(BoardShapeError);
        }
        let mut board = Self::empty();
        for (y, row) in rows.into_iter().enumerate() {
            for (x, tile) in row.into_iter().enumerate() {
                board.rows[y][x] = tile;
            }
        }
        Ok(board)
    }
}

impl From<Board> for Vec<Vec<Tile>> {
    fn from(board: Board) -> Self {
        board.rows.iter().map(|row| row.to_vec()).collect()
    }
}

impl Board {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            rows: [[Tile::Empty; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    #[must_use]
    pub fn tile(&self, point: Point) -> Tile {
        self.rows[point.y()][point.x()]
    }

    pub(crate) fn set_tile(&mut self, point: Point, tile: Tile) {
        self.rows[point.y()][point.x()] = tile;
    }

    /// Iterates every board coordinate, column by column.
    #[expect(clippy::cast_possible_truncation)]
    pub fn points() -> impl Iterator<Item = Point> {
        (0..BOARD_SIZE)
            .flat_map(|x| (0..BOARD_SIZE).map(move |y| Point::new(x as u8, y as u8)))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.iter().flatten().all(|tile| tile.is_empty())
    }

    pub fn empty_points(&self) -> impl Iterator<Item = Point> + '_ {
        Self::points().filter(|&point| self.tile(point).is_empty())
    }

    /// Whether `piece` fits at `origin`: fully on the board and overlapping
    /// no filled tile.
    #[must_use]
    pub fn can_place(&self, piece: &Piece, origin: Point) -> bool {
        if origin.x() + piece.width() > BOARD_SIZE || origin.y() + piece.height() > BOARD_SIZE {
            return false;
        }
        piece
            .footprint(origin)
            .iter()
            .all(|&point| self.tile(point).is_empty())
    }

    /// Writes `piece` onto the board. Does nothing if the placement is
    /// invalid.
    pub fn commit(&mut self, piece: &Piece, origin: Point) {
        if !self.can_place(piece, origin) {
            return;
        }
        let Some(color) = piece.color() else { return };
        for point in piece.footprint(origin) {
            self.set_tile(point, Tile::Filled(color));
        }
    }

    /// Clears every fully filled row and column, returning the cleared
    /// points with their animation delays.
    ///
    /// `placed` and `origin` identify the piece whose placement triggered
    /// the clear; delays radiate outward from its footprint.
    pub fn clear_filled_lines(&mut self, placed: &Piece, origin: Point) -> LineClear {
        #[expect(clippy::cast_possible_truncation)]
        let full_columns: Vec<u8> = (0..BOARD_SIZE as u8)
            .filter(|&x| (0..BOARD_SIZE as u8).all(|y| self.tile(Point::new(x, y)).is_filled()))
            .collect();
        #[expect(clippy::cast_possible_truncation)]
        let full_rows: Vec<u8> = (0..BOARD_SIZE as u8)
            .filter(|&y| (0..BOARD_SIZE as u8).all(|x| self.tile(Point::new(x, y)).is_filled()))
            .collect();

        let footprint = placed.footprint(origin);
        let mut delays = BTreeMap::new();
        #[expect(clippy::cast_possible_truncation)]
        for &x in &full_columns {
            for y in 0..BOARD_SIZE as u8 {
                let point = Point::new(x, y);
                delays.insert(point, Self::clear_delay(point, &footprint));
            }
        }
        #[expect(clippy::cast_possible_truncation)]
        for &y in &full_rows {
            for x in 0..BOARD_SIZE as u8 {
                let point = Point::new(x, y);
                delays.insert(point, Self::clear_delay(point, &footprint));
            }
        }

        for &point in delays.keys() {
            self.set_tile(point, Tile::Empty);
        }

        let lines = u32::try_from(full_columns.len() + full_rows.len()).unwrap_or(u32::MAX);
        LineClear { delays, lines }
    }

    /// Animation delay for clearing `point`: distance to the nearest cell of
    /// the triggering footprint, scaled by [`CLEAR_DELAY_PER_TILE`].
    fn clear_delay(point: Point, footprint: &[Point]) -> f64 {
        let distance = footprint
            .iter()
            .map(|&cell| point.distance_to(cell))
            .fold(f64::INFINITY, f64::min);
        if distance.is_finite() {
            distance * CLEAR_DELAY_PER_TILE
        } else {
            0.0
        }
    }
}

/// The outcome of a line-clear sweep: which points cleared, with what
/// delays, and how many lines were involved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineClear {
    delays: BTreeMap<Point, f64>,
    lines: u32,
}

impl LineClear {
    /// Number of full rows plus full columns cleared.
    #[must_use]
    pub fn lines(&self) -> u32 {
        self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.delays.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.delays.len()
    }

    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        self.delays.contains_key(&point)
    }

    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.delays.keys().copied()
    }

    /// Animation delay in seconds for a cleared point.
    #[must_use]
    pub fn delay(&self, point: Point) -> Option<f64> {
        self.delays.get(&point).copied()
    }
}

#[cfg(test)]
mod tests {
    use crate::core::grid::TileColor;

    use super::*;

    #[test]
    fn placement_respects_bounds_and_overlap() {
        let mut board = Board::empty();
        let square = Piece::three_by_three();
        assert!(board.can_place(&square, Point::new(7, 7)));
        assert!(!board.can_place(&square, Point::new(8, 7)));
        assert!(!board.can_place(&square, Point::new(7, 8)));

        board.commit(&Piece::one_by_one(), Point::new(8, 8));
        assert!(!board.can_place(&square, Point::new(7, 7)));
        assert!(board.can_place(&square, Point::new(0, 0)));
    }

    #[test]
    fn invalid_commit_leaves_board_unchanged() {
        let mut board = Board::empty();
        board.commit(&Piece::one_by_one(), Point::new(4, 4));
        let before = board.clone();
        board.commit(&Piece::two_by_two(), Point::new(4, 4));
        assert_eq!(board, before);
    }

    #[test]
    fn full_row_clears_and_leaves_rest() {
        let mut board = Board::empty();
        for x in 0..10 {
            board.commit(&Piece::one_by_one(), Point::new(x, 3));
        }
        board.commit(&Piece::one_by_one(), Point::new(0, 0));

        let clear = board.clear_filled_lines(&Piece::one_by_one(), Point::new(9, 3));
        assert_eq!(clear.lines(), 1);
        assert_eq!(clear.len(), 10);
        for x in 0..10 {
            assert!(board.tile(Point::new(x, 3)).is_empty());
        }
        assert!(board.tile(Point::new(0, 0)).is_filled());
    }

    #[test]
    fn crossing_row_and_column_clear_together() {
        let mut board = Board::empty();
        for i in 0..10 {
            board.set_tile(Point::new(i, 4), Tile::Filled(TileColor::Red));
            board.set_tile(Point::new(2, i), Tile::Filled(TileColor::Red));
        }
        let clear = board.clear_filled_lines(&Piece::one_by_one(), Point::new(2, 4));
        assert_eq!(clear.lines(), 2);
        // 10 + 10 minus the shared intersection cell.
        assert_eq!(clear.len(), 19);
        assert!(board.is_empty());
    }

    #[test]
    fn no_clear_when_no_line_is_full() {
        let mut board = Board::empty();
        board.commit(&Piece::three_by_three(), Point::new(0, 0));
        let clear = board.clear_filled_lines(&Piece::three_by_three(), Point::new(0, 0));
        assert!(clear.is_empty());
        assert_eq!(clear.lines(), 0);
        assert!(board.tile(Point::new(1, 1)).is_filled());
    }

    #[test]
    fn clear_delays_radiate_from_the_placed_piece() {
        let mut board = Board::empty();
        for x in 0..10 {
            board.set_tile(Point::new(x, 5), Tile::Filled(TileColor::Green));
            board.set_tile(Point::new(x, 6), Tile::Filled(TileColor::Green));
        }
        let square = Piece::two_by_two();
        let clear = board.clear_filled_lines(&square, Point::new(5, 5));

        let expected = [0.125, 0.1, 0.075, 0.05, 0.025, 0.0, 0.0, 0.025, 0.05, 0.075];
        for (x, &delay) in expected.iter().enumerate() {
            #[expect(clippy::cast_possible_truncation)]
            let point = Point::new(x as u8, 5);
            let actual = clear.delay(point).unwrap();
            assert!(
                (actual - delay).abs() < 1e-9,
                "delay at x={x}: expected {delay}, got {actual}"
            );
        }
    }

    #[test]
    fn six_piece_layout_fills_the_expected_cells() {
        let mut board = Board::empty();
        let placements = [
            (Piece::one_by_one(), Point::new(0, 0)),
            (Piece::two_by_two(), Point::new(2, 0)),
            (Piece::three_by_three(), Point::new(5, 0)),
            (Piece::one_by_five(), Point::new(0, 5)),
            (Piece::two_by_two_elbow(), Point::new(6, 5)),
            (Piece::three_by_three_elbow(), Point::new(0, 7)),
        ];
        for (piece, origin) in &placements {
            assert!(board.can_place(piece, *origin));
            board.commit(piece, *origin);
        }

        let filled: usize = Board::points()
            .filter(|&point| board.tile(point).is_filled())
            .count();
        assert_eq!(filled, 1 + 4 + 9 + 5 + 3 + 5);
        // Spot-check corners of each footprint and the elbow gaps.
        assert_eq!(board.tile(Point::new(0, 0)).color(), Some(TileColor::Blue));
        assert_eq!(board.tile(Point::new(3, 1)).color(), Some(TileColor::Green));
        assert_eq!(board.tile(Point::new(7, 2)).color(), Some(TileColor::Red));
        assert_eq!(
            board.tile(Point::new(4, 5)).color(),
            Some(TileColor::Purple)
        );
        assert_eq!(board.tile(Point::new(6, 6)).color(), Some(TileColor::Cyan));
        assert!(board.tile(Point::new(7, 5)).is_empty());
        assert_eq!(board.tile(Point::new(2, 9)).color(), Some(TileColor::Pink));
        assert!(board.tile(Point::new(1, 7)).is_empty());
    }

    #[test]
    fn board_serde_rejects_wrong_dimensions() {
        let nine_by_nine = vec![vec![Tile::Empty; 9]; 9];
        assert!(Board::try_from(nine_by_nine).is_err());
        let json = serde_json::to_string(&vec![vec![Tile::Empty; 10]; 9]).unwrap();
        assert!(serde_json::from_str::<Board>(&json).is_err());
    }

    #[test]
    fn board_serde_round_trips() {
        let mut board = Board::empty();
        board.commit(&Piece::two_by_two_elbow(), Point::new(3, 3));
        let json = serde_json::to_string(&board).unwrap();
        let restored: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, board);
    }
}
