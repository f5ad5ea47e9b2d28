use serde::{Deserialize, Serialize};

/// Width and height of the square game board.
pub const BOARD_SIZE: usize = 10;

/// A grid coordinate in `[0, 9] × [0, 9]`.
///
/// Used both for board cells and for piece-local cells (pieces are at most
/// 5×5, so every piece-local coordinate is also a valid `Point`).
///
/// # Coordinate System
///
/// - (0, 0) is the top-left corner
/// - X increases rightward (columns)
/// - Y increases downward (rows)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "RawPoint")]
pub struct Point {
    x: u8,
    y: u8,
}

/// Error produced when deserializing a [`Point`] outside the board.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("point ({x}, {y}) is outside the {BOARD_SIZE}x{BOARD_SIZE} board")]
pub struct PointRangeError {
    x: u8,
    y: u8,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct RawPoint {
    x: u8,
    y: u8,
}

impl TryFrom<RawPoint> for Point {
    type Error = PointRangeError;

    fn try_from(raw: RawPoint) -> Result<Self, Self::Error> {
        if (raw.x as usize) < BOARD_SIZE && (raw.y as usize) < BOARD_SIZE {
            Ok(Self { x: raw.x, y: raw.y })
        } else {
            Err(PointRangeError { x: raw.x, y: raw.y })
        }
    }
}

impl Point {
    #[must_use]
    pub const fn new(x: u8, y: u8) -> Self {
        assert!((x as usize) < BOARD_SIZE);
        assert!((y as usize) < BOARD_SIZE);
        Self { x, y }
    }

    #[must_use]
    pub fn x(self) -> usize {
        usize::from(self.x)
    }

    #[must_use]
    pub fn y(self) -> usize {
        usize::from(self.y)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance_to(self, other: Point) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        dx.hypot(dy)
    }

    /// The point shifted by a piece-local offset.
    ///
    /// Callers are responsible for keeping the result on the board; this is
    /// asserted, not checked.
    #[must_use]
    pub(crate) fn translated(self, offset: Point) -> Point {
        Point::new(self.x + offset.x, self.y + offset.y)
    }
}

/// The color of a filled tile.
///
/// A small closed palette shared between board tiles and pieces; rendering is
/// free to map these to whatever concrete colors it likes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TileColor {
    Blue,
    Cyan,
    Green,
    Indigo,
    Orange,
    Pink,
    Purple,
    Red,
    Teal,
}

/// A single cell: either empty or filled with a colored block.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Tile {
    #[default]
    Empty,
    Filled(TileColor),
}

impl Tile {
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Tile::Empty
    }

    #[must_use]
    pub fn is_filled(self) -> bool {
        !self.is_empty()
    }

    #[must_use]
    pub fn color(self) -> Option<TileColor> {
        match self {
            Tile::Empty => None,
            Tile::Filled(color) => Some(color),
        }
    }
}

/// Error produced when constructing a [`TileMatrix`] from malformed rows.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("tile matrix must be rectangular, non-empty, and at most {BOARD_SIZE}x{BOARD_SIZE}")]
pub struct MatrixShapeError;

/// A rectangular matrix of tiles.
///
/// Backs piece shapes. The matrix is always rectangular and non-empty, and
/// never exceeds the board dimensions; both invariants are enforced at
/// construction (including deserialization).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Tile>>", into = "Vec<Vec<Tile>>")]
pub struct TileMatrix {
    rows: Vec<Vec<Tile>>,
}

impl TryFrom<Vec<Vec<Tile>>> for TileMatrix {
    type Error = MatrixShapeError;

    fn try_from(rows: Vec<Vec<Tile>>) -> Result<Self, Self::Error> {
        let width = rows.first().map_or(0, Vec::len);
        if width == 0
            || width > BOARD_SIZE
            || rows.len() > BOARD_SIZE
            || rows.iter().any(|row| row.len() != width)
        {
            return Err(MatrixShapeError);
        }
        Ok(Self { rows })
    }
}

impl From<TileMatrix> for Vec<Vec<Tile>> {
    fn from(matrix: TileMatrix) -> Self {
        matrix.rows
    }
}

impl TileMatrix {
    /// Builds a matrix from rows of tiles.
    ///
    /// # Panics
    ///
    /// Panics if the rows are ragged, empty, or exceed the board dimensions.
    /// Only used with fixed catalog shapes, so a violation is a programming
    /// error.
    #[must_use]
    pub fn from_rows(rows: Vec<Vec<Tile>>) -> Self {
        Self::try_from(rows).expect("catalog shapes are rectangular")
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.rows[0].len()
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn get(&self, point: Point) -> Tile {
        self.rows[point.y()][point.x()]
    }

    /// Iterates every cell coordinate, column-major.
    #[expect(clippy::cast_possible_truncation)]
    pub fn points(&self) -> impl Iterator<Item = Point> + use<> {
        let (width, height) = (self.width(), self.height());
        (0..width).flat_map(move |x| (0..height).map(move |y| Point::new(x as u8, y as u8)))
    }

    /// Iterates the coordinates of filled cells.
    pub fn filled_points(&self) -> impl Iterator<Item = Point> + '_ {
        self.points().filter(|point| self.get(*point).is_filled())
    }

    /// The matrix rotated 90° clockwise.
    ///
    /// Width and height swap for non-square matrices; four rotations return
    /// to the original.
    #[must_use]
    pub fn rotated(&self) -> Self {
        let (width, height) = (self.width(), self.height());
        let mut rows = vec![vec![Tile::Empty; height]; width];
        for (y, row) in self.rows.iter().enumerate() {
            for (x, &tile) in row.iter().enumerate() {
                rows[x][height - 1 - y] = tile;
            }
        }
        Self { rows }
    }
}
