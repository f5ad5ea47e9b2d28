use std::sync::LazyLock;

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::grid::{Point, Tile, TileColor, TileMatrix};

/// A placeable piece: a small rectangular matrix of tiles.
///
/// All filled cells of a piece share a single color; non-participating cells
/// are empty. Pieces are immutable — [`Piece::rotated`] returns a new piece.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    tiles: TileMatrix,
}

impl Piece {
    fn from_pattern(color: TileColor, pattern: &[&[u8]]) -> Self {
        let rows = pattern
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&cell| {
                        if cell == 0 {
                            Tile::Empty
                        } else {
                            Tile::Filled(color)
                        }
                    })
                    .collect()
            })
            .collect();
        Self {
            tiles: TileMatrix::from_rows(rows),
        }
    }

    #[must_use]
    pub fn tiles(&self) -> &TileMatrix {
        &self.tiles
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.tiles.width()
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.tiles.height()
    }

    /// Number of filled cells; also the score awarded for placing the piece.
    #[must_use]
    pub fn point_value(&self) -> u32 {
        u32::try_from(self.tiles.filled_points().count()).unwrap_or(u32::MAX)
    }

    /// The single color shared by the piece's filled cells.
    ///
    /// `None` only for an all-empty matrix, which never occurs for catalog
    /// shapes.
    #[must_use]
    pub fn color(&self) -> Option<TileColor> {
        self.tiles
            .filled_points()
            .next()
            .and_then(|point| self.tiles.get(point).color())
    }

    /// The piece rotated 90° clockwise.
    #[must_use]
    pub fn rotated(&self) -> Self {
        Self {
            tiles: self.tiles.rotated(),
        }
    }

    /// Board points covered by the piece's filled cells when placed at
    /// `origin`. The placement must be in bounds.
    #[must_use]
    pub fn footprint(&self, origin: Point) -> Vec<Point> {
        self.tiles
            .filled_points()
            .map(|point| origin.translated(point))
            .collect()
    }
}

// The fixed piece catalog. Shapes and colors match the original game.
impl Piece {
    #[must_use]
    pub fn one_by_one() -> Self {
        Self::from_pattern(TileColor::Blue, &[&[1]])
    }

    #[must_use]
    pub fn two_by_two() -> Self {
        Self::from_pattern(TileColor::Green, &[&[1, 1], &[1, 1]])
    }

    #[must_use]
    pub fn three_by_three() -> Self {
        Self::from_pattern(TileColor::Red, &[&[1, 1, 1], &[1, 1, 1], &[1, 1, 1]])
    }

    #[must_use]
    pub fn one_by_two() -> Self {
        Self::from_pattern(TileColor::Teal, &[&[1, 1]])
    }

    #[must_use]
    pub fn one_by_three() -> Self {
        Self::from_pattern(TileColor::Orange, &[&[1, 1, 1]])
    }

    #[must_use]
    pub fn one_by_four() -> Self {
        Self::from_pattern(TileColor::Indigo, &[&[1, 1, 1, 1]])
    }

    #[must_use]
    pub fn one_by_five() -> Self {
        Self::from_pattern(TileColor::Purple, &[&[1, 1, 1, 1, 1]])
    }

    #[must_use]
    pub fn two_by_two_elbow() -> Self {
        Self::from_pattern(TileColor::Cyan, &[&[1, 0], &[1, 1]])
    }

    #[must_use]
    pub fn three_by_three_elbow() -> Self {
        Self::from_pattern(TileColor::Pink, &[&[1, 0, 0], &[1, 0, 0], &[1, 1, 1]])
    }

    /// Every catalog shape, in no particular order.
    #[must_use]
    pub fn catalog() -> Vec<Piece> {
        vec![
            Self::one_by_one(),
            Self::two_by_two(),
            Self::three_by_three(),
            Self::one_by_two(),
            Self::one_by_three(),
            Self::one_by_four(),
            Self::one_by_five(),
            Self::two_by_two_elbow(),
            Self::three_by_three_elbow(),
        ]
    }
}

/// A weighted multiset over the piece catalog used for random spawning.
///
/// Weights are fixed percentages that must sum to exactly 100; the table is
/// materialized as 100 entries so a uniform index draw implements the
/// weighting.
#[derive(Debug, Clone)]
pub struct SpawnTable {
    entries: Vec<Piece>,
}

impl SpawnTable {
    /// The standard spawn table with the original game's weights.
    #[must_use]
    pub fn standard() -> &'static Self {
        static STANDARD: LazyLock<SpawnTable> = LazyLock::new(|| {
            SpawnTable::from_weights(&[
                (Piece::one_by_one(), 6),
                (Piece::three_by_three(), 6),
                (Piece::one_by_four(), 9),
                (Piece::three_by_three_elbow(), 9),
                (Piece::two_by_two(), 14),
                (Piece::one_by_two(), 14),
                (Piece::one_by_three(), 14),
                (Piece::one_by_five(), 14),
                (Piece::two_by_two_elbow(), 14),
            ])
        });
        &STANDARD
    }

    /// Builds a table from (piece, weight) pairs.
    ///
    /// # Panics
    ///
    /// Panics unless the weights sum to exactly 100. A violation is a
    /// programming error in the catalog, caught at first use.
    #[must_use]
    pub fn from_weights(weights: &[(Piece, usize)]) -> Self {
        let mut entries = Vec::with_capacity(100);
        for (piece, weight) in weights {
            for _ in 0..*weight {
                entries.push(piece.clone());
            }
        }
        assert_eq!(entries.len(), 100, "spawn weights must sum to 100");
        Self { entries }
    }

    /// Draws one piece uniformly over the weighted entries.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Piece {
        self.entries[rng.random_range(0..self.entries.len())].clone()
    }
}

/// Unique identity token for a spawned piece instance.
///
/// Distinct from the piece's structural equality: two spawns of the same
/// shape get different ids, and the id survives undo so a specific instance
/// can be tracked across its lifetime. Serialized as a 32-character hex
/// string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceId(u128);

impl PieceId {
    /// A fresh, unique id. Intentionally not derived from the game seed.
    #[must_use]
    pub fn fresh() -> Self {
        Self(rand::rng().random())
    }
}

impl Serialize for PieceId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{:032x}", self.0))
    }
}

impl<'de> Deserialize<'de> for PieceId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        if hex_str.len() != 32 {
            return Err(serde::de::Error::custom(format!(
                "invalid piece id: expected 32 hex characters, got {}",
                hex_str.len()
            )));
        }
        let num = u128::from_str_radix(&hex_str, 16)
            .map_err(|e| serde::de::Error::custom(format!("invalid piece id: {hex_str} ({e})")))?;
        Ok(Self(num))
    }
}

/// A specific spawned piece: a shape plus a unique identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomPiece {
    id: PieceId,
    piece: Piece,
}

impl RandomPiece {
    /// Wraps a piece with a fresh identity.
    #[must_use]
    pub fn spawned(piece: Piece) -> Self {
        Self {
            id: PieceId::fresh(),
            piece,
        }
    }

    #[must_use]
    pub fn id(&self) -> PieceId {
        self.id
    }

    #[must_use]
    pub fn piece(&self) -> &Piece {
        &self.piece
    }
}
