use serde::{Deserialize, Serialize};
use std::fmt;

/// Total number of Squares on the board.
pub const NUM_SQUARES: usize = 10_000;

/// Squares per row (and per column) of the board.
pub const GRID_EDGE: u16 = 100;

/// Identifier of one Square, 1..=10000.
///
/// The id fixes the Square's position on the 100×100 grid: ids count
/// left-to-right, top-to-bottom, so id 1 is the top-left corner and id
/// 10000 the bottom-right. Deserialization goes through [`SquareId::new`],
/// so an out-of-range id can never enter through a data file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct SquareId(u16);

impl SquareId {
    /// Validate a raw number (e.g. a decoded event argument) as a square id.
    pub fn new(n: u64) -> Result<Self, InvalidSquareId> {
        if (1..=NUM_SQUARES as u64).contains(&n) {
            Ok(Self(n as u16))
        } else {
            Err(InvalidSquareId(n))
        }
    }

    /// Rebuild an id from a dense-array index (id − 1).
    pub fn from_index(index: usize) -> Option<Self> {
        if index < NUM_SQUARES {
            Some(Self(index as u16 + 1))
        } else {
            None
        }
    }

    /// Every square id in ascending order.
    pub fn all() -> impl Iterator<Item = SquareId> {
        (1..=NUM_SQUARES as u16).map(SquareId)
    }

    pub fn get(self) -> u16 {
        self.0
    }

    /// Index of this square in the dense per-square arrays (id − 1).
    pub fn index(self) -> usize {
        self.0 as usize - 1
    }

    /// 1-based row on the board.
    pub fn row(self) -> u16 {
        (self.0 - 1) / GRID_EDGE + 1
    }

    /// 1-based column on the board.
    pub fn column(self) -> u16 {
        (self.0 - 1) % GRID_EDGE + 1
    }

    /// Manhattan distance to the nearest of the four central squares.
    ///
    /// The 100×100 board has no single center cell; rows/columns 50 and 51
    /// are all distance zero.
    pub fn manhattan_distance_to_center(self) -> u16 {
        let half = GRID_EDGE / 2;
        let axis = |v: u16| -> u16 {
            if v <= half {
                half - v
            } else {
                v - (half + 1)
            }
        };
        axis(self.row()) + axis(self.column())
    }

    /// Zero-padded five-digit form used in artifact file names.
    pub fn padded(self) -> String {
        format!("{:05}", self.0)
    }
}

impl fmt::Display for SquareId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u64> for SquareId {
    type Error = InvalidSquareId;

    fn try_from(n: u64) -> Result<Self, Self::Error> {
        Self::new(n)
    }
}

impl From<SquareId> for u64 {
    fn from(id: SquareId) -> u64 {
        id.0 as u64
    }
}

/// A number outside 1..=10000 was offered as a square id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidSquareId(pub u64);

impl fmt::Display for InvalidSquareId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid square id: {} (expected 1..={})", self.0, NUM_SQUARES)
    }
}

impl std::error::Error for InvalidSquareId {}
