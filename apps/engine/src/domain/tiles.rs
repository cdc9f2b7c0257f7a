//! Core tile types: Tile, Side, and the fixed 28-tile double-six set.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Highest pip value in a double-six set.
pub const MAX_PIP: u8 = 6;
/// Number of tiles in a full double-six set.
pub const TILE_COUNT: usize = 28;
/// Tiles dealt to each seat at game start.
pub const HAND_SIZE: usize = 7;

/// Which open end of the board a tile is played against.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

/// One domino tile. `(a, b)` and `(b, a)` are the same tile for matching
/// purposes; orientation only matters once placed on the board.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub left: u8,
    pub right: u8,
}

impl Tile {
    pub fn new(left: u8, right: u8) -> Self {
        Self { left, right }
    }

    /// Unordered equality: `(a,b)` matches `(b,a)`.
    pub fn matches(&self, other: Tile) -> bool {
        (self.left == other.left && self.right == other.right)
            || (self.left == other.right && self.right == other.left)
    }

    pub fn is_double(&self) -> bool {
        self.left == self.right
    }

    /// True if either pip equals `value`.
    pub fn has_pip(&self, value: u8) -> bool {
        self.left == value || self.right == value
    }

    pub fn pip_sum(&self) -> u32 {
        self.left as u32 + self.right as u32
    }

    /// The same tile with swapped pip order.
    pub fn flipped(&self) -> Tile {
        Tile {
            left: self.right,
            right: self.left,
        }
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.left, self.right)
    }
}

/// The full double-six set: all pairs `0 <= i <= j <= 6`, 28 tiles.
pub fn full_tile_set() -> Vec<Tile> {
    let mut tiles = Vec::with_capacity(TILE_COUNT);
    for i in 0..=MAX_PIP {
        for j in i..=MAX_PIP {
            tiles.push(Tile::new(i, j));
        }
    }
    tiles
}
