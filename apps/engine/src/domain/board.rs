//! Board: the placed tile chain and its two open ends.

use serde::{Deserialize, Serialize};

use crate::domain::tiles::{Side, Tile};
use crate::errors::GameError;

/// Sentinel pip value meaning "no first move yet".
pub const NO_END: i8 = -1;

/// The two open pip values at the extremities of the tile chain.
/// Both are [`NO_END`] iff the board is empty.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct BoardEnds {
    pub left: i8,
    pub right: i8,
}

impl BoardEnds {
    pub fn empty() -> Self {
        Self {
            left: NO_END,
            right: NO_END,
        }
    }
}

/// A tile as placed on the board: pip order reflects physical orientation,
/// plus play metadata for audit and reporting.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlacedTile {
    pub tile: Tile,
    pub by: String,
    pub side: Side,
    pub played_at: i64,
}

/// Ordered chain of placed tiles plus the open ends.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub tiles: Vec<PlacedTile>,
    pub ends: BoardEnds,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self {
            tiles: Vec::new(),
            ends: BoardEnds::empty(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// The open ends as pip values, or `None` while the board is empty.
    /// Errors when exactly the corruption the sentinel guards against is
    /// detected: a sentinel end on a non-empty board.
    pub fn open_ends(&self) -> Result<Option<(u8, u8)>, GameError> {
        if self.is_empty() {
            return Ok(None);
        }
        if self.ends.left == NO_END || self.ends.right == NO_END {
            return Err(GameError::invalid_board_state(format!(
                "sentinel end on non-empty board: left={}, right={}",
                self.ends.left, self.ends.right
            )));
        }
        Ok(Some((self.ends.left as u8, self.ends.right as u8)))
    }

    /// Splice `tile` onto the given side, flipping it so the matching pip
    /// touches the connecting end. The caller must have validated the move.
    ///
    /// The first tile on an empty board sets both ends (a double therefore
    /// sets both ends to its own value).
    pub fn place(
        &mut self,
        tile: Tile,
        side: Side,
        seat: &str,
        played_at: i64,
    ) -> Result<(), GameError> {
        if self.is_empty() {
            self.tiles.push(PlacedTile {
                tile,
                by: seat.to_string(),
                side,
                played_at,
            });
            self.ends.left = tile.left as i8;
            self.ends.right = tile.right as i8;
            return Ok(());
        }

        let (left_end, right_end) = self
            .open_ends()?
            .ok_or_else(|| GameError::invalid_board_state("empty ends on non-empty board"))?;

        match side {
            Side::Left => {
                let oriented = if tile.right == left_end { tile } else { tile.flipped() };
                if oriented.right != left_end {
                    return Err(GameError::invalid_board_state(format!(
                        "tile {tile} spliced on left but end is {left_end}"
                    )));
                }
                self.tiles.insert(
                    0,
                    PlacedTile {
                        tile: oriented,
                        by: seat.to_string(),
                        side,
                        played_at,
                    },
                );
                self.ends.left = oriented.left as i8;
            }
            Side::Right => {
                let oriented = if tile.left == right_end { tile } else { tile.flipped() };
                if oriented.left != right_end {
                    return Err(GameError::invalid_board_state(format!(
                        "tile {tile} spliced on right but end is {right_end}"
                    )));
                }
                self.tiles.push(PlacedTile {
                    tile: oriented,
                    by: seat.to_string(),
                    side,
                    played_at,
                });
                self.ends.right = oriented.right as i8;
            }
        }
        Ok(())
    }
}
