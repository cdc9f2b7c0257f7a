//! Error codes for the domino engine.
//!
//! All error codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings
//! that appear in client-facing payloads. Add new codes here; never pass
//! ad-hoc strings as error codes.

use core::fmt;

/// Centralized error codes for the domino engine.
///
/// Each variant maps to a canonical SCREAMING_SNAKE_CASE string that is
/// stable across releases because clients switch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Rule violations
    /// Acting seat is not the current turn holder
    NotYourTurn,
    /// Played tile is not in the acting seat's hand
    TileNotInHand,
    /// Tile does not match the targeted board end
    InvalidMove,
    /// Board ends are sentinel while tiles are placed (engine bug)
    InvalidBoardState,
    /// Draw attempted in a 4-seat game (no draw pile exists)
    CannotDrawTilesInAFourPlayerGame,
    /// Pass attempted while a legal tile is in hand
    MustPlayTile,

    // Concurrency
    /// Room lock held by another mutator; caller may retry
    LockNotAcquired,

    // Resource Not Found
    /// No game record for the room id
    GameNotFound,

    // System Errors
    /// Store unavailable or returned corrupt data
    CacheError,
    /// Configuration error
    ConfigError,
    /// Internal engine error
    Internal,
}

impl ErrorCode {
    /// Returns the canonical string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotYourTurn => "NOT_YOUR_TURN",
            ErrorCode::TileNotInHand => "TILE_NOT_IN_HAND",
            ErrorCode::InvalidMove => "INVALID_MOVE",
            ErrorCode::InvalidBoardState => "INVALID_BOARD_STATE",
            ErrorCode::CannotDrawTilesInAFourPlayerGame => {
                "CANNOT_DRAW_TILES_IN_A_4_PLAYER_GAME"
            }
            ErrorCode::MustPlayTile => "MUST_PLAY_TILE",
            ErrorCode::LockNotAcquired => "LOCK_NOT_ACQUIRED",
            ErrorCode::GameNotFound => "GAME_NOT_FOUND",
            ErrorCode::CacheError => "CACHE_ERROR",
            ErrorCode::ConfigError => "CONFIG_ERROR",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
