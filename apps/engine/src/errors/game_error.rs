use thiserror::Error;

use super::ErrorCode;

/// Central error type for engine operations.
///
/// Rule violations and contention surface to callers as typed failures;
/// nothing is silently swallowed. Transports should expose
/// [`GameError::code`] and treat [`GameError::is_retryable`] failures as
/// transient.
#[derive(Error, Debug)]
pub enum GameError {
    #[error("it is not this seat's turn")]
    NotYourTurn,

    #[error("tile is not in the acting seat's hand")]
    TileNotInHand,

    #[error("invalid move: {detail}")]
    InvalidMove { detail: String },

    /// Board corruption. Indicates an engine bug; fatal for the room.
    #[error("invalid board state: {detail}")]
    InvalidBoardState { detail: String },

    #[error("cannot draw tiles in a 4-player game")]
    CannotDrawInFourPlayerGame,

    #[error("a playable tile is in hand and must be played")]
    MustPlayTile,

    /// Recoverable contention: another mutator holds the room lock.
    #[error("could not acquire lock for room {room_id}")]
    LockNotAcquired { room_id: String },

    #[error("game not found: {room_id}")]
    GameNotFound { room_id: String },

    #[error("cache error: {detail}")]
    Cache { detail: String },

    #[error("configuration error: {detail}")]
    Config { detail: String },

    #[error("internal error: {detail}")]
    Internal { detail: String },
}

impl GameError {
    /// Stable code for client mapping.
    pub fn code(&self) -> ErrorCode {
        match self {
            GameError::NotYourTurn => ErrorCode::NotYourTurn,
            GameError::TileNotInHand => ErrorCode::TileNotInHand,
            GameError::InvalidMove { .. } => ErrorCode::InvalidMove,
            GameError::InvalidBoardState { .. } => ErrorCode::InvalidBoardState,
            GameError::CannotDrawInFourPlayerGame => {
                ErrorCode::CannotDrawTilesInAFourPlayerGame
            }
            GameError::MustPlayTile => ErrorCode::MustPlayTile,
            GameError::LockNotAcquired { .. } => ErrorCode::LockNotAcquired,
            GameError::GameNotFound { .. } => ErrorCode::GameNotFound,
            GameError::Cache { .. } => ErrorCode::CacheError,
            GameError::Config { .. } => ErrorCode::ConfigError,
            GameError::Internal { .. } => ErrorCode::Internal,
        }
    }

    /// True only for contention the caller may retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GameError::LockNotAcquired { .. })
    }

    pub fn invalid_move(detail: impl Into<String>) -> Self {
        Self::InvalidMove {
            detail: detail.into(),
        }
    }

    pub fn invalid_board_state(detail: impl Into<String>) -> Self {
        Self::InvalidBoardState {
            detail: detail.into(),
        }
    }

    pub fn cache(detail: impl Into<String>) -> Self {
        Self::Cache {
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }
}
