//! Error types shared across the engine.
//!
//! Every failure that can reach a client carries a stable [`ErrorCode`];
//! transports map the code string, never the message text.

mod error_code;
mod game_error;

pub use error_code::ErrorCode;
pub use game_error::GameError;
