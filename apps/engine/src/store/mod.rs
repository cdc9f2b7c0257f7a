//! State store gateway.
//!
//! Narrow contract the orchestrator persists through: load/save a
//! [`GameState`] by room id, a room-scoped mutual-exclusion lock, and the
//! auxiliary records (seat→room lookup, bot profiles, chat transcript).
//! Saves are last-writer-wins at the storage layer; correctness relies on
//! the orchestrator holding the room lock for the whole read-modify-write.

pub mod memory;
pub mod redis_store;

use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::bots::BotProfile;
use crate::domain::GameState;
use crate::errors::GameError;

/// Proof of a single lock acquisition. Releasing requires the token the
/// acquisition returned, so a caller that outlived its TTL cannot release
/// a lock that was re-acquired by someone else — including a later
/// operation in the same process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockToken(String);

impl LockToken {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[async_trait]
pub trait GameStore: Send + Sync {
    /// Load the game record for a room. `GAME_NOT_FOUND` if absent.
    async fn load(&self, room_id: &str) -> Result<GameState, GameError>;

    /// Persist the full game record (keyed by `state.room_id`).
    async fn save(&self, state: &GameState) -> Result<(), GameError>;

    /// Delete the game record.
    async fn remove(&self, room_id: &str) -> Result<(), GameError>;

    /// Point a seat id at its current room for O(1) lookup.
    async fn map_seat_to_room(&self, seat: &str, room_id: &str) -> Result<(), GameError>;

    async fn room_for_seat(&self, seat: &str) -> Result<Option<String>, GameError>;

    async fn clear_seat_mapping(&self, seat: &str) -> Result<(), GameError>;

    /// Non-blocking attempt to take the room lock with an expiry. Returns
    /// a fresh per-acquisition token on success, `None` if another holder
    /// has it; callers treat the latter as recoverable contention, never
    /// fatal.
    async fn acquire_lock(
        &self,
        room_id: &str,
        ttl: Duration,
    ) -> Result<Option<LockToken>, GameError>;

    /// Release the room lock only if `token` still owns it
    /// (compare-and-delete), so a holder that outlived its TTL cannot
    /// release a lock re-acquired by anyone else.
    async fn release_lock(&self, room_id: &str, token: &LockToken) -> Result<(), GameError>;

    async fn put_bot(&self, profile: &BotProfile) -> Result<(), GameError>;

    async fn get_bot(&self, bot_id: &str) -> Result<Option<BotProfile>, GameError>;

    async fn remove_bot(&self, bot_id: &str) -> Result<(), GameError>;

    /// Append one line to the room's chat transcript.
    async fn append_chat(&self, room_id: &str, line: &str) -> Result<(), GameError>;

    async fn clear_chat(&self, room_id: &str) -> Result<(), GameError>;
}

pub(crate) fn game_key(room_id: &str) -> String {
    format!("game:{room_id}")
}

pub(crate) fn seat_room_key(seat: &str) -> String {
    format!("player:{seat}:room")
}

pub(crate) fn lock_key(room_id: &str) -> String {
    format!("lock:{room_id}")
}

pub(crate) fn bot_key(bot_id: &str) -> String {
    format!("bot:{bot_id}")
}

pub(crate) fn chat_key(room_id: &str) -> String {
    format!("chat:{room_id}")
}
