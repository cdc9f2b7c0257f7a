//! In-process [`GameStore`] with the same key semantics as the redis
//! store, including TTL-honoring locks and JSON-serialized records. Used
//! by the test suite and by embedders that run without redis.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{GameStore, LockToken};
use crate::bots::BotProfile;
use crate::domain::GameState;
use crate::errors::GameError;

struct LockEntry {
    token: LockToken,
    expires_at: Instant,
}

#[derive(Default)]
struct Inner {
    games: HashMap<String, String>,
    seat_rooms: HashMap<String, String>,
    bots: HashMap<String, String>,
    chat: HashMap<String, Vec<String>>,
    locks: HashMap<String, LockEntry>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw persisted JSON for a room, as the store holds it.
    pub fn raw_game(&self, room_id: &str) -> Option<String> {
        self.inner.lock().games.get(room_id).cloned()
    }

    pub fn chat_lines(&self, room_id: &str) -> Vec<String> {
        self.inner
            .lock()
            .chat
            .get(room_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl GameStore for MemoryStore {
    async fn load(&self, room_id: &str) -> Result<GameState, GameError> {
        let raw = self
            .inner
            .lock()
            .games
            .get(room_id)
            .cloned()
            .ok_or_else(|| GameError::GameNotFound {
                room_id: room_id.to_string(),
            })?;
        serde_json::from_str(&raw)
            .map_err(|err| GameError::cache(format!("corrupt game record for {room_id}: {err}")))
    }

    async fn save(&self, state: &GameState) -> Result<(), GameError> {
        let raw = serde_json::to_string(state)
            .map_err(|err| GameError::internal(format!("serialize game state: {err}")))?;
        self.inner.lock().games.insert(state.room_id.clone(), raw);
        Ok(())
    }

    async fn remove(&self, room_id: &str) -> Result<(), GameError> {
        self.inner.lock().games.remove(room_id);
        Ok(())
    }

    async fn map_seat_to_room(&self, seat: &str, room_id: &str) -> Result<(), GameError> {
        self.inner
            .lock()
            .seat_rooms
            .insert(seat.to_string(), room_id.to_string());
        Ok(())
    }

    async fn room_for_seat(&self, seat: &str) -> Result<Option<String>, GameError> {
        Ok(self.inner.lock().seat_rooms.get(seat).cloned())
    }

    async fn clear_seat_mapping(&self, seat: &str) -> Result<(), GameError> {
        self.inner.lock().seat_rooms.remove(seat);
        Ok(())
    }

    async fn acquire_lock(
        &self,
        room_id: &str,
        ttl: Duration,
    ) -> Result<Option<LockToken>, GameError> {
        let mut inner = self.inner.lock();
        let now = Instant::now();
        if let Some(entry) = inner.locks.get(room_id) {
            if entry.expires_at > now {
                return Ok(None);
            }
        }
        let token = LockToken::new();
        inner.locks.insert(
            room_id.to_string(),
            LockEntry {
                token: token.clone(),
                expires_at: now + ttl,
            },
        );
        Ok(Some(token))
    }

    async fn release_lock(&self, room_id: &str, token: &LockToken) -> Result<(), GameError> {
        let mut inner = self.inner.lock();
        if let Some(entry) = inner.locks.get(room_id) {
            if entry.token == *token {
                inner.locks.remove(room_id);
            }
        }
        Ok(())
    }

    async fn put_bot(&self, profile: &BotProfile) -> Result<(), GameError> {
        let raw = serde_json::to_string(profile)
            .map_err(|err| GameError::internal(format!("serialize bot profile: {err}")))?;
        self.inner.lock().bots.insert(profile.id.clone(), raw);
        Ok(())
    }

    async fn get_bot(&self, bot_id: &str) -> Result<Option<BotProfile>, GameError> {
        let raw = self.inner.lock().bots.get(bot_id).cloned();
        match raw {
            None => Ok(None),
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|err| GameError::cache(format!("corrupt bot record {bot_id}: {err}"))),
        }
    }

    async fn remove_bot(&self, bot_id: &str) -> Result<(), GameError> {
        self.inner.lock().bots.remove(bot_id);
        Ok(())
    }

    async fn append_chat(&self, room_id: &str, line: &str) -> Result<(), GameError> {
        self.inner
            .lock()
            .chat
            .entry(room_id.to_string())
            .or_default()
            .push(line.to_string());
        Ok(())
    }

    async fn clear_chat(&self, room_id: &str) -> Result<(), GameError> {
        self.inner.lock().chat.remove(room_id);
        Ok(())
    }
}
