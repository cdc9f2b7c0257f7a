//! Redis-backed [`GameStore`].
//!
//! One JSON blob per room (`game:{room}`), seat→room pointers
//! (`player:{seat}:room`), ephemeral lock keys with TTL (`lock:{room}`),
//! bot profiles (`bot:{id}`), and a chat list (`chat:{room}`).

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tracing::debug;

use super::{bot_key, chat_key, game_key, lock_key, seat_room_key, GameStore, LockToken};
use crate::bots::BotProfile;
use crate::domain::GameState;
use crate::errors::GameError;

pub struct RedisStore {
    manager: ConnectionManager,
}

impl RedisStore {
    pub async fn connect(redis_url: &str) -> Result<Self, GameError> {
        let client = Client::open(redis_url)
            .map_err(|err| GameError::config(format!("invalid redis url: {err}")))?;

        let manager = ConnectionManager::new(client)
            .await
            .map_err(|err| GameError::cache(format!("redis connection manager: {err}")))?;

        Ok(Self { manager })
    }

    fn conn(&self) -> ConnectionManager {
        self.manager.clone()
    }
}

fn cache_err(op: &str, err: redis::RedisError) -> GameError {
    GameError::cache(format!("{op}: {err}"))
}

#[async_trait]
impl GameStore for RedisStore {
    async fn load(&self, room_id: &str) -> Result<GameState, GameError> {
        let mut con = self.conn();
        let raw: Option<String> = con
            .get(game_key(room_id))
            .await
            .map_err(|e| cache_err("load game", e))?;

        let raw = raw.ok_or_else(|| GameError::GameNotFound {
            room_id: room_id.to_string(),
        })?;

        serde_json::from_str(&raw)
            .map_err(|err| GameError::cache(format!("corrupt game record for {room_id}: {err}")))
    }

    async fn save(&self, state: &GameState) -> Result<(), GameError> {
        let raw = serde_json::to_string(state)
            .map_err(|err| GameError::internal(format!("serialize game state: {err}")))?;
        let mut con = self.conn();
        let _: () = con
            .set(game_key(&state.room_id), raw)
            .await
            .map_err(|e| cache_err("save game", e))?;
        Ok(())
    }

    async fn remove(&self, room_id: &str) -> Result<(), GameError> {
        let mut con = self.conn();
        let _: () = con
            .del(game_key(room_id))
            .await
            .map_err(|e| cache_err("remove game", e))?;
        Ok(())
    }

    async fn map_seat_to_room(&self, seat: &str, room_id: &str) -> Result<(), GameError> {
        let mut con = self.conn();
        let _: () = con
            .set(seat_room_key(seat), room_id)
            .await
            .map_err(|e| cache_err("map seat", e))?;
        Ok(())
    }

    async fn room_for_seat(&self, seat: &str) -> Result<Option<String>, GameError> {
        let mut con = self.conn();
        con.get(seat_room_key(seat))
            .await
            .map_err(|e| cache_err("room for seat", e))
    }

    async fn clear_seat_mapping(&self, seat: &str) -> Result<(), GameError> {
        let mut con = self.conn();
        let _: () = con
            .del(seat_room_key(seat))
            .await
            .map_err(|e| cache_err("clear seat mapping", e))?;
        Ok(())
    }

    async fn acquire_lock(
        &self,
        room_id: &str,
        ttl: Duration,
    ) -> Result<Option<LockToken>, GameError> {
        let token = LockToken::new();
        let mut con = self.conn();
        // SET key token NX PX ttl — single round trip, atomic.
        let res: Option<String> = redis::cmd("SET")
            .arg(lock_key(room_id))
            .arg(token.as_str())
            .arg("NX")
            .arg("PX")
            .arg(ttl.as_millis() as u64)
            .query_async(&mut con)
            .await
            .map_err(|e| cache_err("acquire lock", e))?;

        let acquired = res.is_some();
        debug!(room_id, acquired, "room lock attempt");
        Ok(acquired.then_some(token))
    }

    async fn release_lock(&self, room_id: &str, token: &LockToken) -> Result<(), GameError> {
        let mut con = self.conn();
        let key = lock_key(room_id);
        let holder: Option<String> = con
            .get(&key)
            .await
            .map_err(|e| cache_err("read lock", e))?;

        // Only delete the lock this acquisition still owns. A lock that
        // expired and was re-acquired carries a different token.
        if holder.as_deref() == Some(token.as_str()) {
            let _: () = con.del(&key).await.map_err(|e| cache_err("release lock", e))?;
        }
        Ok(())
    }

    async fn put_bot(&self, profile: &BotProfile) -> Result<(), GameError> {
        let raw = serde_json::to_string(profile)
            .map_err(|err| GameError::internal(format!("serialize bot profile: {err}")))?;
        let mut con = self.conn();
        let _: () = con
            .set(bot_key(&profile.id), raw)
            .await
            .map_err(|e| cache_err("put bot", e))?;
        Ok(())
    }

    async fn get_bot(&self, bot_id: &str) -> Result<Option<BotProfile>, GameError> {
        let mut con = self.conn();
        let raw: Option<String> = con
            .get(bot_key(bot_id))
            .await
            .map_err(|e| cache_err("get bot", e))?;

        match raw {
            None => Ok(None),
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|err| GameError::cache(format!("corrupt bot record {bot_id}: {err}"))),
        }
    }

    async fn remove_bot(&self, bot_id: &str) -> Result<(), GameError> {
        let mut con = self.conn();
        let _: () = con
            .del(bot_key(bot_id))
            .await
            .map_err(|e| cache_err("remove bot", e))?;
        Ok(())
    }

    async fn append_chat(&self, room_id: &str, line: &str) -> Result<(), GameError> {
        let mut con = self.conn();
        let _: () = con
            .rpush(chat_key(room_id), line)
            .await
            .map_err(|e| cache_err("append chat", e))?;
        Ok(())
    }

    async fn clear_chat(&self, room_id: &str) -> Result<(), GameError> {
        let mut con = self.conn();
        let _: () = con
            .del(chat_key(room_id))
            .await
            .map_err(|e| cache_err("clear chat", e))?;
        Ok(())
    }
}
