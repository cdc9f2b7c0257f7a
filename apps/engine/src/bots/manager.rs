//! Bot profile registry and turn pacing.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::info;
use uuid::Uuid;

use super::{BotDifficulty, BotProfile};
use crate::config::EngineConfig;
use crate::errors::GameError;
use crate::store::GameStore;

pub struct BotManager {
    store: Arc<dyn GameStore>,
    config: EngineConfig,
}

impl BotManager {
    pub fn new(store: Arc<dyn GameStore>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// Register a bot seated at game creation.
    pub async fn register(&self, difficulty: BotDifficulty) -> Result<BotProfile, GameError> {
        let profile = BotProfile::new(format!("bot-{}", Uuid::new_v4()), difficulty);
        self.store.put_bot(&profile).await?;
        info!(bot_id = %profile.id, ?difficulty, "bot registered");
        Ok(profile)
    }

    /// Register a bot that takes over a disconnected human's seat.
    pub async fn register_substitute(
        &self,
        replaces: &str,
        difficulty: BotDifficulty,
    ) -> Result<BotProfile, GameError> {
        let profile = BotProfile::substitute(
            format!("bot-{}", Uuid::new_v4()),
            difficulty,
            replaces,
        );
        self.store.put_bot(&profile).await?;
        info!(bot_id = %profile.id, replaces, "substitute bot registered");
        Ok(profile)
    }

    pub async fn profile(&self, seat: &str) -> Result<Option<BotProfile>, GameError> {
        self.store.get_bot(seat).await
    }

    pub async fn is_bot(&self, seat: &str) -> Result<bool, GameError> {
        Ok(self.store.get_bot(seat).await?.is_some())
    }

    pub async fn remove(&self, seat: &str) -> Result<(), GameError> {
        self.store.remove_bot(seat).await
    }

    /// Randomized pause before a bot acts, so automated turns read as
    /// human-paced. Zero when the configured bounds are zero (tests).
    pub fn think_delay(&self) -> Duration {
        let min = self.config.bot_think_min;
        let max = self.config.bot_think_max;
        if max <= min {
            return min;
        }
        let span = (max - min).as_millis() as u64;
        let extra = rand::rng().random_range(0..=span);
        min + Duration::from_millis(extra)
    }
}
