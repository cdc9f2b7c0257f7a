//! Engine configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::errors::GameError;

/// Tunable knobs for turn timing, locking, and bot pacing.
///
/// All durations have production defaults matching the original service;
/// tests typically construct a config with zero bot delay.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Hard per-turn timeout; on expiry the seat is passed.
    pub turn_timeout: Duration,
    /// Lead time before the timeout at which the acting seat is warned.
    pub turn_warning: Duration,
    /// TTL on the room lock; guarantees forward progress if a holder dies.
    pub lock_ttl: Duration,
    /// Minimum simulated bot thinking delay.
    pub bot_think_min: Duration,
    /// Maximum simulated bot thinking delay.
    pub bot_think_max: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            turn_timeout: Duration::from_secs(30),
            turn_warning: Duration::from_secs(10),
            lock_ttl: Duration::from_millis(5000),
            bot_think_min: Duration::from_millis(1000),
            bot_think_max: Duration::from_millis(3000),
        }
    }
}

impl EngineConfig {
    /// Build a config from `DOMINO_*` environment variables, falling back
    /// to defaults for anything unset.
    pub fn from_env() -> Result<Self, GameError> {
        let defaults = Self::default();
        Ok(Self {
            turn_timeout: millis_var("DOMINO_TURN_TIMEOUT_MS", defaults.turn_timeout)?,
            turn_warning: millis_var("DOMINO_TURN_WARNING_MS", defaults.turn_warning)?,
            lock_ttl: millis_var("DOMINO_LOCK_TTL_MS", defaults.lock_ttl)?,
            bot_think_min: millis_var("DOMINO_BOT_THINK_MIN_MS", defaults.bot_think_min)?,
            bot_think_max: millis_var("DOMINO_BOT_THINK_MAX_MS", defaults.bot_think_max)?,
        })
    }

    /// Config with no bot delay, for tests.
    pub fn fast() -> Self {
        Self {
            bot_think_min: Duration::ZERO,
            bot_think_max: Duration::ZERO,
            ..Self::default()
        }
    }
}

fn millis_var(name: &str, default: Duration) -> Result<Duration, GameError> {
    match env::var(name) {
        Ok(raw) => {
            let ms: u64 = raw
                .parse()
                .map_err(|_| GameError::config(format!("{name} must be an integer (millis), got {raw:?}")))?;
            Ok(Duration::from_millis(ms))
        }
        Err(_) => Ok(default),
    }
}
