#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

//! Turn-based multiplayer domino engine.
//!
//! The crate is a library embedded by a transport gateway: it owns the
//! rules engine, the room-locked turn orchestrator, the turn timers, and
//! the bot players. Everything outside — websockets, matchmaking, auth,
//! settlement — talks to it through the seams in [`store`] and
//! [`services`].

pub mod bots;
pub mod config;
pub mod domain;
pub mod errors;
pub mod services;
pub mod store;
pub mod telemetry;

#[cfg(test)]
mod test_bootstrap;

// Re-exports for public API
pub use bots::{BotDifficulty, BotProfile};
pub use config::EngineConfig;
pub use errors::{ErrorCode, GameError};
pub use services::game_flow::GameFlowService;
pub use services::notifier::{GameEvent, Notifier, NullNotifier};
pub use services::report::GameReport;
pub use services::settlement::{NullSettlement, Settlement, SettlementRequest};
pub use store::memory::MemoryStore;
pub use store::redis_store::RedisStore;
pub use store::{GameStore, LockToken};

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    test_bootstrap::logging_init();
}
