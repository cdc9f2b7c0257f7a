//! Orchestration layer: everything that touches the store, the clock, or
//! the outside world. The domain layer stays pure; this is where locking,
//! timers, bots, and notification fan-out live.

pub mod game_flow;
pub mod notifier;
pub mod report;
pub mod settlement;
pub mod timer;
