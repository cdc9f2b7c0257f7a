//! Settlement seam for real-money games.
//!
//! Called once per finished game with a positive bet, after the finished
//! state is durably persisted. Fire-and-forget: a failure is logged and
//! never rolls back game completion.

use async_trait::async_trait;

use crate::errors::GameError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementRequest {
    pub game_id: String,
    pub winner_id: String,
    pub loser_ids: Vec<String>,
    pub bet_amount: i64,
}

#[async_trait]
pub trait Settlement: Send + Sync {
    async fn settle(&self, request: SettlementRequest) -> Result<(), GameError>;
}

/// No-op collaborator for free games and tests.
pub struct NullSettlement;

#[async_trait]
impl Settlement for NullSettlement {
    async fn settle(&self, _request: SettlementRequest) -> Result<(), GameError> {
        Ok(())
    }
}
