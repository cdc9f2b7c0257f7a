//! Post-game report, built once a game is finished. The gateway renders
//! it; the engine only assembles the facts.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{EndReason, GameState, MoveRecord, SeatId};
use crate::errors::GameError;

#[derive(Debug, Clone, Serialize)]
pub struct GameReport {
    pub room_id: String,
    pub seats: Vec<SeatId>,
    pub winner: SeatId,
    pub reason: EndReason,
    /// Remaining pip-sum per seat at game end.
    pub scores: BTreeMap<SeatId, u32>,
    pub bet_amount: i64,
    pub pot: i64,
    pub moves: Vec<MoveRecord>,
    pub tiles_on_board: usize,
    pub duration_ms: i64,
}

impl GameReport {
    /// Only finished games have a report.
    pub fn from_state(state: &GameState) -> Result<Self, GameError> {
        if !state.is_finished {
            return Err(GameError::internal(format!(
                "report requested for unfinished game {}",
                state.room_id
            )));
        }
        let winner = state
            .winner
            .clone()
            .ok_or_else(|| GameError::internal("finished game without a winner"))?;
        let reason = state
            .end_reason
            .ok_or_else(|| GameError::internal("finished game without an end reason"))?;
        let finished_at = state.finished_at.unwrap_or(state.created_at);

        Ok(Self {
            room_id: state.room_id.clone(),
            seats: state.seats.clone(),
            winner,
            reason,
            scores: state.scores.clone(),
            bet_amount: state.bet_amount,
            pot: state.bet_amount * state.seat_count() as i64,
            moves: state.move_history.clone(),
            tiles_on_board: state.board.len(),
            duration_ms: finished_at - state.created_at,
        })
    }
}
