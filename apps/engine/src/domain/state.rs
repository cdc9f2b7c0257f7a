//! The room-scoped game state aggregate.
//!
//! `GameState` is the single unit of concurrency control: the turn
//! orchestrator, holding the room lock, is the only writer. The struct is
//! persisted as JSON on every mutation, so everything here is an explicit
//! serde field (no ad-hoc sidecar maps).

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::board::Board;
use crate::domain::tiles::{Side, Tile, TILE_COUNT};
use crate::errors::GameError;

/// Stable id of a player slot (human id, or a synthetic bot id after
/// disconnect substitution).
pub type SeatId = String;

/// Current unix time in milliseconds (the store's timestamp format).
pub fn now_ms() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

/// What a seat did on its turn.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveAction {
    Play,
    Draw,
    Pass,
}

/// Append-only audit log entry.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub seat: SeatId,
    pub action: MoveAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tile: Option<Tile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
    pub at: i64,
}

/// How a finished game ended.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndReason {
    /// A seat emptied its hand.
    Normal,
    /// No seat could move and nothing was left to draw.
    Blocked,
}

/// Entire per-room match state, sufficient for all pure rules operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub room_id: String,
    /// Seat ids in turn order. Substitution rewrites entries in place.
    pub seats: Vec<SeatId>,
    pub hands: BTreeMap<SeatId, Vec<Tile>>,
    pub board: Board,
    /// Undealt tiles; empty in a 4-seat game (all 28 are dealt).
    pub draw_pile: Vec<Tile>,
    /// Index into `seats` of the seat expected to act.
    pub turn_index: usize,
    pub is_first_play: bool,
    pub bet_amount: i64,
    /// Human seats currently replaced by a bot.
    pub disconnected: BTreeSet<SeatId>,
    pub move_history: Vec<MoveRecord>,
    pub scores: BTreeMap<SeatId, u32>,
    pub turn_started_at: i64,
    pub created_at: i64,
    pub is_finished: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<SeatId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_reason: Option<EndReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<i64>,
}

impl GameState {
    pub fn seat_count(&self) -> usize {
        self.seats.len()
    }

    /// The seat expected to act.
    pub fn current_seat(&self) -> &str {
        &self.seats[self.turn_index]
    }

    /// `turn_index = (turn_index + 1) mod seat_count`.
    pub fn advance_turn(&mut self) {
        self.turn_index = (self.turn_index + 1) % self.seat_count();
        self.turn_started_at = now_ms();
    }

    pub fn hand(&self, seat: &str) -> Result<&Vec<Tile>, GameError> {
        self.hands
            .get(seat)
            .ok_or_else(|| GameError::internal(format!("no hand for seat {seat}")))
    }

    pub fn hand_mut(&mut self, seat: &str) -> Result<&mut Vec<Tile>, GameError> {
        self.hands
            .get_mut(seat)
            .ok_or_else(|| GameError::internal(format!("no hand for seat {seat}")))
    }

    /// Tiles across hands, board, and draw pile. Equals [`TILE_COUNT`]
    /// before game end.
    pub fn total_tiles(&self) -> usize {
        let in_hands: usize = self.hands.values().map(Vec::len).sum();
        in_hands + self.board.len() + self.draw_pile.len()
    }

    /// Debug guard used by mutation paths.
    pub fn check_tile_conservation(&self) -> Result<(), GameError> {
        let total = self.total_tiles();
        if total != TILE_COUNT {
            return Err(GameError::invalid_board_state(format!(
                "tile conservation violated: {total} tiles in room {}",
                self.room_id
            )));
        }
        Ok(())
    }

    pub fn record_move(
        &mut self,
        seat: &str,
        action: MoveAction,
        tile: Option<Tile>,
        side: Option<Side>,
    ) {
        self.move_history.push(MoveRecord {
            seat: seat.to_string(),
            action,
            tile,
            side,
            at: now_ms(),
        });
    }
}
