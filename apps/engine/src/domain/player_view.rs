//! Seat-personalized snapshot of a game.
//!
//! Only the viewing seat's own hand is included; everyone else appears as
//! a tile count. This is the shape every outbound notification embeds.

use serde::{Deserialize, Serialize};

use crate::domain::board::{Board, BoardEnds};
use crate::domain::state::{GameState, SeatId};
use crate::domain::tiles::Tile;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatSummary {
    pub seat: SeatId,
    pub position: usize,
    pub tile_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    pub room_id: String,
    pub seats: Vec<SeatSummary>,
    pub your_hand: Vec<Tile>,
    pub your_position: usize,
    pub board: Board,
    pub board_ends: BoardEnds,
    pub current_turn: SeatId,
    pub draw_pile_count: usize,
    pub bet_amount: i64,
    pub bet_total: i64,
}

impl PlayerView {
    pub fn for_seat(state: &GameState, seat: &str) -> Self {
        let seats = state
            .seats
            .iter()
            .enumerate()
            .map(|(position, id)| SeatSummary {
                seat: id.clone(),
                position,
                tile_count: state.hands.get(id).map(Vec::len).unwrap_or(0),
            })
            .collect();

        Self {
            room_id: state.room_id.clone(),
            seats,
            your_hand: state.hands.get(seat).cloned().unwrap_or_default(),
            your_position: state.seats.iter().position(|s| s == seat).unwrap_or(0),
            board: state.board.clone(),
            board_ends: state.board.ends,
            current_turn: state.current_seat().to_string(),
            draw_pile_count: state.draw_pile.len(),
            bet_amount: state.bet_amount,
            bet_total: state.bet_amount * state.seat_count() as i64,
        }
    }
}
