#![cfg(test)]

//! Hand-built states for unit tests. Hands here are chosen for the rule
//! under test and do not always exhaust the 28-tile set; tests that care
//! about conservation use dealt states instead.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::board::Board;
use crate::domain::state::{now_ms, GameState, SeatId};
use crate::domain::tiles::Tile;

pub fn state_with_hands(hands: Vec<(&str, Vec<Tile>)>, draw_pile: Vec<Tile>) -> GameState {
    let seats: Vec<SeatId> = hands.iter().map(|(seat, _)| seat.to_string()).collect();
    let hands: BTreeMap<SeatId, Vec<Tile>> = hands
        .into_iter()
        .map(|(seat, tiles)| (seat.to_string(), tiles))
        .collect();
    let now = now_ms();
    GameState {
        room_id: "room-test".to_string(),
        seats,
        hands,
        board: Board::new(),
        draw_pile,
        turn_index: 0,
        is_first_play: true,
        bet_amount: 10,
        disconnected: BTreeSet::new(),
        move_history: Vec::new(),
        scores: BTreeMap::new(),
        turn_started_at: now,
        created_at: now,
        is_finished: false,
        winner: None,
        end_reason: None,
        finished_at: None,
    }
}

pub fn two_seat_state() -> GameState {
    state_with_hands(
        vec![
            ("alice", vec![Tile::new(6, 6), Tile::new(2, 5)]),
            ("bob", vec![Tile::new(1, 4), Tile::new(0, 0)]),
        ],
        vec![Tile::new(3, 3)],
    )
}
