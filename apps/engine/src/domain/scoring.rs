//! Pip-sum scoring.

use std::collections::BTreeMap;

use crate::domain::state::{GameState, SeatId};
use crate::domain::tiles::Tile;

/// Sum of all pips left in a hand. Lower is better at game end.
pub fn hand_score(hand: &[Tile]) -> u32 {
    hand.iter().map(Tile::pip_sum).sum()
}

/// Pip-sum per seat, computed at game end regardless of outcome.
pub fn calculate_final_scores(state: &GameState) -> BTreeMap<SeatId, u32> {
    state
        .seats
        .iter()
        .map(|seat| {
            let score = state
                .hands
                .get(seat)
                .map(|hand| hand_score(hand))
                .unwrap_or(0);
            (seat.clone(), score)
        })
        .collect()
}
