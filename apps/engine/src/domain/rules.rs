//! Rules engine: stateless predicates over a [`GameState`].
//!
//! No I/O and no locking here; everything is a pure function so the rules
//! can be unit tested directly. The orchestrator is the only caller that
//! acts on the answers.

use crate::domain::scoring::hand_score;
use crate::domain::state::{GameState, SeatId};
use crate::domain::tiles::{Side, Tile, MAX_PIP};
use crate::errors::GameError;

/// The opening tile of a 4-seat game.
pub const DOUBLE_SIX: Tile = Tile {
    left: MAX_PIP,
    right: MAX_PIP,
};

/// Highest double held by any seat, if any double was dealt at all.
pub fn highest_double_in_play(state: &GameState) -> Option<Tile> {
    state
        .seats
        .iter()
        .filter_map(|seat| state.hands.get(seat))
        .flatten()
        .filter(|t| t.is_double())
        .max_by_key(|t| t.left)
        .copied()
}

/// First-move tile legality.
///
/// 4 seats: only the double-six may open. 2–3 seats: the opening tile must
/// equal the highest double present in any hand; when no seat holds any
/// double, any tile is legal.
pub fn opening_tile_allowed(state: &GameState, tile: Tile) -> bool {
    if state.seat_count() == 4 {
        return tile.matches(DOUBLE_SIX);
    }
    match highest_double_in_play(state) {
        Some(required) => tile.matches(required),
        None => true,
    }
}

/// Whether `tile` may be spliced onto `side` given the current board.
///
/// Empty board delegates to [`opening_tile_allowed`]. A sentinel end on a
/// non-empty board is corruption and errors with `INVALID_BOARD_STATE`.
pub fn is_valid_move(state: &GameState, tile: Tile, side: Side) -> Result<bool, GameError> {
    match state.board.open_ends()? {
        None => Ok(opening_tile_allowed(state, tile)),
        Some((left_end, right_end)) => Ok(match side {
            Side::Left => tile.has_pip(left_end),
            Side::Right => tile.has_pip(right_end),
        }),
    }
}

/// Hand membership, treating `(a,b)` and `(b,a)` as the same tile.
pub fn player_has_tile(state: &GameState, seat: &str, tile: Tile) -> bool {
    state
        .hands
        .get(seat)
        .map(|hand| hand.iter().any(|t| t.matches(tile)))
        .unwrap_or(false)
}

/// Whether the seat holds at least one tile legal to play right now.
///
/// On the first play this applies the opening rule (the seat must hold the
/// required opening double, if one exists); afterwards any tile matching
/// either board end qualifies.
pub fn can_play_tile(state: &GameState, seat: &str) -> Result<bool, GameError> {
    let hand = match state.hands.get(seat) {
        Some(hand) => hand,
        None => return Ok(false),
    };

    if state.is_first_play {
        if state.seat_count() == 4 {
            return Ok(hand.iter().any(|t| t.matches(DOUBLE_SIX)));
        }
        return Ok(match highest_double_in_play(state) {
            Some(required) => hand.iter().any(|t| t.matches(required)),
            None => !hand.is_empty(),
        });
    }

    let (left_end, right_end) = state
        .board
        .open_ends()?
        .ok_or_else(|| GameError::invalid_board_state("empty board after first play"))?;
    Ok(hand
        .iter()
        .any(|t| t.has_pip(left_end) || t.has_pip(right_end)))
}

/// True only when no further move is possible by anyone: the pile is
/// empty, the first move already happened, and every seat is stuck.
pub fn is_game_blocked(state: &GameState) -> Result<bool, GameError> {
    if !state.draw_pile.is_empty() || state.is_first_play {
        return Ok(false);
    }
    for seat in &state.seats {
        if can_play_tile(state, seat)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// The first seat in seat order whose hand is empty, if any.
pub fn check_winner(state: &GameState) -> Option<&SeatId> {
    state
        .seats
        .iter()
        .find(|seat| state.hands.get(*seat).map(Vec::is_empty).unwrap_or(false))
}

/// Blocked-game resolution: lowest pip sum wins.
///
/// Tie-break is deliberately asymmetric and preserved as documented: if
/// the seat that made the most recent move is among the tied seats it
/// wins, otherwise the first tied seat in seat order does. Settlement
/// downstream depends on this exact policy.
pub fn determine_winner_by_lowest_tile(state: &GameState) -> Result<SeatId, GameError> {
    let lowest = state
        .seats
        .iter()
        .filter_map(|seat| state.hands.get(seat).map(|hand| hand_score(hand)))
        .min()
        .ok_or_else(|| GameError::internal("no seats to resolve blocked game"))?;

    let tied: Vec<&SeatId> = state
        .seats
        .iter()
        .filter(|seat| {
            state
                .hands
                .get(*seat)
                .map(|hand| hand_score(hand) == lowest)
                .unwrap_or(false)
        })
        .collect();

    if let Some(last) = state.move_history.last() {
        if tied.iter().any(|seat| **seat == last.seat) {
            return Ok(last.seat.clone());
        }
    }

    tied.first()
        .map(|seat| (*seat).clone())
        .ok_or_else(|| GameError::internal("no tied seats in blocked resolution"))
}

/// Starting seat for a fresh deal.
///
/// 4 seats: the holder of the double-six (the dealing invariant guarantees
/// exactly one). 2–3 seats: the holder of the highest double dealt, or
/// seat 0 when no doubles were dealt at all.
pub fn find_first_player(state: &GameState) -> usize {
    if state.seat_count() == 4 {
        for (i, seat) in state.seats.iter().enumerate() {
            if player_has_tile(state, seat, DOUBLE_SIX) {
                return i;
            }
        }
        return 0;
    }

    if let Some(required) = highest_double_in_play(state) {
        for (i, seat) in state.seats.iter().enumerate() {
            if player_has_tile(state, seat, required) {
                return i;
            }
        }
    }
    0
}
