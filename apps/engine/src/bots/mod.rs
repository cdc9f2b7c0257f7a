//! Automated seat play.
//!
//! Decision-making is a pure function over the game state so it can be
//! unit-tested without a store or a running orchestrator; [`manager`]
//! owns the persisted bot profiles and the think-delay pacing.

pub mod manager;

use serde::{Deserialize, Serialize};

use crate::domain::rules::{is_valid_move, opening_tile_allowed};
use crate::domain::{GameState, Side, Tile};
use crate::errors::GameError;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotDifficulty {
    Easy,
    Medium,
    Hard,
}

/// Persisted record for a synthetic seat, keyed by its seat id.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct BotProfile {
    pub id: String,
    pub difficulty: BotDifficulty,
    /// Seat id of the human this bot replaced, if any. `None` for bots
    /// that were seated at game creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replaces: Option<String>,
}

impl BotProfile {
    pub fn new(id: impl Into<String>, difficulty: BotDifficulty) -> Self {
        Self {
            id: id.into(),
            difficulty,
            replaces: None,
        }
    }

    pub fn substitute(
        id: impl Into<String>,
        difficulty: BotDifficulty,
        replaces: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            difficulty,
            replaces: Some(replaces.into()),
        }
    }
}

/// What an automated seat chose to do with its turn.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BotDecision {
    Play { tile: Tile, side: Side },
    Draw,
    Pass,
}

/// Pick a move for `seat`. Deterministic for a given state, which keeps
/// replays and tests stable.
pub fn decide(
    state: &GameState,
    seat: &str,
    difficulty: BotDifficulty,
) -> Result<BotDecision, GameError> {
    let hand = state.hand(seat)?;
    let candidates = legal_moves(state, hand)?;

    if candidates.is_empty() {
        // Draw is only an option while the pile has tiles; 4-seat games
        // never have a pile so this collapses to a pass.
        if !state.draw_pile.is_empty() {
            return Ok(BotDecision::Draw);
        }
        return Ok(BotDecision::Pass);
    }

    let (tile, side) = match difficulty {
        BotDifficulty::Easy => candidates[0],
        BotDifficulty::Medium => {
            let board_counts = board_pip_counts(state);
            pick_best(&candidates, |t| medium_score(t, &board_counts))
        }
        BotDifficulty::Hard => {
            let opponent_counts = unseen_pip_counts(state, hand);
            pick_best(&candidates, |t| hard_score(t, &opponent_counts))
        }
    };

    Ok(BotDecision::Play { tile, side })
}

fn legal_moves(state: &GameState, hand: &[Tile]) -> Result<Vec<(Tile, Side)>, GameError> {
    let mut out = Vec::new();
    for &tile in hand {
        if state.is_first_play {
            if opening_tile_allowed(state, tile) {
                out.push((tile, Side::Right));
            }
            continue;
        }
        for side in [Side::Left, Side::Right] {
            if is_valid_move(state, tile, side)? {
                out.push((tile, side));
            }
        }
    }
    Ok(out)
}

fn pick_best<F>(candidates: &[(Tile, Side)], score: F) -> (Tile, Side)
where
    F: Fn(Tile) -> i32,
{
    // max_by_key keeps the last maximum; iterate in reverse so ties
    // resolve to the earliest candidate (stable across runs).
    *candidates
        .iter()
        .rev()
        .max_by_key(|(t, _)| score(*t))
        .unwrap()
}

/// Doubles first, then pips that already appear often on the board (the
/// hand is likelier to connect to them again later).
fn medium_score(tile: Tile, board_counts: &[i32; 7]) -> i32 {
    let mut score = if tile.is_double() { 5 } else { 0 };
    score += board_counts[tile.left as usize] + board_counts[tile.right as usize];
    score
}

/// Doubles first, minus how well the tiles we cannot see cover this
/// tile's pips: shed the pips opponents are likely still holding.
fn hard_score(tile: Tile, opponent_counts: &[i32; 7]) -> i32 {
    let mut score = if tile.is_double() { 5 } else { 0 };
    score -= opponent_counts[tile.left as usize] + opponent_counts[tile.right as usize];
    score
}

/// Occurrences of each pip value across the placed tiles.
fn board_pip_counts(state: &GameState) -> [i32; 7] {
    let mut counts = [0i32; 7];
    for placed in &state.board.tiles {
        counts[placed.tile.left as usize] += 1;
        counts[placed.tile.right as usize] += 1;
    }
    counts
}

/// Pip counts over the tiles that are neither on the board nor in
/// `hand` — the pool opponents and the pile draw from.
fn unseen_pip_counts(state: &GameState, hand: &[Tile]) -> [i32; 7] {
    use crate::domain::full_tile_set;

    let mut counts = [0i32; 7];
    for tile in full_tile_set() {
        let seen = state.board.tiles.iter().any(|p| p.tile.matches(tile))
            || hand.iter().any(|h| h.matches(tile));
        if !seen {
            counts[tile.left as usize] += 1;
            counts[tile.right as usize] += 1;
        }
    }
    counts
}
