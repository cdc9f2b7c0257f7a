//! Domain layer: pure game types and the rules engine.

pub mod board;
pub mod dealing;
pub mod player_view;
pub mod rules;
pub mod scoring;
pub mod state;
pub mod tiles;

#[cfg(test)]
pub mod test_states;

#[cfg(test)]
mod tests_props;
#[cfg(test)]
mod tests_rules;

// Re-exports for ergonomics
pub use board::{Board, BoardEnds, PlacedTile};
pub use player_view::PlayerView;
pub use state::{EndReason, GameState, MoveAction, MoveRecord, SeatId};
pub use tiles::{full_tile_set, Side, Tile};
