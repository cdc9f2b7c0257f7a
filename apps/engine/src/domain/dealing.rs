//! Deterministic tile dealing.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::domain::state::SeatId;
use crate::domain::tiles::{full_tile_set, Tile, HAND_SIZE};
use crate::errors::GameError;

/// Shuffle the full 28-tile set with the given seed and deal 7 tiles per
/// seat. For 2–3 seats the remainder becomes the draw pile; a 4-seat game
/// deals everything and has no pile.
pub fn deal(
    seats: &[SeatId],
    seed: u64,
) -> Result<(BTreeMap<SeatId, Vec<Tile>>, Vec<Tile>), GameError> {
    if !(2..=4).contains(&seats.len()) {
        return Err(GameError::internal(format!(
            "cannot deal for {} seats",
            seats.len()
        )));
    }

    let mut tiles = full_tile_set();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    tiles.shuffle(&mut rng);

    let mut hands = BTreeMap::new();
    for seat in seats {
        let hand: Vec<Tile> = tiles.drain(..HAND_SIZE).collect();
        hands.insert(seat.clone(), hand);
    }

    // 4 seats x 7 tiles leaves nothing; tiles is already empty then.
    let draw_pile = tiles;
    Ok((hands, draw_pile))
}
