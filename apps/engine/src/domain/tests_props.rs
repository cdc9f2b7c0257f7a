use proptest::prelude::*;

use crate::domain::dealing::deal;
use crate::domain::rules::{can_play_tile, find_first_player, DOUBLE_SIX};
use crate::domain::test_states::state_with_hands;
use crate::domain::tiles::{full_tile_set, Side, Tile, HAND_SIZE, TILE_COUNT};

proptest! {
    /// Dealing always conserves the 28-tile set, whatever the seed.
    #[test]
    fn deal_conserves_all_tiles(seed in any::<u64>(), seat_count in 2usize..=4) {
        let seats: Vec<String> = (0..seat_count).map(|i| format!("p{i}")).collect();
        let (hands, pile) = deal(&seats, seed).unwrap();

        let dealt: usize = hands.values().map(Vec::len).sum();
        prop_assert_eq!(dealt + pile.len(), TILE_COUNT);
        for hand in hands.values() {
            prop_assert_eq!(hand.len(), HAND_SIZE);
        }

        // Every tile from the full set appears exactly once.
        let mut all: Vec<Tile> = hands.values().flatten().copied().collect();
        all.extend(pile.iter().copied());
        for tile in full_tile_set() {
            let occurrences = all.iter().filter(|t| t.matches(tile)).count();
            prop_assert_eq!(occurrences, 1, "tile {} dealt {} times", tile, occurrences);
        }
    }

    /// In a 4-seat deal exactly one seat holds the double-six, and that
    /// seat can act on the first turn.
    #[test]
    fn four_seat_deal_has_one_opener(seed in any::<u64>()) {
        let seats: Vec<String> = (0..4).map(|i| format!("p{i}")).collect();
        let (hands, _) = deal(&seats, seed).unwrap();

        let holders: Vec<&String> = seats
            .iter()
            .filter(|s| hands[*s].iter().any(|t| t.matches(DOUBLE_SIX)))
            .collect();
        prop_assert_eq!(holders.len(), 1);

        let state = state_with_hands(
            seats.iter().map(|s| (s.as_str(), hands[s].clone())).collect(),
            vec![],
        );
        let first = find_first_player(&state);
        prop_assert_eq!(&state.seats[first], holders[0]);
        prop_assert!(can_play_tile(&state, holders[0]).unwrap());
    }

    /// Placing any tile on an empty board establishes both ends.
    #[test]
    fn first_placement_sets_both_ends(left in 0u8..=6, right in 0u8..=6) {
        let mut state = state_with_hands(vec![("a", vec![]), ("b", vec![])], vec![]);
        state
            .board
            .place(Tile::new(left, right), Side::Right, "a", 0)
            .unwrap();
        let ends = state.board.open_ends().unwrap();
        prop_assert!(ends.is_some());
    }
}
