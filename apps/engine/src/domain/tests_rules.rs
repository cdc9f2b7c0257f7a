use crate::domain::rules::{
    can_play_tile, check_winner, determine_winner_by_lowest_tile, find_first_player,
    is_game_blocked, is_valid_move, opening_tile_allowed, player_has_tile, DOUBLE_SIX,
};
use crate::domain::state::MoveAction;
use crate::domain::test_states::state_with_hands;
use crate::domain::tiles::{Side, Tile};
use crate::errors::ErrorCode;

#[test]
fn four_seat_opening_requires_double_six() {
    let state = state_with_hands(
        vec![
            ("a", vec![Tile::new(1, 2)]),
            ("b", vec![DOUBLE_SIX]),
            ("c", vec![Tile::new(5, 5)]),
            ("d", vec![Tile::new(0, 1)]),
        ],
        vec![],
    );
    assert!(opening_tile_allowed(&state, DOUBLE_SIX));
    assert!(!opening_tile_allowed(&state, Tile::new(5, 5)));
    // The same rule flows through is_valid_move on an empty board.
    assert!(!is_valid_move(&state, Tile::new(1, 2), Side::Left).unwrap());
    assert!(is_valid_move(&state, DOUBLE_SIX, Side::Left).unwrap());
}

#[test]
fn four_seat_only_double_six_holder_can_open() {
    let state = state_with_hands(
        vec![
            ("a", vec![Tile::new(1, 2)]),
            ("b", vec![DOUBLE_SIX]),
            ("c", vec![Tile::new(5, 5)]),
            ("d", vec![Tile::new(0, 1)]),
        ],
        vec![],
    );
    assert!(!can_play_tile(&state, "a").unwrap());
    assert!(can_play_tile(&state, "b").unwrap());
    assert_eq!(find_first_player(&state), 1);
}

#[test]
fn small_game_opening_is_the_highest_double_dealt() {
    let state = state_with_hands(
        vec![
            ("a", vec![Tile::new(3, 3), Tile::new(1, 2)]),
            ("b", vec![Tile::new(5, 5), Tile::new(0, 6)]),
        ],
        vec![Tile::new(4, 6)],
    );
    assert!(opening_tile_allowed(&state, Tile::new(5, 5)));
    assert!(!opening_tile_allowed(&state, Tile::new(3, 3)));
    assert!(!can_play_tile(&state, "a").unwrap());
    assert!(can_play_tile(&state, "b").unwrap());
    assert_eq!(find_first_player(&state), 1);
}

#[test]
fn small_game_without_doubles_lets_anyone_open() {
    let state = state_with_hands(
        vec![
            ("a", vec![Tile::new(1, 2)]),
            ("b", vec![Tile::new(0, 6)]),
        ],
        vec![],
    );
    assert!(opening_tile_allowed(&state, Tile::new(1, 2)));
    assert!(can_play_tile(&state, "a").unwrap());
    assert!(can_play_tile(&state, "b").unwrap());
    assert_eq!(find_first_player(&state), 0);
}

#[test]
fn moves_must_match_the_targeted_end() {
    let mut state = state_with_hands(
        vec![
            ("a", vec![Tile::new(2, 4)]),
            ("b", vec![Tile::new(5, 1)]),
        ],
        vec![],
    );
    state.board.place(Tile::new(2, 5), Side::Left, "a", 0).unwrap();
    state.is_first_play = false;

    // ends are now (2, 5)
    assert!(is_valid_move(&state, Tile::new(2, 4), Side::Left).unwrap());
    assert!(!is_valid_move(&state, Tile::new(2, 4), Side::Right).unwrap());
    assert!(is_valid_move(&state, Tile::new(5, 1), Side::Right).unwrap());
    assert!(is_valid_move(&state, Tile::new(4, 2), Side::Left).unwrap());
}

#[test]
fn corrupt_ends_surface_invalid_board_state() {
    let mut state = state_with_hands(
        vec![("a", vec![Tile::new(2, 4)]), ("b", vec![])],
        vec![],
    );
    state.board.place(Tile::new(2, 5), Side::Left, "a", 0).unwrap();
    state.is_first_play = false;
    state.board.ends.left = -1;

    let err = is_valid_move(&state, Tile::new(2, 4), Side::Left).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidBoardState);
}

#[test]
fn has_tile_ignores_pip_order() {
    let state = state_with_hands(vec![("a", vec![Tile::new(2, 5)]), ("b", vec![])], vec![]);
    assert!(player_has_tile(&state, "a", Tile::new(5, 2)));
    assert!(player_has_tile(&state, "a", Tile::new(2, 5)));
    assert!(!player_has_tile(&state, "a", Tile::new(2, 4)));
    assert!(!player_has_tile(&state, "missing", Tile::new(2, 5)));
}

#[test]
fn blocked_only_when_pile_empty_and_everyone_stuck() {
    let mut state = state_with_hands(
        vec![
            ("a", vec![Tile::new(0, 1)]),
            ("b", vec![Tile::new(0, 0)]),
        ],
        vec![],
    );
    state.board.place(Tile::new(2, 5), Side::Left, "a", 0).unwrap();
    state.is_first_play = false;
    assert!(is_game_blocked(&state).unwrap());

    // A non-empty pile means someone could still draw.
    state.draw_pile.push(Tile::new(3, 3));
    assert!(!is_game_blocked(&state).unwrap());
    state.draw_pile.clear();

    // A single playable tile unblocks the game.
    state.hands.get_mut("b").unwrap().push(Tile::new(5, 6));
    assert!(!is_game_blocked(&state).unwrap());
}

#[test]
fn never_blocked_before_the_first_play() {
    let state = state_with_hands(
        vec![
            ("a", vec![Tile::new(0, 1)]),
            ("b", vec![Tile::new(2, 3)]),
        ],
        vec![],
    );
    assert!(!is_game_blocked(&state).unwrap());
}

#[test]
fn winner_is_first_seat_with_empty_hand() {
    let state = state_with_hands(
        vec![
            ("a", vec![Tile::new(0, 1)]),
            ("b", vec![]),
            ("c", vec![]),
        ],
        vec![],
    );
    assert_eq!(check_winner(&state).unwrap(), "b");
}

#[test]
fn lowest_pip_sum_wins_a_blocked_game() {
    let state = state_with_hands(
        vec![
            ("a", vec![Tile::new(6, 6)]),
            ("b", vec![Tile::new(0, 1)]),
            ("c", vec![Tile::new(4, 4)]),
        ],
        vec![],
    );
    assert_eq!(determine_winner_by_lowest_tile(&state).unwrap(), "b");
}

#[test]
fn pip_tie_prefers_the_most_recent_mover() {
    let mut state = state_with_hands(
        vec![
            ("a", vec![Tile::new(0, 2)]),
            ("b", vec![Tile::new(1, 1)]),
            ("c", vec![Tile::new(6, 6)]),
        ],
        vec![],
    );
    state.record_move("b", MoveAction::Pass, None, None);
    assert_eq!(determine_winner_by_lowest_tile(&state).unwrap(), "b");
}

#[test]
fn pip_tie_falls_back_to_seat_order_when_last_mover_not_tied() {
    let mut state = state_with_hands(
        vec![
            ("a", vec![Tile::new(0, 2)]),
            ("b", vec![Tile::new(1, 1)]),
            ("c", vec![Tile::new(6, 6)]),
        ],
        vec![],
    );
    state.record_move("c", MoveAction::Pass, None, None);
    assert_eq!(determine_winner_by_lowest_tile(&state).unwrap(), "a");
}
