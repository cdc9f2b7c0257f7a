use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::bots::BotDifficulty;
use crate::config::EngineConfig;
use crate::domain::rules::highest_double_in_play;
use crate::domain::test_states::state_with_hands;
use crate::domain::{EndReason, GameState, MoveAction, Side, Tile};
use crate::errors::GameError;
use crate::services::game_flow::GameFlowService;
use crate::services::notifier::{GameEvent, Notifier};
use crate::services::settlement::{Settlement, SettlementRequest};
use crate::store::memory::MemoryStore;
use crate::store::GameStore;

#[derive(Default)]
struct RecordingNotifier {
    events: Mutex<Vec<(String, serde_json::Value)>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_seat(&self, seat: &str, event: GameEvent) {
        let value = serde_json::to_value(&event).unwrap();
        self.events.lock().push((seat.to_string(), value));
    }
}

impl RecordingNotifier {
    fn seats_for_type(&self, event_type: &str) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter(|(_, v)| v["type"] == event_type)
            .map(|(seat, _)| seat.clone())
            .collect()
    }

    fn has_type(&self, event_type: &str) -> bool {
        !self.seats_for_type(event_type).is_empty()
    }
}

#[derive(Default)]
struct RecordingSettlement {
    requests: Mutex<Vec<SettlementRequest>>,
}

#[async_trait]
impl Settlement for RecordingSettlement {
    async fn settle(&self, request: SettlementRequest) -> Result<(), GameError> {
        self.requests.lock().push(request);
        Ok(())
    }
}

struct Harness {
    store: Arc<MemoryStore>,
    notifier: Arc<RecordingNotifier>,
    settlement: Arc<RecordingSettlement>,
    svc: Arc<GameFlowService>,
}

fn harness() -> Harness {
    harness_with_config(EngineConfig::fast())
}

fn harness_with_config(config: EngineConfig) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let settlement = Arc::new(RecordingSettlement::default());
    let svc = GameFlowService::new(
        Arc::clone(&store) as Arc<dyn GameStore>,
        Arc::clone(&notifier) as Arc<dyn Notifier>,
        Arc::clone(&settlement) as Arc<dyn Settlement>,
        config,
    );
    Harness {
        store,
        notifier,
        settlement,
        svc,
    }
}

async fn seed_room(h: &Harness, state: &GameState) {
    for seat in &state.seats {
        h.store
            .map_seat_to_room(seat, &state.room_id)
            .await
            .unwrap();
    }
    h.store.save(state).await.unwrap();
}

/// Hands picked for the scenario, board already opened with a 6|6 so the
/// open ends are (6, 6).
fn opened_state(hands: Vec<(&str, Vec<Tile>)>, draw_pile: Vec<Tile>) -> GameState {
    let mut state = state_with_hands(hands, draw_pile);
    state
        .board
        .place(Tile::new(6, 6), Side::Right, "setup", 0)
        .unwrap();
    state.is_first_play = false;
    state
}

async fn wait_for_settlement(h: &Harness) -> SettlementRequest {
    for _ in 0..200 {
        if let Some(request) = h.settlement.requests.lock().first().cloned() {
            return request;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("settlement was never called");
}

#[tokio::test]
async fn two_seat_creation_deals_seven_each_and_a_fourteen_tile_pile() {
    let h = harness();
    h.svc
        .create_game("r-a", vec!["alice".into(), "bob".into()], 0, 7)
        .await
        .unwrap();

    let state = h.store.load("r-a").await.unwrap();
    assert_eq!(state.hands["alice"].len(), 7);
    assert_eq!(state.hands["bob"].len(), 7);
    assert_eq!(state.draw_pile.len(), 14);
    assert_eq!(state.total_tiles(), 28);

    // The starting seat holds the highest double dealt, when one exists.
    if let Some(required) = highest_double_in_play(&state) {
        let opener = state.current_seat();
        assert!(state.hands[opener].iter().any(|t| t.matches(required)));
    }

    assert_eq!(h.notifier.seats_for_type("match_found").len(), 2);
    assert!(h.svc.timers().is_armed("r-a"));
}

#[tokio::test]
async fn opening_with_a_wrong_tile_is_an_invalid_move() {
    let h = harness();
    h.svc
        .create_game("r-open", vec!["alice".into(), "bob".into()], 0, 42)
        .await
        .unwrap();

    let state = h.store.load("r-open").await.unwrap();
    let opener = state.current_seat().to_string();

    if let Some(required) = highest_double_in_play(&state) {
        if let Some(&wrong) = state.hands[&opener].iter().find(|t| !t.matches(required)) {
            let err = h
                .svc
                .play_tile("r-open", &opener, wrong, Side::Right)
                .await
                .unwrap_err();
            assert_eq!(err.code().as_str(), "INVALID_MOVE");
        }
    }

    // The opening tile itself always goes through.
    let tile = highest_double_in_play(&state).unwrap_or(state.hands[&opener][0]);
    h.svc
        .play_tile("r-open", &opener, tile, Side::Right)
        .await
        .unwrap();

    let state = h.store.load("r-open").await.unwrap();
    assert!(!state.is_first_play);
    assert_eq!(state.move_history.len(), 1);
    assert_eq!(state.hands[&opener].len(), 6);
    assert_ne!(state.current_seat(), opener);
    assert!(h.notifier.has_type("tile_played"));
}

#[tokio::test]
async fn all_bot_game_runs_to_completion() {
    let h = harness();
    h.svc
        .create_game_with_bots("r-bots", vec![], 2, BotDifficulty::Medium, 0, 42)
        .await
        .unwrap();

    let state = h.store.load("r-bots").await.unwrap();
    assert!(state.is_finished);
    assert!(state.winner.is_some());
    assert!(state.end_reason.is_some());
    assert_eq!(state.total_tiles(), 28);
    assert!(!state.move_history.is_empty());

    assert!(h.notifier.has_type("game_over"));
    assert!(!h.svc.timers().is_armed("r-bots"));

    let report = h.svc.game_report("r-bots").await.unwrap();
    assert_eq!(report.winner, state.winner.clone().unwrap());
    assert_eq!(report.scores.len(), 2);
}

#[tokio::test]
async fn four_seat_game_never_allows_drawing() {
    let h = harness();
    let seats: Vec<String> = (0..4).map(|i| format!("p{i}")).collect();
    h.svc.create_game("r-4", seats.clone(), 0, 3).await.unwrap();

    let state = h.store.load("r-4").await.unwrap();
    assert!(state.draw_pile.is_empty());

    // Every seat gets the same rejection, current or not.
    for seat in &seats {
        let err = h.svc.draw_tile("r-4", seat).await.unwrap_err();
        assert_eq!(
            err.code().as_str(),
            "CANNOT_DRAW_TILES_IN_A_4_PLAYER_GAME"
        );
    }
}

#[tokio::test]
async fn lock_contention_surfaces_then_turn_moves_on() {
    let h = harness();
    h.svc
        .create_game("r-lock", vec!["alice".into(), "bob".into()], 0, 5)
        .await
        .unwrap();

    let state = h.store.load("r-lock").await.unwrap();
    let opener = state.current_seat().to_string();
    let tile = highest_double_in_play(&state).unwrap_or(state.hands[&opener][0]);

    // Another holder (a second process, in effect) takes the room lock.
    let rival_token = h
        .store
        .acquire_lock("r-lock", Duration::from_secs(5))
        .await
        .unwrap()
        .unwrap();

    let err = h
        .svc
        .play_tile("r-lock", &opener, tile, Side::Right)
        .await
        .unwrap_err();
    assert_eq!(err.code().as_str(), "LOCK_NOT_ACQUIRED");
    assert!(err.is_retryable());

    h.store.release_lock("r-lock", &rival_token).await.unwrap();

    // First retry commits; replaying the same intent now hits the turn check.
    h.svc
        .play_tile("r-lock", &opener, tile, Side::Right)
        .await
        .unwrap();
    let err = h
        .svc
        .play_tile("r-lock", &opener, tile, Side::Right)
        .await
        .unwrap_err();
    assert_eq!(err.code().as_str(), "NOT_YOUR_TURN");
}

#[tokio::test]
async fn pass_is_rejected_while_a_tile_is_playable() {
    let h = harness();
    let state = opened_state(
        vec![
            ("alice", vec![Tile::new(6, 1)]),
            ("bob", vec![Tile::new(2, 3)]),
        ],
        vec![],
    );
    seed_room(&h, &state).await;

    let err = h.svc.pass_turn(&state.room_id, "alice").await.unwrap_err();
    assert_eq!(err.code().as_str(), "MUST_PLAY_TILE");

    // Drawing with a playable tile in hand is a defensive no-op.
    let before = h.store.load(&state.room_id).await.unwrap();
    h.svc.draw_tile(&state.room_id, "alice").await.unwrap();
    let after = h.store.load(&state.room_id).await.unwrap();
    assert_eq!(before.move_history.len(), after.move_history.len());
    assert_eq!(before.hands["alice"], after.hands["alice"]);
}

#[tokio::test]
async fn drawing_keeps_the_turn_until_the_seat_plays() {
    let h = harness();
    // Pile pops from the back: first draw yields 2|3 (unplayable against
    // ends of 6), second yields 6|2.
    let state = opened_state(
        vec![
            ("alice", vec![Tile::new(0, 1)]),
            ("bob", vec![Tile::new(5, 6)]),
        ],
        vec![Tile::new(6, 2), Tile::new(2, 3)],
    );
    seed_room(&h, &state).await;
    let room = state.room_id.as_str();

    h.svc.draw_tile(room, "alice").await.unwrap();
    let state = h.store.load(room).await.unwrap();
    assert_eq!(state.current_seat(), "alice");
    assert_eq!(state.hands["alice"].len(), 2);

    h.svc.draw_tile(room, "alice").await.unwrap();
    let state = h.store.load(room).await.unwrap();
    assert_eq!(state.current_seat(), "alice");
    assert!(state.draw_pile.is_empty());
    assert_eq!(
        state
            .move_history
            .iter()
            .filter(|m| m.action == MoveAction::Draw)
            .count(),
        2
    );

    h.svc
        .play_tile(room, "alice", Tile::new(6, 2), Side::Left)
        .await
        .unwrap();
    let state = h.store.load(room).await.unwrap();
    assert_eq!(state.current_seat(), "bob");
    assert!(h.notifier.has_type("tile_drawn"));
    assert!(h.notifier.has_type("player_drew_tile"));
}

#[tokio::test]
async fn exhausted_pile_with_no_playable_tile_auto_passes() {
    let h = harness();
    let state = opened_state(
        vec![
            ("alice", vec![Tile::new(0, 1)]),
            ("bob", vec![Tile::new(6, 3)]),
        ],
        vec![],
    );
    seed_room(&h, &state).await;

    h.svc.draw_tile(&state.room_id, "alice").await.unwrap();

    let state = h.store.load(&state.room_id).await.unwrap();
    assert_eq!(state.current_seat(), "bob");
    assert_eq!(
        state.move_history.last().map(|m| m.action),
        Some(MoveAction::Pass)
    );
    assert!(!state.is_finished);
}

#[tokio::test]
async fn blocked_game_ends_by_lowest_pip_sum() {
    let h = harness();
    // Ends are (6, 6) and nobody holds a 6. Pip sums: alice 3, bob 9,
    // carol 3. Carol's pass is the most recent move and she is tied for
    // lowest, so she wins.
    let mut state = opened_state(
        vec![
            ("alice", vec![Tile::new(0, 3)]),
            ("bob", vec![Tile::new(4, 5)]),
            ("carol", vec![Tile::new(1, 2)]),
        ],
        vec![],
    );
    state.turn_index = 2;
    seed_room(&h, &state).await;

    h.svc.pass_turn(&state.room_id, "carol").await.unwrap();

    let state = h.store.load(&state.room_id).await.unwrap();
    assert!(state.is_finished);
    assert_eq!(state.winner.as_deref(), Some("carol"));
    assert_eq!(state.end_reason, Some(EndReason::Blocked));
    assert_eq!(state.scores["alice"], 3);
    assert_eq!(state.scores["bob"], 9);
    assert_eq!(state.scores["carol"], 3);
    assert!(h.notifier.has_type("game_over"));

    // bet_amount is positive in the crafted state, so settlement fires.
    let request = wait_for_settlement(&h).await;
    assert_eq!(request.winner_id, "carol");
    assert_eq!(request.loser_ids.len(), 2);
    assert_eq!(request.bet_amount, state.bet_amount);
}

#[tokio::test]
async fn four_seat_blocked_game_ends_without_a_pile() {
    let h = harness();
    // Four seats, no draw pile at all. Ends are (6, 6) and nobody holds
    // a 6, so the first pass blocks the game. Pip sums: alice 1, bob 5,
    // carol 9, dave 3 — alice wins outright.
    let state = opened_state(
        vec![
            ("alice", vec![Tile::new(0, 1)]),
            ("bob", vec![Tile::new(2, 3)]),
            ("carol", vec![Tile::new(4, 5)]),
            ("dave", vec![Tile::new(1, 2)]),
        ],
        vec![],
    );
    seed_room(&h, &state).await;

    // Drawing stays forbidden even with nothing to play.
    let err = h.svc.draw_tile(&state.room_id, "alice").await.unwrap_err();
    assert_eq!(err.code().as_str(), "CANNOT_DRAW_TILES_IN_A_4_PLAYER_GAME");

    h.svc.pass_turn(&state.room_id, "alice").await.unwrap();

    let state = h.store.load(&state.room_id).await.unwrap();
    assert!(state.is_finished);
    assert_eq!(state.winner.as_deref(), Some("alice"));
    assert_eq!(state.end_reason, Some(EndReason::Blocked));
    assert_eq!(state.scores["alice"], 1);
    assert_eq!(state.scores["bob"], 5);
    assert_eq!(state.scores["carol"], 9);
    assert_eq!(state.scores["dave"], 3);
    assert!(h.notifier.has_type("game_over"));
}

#[tokio::test]
async fn disconnect_substitution_plays_exactly_one_move() {
    let h = harness();
    h.svc
        .create_game("r-dc", vec!["alice".into(), "bob".into()], 0, 11)
        .await
        .unwrap();

    let state = h.store.load("r-dc").await.unwrap();
    let opener = state.current_seat().to_string();
    let other = state
        .seats
        .iter()
        .find(|s| **s != opener)
        .unwrap()
        .clone();

    h.svc
        .handle_disconnect(&opener, BotDifficulty::Easy)
        .await
        .unwrap();

    let state = h.store.load("r-dc").await.unwrap();
    // The substitute played the opening move and stopped at the human.
    assert_eq!(state.move_history.len(), 1);
    assert_eq!(state.move_history[0].action, MoveAction::Play);
    assert_eq!(state.current_seat(), other);
    assert!(state.disconnected.contains(&opener));
    let bot_seat = state
        .seats
        .iter()
        .find(|s| **s != other)
        .unwrap()
        .clone();
    assert!(h.svc.bots().is_bot(&bot_seat).await.unwrap());
    assert_eq!(state.total_tiles(), 28);
    assert!(h.notifier.has_type("player_disconnected"));

    h.svc.handle_reconnect(&opener).await.unwrap();

    let state = h.store.load("r-dc").await.unwrap();
    assert!(state.seats.contains(&opener));
    assert!(state.disconnected.is_empty());
    assert_eq!(state.hands[&opener].len(), 6);
    assert!(!h.svc.bots().is_bot(&bot_seat).await.unwrap());
    assert!(h.notifier.has_type("player_reconnected"));
}

#[tokio::test]
async fn administrative_end_finishes_and_settles() {
    let h = harness();
    let state = opened_state(
        vec![
            ("alice", vec![Tile::new(6, 1)]),
            ("bob", vec![Tile::new(2, 3)]),
        ],
        vec![],
    );
    seed_room(&h, &state).await;

    h.svc
        .end_game(&state.room_id, "alice".to_string(), EndReason::Normal)
        .await
        .unwrap();

    let state = h.store.load(&state.room_id).await.unwrap();
    assert!(state.is_finished);
    assert_eq!(state.winner.as_deref(), Some("alice"));

    let request = wait_for_settlement(&h).await;
    assert_eq!(request.winner_id, "alice");

    // A finished room rejects further intents.
    let err = h.svc.pass_turn(&state.room_id, "alice").await.unwrap_err();
    assert_eq!(err.code().as_str(), "INVALID_MOVE");
}

#[tokio::test]
async fn turn_timeout_passes_a_stuck_seat() {
    let config = EngineConfig {
        turn_timeout: Duration::from_millis(80),
        turn_warning: Duration::from_millis(40),
        ..EngineConfig::fast()
    };
    let h = harness_with_config(config);

    let state = opened_state(
        vec![
            ("alice", vec![Tile::new(0, 1)]),
            ("bob", vec![Tile::new(6, 2)]),
        ],
        vec![],
    );
    seed_room(&h, &state).await;

    h.svc.arm_turn_timers(&state.room_id, "alice");
    tokio::time::sleep(Duration::from_millis(250)).await;

    let state = h.store.load(&state.room_id).await.unwrap();
    assert_eq!(state.current_seat(), "bob");
    assert_eq!(
        state.move_history.last().map(|m| m.action),
        Some(MoveAction::Pass)
    );
    assert_eq!(h.notifier.seats_for_type("turn_warning"), vec!["alice"]);
}

#[tokio::test]
async fn unknown_room_is_game_not_found() {
    let h = harness();
    let err = h.svc.pass_turn("nope", "alice").await.unwrap_err();
    assert_eq!(err.code().as_str(), "GAME_NOT_FOUND");
}
