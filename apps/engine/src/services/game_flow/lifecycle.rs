//! Room lifecycle: creation, disconnect substitution, reconnection, and
//! game end.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::info;

use super::{push_state_updates, GameFlowService, Notice, TurnOutcome};
use crate::bots::BotDifficulty;
use crate::domain::board::Board;
use crate::domain::dealing::deal;
use crate::domain::rules::find_first_player;
use crate::domain::scoring::calculate_final_scores;
use crate::domain::state::now_ms;
use crate::domain::{EndReason, GameState, PlayerView, SeatId};
use crate::errors::GameError;
use crate::services::notifier::GameEvent;

impl GameFlowService {
    /// Create a room's game: deal from the seeded shuffle, pick the
    /// starting seat, persist, and notify every seat. If the starting
    /// seat is a bot it acts immediately.
    pub async fn create_game(
        self: &Arc<Self>,
        room_id: &str,
        seats: Vec<SeatId>,
        bet_amount: i64,
        seed: u64,
    ) -> Result<(), GameError> {
        let token = self.lock_room(room_id).await?;
        let result = self.create_game_once(room_id, seats, bet_amount, seed).await;
        self.unlock_room(room_id, &token).await;
        let outcome = result?;
        if !self.dispatch(outcome).await {
            self.run_automated_seats(room_id).await;
        }
        Ok(())
    }

    /// Create a game where `bot_count` of the seats are freshly
    /// registered bots, appended after the human seats.
    pub async fn create_game_with_bots(
        self: &Arc<Self>,
        room_id: &str,
        humans: Vec<SeatId>,
        bot_count: usize,
        difficulty: BotDifficulty,
        bet_amount: i64,
        seed: u64,
    ) -> Result<(), GameError> {
        let mut seats = humans;
        for _ in 0..bot_count {
            let profile = self.bots().register(difficulty).await?;
            seats.push(profile.id);
        }
        self.create_game(room_id, seats, bet_amount, seed).await
    }

    /// Force-finish a room with an explicit winner and reason. Normal
    /// endings happen inside the turn intents; this is for administrative
    /// termination (e.g. a room torn down by the gateway).
    pub async fn end_game(
        self: &Arc<Self>,
        room_id: &str,
        winner: SeatId,
        reason: EndReason,
    ) -> Result<(), GameError> {
        let token = self.lock_room(room_id).await?;
        let result = self.end_game_once(room_id, winner, reason).await;
        self.unlock_room(room_id, &token).await;
        let outcome = result?;
        self.dispatch(outcome).await;
        Ok(())
    }

    /// Replace a disconnected human with a substitute bot holding the
    /// same hand. If it is the substituted seat's turn, the bot acts
    /// right away — through the same locked entry points as everyone.
    pub async fn handle_disconnect(
        self: &Arc<Self>,
        seat: &str,
        difficulty: BotDifficulty,
    ) -> Result<(), GameError> {
        let Some(room_id) = self.store.room_for_seat(seat).await? else {
            return Ok(());
        };

        let token = self.lock_room(&room_id).await?;
        let result = self.disconnect_once(&room_id, seat, difficulty).await;
        self.unlock_room(&room_id, &token).await;

        let Some(outcome) = result? else {
            return Ok(());
        };
        if !self.dispatch(outcome).await {
            self.run_automated_seats(&room_id).await;
        }
        Ok(())
    }

    /// Give a reconnecting human their seat (and hand) back from the
    /// substitute bot.
    pub async fn handle_reconnect(self: &Arc<Self>, seat: &str) -> Result<(), GameError> {
        let Some(room_id) = self.store.room_for_seat(seat).await? else {
            return Ok(());
        };

        let token = self.lock_room(&room_id).await?;
        let result = self.reconnect_once(&room_id, seat).await;
        self.unlock_room(&room_id, &token).await;

        let Some(outcome) = result? else {
            return Ok(());
        };
        if !self.dispatch(outcome).await {
            // The current seat may still be some other bot.
            self.run_automated_seats(&room_id).await;
        }
        Ok(())
    }

    async fn create_game_once(
        &self,
        room_id: &str,
        seats: Vec<SeatId>,
        bet_amount: i64,
        seed: u64,
    ) -> Result<TurnOutcome, GameError> {
        match self.store.load(room_id).await {
            Ok(existing) if !existing.is_finished => {
                return Err(GameError::internal(format!(
                    "room {room_id} already has a game in progress"
                )));
            }
            Ok(_) | Err(GameError::GameNotFound { .. }) => {}
            Err(err) => return Err(err),
        }

        let (hands, draw_pile) = deal(&seats, seed)?;
        let now = now_ms();
        let mut state = GameState {
            room_id: room_id.to_string(),
            seats,
            hands,
            board: Board::new(),
            draw_pile,
            turn_index: 0,
            is_first_play: true,
            bet_amount,
            disconnected: BTreeSet::new(),
            move_history: Vec::new(),
            scores: BTreeMap::new(),
            turn_started_at: now,
            created_at: now,
            is_finished: false,
            winner: None,
            end_reason: None,
            finished_at: None,
        };
        state.turn_index = find_first_player(&state);

        for seat in &state.seats {
            self.store.map_seat_to_room(seat, room_id).await?;
        }
        self.store.save(&state).await?;

        let notices = state
            .seats
            .iter()
            .map(|seat| {
                Notice::Seat(
                    seat.clone(),
                    GameEvent::MatchFound {
                        view: PlayerView::for_seat(&state, seat),
                    },
                )
            })
            .collect();

        info!(
            room_id,
            seats = ?state.seats,
            first = state.current_seat(),
            bet_amount,
            "game created"
        );
        Ok(TurnOutcome {
            state,
            notices,
            rearm_timers: true,
        })
    }

    async fn end_game_once(
        &self,
        room_id: &str,
        winner: SeatId,
        reason: EndReason,
    ) -> Result<TurnOutcome, GameError> {
        let mut state = self.store.load(room_id).await?;
        if state.is_finished {
            return Err(GameError::invalid_move(format!(
                "game in room {room_id} is already finished"
            )));
        }
        if !state.seats.contains(&winner) {
            return Err(GameError::internal(format!(
                "winner {winner} is not seated in room {room_id}"
            )));
        }

        let mut notices = Vec::new();
        self.apply_finish(&mut state, winner, reason, &mut notices);
        self.store.save(&state).await?;
        push_state_updates(&mut notices, &state);
        Ok(TurnOutcome {
            state,
            notices,
            rearm_timers: false,
        })
    }

    async fn disconnect_once(
        &self,
        room_id: &str,
        seat: &str,
        difficulty: BotDifficulty,
    ) -> Result<Option<TurnOutcome>, GameError> {
        let mut state = self.store.load(room_id).await?;
        if state.is_finished {
            return Ok(None);
        }
        let Some(pos) = state.seats.iter().position(|s| s == seat) else {
            return Ok(None);
        };

        let profile = self.bots().register_substitute(seat, difficulty).await?;
        let bot_id = profile.id;

        state.seats[pos] = bot_id.clone();
        if let Some(hand) = state.hands.remove(seat) {
            state.hands.insert(bot_id.clone(), hand);
        }
        state.disconnected.insert(seat.to_string());
        state.check_tile_conservation()?;

        self.store.map_seat_to_room(&bot_id, room_id).await?;
        self.store.save(&state).await?;

        let mut notices = vec![Notice::Room(GameEvent::PlayerDisconnected {
            room_id: state.room_id.clone(),
            seat: seat.to_string(),
        })];
        push_state_updates(&mut notices, &state);
        info!(room_id, seat, bot_id, "seat substituted after disconnect");
        Ok(Some(TurnOutcome {
            state,
            notices,
            rearm_timers: false,
        }))
    }

    async fn reconnect_once(
        &self,
        room_id: &str,
        seat: &str,
    ) -> Result<Option<TurnOutcome>, GameError> {
        let mut state = self.store.load(room_id).await?;
        if state.is_finished || !state.disconnected.contains(seat) {
            return Ok(None);
        }

        let mut substitute: Option<(usize, String)> = None;
        for (pos, id) in state.seats.iter().enumerate() {
            if let Some(profile) = self.bots().profile(id).await? {
                if profile.replaces.as_deref() == Some(seat) {
                    substitute = Some((pos, id.clone()));
                    break;
                }
            }
        }
        let Some((pos, bot_id)) = substitute else {
            return Ok(None);
        };

        state.seats[pos] = seat.to_string();
        if let Some(hand) = state.hands.remove(&bot_id) {
            state.hands.insert(seat.to_string(), hand);
        }
        state.disconnected.remove(seat);
        state.check_tile_conservation()?;

        self.bots().remove(&bot_id).await?;
        self.store.clear_seat_mapping(&bot_id).await?;
        self.store.save(&state).await?;

        let mut notices = vec![Notice::Room(GameEvent::PlayerReconnected {
            room_id: state.room_id.clone(),
            seat: seat.to_string(),
        })];
        push_state_updates(&mut notices, &state);
        info!(room_id, seat, bot_id, "seat restored after reconnect");
        Ok(Some(TurnOutcome {
            state,
            notices,
            rearm_timers: false,
        }))
    }

    /// Mark the state finished in place and queue the game-over event.
    /// Runs while the lock is held; collaborator cleanup and settlement
    /// happen afterwards in the dispatch tail.
    pub(crate) fn apply_finish(
        &self,
        state: &mut GameState,
        winner: SeatId,
        reason: EndReason,
        notices: &mut Vec<Notice>,
    ) {
        state.scores = calculate_final_scores(state);
        state.is_finished = true;
        state.winner = Some(winner.clone());
        state.end_reason = Some(reason);
        state.finished_at = Some(now_ms());

        notices.push(Notice::Room(GameEvent::GameOver {
            room_id: state.room_id.clone(),
            winner: winner.clone(),
            reason,
            scores: state.scores.clone(),
        }));
        info!(room_id = %state.room_id, %winner, ?reason, "game finished");
    }
}
