//! The three turn intents: play, draw, pass.
//!
//! Humans, bots, and timer callbacks all enter through these; there is no
//! privileged path. Each public method commits under the room lock, fans
//! out notifications, then runs any automated seats that are now due.

use std::sync::Arc;

use tracing::{debug, info};

use super::{push_state_updates, GameFlowService, Notice, TurnOutcome};
use crate::domain::rules::{
    can_play_tile, check_winner, determine_winner_by_lowest_tile, is_game_blocked, is_valid_move,
    player_has_tile,
};
use crate::domain::state::now_ms;
use crate::domain::{EndReason, GameState, MoveAction, Side, Tile};
use crate::errors::GameError;
use crate::services::notifier::GameEvent;

impl GameFlowService {
    pub async fn play_tile(
        self: &Arc<Self>,
        room_id: &str,
        seat: &str,
        tile: Tile,
        side: Side,
    ) -> Result<(), GameError> {
        let outcome = self.commit_play(room_id, seat, tile, side).await?;
        if !self.dispatch(outcome).await {
            self.run_automated_seats(room_id).await;
        }
        Ok(())
    }

    pub async fn draw_tile(self: &Arc<Self>, room_id: &str, seat: &str) -> Result<(), GameError> {
        let outcome = self.commit_draw(room_id, seat).await?;
        if !self.dispatch(outcome).await {
            self.run_automated_seats(room_id).await;
        }
        Ok(())
    }

    pub async fn pass_turn(self: &Arc<Self>, room_id: &str, seat: &str) -> Result<(), GameError> {
        let outcome = self.commit_pass(room_id, seat).await?;
        if !self.dispatch(outcome).await {
            self.run_automated_seats(room_id).await;
        }
        Ok(())
    }

    pub(crate) async fn commit_play(
        &self,
        room_id: &str,
        seat: &str,
        tile: Tile,
        side: Side,
    ) -> Result<TurnOutcome, GameError> {
        let token = self.lock_room(room_id).await?;
        let result = self.play_tile_once(room_id, seat, tile, side).await;
        self.unlock_room(room_id, &token).await;
        result
    }

    pub(crate) async fn commit_draw(
        &self,
        room_id: &str,
        seat: &str,
    ) -> Result<TurnOutcome, GameError> {
        let token = self.lock_room(room_id).await?;
        let result = self.draw_tile_once(room_id, seat).await;
        self.unlock_room(room_id, &token).await;
        result
    }

    pub(crate) async fn commit_pass(
        &self,
        room_id: &str,
        seat: &str,
    ) -> Result<TurnOutcome, GameError> {
        let token = self.lock_room(room_id).await?;
        let result = self.pass_turn_once(room_id, seat).await;
        self.unlock_room(room_id, &token).await;
        result
    }

    async fn play_tile_once(
        &self,
        room_id: &str,
        seat: &str,
        tile: Tile,
        side: Side,
    ) -> Result<TurnOutcome, GameError> {
        let mut state = self.load_live(room_id).await?;
        if state.current_seat() != seat {
            return Err(GameError::NotYourTurn);
        }
        if !player_has_tile(&state, seat, tile) {
            return Err(GameError::TileNotInHand);
        }
        if !is_valid_move(&state, tile, side)? {
            return Err(GameError::invalid_move(format!(
                "tile {tile} does not match the {side:?} end"
            )));
        }

        let hand = state.hand_mut(seat)?;
        let pos = hand
            .iter()
            .position(|t| t.matches(tile))
            .ok_or(GameError::TileNotInHand)?;
        let played = hand.remove(pos);

        state.board.place(played, side, seat, now_ms())?;
        state.is_first_play = false;
        state.record_move(seat, MoveAction::Play, Some(played), Some(side));
        state.check_tile_conservation()?;

        let mut notices = vec![Notice::Room(GameEvent::TilePlayed {
            room_id: state.room_id.clone(),
            seat: seat.to_string(),
            tile: played,
            side,
            board_ends: state.board.ends,
        })];

        let winner = check_winner(&state).cloned();
        match winner {
            Some(winner) => {
                self.apply_finish(&mut state, winner, EndReason::Normal, &mut notices);
            }
            None => state.advance_turn(),
        }

        self.store.save(&state).await?;
        push_state_updates(&mut notices, &state);
        info!(room_id, seat, tile = %played, ?side, "tile played");
        Ok(TurnOutcome {
            state,
            notices,
            rearm_timers: true,
        })
    }

    /// Drawing never advances the turn: the seat stays current until it
    /// plays or is passed. At most one tile per call.
    async fn draw_tile_once(&self, room_id: &str, seat: &str) -> Result<TurnOutcome, GameError> {
        let mut state = self.load_live(room_id).await?;
        if state.seat_count() == 4 {
            return Err(GameError::CannotDrawInFourPlayerGame);
        }
        if state.current_seat() != seat {
            return Err(GameError::NotYourTurn);
        }

        if can_play_tile(&state, seat)? {
            // A legal tile is already in hand; the draw is a no-op save.
            debug!(room_id, seat, "draw requested with a playable tile in hand");
            self.store.save(&state).await?;
            return Ok(TurnOutcome {
                state,
                notices: Vec::new(),
                rearm_timers: false,
            });
        }

        match state.draw_pile.pop() {
            Some(tile) => {
                state.hand_mut(seat)?.push(tile);
                state.record_move(seat, MoveAction::Draw, Some(tile), None);
                state.check_tile_conservation()?;
                self.store.save(&state).await?;

                let mut notices = vec![Notice::Seat(
                    seat.to_string(),
                    GameEvent::TileDrawn {
                        room_id: state.room_id.clone(),
                        tile,
                        draw_pile_count: state.draw_pile.len(),
                    },
                )];
                for other in state.seats.iter().filter(|s| s.as_str() != seat) {
                    notices.push(Notice::Seat(
                        other.clone(),
                        GameEvent::PlayerDrewTile {
                            room_id: state.room_id.clone(),
                            seat: seat.to_string(),
                            draw_pile_count: state.draw_pile.len(),
                        },
                    ));
                }
                push_state_updates(&mut notices, &state);
                info!(room_id, seat, pile = state.draw_pile.len(), "tile drawn");
                Ok(TurnOutcome {
                    state,
                    notices,
                    rearm_timers: false,
                })
            }
            // Pile exhausted with nothing playable: the turn is passed.
            None => self.pass_current_seat(state).await,
        }
    }

    async fn pass_turn_once(&self, room_id: &str, seat: &str) -> Result<TurnOutcome, GameError> {
        let state = self.load_live(room_id).await?;
        if state.current_seat() != seat {
            return Err(GameError::NotYourTurn);
        }
        // Passing is never optional while a move exists.
        if can_play_tile(&state, seat)? {
            return Err(GameError::MustPlayTile);
        }
        self.pass_current_seat(state).await
    }

    /// Shared tail of an explicit pass and an exhausted draw: record the
    /// pass, resolve a blocked game, otherwise hand the turn on.
    async fn pass_current_seat(&self, mut state: GameState) -> Result<TurnOutcome, GameError> {
        let seat = state.current_seat().to_string();
        state.record_move(&seat, MoveAction::Pass, None, None);

        let mut notices = vec![Notice::Room(GameEvent::PlayerPassed {
            room_id: state.room_id.clone(),
            seat: seat.clone(),
        })];

        if is_game_blocked(&state)? {
            let winner = determine_winner_by_lowest_tile(&state)?;
            self.apply_finish(&mut state, winner, EndReason::Blocked, &mut notices);
        } else {
            state.advance_turn();
        }

        self.store.save(&state).await?;
        push_state_updates(&mut notices, &state);
        info!(room_id = %state.room_id, seat, "turn passed");
        Ok(TurnOutcome {
            state,
            notices,
            rearm_timers: true,
        })
    }

    /// Load a room that is still in progress.
    async fn load_live(&self, room_id: &str) -> Result<GameState, GameError> {
        let state = self.store.load(room_id).await?;
        if state.is_finished {
            return Err(GameError::invalid_move(format!(
                "game in room {room_id} is already finished"
            )));
        }
        Ok(state)
    }
}
