//! Post-commit tail: notification fan-out, timer management, collaborator
//! cleanup, and the automated-seat work loop.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use super::{GameFlowService, Notice, TurnOutcome};
use crate::bots;
use crate::bots::BotDecision;
use crate::domain::GameState;
use crate::errors::{ErrorCode, GameError};
use crate::services::notifier::GameEvent;
use crate::services::settlement::SettlementRequest;

/// Backoff between retries when a bot turn hits lock contention.
const BOT_RETRY_DELAY: Duration = Duration::from_millis(25);
const BOT_RETRY_LIMIT: u32 = 10;

impl GameFlowService {
    /// Deliver a committed outcome's notifications and settle the room's
    /// follow-up work. Returns `true` if the game is finished. Never
    /// called while the room lock is held.
    pub(crate) async fn dispatch(self: &Arc<Self>, outcome: TurnOutcome) -> bool {
        let TurnOutcome {
            state,
            notices,
            rearm_timers,
        } = outcome;

        for notice in notices {
            match notice {
                Notice::Seat(seat, event) => self.notifier.notify_seat(&seat, event).await,
                Notice::Room(event) => {
                    for seat in &state.seats {
                        self.notifier.notify_seat(seat, event.clone()).await;
                    }
                }
            }
        }

        if state.is_finished {
            self.timers.cancel(&state.room_id);
            self.finish_room(&state).await;
            return true;
        }
        if rearm_timers {
            self.arm_turn_timers(&state.room_id, state.current_seat());
        }
        false
    }

    /// Keep acting for the current seat while it is a bot. An explicit
    /// loop rather than re-entrant calls, so any chain of consecutive bot
    /// turns runs in constant depth. Errors here are logged, never
    /// propagated: the triggering turn is already committed.
    pub(crate) async fn run_automated_seats(self: &Arc<Self>, room_id: &str) {
        let mut retries = 0u32;
        loop {
            let state = match self.store.load(room_id).await {
                Ok(state) => state,
                Err(GameError::GameNotFound { .. }) => return,
                Err(err) => {
                    warn!(room_id, error = %err, "bot loop could not load state");
                    return;
                }
            };
            if state.is_finished {
                return;
            }

            let seat = state.current_seat().to_string();
            let profile = match self.bots.profile(&seat).await {
                Ok(Some(profile)) => profile,
                Ok(None) => return,
                Err(err) => {
                    warn!(room_id, seat, error = %err, "bot lookup failed");
                    return;
                }
            };

            let delay = self.bots.think_delay();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let decision = match bots::decide(&state, &seat, profile.difficulty) {
                Ok(decision) => decision,
                Err(err) => {
                    error!(room_id, seat, error = %err, "bot decision failed");
                    return;
                }
            };
            debug!(room_id, seat, ?decision, "bot acting");

            // The decision came from an unlocked read; the commit
            // revalidates under the lock and fails loudly if the state
            // moved underneath us.
            let result = match decision {
                BotDecision::Play { tile, side } => {
                    self.commit_play(room_id, &seat, tile, side).await
                }
                BotDecision::Draw => self.commit_draw(room_id, &seat).await,
                BotDecision::Pass => self.commit_pass(room_id, &seat).await,
            };

            match result {
                Ok(outcome) => {
                    retries = 0;
                    if self.dispatch(outcome).await {
                        return;
                    }
                }
                Err(err)
                    if retries < BOT_RETRY_LIMIT
                        && (err.is_retryable() || err.code() == ErrorCode::NotYourTurn) =>
                {
                    // Contention, or another caller got there first;
                    // re-read and reconsider.
                    retries += 1;
                    tokio::time::sleep(BOT_RETRY_DELAY).await;
                }
                Err(err) => {
                    error!(room_id, seat, error = %err, "bot turn failed");
                    return;
                }
            }
        }
    }

    /// Arm the warning/timeout pair for the seat now on the clock. The
    /// tasks hold only a weak service handle so a dropped service kills
    /// its timers.
    pub(crate) fn arm_turn_timers(self: &Arc<Self>, room_id: &str, seat: &str) {
        let warning_after = self.config.turn_timeout.saturating_sub(self.config.turn_warning);
        let timeout_after = self.config.turn_timeout;

        let warning = {
            let weak = Arc::downgrade(self);
            let room_id = room_id.to_string();
            let seat = seat.to_string();
            tokio::spawn(async move {
                tokio::time::sleep(warning_after).await;
                if let Some(svc) = weak.upgrade() {
                    let seconds_left = svc.config.turn_warning.as_secs();
                    svc.notifier
                        .notify_seat(
                            &seat,
                            GameEvent::TurnWarning {
                                room_id: room_id.clone(),
                                seat: seat.clone(),
                                seconds_left,
                            },
                        )
                        .await;
                }
            })
        };

        let timeout = {
            let weak = Arc::downgrade(self);
            let room_id = room_id.to_string();
            let seat = seat.to_string();
            tokio::spawn(async move {
                tokio::time::sleep(timeout_after).await;
                if let Some(svc) = weak.upgrade() {
                    svc.handle_turn_timeout(&room_id, &seat).await;
                }
            })
        };

        self.timers.arm(room_id, warning, timeout);
    }

    /// Timeout path: pass on the seat's behalf through the normal locked
    /// entry point. A seat holding a playable tile cannot be passed; that
    /// rejection re-arms the clock instead of stalling the room.
    async fn handle_turn_timeout(self: &Arc<Self>, room_id: &str, seat: &str) {
        info!(room_id, seat, "turn timed out");
        match self.pass_turn(room_id, seat).await {
            Ok(()) => {}
            Err(err) if err.code() == ErrorCode::MustPlayTile || err.is_retryable() => {
                warn!(room_id, seat, error = %err, "timeout pass rejected, re-arming");
                self.arm_turn_timers(room_id, seat);
            }
            Err(err)
                if matches!(
                    err.code(),
                    ErrorCode::NotYourTurn | ErrorCode::GameNotFound | ErrorCode::InvalidMove
                ) =>
            {
                // The turn moved on (or the game ended) before the timer
                // was cancelled.
                debug!(room_id, seat, "stale turn timeout");
            }
            Err(err) => {
                error!(room_id, seat, error = %err, "timeout pass failed");
            }
        }
    }

    /// Post-finish cleanup: seat mappings, bot profiles, chat transcript,
    /// and the settlement call for real-money games. All best-effort; the
    /// finished state is already durable.
    async fn finish_room(self: &Arc<Self>, state: &GameState) {
        for seat in &state.seats {
            if let Err(err) = self.store.clear_seat_mapping(seat).await {
                warn!(room_id = %state.room_id, seat, error = %err, "seat mapping cleanup failed");
            }
            match self.bots.profile(seat).await {
                Ok(Some(profile)) => {
                    if let Some(human) = &profile.replaces {
                        if let Err(err) = self.store.clear_seat_mapping(human).await {
                            warn!(room_id = %state.room_id, seat = %human, error = %err, "seat mapping cleanup failed");
                        }
                    }
                    if let Err(err) = self.bots.remove(seat).await {
                        warn!(room_id = %state.room_id, seat, error = %err, "bot cleanup failed");
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(room_id = %state.room_id, seat, error = %err, "bot lookup failed during cleanup");
                }
            }
        }
        if let Err(err) = self.store.clear_chat(&state.room_id).await {
            warn!(room_id = %state.room_id, error = %err, "chat cleanup failed");
        }

        if state.bet_amount > 0 {
            if let Some(winner) = state.winner.clone() {
                let request = SettlementRequest {
                    game_id: state.room_id.clone(),
                    loser_ids: state
                        .seats
                        .iter()
                        .filter(|s| **s != winner)
                        .cloned()
                        .collect(),
                    winner_id: winner,
                    bet_amount: state.bet_amount,
                };
                let settlement = Arc::clone(&self.settlement);
                // Fire-and-forget; settlement failures never roll back a
                // finished game.
                tokio::spawn(async move {
                    if let Err(err) = settlement.settle(request).await {
                        error!(error = %err, "settlement call failed");
                    }
                });
            }
        }
    }
}
