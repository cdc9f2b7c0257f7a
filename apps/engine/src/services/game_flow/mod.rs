//! Turn orchestrator: the only writer of game state.
//!
//! Every mutation follows the same shape: acquire the room lock, load,
//! validate and mutate through the rules engine, persist, release. The
//! lock is released on every path, including validation failures.
//! Notifications, timer re-arming, and the automated-seat loop all happen
//! after release, so slow collaborators never extend the critical section.

mod lifecycle;
mod orchestration;
mod player_actions;

#[cfg(test)]
mod tests_flow;

use std::sync::Arc;

use tracing::warn;

use crate::bots::manager::BotManager;
use crate::config::EngineConfig;
use crate::domain::{GameState, PlayerView, SeatId};
use crate::errors::GameError;
use crate::services::notifier::{GameEvent, Notifier};
use crate::services::report::GameReport;
use crate::services::settlement::Settlement;
use crate::services::timer::TurnTimers;
use crate::store::{GameStore, LockToken};

pub struct GameFlowService {
    store: Arc<dyn GameStore>,
    notifier: Arc<dyn Notifier>,
    settlement: Arc<dyn Settlement>,
    bots: BotManager,
    timers: TurnTimers,
    config: EngineConfig,
}

impl GameFlowService {
    pub fn new(
        store: Arc<dyn GameStore>,
        notifier: Arc<dyn Notifier>,
        settlement: Arc<dyn Settlement>,
        config: EngineConfig,
    ) -> Arc<Self> {
        let bots = BotManager::new(Arc::clone(&store), config.clone());
        Arc::new(Self {
            store,
            notifier,
            settlement,
            bots,
            timers: TurnTimers::new(),
            config,
        })
    }

    pub fn bots(&self) -> &BotManager {
        &self.bots
    }

    pub fn timers(&self) -> &TurnTimers {
        &self.timers
    }

    /// Read-only snapshot for a seat; no lock needed.
    pub async fn player_view(&self, room_id: &str, seat: &str) -> Result<PlayerView, GameError> {
        let state = self.store.load(room_id).await?;
        Ok(PlayerView::for_seat(&state, seat))
    }

    /// Post-game report for a finished room.
    pub async fn game_report(&self, room_id: &str) -> Result<GameReport, GameError> {
        let state = self.store.load(room_id).await?;
        GameReport::from_state(&state)
    }

    pub(crate) async fn lock_room(&self, room_id: &str) -> Result<LockToken, GameError> {
        self.store
            .acquire_lock(room_id, self.config.lock_ttl)
            .await?
            .ok_or_else(|| GameError::LockNotAcquired {
                room_id: room_id.to_string(),
            })
    }

    /// Release never masks the operation's own result; a failed release
    /// is logged and the TTL reclaims the lock.
    pub(crate) async fn unlock_room(&self, room_id: &str, token: &LockToken) {
        if let Err(err) = self.store.release_lock(room_id, token).await {
            warn!(room_id, error = %err, "failed to release room lock");
        }
    }
}

/// Where a queued notification goes.
pub(crate) enum Notice {
    Seat(SeatId, GameEvent),
    Room(GameEvent),
}

/// A committed mutation: the persisted state plus the notifications to
/// fan out after the lock is released.
pub(crate) struct TurnOutcome {
    pub state: GameState,
    pub notices: Vec<Notice>,
    /// Timers are only reset when the acting seat changed (or the room
    /// was just created); a draw leaves the clock running.
    pub rearm_timers: bool,
}

/// Queue a per-seat snapshot for everyone at the table.
pub(crate) fn push_state_updates(notices: &mut Vec<Notice>, state: &GameState) {
    for seat in &state.seats {
        notices.push(Notice::Seat(
            seat.clone(),
            GameEvent::GameStateUpdate {
                view: PlayerView::for_seat(state, seat),
            },
        ));
    }
}
