//! Per-room turn timer registry.
//!
//! Each room has at most one armed (warning, timeout) pair. Arming a room
//! aborts whatever was armed before, so timers from a finished turn can
//! never fire into the next one. The tasks themselves are spawned by the
//! orchestrator; this registry only owns their handles.

use std::collections::HashMap;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

struct TimerPair {
    warning: JoinHandle<()>,
    timeout: JoinHandle<()>,
}

impl TimerPair {
    fn abort(self) {
        self.warning.abort();
        self.timeout.abort();
    }
}

#[derive(Default)]
pub struct TurnTimers {
    inner: Mutex<HashMap<String, TimerPair>>,
}

impl TurnTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a fresh timer pair for the room, cancelling any previous one.
    pub fn arm(&self, room_id: &str, warning: JoinHandle<()>, timeout: JoinHandle<()>) {
        let previous = self
            .inner
            .lock()
            .insert(room_id.to_string(), TimerPair { warning, timeout });
        if let Some(pair) = previous {
            pair.abort();
        }
    }

    pub fn cancel(&self, room_id: &str) {
        if let Some(pair) = self.inner.lock().remove(room_id) {
            pair.abort();
        }
    }

    pub fn is_armed(&self, room_id: &str) -> bool {
        self.inner.lock().contains_key(room_id)
    }
}

impl Drop for TurnTimers {
    fn drop(&mut self) {
        for (_, pair) in self.inner.lock().drain() {
            pair.abort();
        }
    }
}
