//! Outbound notification seam.
//!
//! The engine only needs "push this payload to this seat"; transport
//! semantics (websockets, rooms, acks) belong to the gateway. Delivery is
//! best-effort: the orchestrator never holds the room lock across a
//! notification, and a failed push must not roll back a committed turn.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::board::BoardEnds;
use crate::domain::{EndReason, PlayerView, SeatId, Side, Tile};

/// Payloads pushed to seats. Tagged serialization matches what the
/// gateway forwards verbatim to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// A room formed and this seat's game is starting.
    MatchFound { view: PlayerView },
    TilePlayed {
        room_id: String,
        seat: SeatId,
        tile: Tile,
        side: Side,
        board_ends: BoardEnds,
    },
    PlayerPassed { room_id: String, seat: SeatId },
    /// Sent only to the seat that drew; carries the tile.
    TileDrawn {
        room_id: String,
        tile: Tile,
        draw_pile_count: usize,
    },
    /// Sent to everyone else; carries only the new pile size.
    PlayerDrewTile {
        room_id: String,
        seat: SeatId,
        draw_pile_count: usize,
    },
    GameOver {
        room_id: String,
        winner: SeatId,
        reason: EndReason,
        scores: BTreeMap<SeatId, u32>,
    },
    PlayerDisconnected { room_id: String, seat: SeatId },
    PlayerReconnected { room_id: String, seat: SeatId },
    TurnWarning {
        room_id: String,
        seat: SeatId,
        seconds_left: u64,
    },
    /// Per-seat snapshot after every committed mutation.
    GameStateUpdate { view: PlayerView },
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Best-effort push; implementations log failures rather than
    /// surfacing them.
    async fn notify_seat(&self, seat: &str, event: GameEvent);
}

/// Discards everything. Useful for tooling and as a default.
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn notify_seat(&self, _seat: &str, _event: GameEvent) {}
}
