//! Per-connection handler: identity, room membership, and message routing.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Read `name` and `room` from the upgrade request's query string
//!   2. Join (or create) the room → `WELCOME`, then the room's `GAME_STATE`
//!   3. Loop: receive envelopes → route game commands to the room,
//!      handle `JOIN_ROOM` here
//!
//! Outbound traffic never goes through this loop. The room pushes into a
//! bounded channel and a writer task drains it onto the socket, so a slow
//! client only ever stalls its own writer.
//!
//! The room manager lock only guards bookkeeping. Joins and leaves talk to
//! the room after the lock is released, so a busy room never holds up
//! players on their way into other rooms.

use std::sync::Arc;
use std::time::Duration;

use geochain_protocol::{ClientMessage, Codec, Envelope, PlayerId, RoomId, ServerMessage};
use geochain_room::{Action, RoomError, RoomHandle};
use geochain_transport::{Connection, TransportError, WebSocketConnection};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::GeochainError;
use crate::server::ServerState;

/// Name used when the query string has none.
pub const DEFAULT_PLAYER_NAME: &str = "Guest";

/// Joins retried when the room stops between booking and joining.
const SEAT_ATTEMPTS: usize = 3;

/// Drop guard that takes the player out of their room when the handler
/// exits, even if it panics. `Drop` is synchronous, so the leave runs in
/// a fire-and-forget task.
struct LeaveGuard {
    player_id: PlayerId,
    state: Arc<ServerState>,
}

impl Drop for LeaveGuard {
    fn drop(&mut self) {
        let player_id = self.player_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move { leave_room(&state, player_id).await });
    }
}

/// The room a connection is in and the task writing that room's messages
/// to the socket.
struct Seat {
    room: RoomHandle,
    writer: JoinHandle<()>,
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    state: Arc<ServerState>,
) -> Result<(), GeochainError> {
    let conn = Arc::new(conn);
    let conn_id = conn.id();

    let name = conn
        .query_param("name")
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_PLAYER_NAME)
        .to_string();
    let requested_room = conn
        .query_param("room")
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(RoomId::new);

    let player_id = PlayerId::next();
    tracing::info!(%conn_id, %player_id, %name, peer = %conn.peer_addr(), "player connected");

    let mut seat = take_seat(&conn, &state, player_id, &name, requested_room).await?;
    let _guard = LeaveGuard {
        player_id,
        state: Arc::clone(&state),
    };

    loop {
        let received = tokio::select! {
            received = recv_or_idle(&conn, state.config.idle_timeout) => received,
            _ = &mut seat.writer => {
                tracing::info!(%player_id, room_id = %seat.room.room_id(), "room dropped connection");
                break;
            }
        };

        let data = match received {
            Some(Ok(Some(data))) => data,
            Some(Ok(None)) => {
                tracing::info!(%player_id, "connection closed cleanly");
                break;
            }
            Some(Err(e)) => {
                tracing::debug!(%player_id, error = %e, "recv error");
                break;
            }
            None => {
                tracing::info!(%player_id, "connection idle, closing");
                break;
            }
        };

        let message = match decode(&state, &data) {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "dropping undecodable message");
                continue;
            }
        };

        match message {
            ClientMessage::JoinRoom { room_id } => {
                if room_id == *seat.room.room_id() {
                    tracing::debug!(%player_id, %room_id, "already in requested room");
                    continue;
                }
                seat = switch_room(&conn, &state, player_id, &name, seat, room_id).await?;
            }
            other => {
                let Some(action) = Action::from_client(other) else {
                    continue;
                };
                if let Err(e) = seat.room.send_action(player_id, action).await {
                    tracing::debug!(%player_id, error = %e, "room stopped taking commands");
                    break;
                }
            }
        }
    }

    seat.writer.abort();
    if let Err(e) = conn.close().await {
        tracing::debug!(%player_id, error = %e, "close failed");
    }
    // _guard drops here → leave_room fires.
    Ok(())
}

/// `None` when nothing arrived within `limit`. Without a limit it waits
/// for as long as the peer stays connected.
async fn recv_or_idle(
    conn: &WebSocketConnection,
    limit: Option<Duration>,
) -> Option<Result<Option<Vec<u8>>, TransportError>> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, conn.recv()).await.ok(),
        None => Some(conn.recv().await),
    }
}

fn decode(state: &ServerState, data: &[u8]) -> Result<ClientMessage, GeochainError> {
    let envelope: Envelope = state.codec.decode(data)?;
    Ok(ClientMessage::try_from(envelope)?)
}

/// Seats the player in `room_id` (or a fresh room) and starts the writer
/// for it. `WELCOME` is queued before the join so it always precedes the
/// room's first `GAME_STATE`.
///
/// A room can stop between being booked and being joined when its last
/// human leaves at that moment. The join then comes back `Unavailable` and
/// is retried against a fresh room under the same id.
async fn take_seat(
    conn: &Arc<WebSocketConnection>,
    state: &Arc<ServerState>,
    player_id: PlayerId,
    name: &str,
    room_id: Option<RoomId>,
) -> Result<Seat, GeochainError> {
    let mut attempt = 1;
    loop {
        let room = state.rooms.lock().await.reserve(player_id, room_id.clone())?;

        let (tx, rx) = mpsc::channel(state.config.outbound_buffer.max(1));
        // fresh channel with capacity >= 1, cannot be full
        let _ = tx.try_send(ServerMessage::Welcome {
            id: player_id,
            room_id: room.room_id().clone(),
        });

        match room.join(player_id, name, tx).await {
            Ok(()) => {
                tracing::info!(%player_id, room_id = %room.room_id(), "player seated");
                let writer = spawn_writer(Arc::clone(conn), Arc::clone(state), player_id, rx);
                return Ok(Seat { room, writer });
            }
            Err(e) => {
                let stopped = matches!(e, RoomError::Unavailable(_));
                {
                    let mut rooms = state.rooms.lock().await;
                    let _ = rooms.release(player_id);
                    if stopped {
                        rooms.retire(&room);
                    }
                }
                if !stopped || attempt == SEAT_ATTEMPTS {
                    return Err(e.into());
                }
                tracing::debug!(%player_id, room_id = %room.room_id(), attempt, "room stopped during join, retrying");
                attempt += 1;
            }
        }
    }
}

/// Takes the player out of whatever room they are in. Only the
/// bookkeeping runs under the manager lock.
async fn leave_room(state: &ServerState, player_id: PlayerId) {
    let released = state.rooms.lock().await.release(player_id);
    let room = match released {
        Ok(Some(room)) => room,
        Ok(None) => return,
        Err(e) => {
            tracing::debug!(%player_id, error = %e, "leave without a room");
            return;
        }
    };

    match room.vacate(player_id).await {
        Ok(true) => state.rooms.lock().await.retire(&room),
        Ok(false) => {}
        Err(e) => tracing::debug!(%player_id, room_id = %room.room_id(), error = %e, "leave failed"),
    }
}

/// Leaves the current room, lets its writer flush what the room already
/// sent, then takes a seat in `room_id`.
async fn switch_room(
    conn: &Arc<WebSocketConnection>,
    state: &Arc<ServerState>,
    player_id: PlayerId,
    name: &str,
    seat: Seat,
    room_id: RoomId,
) -> Result<Seat, GeochainError> {
    tracing::info!(%player_id, from = %seat.room.room_id(), to = %room_id, "switching rooms");

    leave_room(state, player_id).await;
    // the room dropped its sender on leave, so the writer ends on its own
    let _ = seat.writer.await;

    take_seat(conn, state, player_id, name, Some(room_id)).await
}

/// Drains one room's outbound channel onto the socket. Ends when the room
/// drops the sender (leave, backpressure, shutdown) or a send fails.
fn spawn_writer(
    conn: Arc<WebSocketConnection>,
    state: Arc<ServerState>,
    player_id: PlayerId,
    mut rx: mpsc::Receiver<ServerMessage>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let bytes = match state.codec.encode(&message) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(%player_id, error = %e, "failed to encode outbound message");
                    continue;
                }
            };
            if let Err(e) = conn.send(&bytes).await {
                tracing::debug!(%player_id, error = %e, "send failed");
                break;
            }
        }
    })
}
