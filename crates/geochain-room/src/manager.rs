//! Room manager: creates, tracks, and routes players to rooms.

use std::collections::HashMap;
use std::sync::Arc;

use geochain_protocol::{GameSnapshot, PlayerId, RoomId};
use geochain_stats::StatsRecorder;
use rand::Rng;
use tracing::{debug, info};

use crate::room::spawn_room;
use crate::{Action, Dictionary, PlayerSender, RoomConfig, RoomError, RoomHandle, RoomInfo};

/// Generates a fresh six-hex-digit room id, e.g. `"3fa9c1"`.
fn generate_room_id() -> RoomId {
    RoomId::new(format!("{:06x}", rand::rng().random_range(0..0x100_0000u32)))
}

/// Every live room, and which room each player is in.
///
/// Rooms are created the first time someone asks for them and stop when
/// their last human leaves. A player is in at most one room at a time.
pub struct RoomManager {
    dictionary: Arc<dyn Dictionary>,
    stats: Arc<dyn StatsRecorder>,
    config: RoomConfig,
    rooms: HashMap<RoomId, RoomHandle>,
    player_rooms: HashMap<PlayerId, RoomId>,
}

impl RoomManager {
    pub fn new(dictionary: Arc<dyn Dictionary>, stats: Arc<dyn StatsRecorder>, config: RoomConfig) -> Self {
        Self {
            dictionary,
            stats,
            config,
            rooms: HashMap::new(),
            player_rooms: HashMap::new(),
        }
    }

    /// Returns the handle for `room_id`, spawning the room if it does not
    /// exist (or its actor has stopped). `None` generates an unused id.
    pub fn create_room(&mut self, room_id: Option<RoomId>) -> RoomHandle {
        let room_id = room_id.unwrap_or_else(|| loop {
            let candidate = generate_room_id();
            if !self.rooms.contains_key(&candidate) {
                break candidate;
            }
        });

        if let Some(handle) = self.rooms.get(&room_id).filter(|h| !h.is_closed()) {
            return handle.clone();
        }

        let handle = spawn_room(
            room_id.clone(),
            self.config.clone(),
            Arc::clone(&self.dictionary),
            Arc::clone(&self.stats),
        );
        self.rooms.insert(room_id.clone(), handle.clone());
        info!(%room_id, rooms = self.rooms.len(), "room created");
        handle
    }

    /// Books `player_id` into `room_id` (created on demand, or a brand-new
    /// room when no id is given) and returns the handle to join through.
    ///
    /// Only bookkeeping happens here. The caller joins via the handle
    /// afterwards, so a manager shared behind a lock is never held while
    /// a room works through its queue.
    pub fn reserve(&mut self, player_id: PlayerId, room_id: Option<RoomId>) -> Result<RoomHandle, RoomError> {
        if let Some(current) = self.player_rooms.get(&player_id) {
            return Err(RoomError::AlreadyInRoom(player_id, current.clone()));
        }

        let handle = self.create_room(room_id);
        self.player_rooms.insert(player_id, handle.room_id().clone());
        Ok(handle)
    }

    /// Forgets which room `player_id` is in and hands back that room, if
    /// it is still tracked. The caller leaves through the handle.
    pub fn release(&mut self, player_id: PlayerId) -> Result<Option<RoomHandle>, RoomError> {
        let room_id = self
            .player_rooms
            .remove(&player_id)
            .ok_or(RoomError::NoRoom(player_id))?;
        Ok(self.rooms.get(&room_id).cloned())
    }

    /// Forgets a room whose actor stopped. No-op when `room_id` has
    /// already been reused by a newer room.
    pub fn retire(&mut self, handle: &RoomHandle) {
        let room_id = handle.room_id();
        if !self.rooms.get(room_id).is_some_and(|h| h.same_room(handle)) {
            return;
        }
        self.rooms.remove(room_id);
        self.player_rooms.retain(|_, rid| rid != room_id);
        info!(%room_id, rooms = self.rooms.len(), "room retired");
    }

    /// [`reserve`](Self::reserve) and join in one step.
    pub async fn join_or_create(
        &mut self,
        player_id: PlayerId,
        room_id: Option<RoomId>,
        name: impl Into<String>,
        sender: PlayerSender,
    ) -> Result<RoomHandle, RoomError> {
        let handle = self.reserve(player_id, room_id)?;
        if let Err(e) = handle.join(player_id, name, sender).await {
            let _ = self.release(player_id);
            if matches!(e, RoomError::Unavailable(_)) {
                self.retire(&handle);
            }
            return Err(e);
        }
        Ok(handle)
    }

    /// Removes a player from their room. The room stops on its own when no
    /// humans remain and is forgotten here.
    ///
    /// A room may already have dropped the player for backpressure; that
    /// still counts as a successful leave.
    pub async fn leave_room(&mut self, player_id: PlayerId) -> Result<(), RoomError> {
        let Some(handle) = self.release(player_id)? else {
            return Ok(());
        };

        if handle.vacate(player_id).await? {
            debug!(room_id = %handle.room_id(), "no humans left");
            self.retire(&handle);
        }
        Ok(())
    }

    /// Routes a game command to the player's current room.
    pub async fn route_action(&self, player_id: PlayerId, action: Action) -> Result<(), RoomError> {
        let room_id = self
            .player_rooms
            .get(&player_id)
            .ok_or(RoomError::NoRoom(player_id))?;
        let handle = self
            .rooms
            .get(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;
        handle.send_action(player_id, action).await
    }

    pub async fn get_room_info(&self, room_id: &RoomId) -> Result<RoomInfo, RoomError> {
        self.handle(room_id)?.get_info().await
    }

    pub async fn snapshot(&self, room_id: &RoomId) -> Result<GameSnapshot, RoomError> {
        self.handle(room_id)?.snapshot().await
    }

    /// Shuts a room down and forgets everyone in it.
    pub async fn destroy_room(&mut self, room_id: &RoomId) -> Result<(), RoomError> {
        let handle = self
            .rooms
            .remove(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;

        // an actor that already stopped is as good as shut down
        let _ = handle.shutdown().await;
        self.player_rooms.retain(|_, rid| *rid != *room_id);

        info!(%room_id, rooms = self.rooms.len(), "room destroyed");
        Ok(())
    }

    pub fn handle(&self, room_id: &RoomId) -> Result<&RoomHandle, RoomError> {
        self.rooms
            .get(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))
    }

    /// The room a player is currently in, if any.
    pub fn player_room(&self, player_id: PlayerId) -> Option<&RoomId> {
        self.player_rooms.get(&player_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.keys().cloned().collect()
    }
}
