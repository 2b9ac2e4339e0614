//! In-memory room registry.
//!
//! Implements the domain's [`RoomRegistry`] with two maps behind one mutex:
//! rooms by id, and each connection's current room.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, RegistryError, Room, RoomId, RoomRegistry, RoomSummary, Settings, SharedRoom,
    Timestamp,
};

#[derive(Default)]
struct Inner {
    rooms: HashMap<RoomId, SharedRoom>,
    bindings: HashMap<ConnectionId, RoomId>,
}

#[derive(Default)]
pub struct InMemoryRoomRegistry {
    inner: Mutex<Inner>,
}

impl InMemoryRoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomRegistry for InMemoryRoomRegistry {
    async fn create_or_get(
        &self,
        room_id: &RoomId,
        settings: Settings,
        created_at: Timestamp,
    ) -> (SharedRoom, bool) {
        let mut inner = self.inner.lock().await;
        if let Some(room) = inner.rooms.get(room_id) {
            return (room.clone(), false);
        }

        let room = Arc::new(Mutex::new(Room::new(room_id.clone(), settings, created_at)));
        inner.rooms.insert(room_id.clone(), room.clone());
        tracing::info!("Room '{}' created", room_id);
        (room, true)
    }

    async fn get(&self, room_id: &RoomId) -> Option<SharedRoom> {
        let inner = self.inner.lock().await;
        inner.rooms.get(room_id).cloned()
    }

    async fn list(&self) -> Vec<RoomSummary> {
        let inner = self.inner.lock().await;
        let mut summaries = Vec::with_capacity(inner.rooms.len());
        for (room_id, room) in &inner.rooms {
            let occupancy = room.lock().await.occupancy();
            summaries.push(RoomSummary {
                room_id: room_id.clone(),
                occupancy,
            });
        }
        summaries.sort_by(|a, b| a.room_id.cmp(&b.room_id));
        summaries
    }

    async fn remove_if_empty(&self, room_id: &RoomId) -> bool {
        let mut inner = self.inner.lock().await;
        let Some(room) = inner.rooms.get(room_id).cloned() else {
            return false;
        };

        let mut room = room.lock().await;
        if !room.is_empty() {
            return false;
        }
        room.close();
        inner.rooms.remove(room_id);
        tracing::info!("Room '{}' removed", room_id);
        true
    }

    async fn all_rooms(&self) -> Vec<SharedRoom> {
        let inner = self.inner.lock().await;
        inner.rooms.values().cloned().collect()
    }

    async fn bind(&self, connection: ConnectionId, room_id: RoomId) -> Result<(), RegistryError> {
        let mut inner = self.inner.lock().await;
        if let Some(existing) = inner.bindings.get(&connection) {
            return Err(RegistryError::AlreadyBound(
                connection.to_string(),
                existing.to_string(),
            ));
        }
        inner.bindings.insert(connection, room_id);
        Ok(())
    }

    async fn unbind(&self, connection: &ConnectionId) -> Option<RoomId> {
        let mut inner = self.inner.lock().await;
        inner.bindings.remove(connection)
    }

    async fn room_of(&self, connection: &ConnectionId) -> Option<RoomId> {
        let inner = self.inner.lock().await;
        inner.bindings.get(connection).cloned()
    }

    async fn bound_connections(&self) -> Vec<ConnectionId> {
        let inner = self.inner.lock().await;
        inner.bindings.keys().cloned().collect()
    }
}
