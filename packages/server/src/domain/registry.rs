//! Room registry trait.
//!
//! The domain defines what it needs from room storage; the infrastructure
//! layer provides the implementation.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::Mutex;

use super::{
    error::RegistryError,
    room::Room,
    settings::Settings,
    value_object::{ConnectionId, RoomId, Timestamp},
};

/// A room guarded for exclusive access by one intent or tick at a time
pub type SharedRoom = Arc<Mutex<Room>>;

/// Lobby listing entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub room_id: RoomId,
    /// Filled player slots (0-2)
    pub occupancy: usize,
}

/// Mapping of room id to room, plus each connection's room binding.
///
/// Implementations must lock the registry before any room, never the reverse.
#[async_trait]
pub trait RoomRegistry: Send + Sync {
    /// Return the room for `room_id`, creating it with `settings` if absent.
    ///
    /// The flag is `true` when the room was created by this call. An existing
    /// room is returned unchanged and `settings` is ignored.
    async fn create_or_get(
        &self,
        room_id: &RoomId,
        settings: Settings,
        created_at: Timestamp,
    ) -> (SharedRoom, bool);

    async fn get(&self, room_id: &RoomId) -> Option<SharedRoom>;

    /// Lobby listing sorted by room id
    async fn list(&self) -> Vec<RoomSummary>;

    /// Drop the room if nobody is left in it. Returns whether it was removed.
    async fn remove_if_empty(&self, room_id: &RoomId) -> bool;

    /// Every live room, for the scheduler
    async fn all_rooms(&self) -> Vec<SharedRoom>;

    /// Record that `connection` now belongs to `room_id`.
    async fn bind(&self, connection: ConnectionId, room_id: RoomId) -> Result<(), RegistryError>;

    /// Forget the connection's binding and return the room it was in.
    async fn unbind(&self, connection: &ConnectionId) -> Option<RoomId>;

    async fn room_of(&self, connection: &ConnectionId) -> Option<RoomId>;

    /// Connections currently bound to some room
    async fn bound_connections(&self) -> Vec<ConnectionId>;
}
