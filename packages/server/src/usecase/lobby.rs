//! UseCase: read-only room queries for the lobby and the HTTP API.

use std::sync::Arc;

use crate::{
    domain::{ConnectionId, RoomId, RoomRegistry, RoomSummary},
    infrastructure::dto::http::RoomDetailDto,
};

use super::notifier::Notifier;

pub struct LobbyUseCase {
    registry: Arc<dyn RoomRegistry>,
    notifier: Arc<Notifier>,
}

impl LobbyUseCase {
    pub fn new(registry: Arc<dyn RoomRegistry>, notifier: Arc<Notifier>) -> Self {
        Self { registry, notifier }
    }

    pub async fn list_rooms(&self) -> Vec<RoomSummary> {
        self.registry.list().await
    }

    /// Answer a `list-rooms` intent.
    pub async fn send_room_list(&self, connection: &ConnectionId) {
        let message = self.notifier.room_list().await;
        self.notifier.send(connection, &message).await;
    }

    /// Detail view of one room, or `None` for an unknown or invalid id.
    pub async fn room_detail(&self, room_id: String) -> Option<RoomDetailDto> {
        let room_id = RoomId::new(room_id).ok()?;
        let shared = self.registry.get(&room_id).await?;
        let room = shared.lock().await;
        Some(RoomDetailDto::from(&*room))
    }
}
