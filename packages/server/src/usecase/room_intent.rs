//! UseCase: intents a member sends to its own room.
//!
//! Each intent locks the room, applies the change and publishes the
//! resulting events before the lock is released, so a tick never observes
//! half of an intent. Intents never wait for the simulation.

use std::sync::Arc;

use crate::domain::{
    ConnectionId, Direction, Room, RoomError, RoomEvent, RoomRegistry, SettingsPatch, Side, Slot,
};

use super::{error::IntentError, notifier::Notifier};

pub struct RoomIntentUseCase {
    registry: Arc<dyn RoomRegistry>,
    notifier: Arc<Notifier>,
}

impl RoomIntentUseCase {
    pub fn new(registry: Arc<dyn RoomRegistry>, notifier: Arc<Notifier>) -> Self {
        Self { registry, notifier }
    }

    async fn apply<F>(&self, connection: &ConnectionId, intent: F) -> Result<(), IntentError>
    where
        F: FnOnce(&mut Room) -> Result<Vec<RoomEvent>, RoomError> + Send,
    {
        let room_id = self
            .registry
            .room_of(connection)
            .await
            .ok_or_else(|| IntentError::NotInRoom(connection.to_string()))?;
        let shared = self
            .registry
            .get(&room_id)
            .await
            .ok_or_else(|| IntentError::RoomNotFound(room_id.to_string()))?;

        let mut room = shared.lock().await;
        let events = intent(&mut *room)?;
        self.notifier.publish(&room, &events).await;
        Ok(())
    }

    pub async fn set_ready(&self, connection: &ConnectionId, slot: Slot) -> Result<(), IntentError> {
        self.apply(connection, |room| room.set_ready(connection, slot))
            .await
    }

    pub async fn toggle_pause(&self, connection: &ConnectionId) -> Result<(), IntentError> {
        self.apply(connection, |room| room.toggle_pause(connection))
            .await
    }

    /// `direction` must be -1 (up) or +1 (down).
    pub async fn move_paddle(
        &self,
        connection: &ConnectionId,
        side: Side,
        direction: i32,
    ) -> Result<(), IntentError> {
        let direction =
            Direction::try_from(direction).map_err(|e| IntentError::Malformed(e.to_string()))?;
        self.apply(connection, |room| room.move_paddle(connection, side, direction))
            .await
    }

    pub async fn update_settings(
        &self,
        connection: &ConnectionId,
        patch: SettingsPatch,
    ) -> Result<(), IntentError> {
        self.apply(connection, |room| room.update_settings(connection, &patch))
            .await
    }

    pub async fn request_replay(&self, connection: &ConnectionId) -> Result<(), IntentError> {
        self.apply(connection, |room| room.request_replay(connection))
            .await
    }
}
