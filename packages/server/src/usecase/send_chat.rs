//! UseCase: room chat and typing indicator.

use std::sync::Arc;

use brickrally_shared::time::Clock;

use crate::{
    domain::{ChatText, ConnectionId, RoomRegistry, SharedRoom, Timestamp},
    infrastructure::dto::websocket::{ChatEntryDto, ServerMessage},
};

use super::{error::IntentError, notifier::Notifier};

pub struct SendChatUseCase {
    registry: Arc<dyn RoomRegistry>,
    notifier: Arc<Notifier>,
    clock: Arc<dyn Clock>,
}

impl SendChatUseCase {
    pub fn new(
        registry: Arc<dyn RoomRegistry>,
        notifier: Arc<Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            notifier,
            clock,
        }
    }

    async fn room_of(&self, connection: &ConnectionId) -> Result<SharedRoom, IntentError> {
        let room_id = self
            .registry
            .room_of(connection)
            .await
            .ok_or_else(|| IntentError::NotInRoom(connection.to_string()))?;
        self.registry
            .get(&room_id)
            .await
            .ok_or_else(|| IntentError::RoomNotFound(room_id.to_string()))
    }

    /// Append to the room's chat log and relay to every member, sender included.
    pub async fn execute(&self, connection: &ConnectionId, text: String) -> Result<(), IntentError> {
        let text = ChatText::new(text).map_err(|e| IntentError::Malformed(e.to_string()))?;
        let shared = self.room_of(connection).await?;

        let mut room = shared.lock().await;
        let entry = room.add_chat(connection, text, Timestamp::new(self.clock.now_millis()))?;
        tracing::debug!("Chat from '{}' in room '{}'", entry.nickname, room.id);

        let message = ServerMessage::ChatMessage(ChatEntryDto::from(entry));
        self.notifier
            .broadcast(room.member_connections(), &message)
            .await;
        Ok(())
    }

    /// Tell the other members that `connection` is typing.
    pub async fn typing(&self, connection: &ConnectionId) -> Result<(), IntentError> {
        let shared = self.room_of(connection).await?;

        let room = shared.lock().await;
        let nickname = room
            .nickname_of(connection)
            .ok_or_else(|| IntentError::NotInRoom(connection.to_string()))?;
        let others = room
            .member_connections()
            .into_iter()
            .filter(|member| member != connection)
            .collect();
        self.notifier
            .broadcast(
                others,
                &ServerMessage::Typing {
                    nickname: nickname.as_str().to_string(),
                },
            )
            .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use brickrally_shared::time::FixedClock;
    use tokio::sync::{Mutex, mpsc};

    use super::*;
    use crate::{
        domain::{MessagePusher, Nickname, RoomId, Settings},
        infrastructure::{
            message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRegistry,
        },
    };

    async fn fixture() -> (
        SendChatUseCase,
        SharedRoom,
        Vec<mpsc::UnboundedReceiver<String>>,
    ) {
        let registry = Arc::new(InMemoryRoomRegistry::new());
        let pusher = Arc::new(WebSocketMessagePusher::new(Arc::new(Mutex::new(
            HashMap::new(),
        ))));
        let arena = RoomId::new("arena".to_string()).unwrap();
        let (room, _) = registry
            .create_or_get(&arena, Settings::default(), Timestamp::new(0))
            .await;

        let mut receivers = Vec::new();
        for (id, name) in [("a", "alice"), ("b", "bob")] {
            let (tx, rx) = mpsc::unbounded_channel();
            let connection = ConnectionId::from(id);
            pusher.register_client(connection.clone(), tx).await;
            registry.bind(connection.clone(), arena.clone()).await.unwrap();
            room.lock()
                .await
                .join(connection, Nickname::new(name.to_string()).unwrap())
                .unwrap();
            receivers.push(rx);
        }

        let notifier = Arc::new(Notifier::new(pusher, registry.clone()));
        let usecase = SendChatUseCase::new(registry, notifier, Arc::new(FixedClock::new(45_296_000)));
        (usecase, room, receivers)
    }

    #[tokio::test]
    async fn test_chat_is_logged_and_relayed_to_all_members() {
        // given:
        let (usecase, room, mut receivers) = fixture().await;

        // when:
        usecase
            .execute(&ConnectionId::from("a"), "good game".to_string())
            .await
            .unwrap();

        // then:
        assert_eq!(room.lock().await.chat.len(), 1);
        for rx in receivers.iter_mut() {
            let value: serde_json::Value =
                serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
            assert_eq!(value["type"], "chat-message");
            assert_eq!(value["nickname"], "alice");
            assert_eq!(value["text"], "good game");
            assert_eq!(value["time"], "12:34:56");
        }
    }

    #[tokio::test]
    async fn test_blank_chat_is_malformed() {
        // given:
        let (usecase, room, _receivers) = fixture().await;

        // when:
        let result = usecase
            .execute(&ConnectionId::from("a"), "   ".to_string())
            .await;

        // then:
        assert!(matches!(result, Err(IntentError::Malformed(_))));
        assert!(room.lock().await.chat.is_empty());
    }

    #[tokio::test]
    async fn test_typing_skips_sender() {
        // given:
        let (usecase, _room, mut receivers) = fixture().await;

        // when:
        usecase.typing(&ConnectionId::from("b")).await.unwrap();

        // then:
        assert!(receivers[1].try_recv().is_err());
        let value: serde_json::Value =
            serde_json::from_str(&receivers[0].try_recv().unwrap()).unwrap();
        assert_eq!(value, serde_json::json!({"type": "typing", "nickname": "bob"}));
    }
}
