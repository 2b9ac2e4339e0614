//! UseCase: leave a room, explicitly or by disconnecting.

use std::sync::Arc;

use crate::{
    domain::{ConnectionId, Phase, RoomEvent, RoomId, RoomRegistry, Severity},
    infrastructure::dto::websocket::ServerMessage,
};

use super::{error::IntentError, notifier::Notifier};

/// Why the connection is leaving
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveReason {
    /// `leave-room` intent; the connection stays open in the lobby
    Left,
    Disconnected,
}

pub struct LeaveRoomUseCase {
    registry: Arc<dyn RoomRegistry>,
    notifier: Arc<Notifier>,
}

impl LeaveRoomUseCase {
    pub fn new(registry: Arc<dyn RoomRegistry>, notifier: Arc<Notifier>) -> Self {
        Self { registry, notifier }
    }

    /// Vacate the connection's seat and tell the rest of the room.
    ///
    /// A non-empty room drops back to waiting; an empty one is removed.
    /// Returns the room that was left.
    pub async fn execute(
        &self,
        connection: &ConnectionId,
        reason: LeaveReason,
    ) -> Result<RoomId, IntentError> {
        let room_id = self
            .registry
            .unbind(connection)
            .await
            .ok_or_else(|| IntentError::NotInRoom(connection.to_string()))?;

        if let Some(shared) = self.registry.get(&room_id).await {
            let mut room = shared.lock().await;
            match room.leave(connection) {
                Ok(departure) => {
                    tracing::info!(
                        "'{}' left room '{}' ({:?}, {:?})",
                        departure.nickname,
                        room_id,
                        departure.role,
                        reason
                    );

                    let mut events = Vec::new();
                    if departure.forced_waiting {
                        events.push(RoomEvent::PhaseChanged(Phase::Waiting));
                        events.push(RoomEvent::StateSnapshot);
                    }
                    events.push(RoomEvent::MembershipChanged);
                    events.push(match reason {
                        LeaveReason::Left => RoomEvent::Notice {
                            text: format!("{} left the room.", departure.nickname),
                            severity: Severity::Info,
                        },
                        LeaveReason::Disconnected => RoomEvent::Notice {
                            text: format!("{} disconnected.", departure.nickname),
                            severity: Severity::Warning,
                        },
                    });
                    self.notifier.publish(&room, &events).await;
                }
                // bound but never seated: the join was interrupted
                Err(e) => tracing::debug!("Nothing to vacate in room '{}': {}", room_id, e),
            }
        } else {
            tracing::warn!("Connection '{}' was bound to missing room '{}'", connection, room_id);
        }

        self.registry.remove_if_empty(&room_id).await;

        if reason == LeaveReason::Left {
            self.notifier
                .send(
                    connection,
                    &ServerMessage::LeftRoom {
                        room_id: room_id.as_str().to_string(),
                    },
                )
                .await;
        }
        self.notifier.broadcast_lobby().await;

        Ok(room_id)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::rngs::mock::StepRng;
    use tokio::sync::{Mutex, mpsc};

    use super::*;
    use crate::{
        domain::{MessagePusher, Nickname, RoomError, Settings, Slot, Timestamp},
        infrastructure::{
            message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRegistry,
        },
    };

    struct Fixture {
        registry: Arc<InMemoryRoomRegistry>,
        pusher: Arc<WebSocketMessagePusher>,
        usecase: LeaveRoomUseCase,
    }

    fn fixture() -> Fixture {
        let registry = Arc::new(InMemoryRoomRegistry::new());
        let pusher = Arc::new(WebSocketMessagePusher::new(Arc::new(Mutex::new(
            HashMap::new(),
        ))));
        let notifier = Arc::new(Notifier::new(pusher.clone(), registry.clone()));
        let usecase = LeaveRoomUseCase::new(registry.clone(), notifier);
        Fixture {
            registry,
            pusher,
            usecase,
        }
    }

    /// Seat `members` in room "arena" in order, bypassing the join use case.
    async fn seat(
        fixture: &Fixture,
        members: &[&str],
    ) -> Vec<mpsc::UnboundedReceiver<String>> {
        let arena = RoomId::new("arena".to_string()).unwrap();
        let (room, _) = fixture
            .registry
            .create_or_get(&arena, Settings::default(), Timestamp::new(0))
            .await;
        let mut receivers = Vec::new();
        for id in members {
            let (tx, rx) = mpsc::unbounded_channel();
            let connection = ConnectionId::from(*id);
            fixture.pusher.register_client(connection.clone(), tx).await;
            fixture
                .registry
                .bind(connection.clone(), arena.clone())
                .await
                .unwrap();
            room.lock()
                .await
                .join(connection, Nickname::new(id.to_string()).unwrap())
                .unwrap();
            receivers.push(rx);
        }
        receivers
    }

    fn messages(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<serde_json::Value> {
        let mut values = Vec::new();
        while let Ok(json) = rx.try_recv() {
            values.push(serde_json::from_str(&json).unwrap());
        }
        values
    }

    #[tokio::test]
    async fn test_disconnect_mid_match_forces_waiting() {
        // given: a running match with a spectator
        let fixture = fixture();
        let mut receivers = seat(&fixture, &["a", "b", "c"]).await;
        let arena = RoomId::new("arena".to_string()).unwrap();
        let shared = fixture.registry.get(&arena).await.unwrap();
        {
            let mut room = shared.lock().await;
            room.set_ready(&ConnectionId::from("a"), Slot::Player1).unwrap();
            room.set_ready(&ConnectionId::from("b"), Slot::Player2).unwrap();
            room.tick(30, &mut StepRng::new(u64::MAX, 0));
            assert_eq!(room.phase, Phase::Running);
        }

        // when: the socket is gone before the implicit leave runs
        fixture.pusher.unregister_client(&ConnectionId::from("a")).await;
        let left = fixture
            .usecase
            .execute(&ConnectionId::from("a"), LeaveReason::Disconnected)
            .await
            .unwrap();

        // then:
        assert_eq!(left, arena);
        let room = shared.lock().await;
        assert_eq!(room.phase, Phase::Waiting);
        assert_eq!(room.player1, None);
        assert!(!room.readiness.player1);
        drop(room);

        let spectator = messages(&mut receivers[2]);
        let types: Vec<&str> = spectator
            .iter()
            .map(|m| m["type"].as_str().unwrap())
            .collect();
        assert_eq!(
            types,
            vec!["phase-changed", "state-snapshot", "membership", "notice"]
        );
        assert_eq!(spectator[0]["phase"], "waiting");
        assert_eq!(spectator[2]["player1"], serde_json::Value::Null);
        assert_eq!(spectator[3]["text"], "a disconnected.");
        assert_eq!(spectator[3]["severity"], "warning");
        assert!(messages(&mut receivers[0]).is_empty());
    }

    #[tokio::test]
    async fn test_last_leave_removes_room_and_acknowledges() {
        // given:
        let fixture = fixture();
        let mut receivers = seat(&fixture, &["a"]).await;
        let alice = ConnectionId::from("a");

        // when:
        fixture
            .usecase
            .execute(&alice, LeaveReason::Left)
            .await
            .unwrap();

        // then: back in the lobby with an empty listing
        assert!(fixture.registry.list().await.is_empty());
        assert_eq!(fixture.registry.room_of(&alice).await, None);
        let received = messages(&mut receivers[0]);
        assert_eq!(received[0]["type"], "left-room");
        assert_eq!(received[0]["roomId"], "arena");
        assert_eq!(received[1]["type"], "room-list");
        assert_eq!(received[1]["rooms"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_leave_outside_a_room_is_rejected() {
        // given:
        let fixture = fixture();

        // when:
        let result = fixture
            .usecase
            .execute(&ConnectionId::from("ghost"), LeaveReason::Left)
            .await;

        // then:
        assert_eq!(result, Err(IntentError::NotInRoom("ghost".to_string())));
    }

    #[tokio::test]
    async fn test_leave_keeps_waiting_room_waiting() {
        // given:
        let fixture = fixture();
        let _receivers = seat(&fixture, &["a", "b"]).await;

        // when:
        fixture
            .usecase
            .execute(&ConnectionId::from("b"), LeaveReason::Left)
            .await
            .unwrap();

        // then:
        let arena = RoomId::new("arena".to_string()).unwrap();
        let room = fixture.registry.get(&arena).await.unwrap();
        let room = room.lock().await;
        assert_eq!(room.phase, Phase::Waiting);
        assert_eq!(room.occupancy(), 1);
        assert_eq!(
            room.clone().leave(&ConnectionId::from("b")),
            Err(RoomError::NotAMember("b".to_string()))
        );
    }

    #[tokio::test]
    async fn test_disconnect_after_interrupted_join_removes_empty_room() {
        // given: bound and room created, but the join never seated the member
        let fixture = fixture();
        let ghost = RoomId::new("ghost".to_string()).unwrap();
        let stray = ConnectionId::from("x");
        fixture.registry.bind(stray.clone(), ghost.clone()).await.unwrap();
        fixture
            .registry
            .create_or_get(&ghost, Settings::default(), Timestamp::new(0))
            .await;
        let (tx, mut observer) = mpsc::unbounded_channel();
        fixture
            .pusher
            .register_client(ConnectionId::from("lobby"), tx)
            .await;

        // when:
        let left = fixture
            .usecase
            .execute(&stray, LeaveReason::Disconnected)
            .await;

        // then:
        assert_eq!(left, Ok(ghost));
        assert!(fixture.registry.list().await.is_empty());
        assert_eq!(fixture.registry.room_of(&stray).await, None);
        let received = messages(&mut observer);
        assert_eq!(received.len(), 1);
        assert_eq!(received[0]["type"], "room-list");
        assert_eq!(received[0]["rooms"], serde_json::json!([]));
    }
}
