//! UseCase: join (or create) a room.

use std::sync::Arc;

use brickrally_shared::time::Clock;

use crate::{
    domain::{
        ConnectionId, Nickname, RegistryError, Role, RoomError, RoomEvent, RoomId, RoomIdFactory,
        RoomRegistry, Settings, SettingsPatch, Severity, Timestamp,
    },
    infrastructure::dto::websocket::{ChatEntryDto, ServerMessage},
};

use super::{error::JoinError, notifier::Notifier};

/// Where a connection ended up after joining
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    pub room_id: RoomId,
    pub role: Role,
    pub created: bool,
}

pub struct JoinRoomUseCase {
    registry: Arc<dyn RoomRegistry>,
    notifier: Arc<Notifier>,
    clock: Arc<dyn Clock>,
}

impl JoinRoomUseCase {
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

    /// Seat `connection` in `room_id`, creating the room on first join.
    ///
    /// `settings` only applies, and is only validated, when this call creates
    /// the room. The joiner receives its role, the chat history, the settings
    /// and a snapshot; the room hears about the new member; lobby observers
    /// get a fresh listing.
    pub async fn execute(
        &self,
        connection: ConnectionId,
        room_id: Option<String>,
        nickname: String,
        settings: Option<SettingsPatch>,
    ) -> Result<JoinOutcome, JoinError> {
        let nickname = Nickname::new(nickname).map_err(JoinError::InvalidNickname)?;
        let room_id = match room_id {
            Some(id) => RoomId::new(id).map_err(JoinError::InvalidRoomId)?,
            None => RoomIdFactory::generate(),
        };
        // only checked if this join creates the room
        let requested = Settings::default().merged(&settings.unwrap_or_default());
        let initial = requested.clone().unwrap_or_default();

        self.registry
            .bind(connection.clone(), room_id.clone())
            .await
            .map_err(|RegistryError::AlreadyBound(conn, room)| JoinError::AlreadyInRoom(conn, room))?;

        let created_at = Timestamp::new(self.clock.now_millis());
        let outcome = loop {
            let (shared, created) = self
                .registry
                .create_or_get(&room_id, initial, created_at)
                .await;
            if let (true, Err(e)) = (created, &requested) {
                self.registry.unbind(&connection).await;
                self.registry.remove_if_empty(&room_id).await;
                return Err(JoinError::InvalidSettings(e.clone()));
            }
            let mut room = shared.lock().await;

            let role = match room.join(connection.clone(), nickname.clone()) {
                Ok(role) => role,
                // emptied and dropped between lookup and lock
                Err(RoomError::Closed) => continue,
                Err(e) => {
                    drop(room);
                    self.registry.unbind(&connection).await;
                    if created {
                        self.registry.remove_if_empty(&room_id).await;
                    }
                    return Err(JoinError::Room(e));
                }
            };

            tracing::info!(
                "'{}' joined room '{}' as {:?} ({})",
                nickname,
                room_id,
                role,
                connection
            );

            self.notifier
                .send(
                    &connection,
                    &ServerMessage::RoleAssigned {
                        room_id: room_id.as_str().to_string(),
                        role: role.into(),
                    },
                )
                .await;
            self.notifier
                .send(
                    &connection,
                    &ServerMessage::ChatHistory {
                        entries: room.chat.iter().cloned().map(ChatEntryDto::from).collect(),
                    },
                )
                .await;
            self.notifier
                .send(
                    &connection,
                    &ServerMessage::SettingsChanged {
                        settings: room.settings,
                    },
                )
                .await;
            self.notifier
                .send(
                    &connection,
                    &ServerMessage::StateSnapshot {
                        phase: room.phase,
                        state: room.game.clone(),
                    },
                )
                .await;
            self.notifier
                .publish(
                    &room,
                    &[
                        RoomEvent::MembershipChanged,
                        RoomEvent::Notice {
                            text: format!("{nickname} joined the room."),
                            severity: Severity::Info,
                        },
                    ],
                )
                .await;

            break JoinOutcome {
                room_id: room_id.clone(),
                role,
                created,
            };
        };

        self.notifier.broadcast_lobby().await;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use brickrally_shared::time::FixedClock;
    use tokio::sync::{Mutex, mpsc};

    use super::*;
    use crate::{
        domain::{GameMode, MessagePusher, Slot},
        infrastructure::{
            message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRegistry,
        },
    };

    struct Fixture {
        registry: Arc<InMemoryRoomRegistry>,
        pusher: Arc<WebSocketMessagePusher>,
        usecase: JoinRoomUseCase,
    }

    fn fixture() -> Fixture {
        let registry = Arc::new(InMemoryRoomRegistry::new());
        let pusher = Arc::new(WebSocketMessagePusher::new(Arc::new(Mutex::new(
            HashMap::new(),
        ))));
        let notifier = Arc::new(Notifier::new(pusher.clone(), registry.clone()));
        let usecase = JoinRoomUseCase::new(
            registry.clone(),
            notifier,
            Arc::new(FixedClock::new(1_700_000_000_000)),
        );
        Fixture {
            registry,
            pusher,
            usecase,
        }
    }

    async fn connect(fixture: &Fixture, id: &str) -> (ConnectionId, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let connection = ConnectionId::from(id);
        fixture.pusher.register_client(connection.clone(), tx).await;
        (connection, rx)
    }

    fn drain_types(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<String> {
        let mut types = Vec::new();
        while let Ok(json) = rx.try_recv() {
            let value: serde_json::Value = serde_json::from_str(&json).unwrap();
            types.push(value["type"].as_str().unwrap().to_string());
        }
        types
    }

    #[tokio::test]
    async fn test_first_join_creates_room_with_requested_settings() {
        // given:
        let fixture = fixture();
        let (alice, mut rx) = connect(&fixture, "a").await;

        // when:
        let outcome = fixture
            .usecase
            .execute(
                alice.clone(),
                Some("arena".to_string()),
                "alice".to_string(),
                Some(SettingsPatch {
                    game_mode: Some(GameMode::Cooperative),
                    ..SettingsPatch::default()
                }),
            )
            .await
            .unwrap();

        // then:
        assert!(outcome.created);
        assert_eq!(outcome.role, Role::Player(Slot::Player1));
        let room = fixture.registry.get(&outcome.room_id).await.unwrap();
        let room = room.lock().await;
        assert_eq!(room.settings.game_mode, GameMode::Cooperative);
        assert_eq!(room.created_at, Timestamp::new(1_700_000_000_000));
        assert_eq!(
            fixture.registry.room_of(&alice).await,
            Some(outcome.room_id.clone())
        );
        assert_eq!(
            drain_types(&mut rx),
            vec![
                "role-assigned",
                "chat-history",
                "settings-changed",
                "state-snapshot",
                "membership",
                "notice"
            ]
        );
    }

    #[tokio::test]
    async fn test_third_join_is_spectator_and_settings_are_ignored() {
        // given:
        let fixture = fixture();
        let (alice, _rx_a) = connect(&fixture, "a").await;
        let (bob, _rx_b) = connect(&fixture, "b").await;
        let (carol, _rx_c) = connect(&fixture, "c").await;
        for (connection, name) in [(alice, "alice"), (bob, "bob")] {
            fixture
                .usecase
                .execute(connection, Some("arena".to_string()), name.to_string(), None)
                .await
                .unwrap();
        }

        // when:
        let outcome = fixture
            .usecase
            .execute(
                carol,
                Some("arena".to_string()),
                "carol".to_string(),
                Some(SettingsPatch {
                    brick_rows: Some(1),
                    ..SettingsPatch::default()
                }),
            )
            .await
            .unwrap();

        // then:
        assert!(!outcome.created);
        assert_eq!(outcome.role, Role::Spectator);
        let room = fixture.registry.get(&outcome.room_id).await.unwrap();
        assert_eq!(room.lock().await.settings.brick_rows, 20);
        assert_eq!(fixture.registry.list().await.len(), 1);
    }

    #[tokio::test]
    async fn test_lobby_observer_sees_new_room() {
        // given:
        let fixture = fixture();
        let (alice, _rx_a) = connect(&fixture, "a").await;
        let (_observer, mut rx_o) = connect(&fixture, "o").await;

        // when:
        fixture
            .usecase
            .execute(alice, Some("arena".to_string()), "alice".to_string(), None)
            .await
            .unwrap();

        // then:
        let json = rx_o.try_recv().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["type"], "room-list");
        assert_eq!(value["rooms"][0]["roomId"], "arena");
        assert_eq!(value["rooms"][0]["occupancy"], 1);
    }

    #[tokio::test]
    async fn test_missing_room_id_generates_one() {
        // given:
        let fixture = fixture();
        let (alice, _rx) = connect(&fixture, "a").await;

        // when:
        let outcome = fixture
            .usecase
            .execute(alice, None, "alice".to_string(), None)
            .await
            .unwrap();

        // then:
        assert_eq!(outcome.room_id.as_str().len(), 8);
        assert!(fixture.registry.get(&outcome.room_id).await.is_some());
    }

    #[tokio::test]
    async fn test_rejects_second_room_and_invalid_input() {
        // given:
        let fixture = fixture();
        let (alice, _rx) = connect(&fixture, "a").await;
        fixture
            .usecase
            .execute(alice.clone(), Some("arena".to_string()), "alice".to_string(), None)
            .await
            .unwrap();

        // when:
        let second = fixture
            .usecase
            .execute(alice.clone(), Some("other".to_string()), "alice".to_string(), None)
            .await;
        let (bob, _rx_b) = connect(&fixture, "b").await;
        let blank = fixture
            .usecase
            .execute(bob.clone(), Some("arena".to_string()), "  ".to_string(), None)
            .await;
        let bad_settings = fixture
            .usecase
            .execute(
                bob.clone(),
                Some("fresh".to_string()),
                "bob".to_string(),
                Some(SettingsPatch {
                    ball_speed: Some(-1.0),
                    ..SettingsPatch::default()
                }),
            )
            .await;

        // then:
        assert_eq!(
            second,
            Err(JoinError::AlreadyInRoom("a".to_string(), "arena".to_string()))
        );
        assert!(matches!(blank, Err(JoinError::InvalidNickname(_))));
        assert!(matches!(bad_settings, Err(JoinError::InvalidSettings(_))));
        assert!(bad_settings.unwrap_err().is_malformed());
        assert_eq!(fixture.registry.room_of(&bob).await, None);
        assert_eq!(fixture.registry.list().await.len(), 1);
    }

    #[tokio::test]
    async fn test_settings_are_not_checked_when_joining_existing_room() {
        // given:
        let fixture = fixture();
        let (alice, _rx) = connect(&fixture, "a").await;
        fixture
            .usecase
            .execute(alice, Some("arena".to_string()), "alice".to_string(), None)
            .await
            .unwrap();
        let (bob, _rx_b) = connect(&fixture, "b").await;

        // when:
        let outcome = fixture
            .usecase
            .execute(
                bob.clone(),
                Some("arena".to_string()),
                "bob".to_string(),
                Some(SettingsPatch {
                    brick_rows: Some(0),
                    ..SettingsPatch::default()
                }),
            )
            .await
            .unwrap();

        // then:
        assert_eq!(outcome.role, Role::Player(Slot::Player2));
        assert!(!outcome.created);
        let room = fixture.registry.get(&outcome.room_id).await.unwrap();
        assert_eq!(room.lock().await.settings, Settings::default());
    }
}
