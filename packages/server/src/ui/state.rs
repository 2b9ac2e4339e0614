//! Shared application state.

use std::sync::Arc;

use brickrally_shared::time::{Clock, SystemClock};

use crate::{
    config::ServerConfig,
    domain::{MessagePusher, RoomRegistry, ScoreboardStore},
    infrastructure::{
        message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRegistry,
        scoreboard::JsonFileScoreboardStore,
    },
    usecase::{
        GlobalScoreboardUseCase, JoinRoomUseCase, LeaveRoomUseCase, LobbyUseCase, Notifier,
        RoomIntentUseCase, SendChatUseCase, TickRoomsUseCase,
    },
};

pub struct AppState {
    /// Registers and unregisters each connection's outbound queue
    pub message_pusher: Arc<dyn MessagePusher>,
    pub notifier: Arc<Notifier>,
    pub join_room: JoinRoomUseCase,
    pub leave_room: LeaveRoomUseCase,
    pub room_intent: RoomIntentUseCase,
    pub send_chat: SendChatUseCase,
    pub lobby: LobbyUseCase,
    pub global_scoreboard: GlobalScoreboardUseCase,
    pub tick_rooms: Arc<TickRoomsUseCase>,
}

impl AppState {
    /// Wire dependencies in order: stores, pusher, notifier, use cases.
    pub async fn build(config: &ServerConfig) -> Self {
        let registry: Arc<dyn RoomRegistry> = Arc::new(InMemoryRoomRegistry::new());
        let store: Arc<dyn ScoreboardStore> =
            Arc::new(JsonFileScoreboardStore::load(&config.scoreboard_file).await);
        let message_pusher: Arc<dyn MessagePusher> = Arc::new(WebSocketMessagePusher::default());
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let notifier = Arc::new(Notifier::new(message_pusher.clone(), registry.clone()));

        Self {
            join_room: JoinRoomUseCase::new(registry.clone(), notifier.clone(), clock.clone()),
            leave_room: LeaveRoomUseCase::new(registry.clone(), notifier.clone()),
            room_intent: RoomIntentUseCase::new(registry.clone(), notifier.clone()),
            send_chat: SendChatUseCase::new(registry.clone(), notifier.clone(), clock),
            lobby: LobbyUseCase::new(registry.clone(), notifier.clone()),
            global_scoreboard: GlobalScoreboardUseCase::new(store.clone(), notifier.clone()),
            tick_rooms: Arc::new(TickRoomsUseCase::new(registry, store, notifier.clone())),
            message_pusher,
            notifier,
        }
    }
}
