//! Outbound fan-out shared by every use case.
//!
//! Turns domain events into wire messages, serializes each once, and hands
//! them to the [`MessagePusher`]. Push failures are logged, never returned:
//! a client that went away must not fail the operation that notified it.

use std::{collections::HashSet, sync::Arc};

use crate::{
    domain::{
        ConnectionId, GlobalScoreboard, MessagePusher, Room, RoomEvent, RoomRegistry,
    },
    infrastructure::dto::{
        conversion::{match_over_message, power_up_applied_message, power_up_expired_message},
        websocket::{RoomSummaryDto, ServerMessage},
    },
};

pub struct Notifier {
    pusher: Arc<dyn MessagePusher>,
    registry: Arc<dyn RoomRegistry>,
}

impl Notifier {
    pub fn new(pusher: Arc<dyn MessagePusher>, registry: Arc<dyn RoomRegistry>) -> Self {
        Self { pusher, registry }
    }

    fn encode(message: &ServerMessage) -> Option<String> {
        match serde_json::to_string(message) {
            Ok(json) => Some(json),
            Err(e) => {
                tracing::error!("Failed to serialize outbound message: {}", e);
                None
            }
        }
    }

    pub async fn send(&self, connection: &ConnectionId, message: &ServerMessage) {
        let Some(json) = Self::encode(message) else {
            return;
        };
        if let Err(e) = self.pusher.push_to(connection, &json).await {
            tracing::warn!("Failed to push to '{}': {}", connection, e);
        }
    }

    pub async fn broadcast(&self, targets: Vec<ConnectionId>, message: &ServerMessage) {
        if targets.is_empty() {
            return;
        }
        let Some(json) = Self::encode(message) else {
            return;
        };
        if let Err(e) = self.pusher.broadcast(targets, &json).await {
            tracing::warn!("Broadcast failed: {}", e);
        }
    }

    /// Translate room events into messages for every member of `room`.
    ///
    /// Called with the room still locked so members see events in the order
    /// they happened.
    pub async fn publish(&self, room: &Room, events: &[RoomEvent]) {
        let members = room.member_connections();
        for event in events {
            let message = match event {
                RoomEvent::MembershipChanged => room.membership().into(),
                RoomEvent::StateSnapshot => ServerMessage::StateSnapshot {
                    phase: room.phase,
                    state: room.game.clone(),
                },
                RoomEvent::PhaseChanged(phase) => ServerMessage::PhaseChanged { phase: *phase },
                RoomEvent::MatchOver(result) => match_over_message(result, room.scoreboard),
                RoomEvent::SettingsChanged => ServerMessage::SettingsChanged {
                    settings: room.settings,
                },
                RoomEvent::Feedback(cue) => ServerMessage::Feedback { cue: *cue },
                RoomEvent::PowerUpSpawned(power_up) => ServerMessage::PowerUpSpawned {
                    power_up: *power_up,
                },
                RoomEvent::PowerUpApplied(effect) => power_up_applied_message(*effect),
                RoomEvent::PowerUpExpired(effect) => power_up_expired_message(*effect),
                RoomEvent::Notice { text, severity } => ServerMessage::Notice {
                    text: text.clone(),
                    severity: *severity,
                },
            };
            self.broadcast(members.clone(), &message).await;
        }
    }

    /// Send the lobby listing to every connection that is not in a room.
    pub async fn broadcast_lobby(&self) {
        let bound: HashSet<ConnectionId> =
            self.registry.bound_connections().await.into_iter().collect();
        let observers: Vec<ConnectionId> = self
            .pusher
            .connected_clients()
            .await
            .into_iter()
            .filter(|connection| !bound.contains(connection))
            .collect();
        if observers.is_empty() {
            return;
        }

        let message = self.room_list().await;
        self.broadcast(observers, &message).await;
    }

    pub async fn room_list(&self) -> ServerMessage {
        let rooms = self
            .registry
            .list()
            .await
            .into_iter()
            .map(RoomSummaryDto::from)
            .collect();
        ServerMessage::RoomList { rooms }
    }

    /// Send the scoreboard to every connection.
    pub async fn broadcast_global_scoreboard(&self, scoreboard: GlobalScoreboard) {
        let everyone = self.pusher.connected_clients().await;
        self.broadcast(everyone, &ServerMessage::GlobalScoreboardUpdate { scoreboard })
            .await;
    }
}
