//! UseCase: query the global scoreboard.

use std::sync::Arc;

use crate::{
    domain::{ConnectionId, GlobalScoreboard, ScoreboardStore},
    infrastructure::dto::websocket::ServerMessage,
};

use super::notifier::Notifier;

pub struct GlobalScoreboardUseCase {
    store: Arc<dyn ScoreboardStore>,
    notifier: Arc<Notifier>,
}

impl GlobalScoreboardUseCase {
    pub fn new(store: Arc<dyn ScoreboardStore>, notifier: Arc<Notifier>) -> Self {
        Self { store, notifier }
    }

    pub async fn snapshot(&self) -> GlobalScoreboard {
        self.store.snapshot().await
    }

    /// Answer a `request-global-scoreboard` intent.
    pub async fn send_to(&self, connection: &ConnectionId) {
        let scoreboard = self.store.snapshot().await;
        self.notifier
            .send(connection, &ServerMessage::GlobalScoreboardUpdate { scoreboard })
            .await;
    }
}
