//! UseCase: advance every active room by one simulation step.

use std::sync::Arc;

use rand::{SeedableRng, rngs::StdRng};
use tokio::sync::Mutex;

use crate::domain::{Phase, RoomEvent, RoomRegistry, ScoreboardStore};

use super::notifier::Notifier;

pub struct TickRoomsUseCase {
    registry: Arc<dyn RoomRegistry>,
    store: Arc<dyn ScoreboardStore>,
    notifier: Arc<Notifier>,
    rng: Mutex<StdRng>,
}

impl TickRoomsUseCase {
    pub fn new(
        registry: Arc<dyn RoomRegistry>,
        store: Arc<dyn ScoreboardStore>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self::with_rng(registry, store, notifier, StdRng::from_entropy())
    }

    /// Deterministic power-up spawning
    pub fn with_seed(
        registry: Arc<dyn RoomRegistry>,
        store: Arc<dyn ScoreboardStore>,
        notifier: Arc<Notifier>,
        seed: u64,
    ) -> Self {
        Self::with_rng(registry, store, notifier, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        registry: Arc<dyn RoomRegistry>,
        store: Arc<dyn ScoreboardStore>,
        notifier: Arc<Notifier>,
        rng: StdRng,
    ) -> Self {
        Self {
            registry,
            store,
            notifier,
            rng: Mutex::new(rng),
        }
    }

    /// Run one tick of `dt_ms` for every running or paused room.
    ///
    /// Each room is stepped and published under its own lock. A finished
    /// match credits the global scoreboard before anything is broadcast.
    /// Returns the number of rooms that were ticked.
    pub async fn execute(&self, dt_ms: u64) -> usize {
        let mut ticked = 0;
        let mut scoreboard_update = None;

        for shared in self.registry.all_rooms().await {
            let mut room = shared.lock().await;
            if !matches!(room.phase, Phase::Running | Phase::Paused) {
                continue;
            }

            let events = {
                let mut rng = self.rng.lock().await;
                room.tick(dt_ms, &mut *rng)
            };
            ticked += 1;

            for event in &events {
                if let RoomEvent::MatchOver(result) = event {
                    if let Some(winner) = result.global_winner() {
                        scoreboard_update = Some(self.store.increment(winner).await);
                    }
                }
            }
            self.notifier.publish(&room, &events).await;
        }

        if let Some(scoreboard) = scoreboard_update {
            self.notifier.broadcast_global_scoreboard(scoreboard).await;
        }
        ticked
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use mockall::predicate::eq;
    use tokio::sync::mpsc;

    use super::*;
    use crate::{
        domain::{
            ConnectionId, GameMode, GlobalScoreboard, MessagePusher, MockScoreboardStore,
            Nickname, RoomId, Score, Settings, SharedRoom, Slot, Timestamp,
        },
        infrastructure::{
            message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRegistry,
        },
    };

    struct Fixture {
        registry: Arc<InMemoryRoomRegistry>,
        pusher: Arc<WebSocketMessagePusher>,
    }

    fn fixture() -> Fixture {
        Fixture {
            registry: Arc::new(InMemoryRoomRegistry::new()),
            pusher: Arc::new(WebSocketMessagePusher::new(Arc::new(Mutex::new(
                HashMap::new(),
            )))),
        }
    }

    impl Fixture {
        fn usecase(&self, store: MockScoreboardStore) -> TickRoomsUseCase {
            let notifier = Arc::new(Notifier::new(self.pusher.clone(), self.registry.clone()));
            TickRoomsUseCase::with_seed(self.registry.clone(), Arc::new(store), notifier, 7)
        }

        /// A room named `id` with alice and bob seated, optionally started
        async fn room(
            &self,
            id: &str,
            settings: Settings,
            start: bool,
        ) -> (SharedRoom, mpsc::UnboundedReceiver<String>) {
            let room_id = RoomId::new(id.to_string()).unwrap();
            let (room, _) = self
                .registry
                .create_or_get(&room_id, settings, Timestamp::new(0))
                .await;
            let (tx, rx) = mpsc::unbounded_channel();
            let alice = ConnectionId::from(format!("{id}-a").as_str());
            let bob = ConnectionId::from(format!("{id}-b").as_str());
            self.pusher.register_client(alice.clone(), tx).await;
            let mut guard = room.lock().await;
            guard
                .join(alice.clone(), Nickname::new("alice".to_string()).unwrap())
                .unwrap();
            guard
                .join(bob.clone(), Nickname::new("bob".to_string()).unwrap())
                .unwrap();
            if start {
                guard.set_ready(&alice, Slot::Player1).unwrap();
                guard.set_ready(&bob, Slot::Player2).unwrap();
            }
            drop(guard);
            (room, rx)
        }
    }

    /// Break every brick but the first and aim the ball into it.
    async fn arrange_last_brick(room: &SharedRoom, vx: f32) {
        let mut room = room.lock().await;
        for brick in room.game.bricks.iter_mut().skip(1) {
            brick.intact = false;
        }
        let (cx, _) = room.game.bricks[0].center();
        let y = room.game.bricks[0].y;
        room.game.ball.x = cx;
        room.game.ball.y = y + 35.0;
        room.game.ball.vx = vx;
        room.game.ball.vy = -8.0;
    }

    fn messages_of_type(rx: &mut mpsc::UnboundedReceiver<String>, kind: &str) -> Vec<serde_json::Value> {
        let mut found = Vec::new();
        while let Ok(json) = rx.try_recv() {
            let value: serde_json::Value = serde_json::from_str(&json).unwrap();
            if value["type"] == kind {
                found.push(value);
            }
        }
        found
    }

    #[tokio::test]
    async fn test_only_running_and_paused_rooms_tick() {
        // given:
        let fixture = fixture();
        let (running, mut rx_running) = fixture.room("running", Settings::default(), true).await;
        let (paused, mut rx_paused) = fixture.room("paused", Settings::default(), true).await;
        let (_waiting, mut rx_waiting) = fixture.room("waiting", Settings::default(), false).await;
        paused.lock().await.phase = Phase::Paused;
        let before = running.lock().await.game.ball;
        let usecase = fixture.usecase(MockScoreboardStore::new());

        // when:
        let ticked = usecase.execute(30).await;

        // then:
        assert_eq!(ticked, 2);
        assert_ne!(running.lock().await.game.ball, before);
        assert_eq!(messages_of_type(&mut rx_running, "state-snapshot").len(), 1);
        let paused_signal = messages_of_type(&mut rx_paused, "phase-changed");
        assert_eq!(paused_signal[0]["phase"], "paused");
        assert!(rx_waiting.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_decisive_match_credits_global_scoreboard_once() {
        // given: alice (left) leads and the ball breaks the last brick heading left
        let fixture = fixture();
        let (room, mut rx) = fixture.room("arena", Settings::default(), true).await;
        room.lock().await.game.score = Score::Classic { left: 4, right: 2 };
        arrange_last_brick(&room, -5.0).await;

        let mut store = MockScoreboardStore::new();
        store
            .expect_increment()
            .with(eq(Nickname::new("alice".to_string()).unwrap()))
            .times(1)
            .returning(|nickname| {
                let mut board = GlobalScoreboard::default();
                board.increment(nickname);
                board
            });
        let usecase = fixture.usecase(store);

        // when:
        usecase.execute(30).await;
        usecase.execute(30).await;
        usecase.execute(30).await;

        // then:
        let mut all = Vec::new();
        while let Ok(json) = rx.try_recv() {
            all.push(serde_json::from_str::<serde_json::Value>(&json).unwrap());
        }
        let match_over: Vec<_> = all.iter().filter(|m| m["type"] == "match-over").collect();
        assert_eq!(match_over.len(), 1);
        assert_eq!(match_over[0]["winner"], "alice");
        assert_eq!(match_over[0]["roomScoreboard"]["player1Wins"], 1);
        let update = all
            .iter()
            .find(|m| m["type"] == "global-scoreboard-update")
            .unwrap();
        assert_eq!(update["scoreboard"]["alice"], 1);
        assert_eq!(room.lock().await.phase, Phase::Finished);
    }

    #[tokio::test]
    async fn test_draw_and_cooperative_never_touch_global_scoreboard() {
        // given:
        let fixture = fixture();
        let (draw, mut rx_draw) = fixture.room("draw", Settings::default(), true).await;
        draw.lock().await.game.score = Score::Classic { left: 3, right: 2 };
        arrange_last_brick(&draw, 5.0).await;
        let coop_settings = Settings {
            game_mode: GameMode::Cooperative,
            ..Settings::default()
        };
        let (coop, mut rx_coop) = fixture.room("coop", coop_settings, true).await;
        arrange_last_brick(&coop, 5.0).await;

        let mut store = MockScoreboardStore::new();
        store.expect_increment().never();
        let usecase = fixture.usecase(store);

        // when:
        usecase.execute(30).await;

        // then:
        let draw_over = messages_of_type(&mut rx_draw, "match-over");
        assert_eq!(draw_over[0]["outcome"], "draw");
        let coop_over = messages_of_type(&mut rx_coop, "match-over");
        assert_eq!(coop_over[0]["outcome"], "cooperative");
        assert_eq!(coop_over[0]["score"], 1);
        assert_eq!(draw.lock().await.scoreboard.player1_wins, 0);
    }
}
