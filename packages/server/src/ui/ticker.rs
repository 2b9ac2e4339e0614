//! Fixed-cadence simulation scheduler.

use std::{sync::Arc, time::Duration};

use tokio::{task::JoinHandle, time::MissedTickBehavior};

use crate::usecase::TickRoomsUseCase;

/// Tick every active room each `period`, advancing `dt_ms` of simulated
/// time per tick. Late ticks are skipped rather than replayed in a burst.
pub fn spawn_ticker(usecase: Arc<TickRoomsUseCase>, period: Duration, dt_ms: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            usecase.execute(dt_ms).await;
        }
    })
}
