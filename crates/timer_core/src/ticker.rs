use std::{sync::Arc, time::Duration};

use tokio::{task::JoinHandle, time::MissedTickBehavior};

use crate::store::TimerStore;

/// Drives `TimerStore::tick` once per second for the lifetime of the
/// surface.
///
/// Cadence is cumulative second-counting, not wall-clock anchored: a missed
/// firing delays the next one rather than catching up, so long sessions may
/// drift from wall-clock time. Acceptable at this granularity.
pub struct TickScheduler {
    task: JoinHandle<()>,
}

impl TickScheduler {
    pub fn spawn(store: Arc<TimerStore>) -> Self {
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first interval firing completes immediately; skip it so
            // the first decrement lands a full second after spawn.
            interval.tick().await;
            loop {
                interval.tick().await;
                store.tick().await;
            }
        });
        Self { task }
    }

    pub fn shutdown(&self) {
        self.task.abort();
    }
}

impl Drop for TickScheduler {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::SessionConfig;

    #[tokio::test(start_paused = true)]
    async fn decrements_running_timers_once_per_second() {
        let store = TimerStore::new(SessionConfig { default_seconds: 5 });
        let ana = store.add("Ana").await;
        store.start(&ana.id).await.expect("start");

        let scheduler = TickScheduler::spawn(Arc::clone(&store));
        tokio::time::sleep(Duration::from_millis(3200)).await;

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot[0].remaining_seconds, 2);
        scheduler.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn leaves_paused_timers_untouched() {
        let store = TimerStore::new(SessionConfig { default_seconds: 5 });
        store.add("Carlos").await;

        let _scheduler = TickScheduler::spawn(Arc::clone(&store));
        tokio::time::sleep(Duration::from_millis(2500)).await;

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot[0].remaining_seconds, 5);
    }
}
