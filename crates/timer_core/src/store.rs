use std::sync::Arc;

use shared::{
    domain::{ParticipantId, ParticipantTimer, SessionConfig, SessionId},
    error::StoreError,
    protocol::{SyncEnvelope, SyncPayload},
};
use tokio::sync::{broadcast, Mutex};
use tracing::warn;

const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// What a mutation touched: the affected record(s) or the batch operation.
#[derive(Debug, Clone)]
pub enum StateChange {
    TimerReplaced { timer: ParticipantTimer },
    ParticipantAdded { timer: ParticipantTimer },
    ParticipantRemoved { id: ParticipantId },
    AllPaused,
    AllReset,
    DefaultChanged { seconds: i64 },
    /// One scheduler firing; carries the post-decrement running records.
    /// Never put on the wire: each surface runs its own scheduler.
    Ticked { timers: Vec<ParticipantTimer> },
}

#[derive(Debug, Clone)]
pub enum StoreEvent {
    /// Emitted after every committed mutation. `origin` is the surface that
    /// issued the mutation; remote applications carry the remote identity.
    StateChanged {
        origin: SessionId,
        change: StateChange,
    },
    /// A countdown first crossed zero while running. Fired once per record
    /// until the next reset, distinct from the change notification.
    OvertimeReached { id: ParticipantId },
}

/// Canonical owner of the participant timer list for one surface.
///
/// All mutation is serialized through the inner mutex, so the periodic
/// ticker and the inbound sync handler never interleave mid-operation.
/// Events are emitted while the lock is held, which keeps notification
/// order identical to commit order.
pub struct TimerStore {
    local_session: SessionId,
    inner: Mutex<StoreState>,
    events: broadcast::Sender<StoreEvent>,
}

struct StoreState {
    config: SessionConfig,
    timers: Vec<ParticipantTimer>,
}

impl TimerStore {
    pub fn new(config: SessionConfig) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            local_session: SessionId::fresh(),
            inner: Mutex::new(StoreState {
                config,
                timers: Vec::new(),
            }),
            events,
        })
    }

    /// Identity of this surface instance; the origin tag on everything it
    /// publishes.
    pub fn local_session(&self) -> SessionId {
        self.local_session.clone()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub async fn config(&self) -> SessionConfig {
        self.inner.lock().await.config
    }

    pub async fn snapshot(&self) -> Vec<ParticipantTimer> {
        self.inner.lock().await.timers.clone()
    }

    /// Installs pre-populated records at startup, before any observer is
    /// attached. No notification fires.
    pub async fn seed(&self, timers: Vec<ParticipantTimer>) {
        self.inner.lock().await.timers.extend(timers);
    }

    /// Creates a record with the session default. Duplicate names are
    /// permitted; ids are always fresh.
    pub async fn add(&self, name: impl Into<String>) -> ParticipantTimer {
        let mut guard = self.inner.lock().await;
        let timer = ParticipantTimer::new(
            ParticipantId::fresh(),
            name,
            guard.config.default_seconds,
        );
        guard.timers.push(timer.clone());
        self.emit_local(StateChange::ParticipantAdded {
            timer: timer.clone(),
        });
        timer
    }

    pub async fn start(&self, id: &ParticipantId) -> Result<(), StoreError> {
        let mut guard = self.inner.lock().await;
        let timer = find_mut(&mut guard.timers, id)?;
        if timer.running {
            return Ok(());
        }
        timer.running = true;
        let timer = timer.clone();
        self.emit_local(StateChange::TimerReplaced { timer });
        Ok(())
    }

    pub async fn pause(&self, id: &ParticipantId) -> Result<(), StoreError> {
        let mut guard = self.inner.lock().await;
        let timer = find_mut(&mut guard.timers, id)?;
        if !timer.running {
            return Ok(());
        }
        timer.running = false;
        let timer = timer.clone();
        self.emit_local(StateChange::TimerReplaced { timer });
        Ok(())
    }

    pub async fn reset(&self, id: &ParticipantId) -> Result<(), StoreError> {
        let mut guard = self.inner.lock().await;
        let default_seconds = guard.config.default_seconds;
        let timer = find_mut(&mut guard.timers, id)?;
        reset_record(timer, default_seconds);
        let timer = timer.clone();
        self.emit_local(StateChange::TimerReplaced { timer });
        Ok(())
    }

    /// Participant-leave. Reported by the hosting platform, not by timers.
    pub async fn remove(&self, id: &ParticipantId) -> Result<(), StoreError> {
        let mut guard = self.inner.lock().await;
        let before = guard.timers.len();
        guard.timers.retain(|timer| timer.id != *id);
        if guard.timers.len() == before {
            return Err(StoreError::NotFound(id.clone()));
        }
        self.emit_local(StateChange::ParticipantRemoved { id: id.clone() });
        Ok(())
    }

    /// Pauses every record. Observers see a single notification.
    pub async fn pause_all(&self) {
        let mut guard = self.inner.lock().await;
        for timer in &mut guard.timers {
            timer.running = false;
        }
        self.emit_local(StateChange::AllPaused);
    }

    /// Resets every record. Observers see a single notification.
    pub async fn reset_all(&self) {
        let mut guard = self.inner.lock().await;
        let default_seconds = guard.config.default_seconds;
        for timer in &mut guard.timers {
            reset_record(timer, default_seconds);
        }
        self.emit_local(StateChange::AllReset);
    }

    /// Changes the session default and moves idle records still sitting at
    /// the previous default onto the new one. Running and overtime records
    /// are left alone. Observers see a single notification, and the change
    /// travels to the peer surface so later resets agree on the default.
    pub async fn set_default_seconds(&self, seconds: i64) {
        if seconds <= 0 {
            warn!(seconds, "ignoring non-positive default");
            return;
        }
        let mut guard = self.inner.lock().await;
        apply_default_seconds(&mut guard, seconds);
        self.emit_local(StateChange::DefaultChanged { seconds });
    }

    /// One second elapsed: decrement every running record and latch
    /// overtime on the first crossing to zero or below. No-op when nothing
    /// is running.
    pub async fn tick(&self) {
        let mut guard = self.inner.lock().await;
        let mut ticked = Vec::new();
        let mut reached_overtime = Vec::new();
        for timer in &mut guard.timers {
            if !timer.running {
                continue;
            }
            let previous = timer.remaining_seconds;
            timer.remaining_seconds -= 1;
            if previous > 0 && timer.remaining_seconds <= 0 && !timer.overtime {
                timer.overtime = true;
                reached_overtime.push(timer.id.clone());
            }
            ticked.push(timer.clone());
        }
        if ticked.is_empty() {
            return;
        }
        self.emit_local(StateChange::Ticked { timers: ticked });
        for id in reached_overtime {
            let _ = self.events.send(StoreEvent::OvertimeReached { id });
        }
    }

    /// Applies an inbound mutation from the peer surface. Record-bearing
    /// payloads replace the local record wholesale (last writer wins,
    /// upserting when absent), so re-delivery is idempotent. The resulting
    /// notification carries the remote origin, which is what keeps the
    /// bridge from republishing it.
    pub async fn apply_sync(&self, envelope: SyncEnvelope) {
        let origin = envelope.origin;
        let mut guard = self.inner.lock().await;
        let change = match envelope.payload {
            SyncPayload::TimerReplaced { timer } => {
                upsert(&mut guard.timers, timer.clone());
                StateChange::TimerReplaced { timer }
            }
            SyncPayload::ParticipantAdded { timer } => {
                upsert(&mut guard.timers, timer.clone());
                StateChange::ParticipantAdded { timer }
            }
            SyncPayload::ParticipantRemoved { id } => {
                guard.timers.retain(|timer| timer.id != id);
                StateChange::ParticipantRemoved { id }
            }
            SyncPayload::PauseAll => {
                for timer in &mut guard.timers {
                    timer.running = false;
                }
                StateChange::AllPaused
            }
            SyncPayload::ResetAll => {
                let default_seconds = guard.config.default_seconds;
                for timer in &mut guard.timers {
                    reset_record(timer, default_seconds);
                }
                StateChange::AllReset
            }
            SyncPayload::DefaultChanged { seconds } => {
                if seconds <= 0 {
                    warn!(seconds, "ignoring non-positive default from peer");
                    return;
                }
                apply_default_seconds(&mut guard, seconds);
                StateChange::DefaultChanged { seconds }
            }
        };
        let _ = self.events.send(StoreEvent::StateChanged { origin, change });
    }

    fn emit_local(&self, change: StateChange) {
        let _ = self.events.send(StoreEvent::StateChanged {
            origin: self.local_session.clone(),
            change,
        });
    }
}

fn find_mut<'a>(
    timers: &'a mut [ParticipantTimer],
    id: &ParticipantId,
) -> Result<&'a mut ParticipantTimer, StoreError> {
    timers
        .iter_mut()
        .find(|timer| timer.id == *id)
        .ok_or_else(|| StoreError::NotFound(id.clone()))
}

fn apply_default_seconds(state: &mut StoreState, seconds: i64) {
    let previous = state.config.default_seconds;
    state.config.default_seconds = seconds;
    for timer in &mut state.timers {
        if !timer.running && !timer.overtime && timer.remaining_seconds == previous {
            timer.remaining_seconds = seconds;
        }
    }
}

fn reset_record(timer: &mut ParticipantTimer, default_seconds: i64) {
    timer.remaining_seconds = default_seconds;
    timer.running = false;
    timer.overtime = false;
}

fn upsert(timers: &mut Vec<ParticipantTimer>, incoming: ParticipantTimer) {
    match timers.iter_mut().find(|timer| timer.id == incoming.id) {
        Some(existing) => *existing = incoming,
        None => timers.push(incoming),
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
