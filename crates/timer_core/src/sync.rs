use std::sync::Arc;

use shared::{
    error::ChannelError,
    protocol::{SyncEnvelope, SyncPayload},
};
use tokio::{sync::broadcast::error::RecvError, task::JoinHandle};
use tracing::{info, warn};

use crate::{
    channel::PubSubChannel,
    store::{StateChange, StoreEvent, TimerStore},
};

pub const DEFAULT_SYNC_TOPIC: &str = "timebox/state";

/// Keeps two surface-local stores consistent over the platform channel.
///
/// Outbound: locally originated changes are serialized and published
/// fire-and-forget. Inbound: envelopes from the peer are applied as
/// last-writer-wins wholesale replacements; envelopes carrying our own
/// origin are echoes and dropped. Re-delivery of the same envelope is
/// idempotent, but causal ordering across different payload kinds is not
/// guaranteed by the transport.
pub struct SyncBridge {
    store: Arc<TimerStore>,
    channel: Arc<dyn PubSubChannel>,
    topic: String,
}

/// Abortable handles for the bridge's two tasks; dropped with the surface.
#[derive(Debug)]
pub struct SyncBridgeHandle {
    outbound: JoinHandle<()>,
    inbound: JoinHandle<()>,
}

impl SyncBridgeHandle {
    pub fn shutdown(&self) {
        self.outbound.abort();
        self.inbound.abort();
    }
}

impl Drop for SyncBridgeHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl SyncBridge {
    pub fn new(
        store: Arc<TimerStore>,
        channel: Arc<dyn PubSubChannel>,
        topic: impl Into<String>,
    ) -> Arc<Self> {
        Arc::new(Self {
            store,
            channel,
            topic: topic.into(),
        })
    }

    /// Subscribes to the channel and starts the outbound and inbound tasks.
    /// A subscription failure leaves the store untouched; the caller runs
    /// local-only.
    pub async fn run(self: &Arc<Self>) -> Result<SyncBridgeHandle, ChannelError> {
        let mut channel_rx = self.channel.subscribe(&self.topic).await?;
        let local = self.store.local_session();
        info!(topic = %self.topic, session = %local, "sync bridge attached");

        let bridge = Arc::clone(self);
        let outbound_session = local.clone();
        // Subscribe before spawning so mutations issued right after attach
        // are not missed.
        let mut events = self.store.subscribe_events();
        let outbound = tokio::spawn(async move {
            loop {
                let event = match events.recv().await {
                    Ok(event) => event,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "sync outbound lagged behind store events");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };
                let StoreEvent::StateChanged { origin, change } = event else {
                    continue;
                };
                if origin != outbound_session {
                    // Remote application re-emitted for observers; not ours
                    // to republish.
                    continue;
                }
                let Some(payload) = wire_payload(change) else {
                    continue;
                };
                let envelope = SyncEnvelope::new(origin, payload);
                let bytes = match serde_json::to_vec(&envelope) {
                    Ok(bytes) => bytes,
                    Err(err) => {
                        warn!("failed to encode sync envelope: {err}");
                        continue;
                    }
                };
                if let Err(err) = bridge.channel.publish(&bridge.topic, bytes).await {
                    warn!(topic = %bridge.topic, "sync publish failed: {err}");
                }
            }
        });

        let bridge = Arc::clone(self);
        let inbound = tokio::spawn(async move {
            loop {
                let bytes = match channel_rx.recv().await {
                    Ok(bytes) => bytes,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "sync inbound lagged; peer state may be stale");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };
                let envelope: SyncEnvelope = match serde_json::from_slice(&bytes) {
                    Ok(envelope) => envelope,
                    Err(err) => {
                        warn!("{}", ChannelError::Decode(err.to_string()));
                        continue;
                    }
                };
                if envelope.origin == local {
                    continue;
                }
                bridge.store.apply_sync(envelope).await;
            }
        });

        Ok(SyncBridgeHandle { outbound, inbound })
    }
}

/// Wire form of a local change. `Ticked` has none: each surface runs its own
/// scheduler, and re-broadcasting decrements would double-count on the peer.
fn wire_payload(change: StateChange) -> Option<SyncPayload> {
    match change {
        StateChange::TimerReplaced { timer } => Some(SyncPayload::TimerReplaced { timer }),
        StateChange::ParticipantAdded { timer } => Some(SyncPayload::ParticipantAdded { timer }),
        StateChange::ParticipantRemoved { id } => Some(SyncPayload::ParticipantRemoved { id }),
        StateChange::AllPaused => Some(SyncPayload::PauseAll),
        StateChange::AllReset => Some(SyncPayload::ResetAll),
        StateChange::DefaultChanged { seconds } => Some(SyncPayload::DefaultChanged { seconds }),
        StateChange::Ticked { .. } => None,
    }
}

#[cfg(test)]
#[path = "tests/sync_tests.rs"]
mod tests;
