use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{ParticipantId, ParticipantTimer, SessionId};

/// State mutation carried between surfaces.
///
/// Record-bearing variants are applied as last-writer-wins wholesale
/// replacements, so re-delivery of the same payload is idempotent. Causal
/// ordering across different payload kinds is not guaranteed by the
/// transport (at-least-once, unordered).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum SyncPayload {
    TimerReplaced { timer: ParticipantTimer },
    ParticipantAdded { timer: ParticipantTimer },
    ParticipantRemoved { id: ParticipantId },
    PauseAll,
    ResetAll,
    DefaultChanged { seconds: i64 },
}

/// Envelope published on the sync topic. `origin` identifies the publishing
/// surface and is compared against local identity to drop echoes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncEnvelope {
    pub origin: SessionId,
    pub sent_at: DateTime<Utc>,
    pub payload: SyncPayload,
}

impl SyncEnvelope {
    pub fn new(origin: SessionId, payload: SyncPayload) -> Self {
        Self {
            origin,
            sent_at: Utc::now(),
            payload,
        }
    }
}
