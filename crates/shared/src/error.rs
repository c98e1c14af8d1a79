use thiserror::Error;

use crate::domain::ParticipantId;

/// Store operation referenced an unknown participant. Callers recover by
/// treating it as a no-op; it is never surfaced to the end user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("unknown participant id {0}")]
    NotFound(ParticipantId),
}

/// Pub/sub transport failures. None of these stop local timers; the surface
/// degrades to local-only mode.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("sync channel unavailable: {0}")]
    Unavailable(String),
    #[error("malformed sync payload: {0}")]
    Decode(String),
}

/// Initial session/config retrieval failed; the surface falls back to the
/// built-in placeholder roster.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("session bootstrap unavailable: {0}")]
    Unavailable(String),
}
