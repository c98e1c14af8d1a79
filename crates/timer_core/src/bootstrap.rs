use std::sync::Arc;

use async_trait::async_trait;
use shared::{
    domain::{ParticipantId, ParticipantTimer, SessionConfig},
    error::BootstrapError,
};
use tracing::{info, warn};

use crate::store::TimerStore;

/// Initial state handed over by the hosting platform when the surface
/// starts: the side panel's activity-starting handoff, or whatever the main
/// stage received from it.
#[derive(Debug, Clone)]
pub struct StartingState {
    pub config: SessionConfig,
    pub participants: Vec<ParticipantTimer>,
}

#[async_trait]
pub trait SessionBootstrap: Send + Sync {
    async fn starting_state(&self) -> Result<StartingState, BootstrapError>;
}

/// Stands in until the platform handoff is wired up.
pub struct MissingSessionBootstrap;

#[async_trait]
impl SessionBootstrap for MissingSessionBootstrap {
    async fn starting_state(&self) -> Result<StartingState, BootstrapError> {
        Err(BootstrapError::Unavailable(
            "platform session handoff is not wired".to_string(),
        ))
    }
}

const PLACEHOLDER_NAMES: [&str; 3] = ["Ana García", "Carlos López", "María Rodríguez"];

/// Built-in roster shown before any real participant data arrives. Ids are
/// stable so two surfaces that both fall back converge under wholesale
/// replacement instead of duplicating records.
pub fn placeholder_starting_state(config: SessionConfig) -> StartingState {
    let participants = PLACEHOLDER_NAMES
        .iter()
        .enumerate()
        .map(|(index, name)| {
            ParticipantTimer::new(
                ParticipantId(format!("seed-{}", index + 1)),
                *name,
                config.default_seconds,
            )
        })
        .collect();
    StartingState {
        config,
        participants,
    }
}

/// Builds the surface's store from the platform handoff, degrading to the
/// placeholder roster when bootstrap fails. Never fatal.
pub async fn bootstrap_store(
    bootstrap: &dyn SessionBootstrap,
    fallback: SessionConfig,
) -> Arc<TimerStore> {
    let starting = match bootstrap.starting_state().await {
        Ok(state) => {
            info!(
                participants = state.participants.len(),
                default_seconds = state.config.default_seconds,
                "bootstrapped from platform handoff"
            );
            state
        }
        Err(err) => {
            warn!("session bootstrap failed; using placeholder roster: {err}");
            placeholder_starting_state(fallback)
        }
    };
    let store = TimerStore::new(starting.config);
    store.seed(starting.participants).await;
    store
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedBootstrap(StartingState);

    #[async_trait]
    impl SessionBootstrap for FixedBootstrap {
        async fn starting_state(&self) -> Result<StartingState, BootstrapError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn failed_bootstrap_falls_back_to_three_placeholders() {
        let store = bootstrap_store(&MissingSessionBootstrap, SessionConfig::default()).await;
        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot[0].name, "Ana García");
        assert_eq!(snapshot[0].id, ParticipantId::from("seed-1"));
        assert!(snapshot
            .iter()
            .all(|timer| timer.remaining_seconds == 180 && !timer.running && !timer.overtime));
    }

    #[tokio::test]
    async fn successful_bootstrap_uses_handoff_state() {
        let config = SessionConfig {
            default_seconds: 60,
        };
        let handoff = StartingState {
            config,
            participants: vec![ParticipantTimer::new(
                ParticipantId::from("user1"),
                "Ana García",
                60,
            )],
        };
        let store = bootstrap_store(&FixedBootstrap(handoff), SessionConfig::default()).await;
        assert_eq!(store.config().await.default_seconds, 60);
        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, ParticipantId::from("user1"));
    }

    #[tokio::test]
    async fn placeholder_rosters_agree_across_surfaces() {
        let first = placeholder_starting_state(SessionConfig::default());
        let second = placeholder_starting_state(SessionConfig::default());
        assert_eq!(first.participants, second.participants);
    }
}
