use serde::{Deserialize, Serialize};
use shared::{domain::ParticipantId, error::StoreError};
use tracing::warn;

use crate::store::TimerStore;

/// User gesture from a presentation adapter, keyed by intent name rather
/// than by store method, so surfaces stay decoupled from store internals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum UserIntent {
    Start { id: ParticipantId },
    Pause { id: ParticipantId },
    Reset { id: ParticipantId },
    Add { name: String },
    Remove { id: ParticipantId },
    PauseAll,
    ResetAll,
    SetDefault { seconds: i64 },
}

impl UserIntent {
    /// Parses a line-oriented command (`start <id>`, `add <name>`,
    /// `pause_all`, ...). Returns `None` for anything unrecognized.
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let intent = words.next()?;
        let rest = words.collect::<Vec<_>>().join(" ");
        match intent {
            "start" if !rest.is_empty() => Some(Self::Start {
                id: ParticipantId(rest),
            }),
            "pause" if !rest.is_empty() => Some(Self::Pause {
                id: ParticipantId(rest),
            }),
            "reset" if !rest.is_empty() => Some(Self::Reset {
                id: ParticipantId(rest),
            }),
            "remove" if !rest.is_empty() => Some(Self::Remove {
                id: ParticipantId(rest),
            }),
            "add" if !rest.is_empty() => Some(Self::Add { name: rest }),
            "pause_all" => Some(Self::PauseAll),
            "reset_all" => Some(Self::ResetAll),
            "set_default" => rest.parse().ok().map(|seconds| Self::SetDefault { seconds }),
            _ => None,
        }
    }
}

/// Routes an intent into the store. An unknown id is recovered here as a
/// logged no-op and never surfaced to the end user.
pub async fn dispatch(store: &TimerStore, intent: UserIntent) {
    let result = match intent {
        UserIntent::Start { id } => store.start(&id).await,
        UserIntent::Pause { id } => store.pause(&id).await,
        UserIntent::Reset { id } => store.reset(&id).await,
        UserIntent::Remove { id } => store.remove(&id).await,
        UserIntent::Add { name } => {
            store.add(name).await;
            Ok(())
        }
        UserIntent::PauseAll => {
            store.pause_all().await;
            Ok(())
        }
        UserIntent::ResetAll => {
            store.reset_all().await;
            Ok(())
        }
        UserIntent::SetDefault { seconds } => {
            store.set_default_seconds(seconds).await;
            Ok(())
        }
    };
    if let Err(StoreError::NotFound(id)) = result {
        warn!(%id, "intent referenced unknown participant; ignored");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::SessionConfig;

    #[test]
    fn parses_id_and_name_commands() {
        assert_eq!(
            UserIntent::parse("start user1"),
            Some(UserIntent::Start {
                id: ParticipantId::from("user1")
            })
        );
        assert_eq!(
            UserIntent::parse("add Ana García"),
            Some(UserIntent::Add {
                name: "Ana García".to_string()
            })
        );
        assert_eq!(UserIntent::parse("pause_all"), Some(UserIntent::PauseAll));
        assert_eq!(
            UserIntent::parse("set_default 120"),
            Some(UserIntent::SetDefault { seconds: 120 })
        );
        assert_eq!(UserIntent::parse("start"), None);
        assert_eq!(UserIntent::parse("shout user1"), None);
        assert_eq!(UserIntent::parse(""), None);
    }

    #[test]
    fn intents_tag_by_name_on_the_wire() {
        let encoded = serde_json::to_value(UserIntent::ResetAll).expect("encode");
        assert_eq!(encoded["intent"], "reset_all");
    }

    #[tokio::test]
    async fn dispatch_recovers_unknown_id_as_noop() {
        let store = TimerStore::new(SessionConfig::default());
        dispatch(
            &store,
            UserIntent::Start {
                id: ParticipantId::from("ghost"),
            },
        )
        .await;
        assert!(store.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn dispatch_routes_to_store() {
        let store = TimerStore::new(SessionConfig::default());
        dispatch(
            &store,
            UserIntent::Add {
                name: "Ana".to_string(),
            },
        )
        .await;
        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.len(), 1);

        dispatch(
            &store,
            UserIntent::Start {
                id: snapshot[0].id.clone(),
            },
        )
        .await;
        assert!(store.snapshot().await[0].running);
    }
}
