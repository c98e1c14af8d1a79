//! Surface-local timer state and cross-surface synchronization.
//!
//! Each hosting surface (side panel or main stage) constructs one
//! [`TimerStore`], drives it with a [`TickScheduler`], and keeps it
//! consistent with the peer surface through a [`SyncBridge`] over the
//! platform's pub/sub channel. Presentation adapters observe the store's
//! event stream and feed gestures back in as [`UserIntent`]s.

pub mod bootstrap;
pub mod channel;
pub mod intent;
pub mod store;
pub mod sync;
pub mod ticker;

pub use bootstrap::{
    bootstrap_store, placeholder_starting_state, MissingSessionBootstrap, SessionBootstrap,
    StartingState,
};
pub use channel::{LoopbackChannel, MissingPubSubChannel, PubSubChannel};
pub use intent::{dispatch, UserIntent};
pub use store::{StateChange, StoreEvent, TimerStore};
pub use sync::{SyncBridge, SyncBridgeHandle, DEFAULT_SYNC_TOPIC};
pub use ticker::TickScheduler;
