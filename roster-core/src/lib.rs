//! Data-sync and session-lifecycle core for the Roster admin console.
//!
//! The [`Console`] facade is the intent surface a view layer talks to. It
//! composes the session store, the normalized user collection, the mutation
//! sequencer and the preference store around an injected [`RemoteGateway`].
#![allow(missing_docs)]

pub mod clock;
pub mod collection;
pub mod config;
pub mod console;
pub mod error;
pub mod gateway;
pub mod notify;
pub mod preferences;
pub mod sequencer;
pub mod session;
pub mod storage;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use clock::{Clock, ManualClock, SystemClock};
pub use collection::{CollectionStore, LoadOutcome, UserCollection};
pub use config::RosterConfig;
pub use console::Console;
pub use error::{AuthError, RosterError, RosterResult, StorageError};
pub use gateway::{GatewayError, GatewayResult, HttpGateway, RemoteGateway};
pub use notify::{
    BroadcastNotifier, BufferedNotifier, Notification, NotificationLevel,
    Notifier, TracingNotifier,
};
pub use preferences::PreferenceStore;
pub use sequencer::{ActivityStatus, MutationSequencer};
pub use session::{ActiveSession, SessionManager, SessionState};
pub use storage::{FileStore, KeyValueStore, MemoryStore};

pub use roster_model as model;
