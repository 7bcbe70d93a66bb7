//! Collection store
//!
//! Normalized cache of the server-paginated users collection plus the
//! transient selected-for-edit slot.

pub(crate) mod request_gate;
pub mod selectors;
mod state;
mod store;

pub use state::UserCollection;
pub use store::{CollectionStore, LoadOutcome};
