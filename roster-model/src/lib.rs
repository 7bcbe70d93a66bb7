//! Core data model definitions shared across Roster crates.
#![allow(missing_docs)]

pub mod credentials;
pub mod ids;
pub mod page;
pub mod preferences;
pub mod session;
pub mod user;
pub mod validation;

// Intentionally curated re-exports for downstream consumers.
pub use credentials::Credentials;
pub use ids::UserId;
pub use page::{UserEnvelope, UserPage, page_window, total_pages};
pub use preferences::{Preferences, Theme, ViewMode};
pub use session::{LoginResponse, SessionUser};
pub use user::{User, UserPatch, UserPayload};
pub use validation::{FieldError, ValidationError};
