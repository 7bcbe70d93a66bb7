//! Session store
//!
//! Single source of truth for whether a valid, unexpired credential exists.

mod manager;
mod state;

pub use manager::{AUTH_EXPIRY_KEY, AUTH_TOKEN_KEY, AUTH_USER_KEY, SessionManager};
pub use state::{ActiveSession, SessionState};
