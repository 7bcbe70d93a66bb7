//! Error types for the console core
//!
//! Every failure the View Layer can see is a [`RosterError`]. Each variant
//! carries enough to produce the short message shown in a notification via
//! [`RosterError::user_message`].

use roster_model::ValidationError;
use thiserror::Error;

use crate::gateway::GatewayError;

/// Fallback shown when a login is rejected without an explanation.
pub const LOGIN_FAILED_MESSAGE: &str =
    "Login failed. Please check your credentials.";

/// Main error type for console operations
#[derive(Debug, Error)]
pub enum RosterError {
    /// Payload failed the form rules; never sent to the server
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Login rejected, session expired or missing
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Requested record does not exist server-side
    #[error("Not found: {0}")]
    NotFound(String),

    /// No response received (connection failure or timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// The request could not be built
    #[error("Request setup error: {0}")]
    Setup(String),

    /// Any other non-2xx response, or a body that could not be decoded
    #[error("Server error (status {status:?}): {message:?}")]
    Server {
        status: Option<u16>,
        message: Option<String>,
    },

    /// Local persistence failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The console was reset (logout or expiry) while the request was in
    /// flight; its result was not applied
    #[error("Cancelled: {0}")]
    Cancelled(&'static str),
}

/// Authentication failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("{0}")]
    Rejected(String),

    #[error("server refused the current credentials")]
    Unauthorized,

    #[error("session expired")]
    SessionExpired,

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("a login is already in progress")]
    LoginInProgress,
}

/// Key-value persistence failures
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read from storage")]
    ReadFailed(#[source] std::io::Error),

    #[error("Failed to write to storage")]
    WriteFailed(#[source] std::io::Error),

    #[error("Failed to encode stored value")]
    Encode(#[source] serde_json::Error),
}

/// Result type alias for console operations
pub type RosterResult<T> = Result<T, RosterError>;

impl RosterError {
    /// Short text for the transient notification and the inline error slot.
    pub fn user_message(&self) -> String {
        match self {
            RosterError::Validation(err) => err.to_string(),
            RosterError::Auth(AuthError::Rejected(message)) => message.clone(),
            RosterError::Auth(
                AuthError::Unauthorized | AuthError::SessionExpired,
            ) => "Session expired. Please log in again.".to_string(),
            RosterError::Auth(AuthError::NotAuthenticated) => {
                "Please log in to continue.".to_string()
            }
            RosterError::Auth(AuthError::LoginInProgress) => {
                "A login is already in progress.".to_string()
            }
            RosterError::NotFound(_) => "Resource not found.".to_string(),
            RosterError::Network(_) => {
                "Network Error: Please check your internet connection."
                    .to_string()
            }
            RosterError::Setup(_) => {
                "An error occurred while setting up the request.".to_string()
            }
            RosterError::Server { message, .. } => format!(
                "API Error: {}",
                message
                    .as_deref()
                    .unwrap_or("An unexpected error occurred.")
            ),
            RosterError::Storage(err) => format!("Local storage error: {err}"),
            RosterError::Cancelled(_) => "The request was cancelled.".to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, RosterError::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RosterError::NotFound(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RosterError::Cancelled(_))
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, RosterError::Auth(AuthError::SessionExpired))
    }
}

impl From<GatewayError> for RosterError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Network(message) => RosterError::Network(message),
            GatewayError::Setup(message) => RosterError::Setup(message),
            GatewayError::Rejected { status: 401, .. } => {
                RosterError::Auth(AuthError::Unauthorized)
            }
            GatewayError::Rejected {
                status: 404,
                message,
            } => RosterError::NotFound(
                message.unwrap_or_else(|| "resource not found".to_string()),
            ),
            GatewayError::Rejected { status, message } => RosterError::Server {
                status: Some(status),
                message,
            },
            GatewayError::Decode(message) => RosterError::Server {
                status: None,
                message: Some(message),
            },
        }
    }
}
