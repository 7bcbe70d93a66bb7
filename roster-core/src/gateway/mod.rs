//! Remote API seam
//!
//! [`RemoteGateway`] is the HTTP contract the console depends on. The stores
//! only ever see this trait; [`HttpGateway`] is the reqwest adapter.

mod http;

pub use http::HttpGateway;

use async_trait::async_trait;
use roster_model::{
    Credentials, LoginResponse, User, UserId, UserPage, UserPatch, UserPayload,
};
use thiserror::Error;

/// Transport-level failures, before they are classified for the console
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// No response arrived (connection refused, DNS, timeout)
    #[error("no response from server: {0}")]
    Network(String),

    /// The request could not be built
    #[error("request could not be built: {0}")]
    Setup(String),

    /// Non-2xx response; `message` is the body's `error` or `message` field
    #[error("server responded with {status}: {message:?}")]
    Rejected {
        status: u16,
        message: Option<String>,
    },

    /// 2xx response whose body did not match the expected shape
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl GatewayError {
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// `POST /login`
    async fn login(&self, credentials: &Credentials) -> GatewayResult<LoginResponse>;

    /// `GET /users?page=N`
    async fn fetch_users(&self, page: u32) -> GatewayResult<UserPage>;

    /// `GET /users/{id}`
    async fn fetch_user(&self, id: &UserId) -> GatewayResult<User>;

    /// `POST /users`; the server assigns the id
    async fn create_user(&self, payload: &UserPayload) -> GatewayResult<User>;

    /// `PUT /users/{id}`; answers with the fields it accepted
    async fn update_user(
        &self,
        id: &UserId,
        payload: &UserPayload,
    ) -> GatewayResult<UserPatch>;

    /// `DELETE /users/{id}`
    async fn delete_user(&self, id: &UserId) -> GatewayResult<()>;
}
