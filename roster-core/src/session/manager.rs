use chrono::{DateTime, TimeDelta, Utc};
use roster_model::{Credentials, SessionUser};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use super::state::{ActiveSession, SessionState, SessionStateStore};
use crate::clock::Clock;
use crate::error::{AuthError, LOGIN_FAILED_MESSAGE, RosterError, RosterResult};
use crate::gateway::{GatewayError, RemoteGateway};
use crate::storage::KeyValueStore;

pub const AUTH_USER_KEY: &str = "auth_user";
pub const AUTH_TOKEN_KEY: &str = "auth_token";
/// Epoch milliseconds, as a decimal string
pub const AUTH_EXPIRY_KEY: &str = "auth_expiry";

const SESSION_KEYS: [&str; 3] = [AUTH_USER_KEY, AUTH_TOKEN_KEY, AUTH_EXPIRY_KEY];

/// Owns the credential lifecycle: login, persistence, restore and expiry.
pub struct SessionManager {
    gateway: Arc<dyn RemoteGateway>,
    storage: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    session_duration: TimeDelta,
    state: SessionStateStore,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("storage", &self.storage)
            .field("clock", &self.clock)
            .field("session_duration", &self.session_duration)
            .field("state", &self.state.current())
            .finish_non_exhaustive()
    }
}

/// Reverts `LoggingIn` to `LoggedOut` unless the attempt completed. Covers
/// error returns and the login future being dropped mid-request.
struct LoginAttempt<'a> {
    state: &'a SessionStateStore,
    ticket: u64,
    armed: bool,
}

impl<'a> LoginAttempt<'a> {
    fn new(state: &'a SessionStateStore, ticket: u64) -> Self {
        Self {
            state,
            ticket,
            armed: true,
        }
    }

    fn is_current(&self) -> bool {
        self.state.is_attempt_current(self.ticket)
    }

    /// False when a logout superseded the attempt
    fn complete(mut self, session: ActiveSession) -> bool {
        self.armed = false;
        self.state.complete_login(self.ticket, session)
    }
}

impl Drop for LoginAttempt<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.state.fail_login(self.ticket);
        }
    }
}

impl SessionManager {
    pub fn new(
        gateway: Arc<dyn RemoteGateway>,
        storage: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        session_duration: Duration,
    ) -> Self {
        let session_duration = TimeDelta::from_std(session_duration)
            .unwrap_or_else(|_| TimeDelta::seconds(300));
        Self {
            gateway,
            storage,
            clock,
            session_duration,
            state: SessionStateStore::new(),
        }
    }

    /// Rehydrate from storage. Anything missing, unparseable or expired
    /// clears the persisted keys and leaves the session logged out.
    pub async fn restore(&self) -> RosterResult<SessionState> {
        if self.state.with_state(SessionState::is_logging_in) {
            tracing::debug!("[Session] Restore skipped, login in flight");
            return Ok(self.state.current());
        }

        let now = self.clock.now();
        match self.read_persisted().await? {
            Some(session) if now < session.expiry => {
                tracing::info!(
                    "[Session] Restored session for {} (expires {})",
                    session.user.email,
                    session.expiry
                );
                let state = SessionState::LoggedIn(session);
                self.state.set(state.clone());
                Ok(state)
            }
            stale => {
                if stale.is_some() {
                    tracing::info!("[Session] Persisted session has expired");
                }
                self.storage.remove_many(&SESSION_KEYS).await?;
                self.state.logout();
                Ok(SessionState::LoggedOut)
            }
        }
    }

    pub async fn login(&self, credentials: &Credentials) -> RosterResult<SessionUser> {
        credentials.validate()?;

        let Ok(ticket) = self.state.begin_login(credentials.email()) else {
            tracing::warn!("[Session] Login refused, another attempt is in flight");
            return Err(AuthError::LoginInProgress.into());
        };
        let attempt = LoginAttempt::new(&self.state, ticket);

        tracing::info!("[Session] Logging in as {}", credentials.email());
        let response = match self.gateway.login(credentials).await {
            Ok(response) if !response.token.is_empty() => response,
            Ok(_) => {
                return self
                    .abandon_login(
                        &attempt,
                        GatewayError::Decode(
                            "login response carried no token".to_string(),
                        ),
                    )
                    .await;
            }
            Err(err) => return self.abandon_login(&attempt, err).await,
        };

        if !attempt.is_current() {
            tracing::info!(
                "[Session] Login for {} superseded by logout, discarding token",
                credentials.email()
            );
            return Err(RosterError::Cancelled("login superseded by logout"));
        }

        let session = ActiveSession {
            user: SessionUser::new(credentials.email()),
            token: response.token,
            expiry: self.clock.now() + self.session_duration,
        };
        if let Err(err) = self.persist(&session).await {
            tracing::error!("[Session] Failed to persist session: {}", err);
            self.clear_persisted_quietly().await;
            return Err(err);
        }

        let user = session.user.clone();
        let expiry = session.expiry;
        if !attempt.complete(session) {
            tracing::info!(
                "[Session] Logout landed while persisting login for {}, rolling back",
                user.email
            );
            self.clear_persisted_quietly().await;
            return Err(RosterError::Cancelled("login superseded by logout"));
        }
        tracing::info!("[Session] Logged in as {} until {}", user.email, expiry);
        Ok(user)
    }

    /// Clears memory first, then storage. Safe when already logged out.
    pub async fn logout(&self) -> RosterResult<()> {
        self.state.logout();
        self.storage.remove_many(&SESSION_KEYS).await?;
        tracing::info!("[Session] Logged out");
        Ok(())
    }

    /// Token present and strictly past its expiry
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.state.with_state(|state| {
            state.session().is_some_and(|session| session.is_expired(now))
        })
    }

    /// Read-time snapshot; an expired session is logged out on the spot.
    pub async fn current(&self) -> RosterResult<SessionState> {
        let state = self.state.current();
        if let SessionState::LoggedIn(session) = &state
            && self.clock.now() >= session.expiry
        {
            self.expire().await?;
            return Ok(SessionState::LoggedOut);
        }
        Ok(state)
    }

    /// Gate for protected operations.
    pub async fn ensure_active(&self) -> RosterResult<ActiveSession> {
        match self.state.current() {
            SessionState::LoggedIn(session)
                if self.clock.now() < session.expiry =>
            {
                Ok(session)
            }
            SessionState::LoggedIn(_) => {
                self.expire().await?;
                Err(AuthError::SessionExpired.into())
            }
            _ => Err(AuthError::NotAuthenticated.into()),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    async fn expire(&self) -> RosterResult<()> {
        tracing::info!("[Session] Session expired, logging out");
        self.logout().await
    }

    async fn abandon_login<T>(
        &self,
        attempt: &LoginAttempt<'_>,
        err: GatewayError,
    ) -> RosterResult<T> {
        tracing::warn!("[Session] Login failed: {}", err);
        // Superseded attempts leave storage alone
        if attempt.is_current() {
            self.clear_persisted_quietly().await;
        }
        Err(classify_login_failure(err))
    }

    async fn persist(&self, session: &ActiveSession) -> RosterResult<()> {
        let user = serde_json::to_string(&session.user)
            .map_err(crate::error::StorageError::Encode)?;
        self.storage
            .set_many(&[
                (AUTH_USER_KEY, user),
                (AUTH_TOKEN_KEY, session.token.clone()),
                (
                    AUTH_EXPIRY_KEY,
                    session.expiry.timestamp_millis().to_string(),
                ),
            ])
            .await?;
        Ok(())
    }

    async fn clear_persisted_quietly(&self) {
        if let Err(err) = self.storage.remove_many(&SESSION_KEYS).await {
            tracing::warn!("[Session] Failed to clear persisted session: {}", err);
        }
    }

    async fn read_persisted(&self) -> RosterResult<Option<ActiveSession>> {
        let Some(token) = self.storage.get(AUTH_TOKEN_KEY).await? else {
            return Ok(None);
        };
        let Some(raw_expiry) = self.storage.get(AUTH_EXPIRY_KEY).await? else {
            return Ok(None);
        };
        let Some(raw_user) = self.storage.get(AUTH_USER_KEY).await? else {
            return Ok(None);
        };

        let Some(expiry) = raw_expiry
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(DateTime::from_timestamp_millis)
        else {
            tracing::warn!("[Session] Ignoring unparseable persisted expiry");
            return Ok(None);
        };
        let user = match serde_json::from_str::<SessionUser>(&raw_user) {
            Ok(user) => user,
            Err(err) => {
                tracing::warn!("[Session] Ignoring unparseable persisted user: {}", err);
                return Ok(None);
            }
        };
        if token.is_empty() {
            return Ok(None);
        }

        Ok(Some(ActiveSession {
            user,
            token,
            expiry,
        }))
    }
}

fn classify_login_failure(err: GatewayError) -> RosterError {
    match err {
        GatewayError::Rejected { message, .. } => {
            AuthError::Rejected(
                message.unwrap_or_else(|| LOGIN_FAILED_MESSAGE.to_string()),
            )
            .into()
        }
        GatewayError::Decode(_) => {
            AuthError::Rejected(LOGIN_FAILED_MESSAGE.to_string()).into()
        }
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::gateway::MockRemoteGateway;
    use crate::storage::MemoryStore;
    use roster_model::LoginResponse;

    fn manager(
        gateway: MockRemoteGateway,
        storage: Arc<MemoryStore>,
        clock: ManualClock,
    ) -> SessionManager {
        SessionManager::new(
            Arc::new(gateway),
            storage,
            Arc::new(clock),
            Duration::from_secs(300),
        )
    }

    #[tokio::test]
    async fn invalid_credentials_never_reach_the_gateway() {
        let mut gateway = MockRemoteGateway::new();
        gateway.expect_login().never();

        let session = manager(
            gateway,
            Arc::new(MemoryStore::new()),
            ManualClock::starting_now(),
        );
        let err = session
            .login(&Credentials::new("not-an-email", ""))
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(session.state.current(), SessionState::LoggedOut);
    }

    #[tokio::test]
    async fn rejection_surfaces_server_message_and_clears_storage() {
        let mut gateway = MockRemoteGateway::new();
        gateway.expect_login().times(1).returning(|_| {
            Err(GatewayError::Rejected {
                status: 400,
                message: Some("user not found".into()),
            })
        });
        let storage = Arc::new(MemoryStore::with_entries([
            (AUTH_TOKEN_KEY, "old"),
            (AUTH_EXPIRY_KEY, "1"),
        ]));

        let session = manager(gateway, storage.clone(), ManualClock::starting_now());
        let err = session
            .login(&Credentials::new("peter@klaven.io", "cityslicka"))
            .await
            .unwrap_err();

        assert_eq!(err.user_message(), "user not found");
        assert!(storage.is_empty());
        assert_eq!(session.state.current(), SessionState::LoggedOut);
    }

    #[tokio::test]
    async fn bare_rejection_uses_fallback_message() {
        let mut gateway = MockRemoteGateway::new();
        gateway.expect_login().returning(|_| {
            Err(GatewayError::Rejected {
                status: 401,
                message: None,
            })
        });
        let session = manager(
            gateway,
            Arc::new(MemoryStore::new()),
            ManualClock::starting_now(),
        );
        let err = session
            .login(&Credentials::new("eve.holt@reqres.in", "wrong"))
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), LOGIN_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn success_persists_all_keys_together() {
        let mut gateway = MockRemoteGateway::new();
        gateway.expect_login().returning(|_| {
            Ok(LoginResponse {
                token: "QpwL5tke4Pnpja7X4".into(),
            })
        });
        let clock = ManualClock::starting_now();
        let storage = Arc::new(MemoryStore::new());
        let session = manager(gateway, storage.clone(), clock.clone());

        let user = session
            .login(&Credentials::new("eve.holt@reqres.in", "cityslicka"))
            .await
            .unwrap();
        assert_eq!(user.email, "eve.holt@reqres.in");

        let expected_expiry = (clock.now() + TimeDelta::seconds(300))
            .timestamp_millis()
            .to_string();
        assert_eq!(
            storage.get(AUTH_EXPIRY_KEY).await.unwrap(),
            Some(expected_expiry)
        );
        assert_eq!(
            storage.get(AUTH_USER_KEY).await.unwrap().as_deref(),
            Some(r#"{"email":"eve.holt@reqres.in"}"#)
        );
        assert!(storage.contains(AUTH_TOKEN_KEY));
    }

    #[tokio::test]
    async fn read_time_expiry_forces_logout() {
        let mut gateway = MockRemoteGateway::new();
        gateway.expect_login().returning(|_| {
            Ok(LoginResponse {
                token: "token".into(),
            })
        });
        let clock = ManualClock::starting_now();
        let storage = Arc::new(MemoryStore::new());
        let session = manager(gateway, storage.clone(), clock.clone());
        session
            .login(&Credentials::new("eve.holt@reqres.in", "cityslicka"))
            .await
            .unwrap();

        clock.advance(TimeDelta::seconds(300));
        assert!(!session.is_expired(clock.now()));
        let err = session.ensure_active().await.unwrap_err();
        assert!(err.is_session_expired());
        assert_eq!(session.current().await.unwrap(), SessionState::LoggedOut);
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn garbage_expiry_is_treated_as_absent() {
        let storage = Arc::new(MemoryStore::with_entries([
            (AUTH_USER_KEY, r#"{"email":"eve.holt@reqres.in"}"#),
            (AUTH_TOKEN_KEY, "token"),
            (AUTH_EXPIRY_KEY, "tomorrow"),
        ]));
        let session = manager(
            MockRemoteGateway::new(),
            storage.clone(),
            ManualClock::starting_now(),
        );

        assert_eq!(session.restore().await.unwrap(), SessionState::LoggedOut);
        assert!(storage.is_empty());
    }
}
