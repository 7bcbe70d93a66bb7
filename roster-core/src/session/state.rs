//! Session state machine
//!
//! `LoggedOut -> LoggingIn -> LoggedIn`, with `LoggingIn` falling back to
//! `LoggedOut` on failure and `LoggedIn` leaving on logout or expiry.

use chrono::{DateTime, Utc};
use roster_model::SessionUser;
use std::sync::Arc;
use tokio::sync::watch;

use crate::collection::request_gate::RequestGate;

/// Credentials of a signed-in administrator
#[derive(Clone, PartialEq, Eq)]
pub struct ActiveSession {
    pub user: SessionUser,
    pub token: String,
    pub expiry: DateTime<Utc>,
}

impl ActiveSession {
    /// Strictly past the expiry instant
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expiry
    }
}

impl std::fmt::Debug for ActiveSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveSession")
            .field("user", &self.user)
            .field("token", &"[REDACTED]")
            .field("expiry", &self.expiry)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    LoggedOut,

    /// A login request is in flight
    LoggingIn { email: String },

    LoggedIn(ActiveSession),
}

impl SessionState {
    pub fn is_logged_in(&self) -> bool {
        matches!(self, SessionState::LoggedIn(_))
    }

    pub fn is_logging_in(&self) -> bool {
        matches!(self, SessionState::LoggingIn { .. })
    }

    pub fn session(&self) -> Option<&ActiveSession> {
        match self {
            SessionState::LoggedIn(session) => Some(session),
            _ => None,
        }
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.session().map(|session| &session.user)
    }

    pub fn token(&self) -> Option<&str> {
        self.session().map(|session| session.token.as_str())
    }

    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        self.session().map(|session| session.expiry)
    }
}

/// Watch-channel holder for [`SessionState`]
///
/// Each login attempt takes a ticket from `attempts`; logout takes one too,
/// so an attempt still in flight can no longer complete.
#[derive(Clone, Debug)]
pub(crate) struct SessionStateStore {
    sender: Arc<watch::Sender<SessionState>>,
    attempts: Arc<RequestGate>,
}

impl SessionStateStore {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(SessionState::LoggedOut);
        Self {
            sender: Arc::new(sender),
            attempts: Arc::new(RequestGate::new()),
        }
    }

    pub fn current(&self) -> SessionState {
        self.sender.borrow().clone()
    }

    pub fn with_state<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&SessionState) -> R,
    {
        f(&self.sender.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.sender.subscribe()
    }

    pub fn set(&self, state: SessionState) {
        self.sender.send_replace(state);
    }

    /// `LoggedOut -> LoggingIn`, returning the attempt ticket. Fails with
    /// the current state while another attempt is in flight.
    pub fn begin_login(&self, email: &str) -> Result<u64, SessionState> {
        let mut outcome = None;
        self.sender.send_if_modified(|state| {
            if state.is_logging_in() {
                outcome = Some(Err(state.clone()));
                return false;
            }
            *state = SessionState::LoggingIn {
                email: email.to_string(),
            };
            outcome = Some(Ok(self.attempts.issue()));
            true
        });
        outcome.unwrap_or_else(|| Err(self.current()))
    }

    /// Whether `ticket` is still the attempt in flight
    pub fn is_attempt_current(&self, ticket: u64) -> bool {
        self.with_state(|state| {
            state.is_logging_in() && self.attempts.is_current(ticket)
        })
    }

    /// `LoggingIn -> LoggedIn` for the attempt holding `ticket`. Returns
    /// false, changing nothing, once that attempt has been superseded.
    pub fn complete_login(&self, ticket: u64, session: ActiveSession) -> bool {
        self.sender.send_if_modified(|state| {
            if state.is_logging_in() && self.attempts.is_current(ticket) {
                *state = SessionState::LoggedIn(session);
                true
            } else {
                false
            }
        })
    }

    /// `LoggingIn -> LoggedOut` for the attempt holding `ticket`. A no-op
    /// once the attempt has resolved or been superseded.
    pub fn fail_login(&self, ticket: u64) {
        self.sender.send_if_modified(|state| {
            if state.is_logging_in() && self.attempts.is_current(ticket) {
                *state = SessionState::LoggedOut;
                true
            } else {
                false
            }
        });
    }

    /// Any state to `LoggedOut`; supersedes an attempt in flight
    pub fn logout(&self) {
        self.sender.send_if_modified(|state| {
            self.attempts.issue();
            if matches!(state, SessionState::LoggedOut) {
                false
            } else {
                *state = SessionState::LoggedOut;
                true
            }
        });
    }
}
