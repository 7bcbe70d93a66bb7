use async_trait::async_trait;
use parking_lot::Mutex;
use roster_model::{
    Credentials, LoginResponse, User, UserId, UserPage, UserPatch, UserPayload,
    page::total_pages,
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::oneshot;

use crate::gateway::{GatewayError, GatewayResult, RemoteGateway};

/// Token handed out for every successful login
pub const STUB_TOKEN: &str = "QpwL5tke4Pnpja7X4";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Login,
    FetchUsers,
    FetchUser,
    CreateUser,
    UpdateUser,
    DeleteUser,
}

/// Keeps one stubbed response parked until released or dropped
#[derive(Debug)]
pub struct ResponseHold {
    release: Option<oneshot::Sender<()>>,
}

impl ResponseHold {
    pub fn release(mut self) {
        if let Some(tx) = self.release.take() {
            let _ = tx.send(());
        }
    }
}

#[derive(Debug)]
struct StubState {
    users: Vec<User>,
    per_page: u32,
    accounts: HashSet<String>,
    next_id: u64,
    failures: HashMap<Operation, VecDeque<GatewayError>>,
    holds: HashMap<Operation, VecDeque<oneshot::Receiver<()>>>,
    panics: HashSet<Operation>,
    calls: Vec<Operation>,
    requested_pages: Vec<u32>,
}

/// In-memory stand-in for the remote user API
#[derive(Debug, Clone)]
pub struct StubGateway {
    inner: Arc<Mutex<StubState>>,
}

impl Default for StubGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl StubGateway {
    /// Twelve sample users, six per page, one known login
    pub fn new() -> Self {
        Self::with_users(sample_users())
            .with_account("eve.holt@reqres.in")
    }

    pub fn with_users(users: Vec<User>) -> Self {
        let next_id = users
            .iter()
            .filter_map(|user| user.id.as_str().parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        Self {
            inner: Arc::new(Mutex::new(StubState {
                users,
                per_page: 6,
                accounts: HashSet::new(),
                next_id,
                failures: HashMap::new(),
                holds: HashMap::new(),
                panics: HashSet::new(),
                calls: Vec::new(),
                requested_pages: Vec::new(),
            })),
        }
    }

    /// Accept logins for `email` with any non-empty password
    pub fn with_account(self, email: &str) -> Self {
        self.inner.lock().accounts.insert(email.to_string());
        self
    }

    /// Id the next created user receives
    pub fn set_next_id(&self, id: u64) {
        self.inner.lock().next_id = id;
    }

    /// Fail the next call of `operation` with `error`
    pub fn fail_next(&self, operation: Operation, error: GatewayError) {
        self.inner
            .lock()
            .failures
            .entry(operation)
            .or_default()
            .push_back(error);
    }

    /// Park the next call of `operation` until the hold is released
    pub fn hold_next(&self, operation: Operation) -> ResponseHold {
        let (tx, rx) = oneshot::channel();
        self.inner
            .lock()
            .holds
            .entry(operation)
            .or_default()
            .push_back(rx);
        ResponseHold { release: Some(tx) }
    }

    /// Panic inside the next call of `operation`
    pub fn panic_on(&self, operation: Operation) {
        self.inner.lock().panics.insert(operation);
    }

    pub fn calls(&self) -> Vec<Operation> {
        self.inner.lock().calls.clone()
    }

    pub fn call_count(&self, operation: Operation) -> usize {
        self.inner
            .lock()
            .calls
            .iter()
            .filter(|call| **call == operation)
            .count()
    }

    pub fn requested_pages(&self) -> Vec<u32> {
        self.inner.lock().requested_pages.clone()
    }

    pub fn users(&self) -> Vec<User> {
        self.inner.lock().users.clone()
    }

    async fn enter(&self, operation: Operation) -> GatewayResult<()> {
        let (hold, failure, panics) = {
            let mut state = self.inner.lock();
            state.calls.push(operation);
            let hold = state
                .holds
                .get_mut(&operation)
                .and_then(VecDeque::pop_front);
            let failure = state
                .failures
                .get_mut(&operation)
                .and_then(VecDeque::pop_front);
            let panics = state.panics.remove(&operation);
            (hold, failure, panics)
        };

        if let Some(hold) = hold {
            // A dropped hold lets the call through as well
            let _ = hold.await;
        }
        if panics {
            panic!("StubGateway: injected panic during {operation:?}");
        }
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn not_found() -> GatewayError {
    GatewayError::Rejected {
        status: 404,
        message: None,
    }
}

#[async_trait]
impl RemoteGateway for StubGateway {
    async fn login(&self, credentials: &Credentials) -> GatewayResult<LoginResponse> {
        self.enter(Operation::Login).await?;
        if credentials.expose_password().is_empty() {
            return Err(GatewayError::Rejected {
                status: 400,
                message: Some("Missing password".to_string()),
            });
        }
        if !self.inner.lock().accounts.contains(credentials.email()) {
            return Err(GatewayError::Rejected {
                status: 400,
                message: Some("user not found".to_string()),
            });
        }
        Ok(LoginResponse {
            token: STUB_TOKEN.to_string(),
        })
    }

    async fn fetch_users(&self, page: u32) -> GatewayResult<UserPage> {
        self.inner.lock().requested_pages.push(page);
        self.enter(Operation::FetchUsers).await?;

        let state = self.inner.lock();
        let per_page = state.per_page.max(1);
        let total = state.users.len() as u64;
        let data = state
            .users
            .iter()
            .skip(page.saturating_sub(1) as usize * per_page as usize)
            .take(per_page as usize)
            .cloned()
            .collect();
        Ok(UserPage {
            data,
            page,
            per_page,
            total,
            total_pages: Some(total_pages(total, per_page)),
        })
    }

    async fn fetch_user(&self, id: &UserId) -> GatewayResult<User> {
        self.enter(Operation::FetchUser).await?;
        self.inner
            .lock()
            .users
            .iter()
            .find(|user| &user.id == id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn create_user(&self, payload: &UserPayload) -> GatewayResult<User> {
        self.enter(Operation::CreateUser).await?;
        let mut state = self.inner.lock();
        let id = UserId::from(state.next_id);
        state.next_id += 1;
        let user = User {
            id,
            email: payload.email.clone(),
            first_name: payload.first_name.clone(),
            last_name: payload.last_name.clone(),
            avatar: Some(payload.avatar.clone()),
        };
        state.users.retain(|existing| existing.id != user.id);
        state.users.insert(0, user.clone());
        Ok(user)
    }

    /// Answers like a permissive server: the patch comes back whether or not
    /// the id exists.
    async fn update_user(
        &self,
        id: &UserId,
        payload: &UserPayload,
    ) -> GatewayResult<UserPatch> {
        self.enter(Operation::UpdateUser).await?;
        let patch = UserPatch::from(payload);
        if let Some(user) = self
            .inner
            .lock()
            .users
            .iter_mut()
            .find(|user| &user.id == id)
        {
            user.apply(&patch);
        }
        Ok(patch)
    }

    async fn delete_user(&self, id: &UserId) -> GatewayResult<()> {
        self.enter(Operation::DeleteUser).await?;
        let mut state = self.inner.lock();
        let before = state.users.len();
        state.users.retain(|user| &user.id != id);
        if state.users.len() == before {
            return Err(not_found());
        }
        Ok(())
    }
}

/// The twelve users of the public demo API
pub fn sample_users() -> Vec<User> {
    [
        ("George", "Bluth"),
        ("Janet", "Weaver"),
        ("Emma", "Wong"),
        ("Eve", "Holt"),
        ("Charles", "Morris"),
        ("Tracey", "Ramos"),
        ("Michael", "Lawson"),
        ("Lindsay", "Ferguson"),
        ("Tobias", "Funke"),
        ("Byron", "Fields"),
        ("George", "Edwards"),
        ("Rachel", "Howell"),
    ]
    .into_iter()
    .enumerate()
    .map(|(index, (first, last))| {
        let id = index as u64 + 1;
        User {
            id: UserId::from(id),
            email: format!(
                "{}.{}@reqres.in",
                first.to_lowercase(),
                last.to_lowercase()
            ),
            first_name: first.to_string(),
            last_name: last.to_string(),
            avatar: Some(format!("https://reqres.in/img/faces/{id}-image.jpg")),
        }
    })
    .collect()
}
