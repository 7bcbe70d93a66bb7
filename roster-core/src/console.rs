//! Intent surface for view layers
//!
//! [`Console`] wires the stores together around injected collaborators.
//! Every intent runs the same way: session check, payload validation, the
//! gateway call under the sequencer, then a notification.

use roster_model::{
    Credentials, Preferences, SessionUser, Theme, User, UserId, UserPayload,
    ViewMode,
};
use std::sync::Arc;

use crate::clock::Clock;
use crate::collection::{CollectionStore, LoadOutcome, UserCollection, selectors};
use crate::config::RosterConfig;
use crate::error::RosterResult;
use crate::gateway::RemoteGateway;
use crate::notify::Notifier;
use crate::preferences::PreferenceStore;
use crate::sequencer::{ActivityStatus, MutationSequencer};
use crate::session::{SessionManager, SessionState};
use crate::storage::KeyValueStore;

pub const USER_CREATED_MESSAGE: &str = "User created successfully!";
pub const USER_UPDATED_MESSAGE: &str = "User updated successfully!";
pub const USER_DELETED_MESSAGE: &str = "User deleted successfully!";

pub struct Console {
    config: RosterConfig,
    session: SessionManager,
    collection: CollectionStore,
    sequencer: MutationSequencer,
    preferences: PreferenceStore,
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console")
            .field("api_base", &self.config.api_base)
            .field("session", &self.session)
            .field("collection", &self.collection)
            .field("activity", &self.sequencer.status())
            .field("preferences", &self.preferences.current())
            .finish_non_exhaustive()
    }
}

impl Console {
    pub fn new(
        config: RosterConfig,
        gateway: Arc<dyn RemoteGateway>,
        storage: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let session = SessionManager::new(
            Arc::clone(&gateway),
            Arc::clone(&storage),
            clock,
            config.session_duration(),
        );
        let collection = CollectionStore::new(gateway, config.per_page);
        let preferences = PreferenceStore::new(storage);

        Self {
            config,
            session,
            collection,
            sequencer: MutationSequencer::new(),
            preferences,
            notifier,
        }
    }

    pub fn config(&self) -> &RosterConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn collection(&self) -> &CollectionStore {
        &self.collection
    }

    pub fn sequencer(&self) -> &MutationSequencer {
        &self.sequencer
    }

    pub fn preferences(&self) -> &PreferenceStore {
        &self.preferences
    }

    /// Startup hydration of the session and preferences
    pub async fn restore_session(&self) -> RosterResult<SessionState> {
        let state = self.session.restore().await?;
        self.preferences.load().await?;
        Ok(state)
    }

    pub async fn login(&self, credentials: &Credentials) -> RosterResult<SessionUser> {
        let result = self.session.login(credentials).await;
        self.sequencer.settle(&result);
        self.report(result, None)
    }

    /// Ends the session and drops every cached record
    pub async fn logout(&self) -> RosterResult<()> {
        self.collection.reset();
        self.sequencer.clear_error();
        self.session.logout().await
    }

    pub async fn load_page(&self, page: u32) -> RosterResult<LoadOutcome> {
        let result = self
            .sequencer
            .track_list_load(async {
                self.session.ensure_active().await?;
                self.collection.load_page(page).await
            })
            .await;
        self.report(result, None)
    }

    pub async fn load_one(&self, id: &UserId) -> RosterResult<LoadOutcome> {
        let result = self
            .sequencer
            .track_action(async {
                self.session.ensure_active().await?;
                self.collection.load_one(id).await
            })
            .await;
        self.report(result, None)
    }

    pub async fn create(&self, payload: &UserPayload) -> RosterResult<User> {
        let result = self
            .sequencer
            .track_action(async {
                self.session.ensure_active().await?;
                payload.validate()?;
                self.collection.create(payload).await
            })
            .await;
        self.report(result, Some(USER_CREATED_MESSAGE))
    }

    /// `Ok(None)` means the server accepted the update but the user is not
    /// in the current page, so nothing changed locally.
    pub async fn update(
        &self,
        id: &UserId,
        payload: &UserPayload,
    ) -> RosterResult<Option<User>> {
        let result = self
            .sequencer
            .track_action(async {
                self.session.ensure_active().await?;
                payload.validate()?;
                self.collection.update(id, payload).await
            })
            .await;
        if let Ok(None) = result {
            tracing::debug!("[Console] Update for {} accepted but user not cached", id);
        }
        self.report(result, Some(USER_UPDATED_MESSAGE))
    }

    pub async fn remove(&self, id: &UserId) -> RosterResult<Option<User>> {
        let result = self
            .sequencer
            .track_action(async {
                self.session.ensure_active().await?;
                self.collection.remove(id).await
            })
            .await;
        self.report(result, Some(USER_DELETED_MESSAGE))
    }

    pub fn clear_selected(&self) {
        self.collection.clear_selected();
    }

    pub fn set_page(&self, page: u32) {
        self.collection.set_page(page);
    }

    pub async fn toggle_theme(&self) -> RosterResult<Theme> {
        let result = self.preferences.toggle_theme().await;
        self.sequencer.settle(&result);
        self.report(result, None)
    }

    pub async fn set_view_mode(&self, view_mode: ViewMode) -> RosterResult<()> {
        let result = self.preferences.set_view_mode(view_mode).await;
        self.sequencer.settle(&result);
        self.report(result, None)
    }

    pub async fn session_state(&self) -> RosterResult<SessionState> {
        self.session.current().await
    }

    pub fn snapshot(&self) -> UserCollection {
        self.collection.snapshot()
    }

    pub fn selected(&self) -> Option<User> {
        self.collection.selected()
    }

    pub fn activity(&self) -> ActivityStatus {
        self.sequencer.status()
    }

    pub fn current_preferences(&self) -> Preferences {
        self.preferences.current()
    }

    pub fn users(&self) -> Vec<User> {
        selectors::users(&self.collection.snapshot())
    }

    pub fn search(&self, query: &str) -> Vec<User> {
        selectors::search(&self.collection.snapshot(), query)
    }

    pub fn total_pages(&self) -> u32 {
        selectors::total_pages(&self.collection.snapshot())
    }

    pub fn page_window(&self) -> Vec<u32> {
        selectors::page_window(&self.collection.snapshot())
    }

    /// Toast the outcome. Validation problems belong to the form, so they
    /// are not toasted; an expired session also drops the cache.
    fn report<T>(&self, result: RosterResult<T>, success: Option<&str>) -> RosterResult<T> {
        match &result {
            Ok(_) => {
                if let Some(message) = success {
                    self.notifier.success(message);
                }
            }
            Err(err) if err.is_cancelled() => {
                tracing::debug!("[Console] {}", err);
            }
            Err(err) => {
                if err.is_session_expired() {
                    self.collection.reset();
                }
                if !err.is_validation() {
                    tracing::warn!("[Console] {}", err);
                    self.notifier.error(&err.user_message());
                }
            }
        }
        result
    }
}
