use roster_model::{User, UserId, UserPayload};
use std::sync::Arc;
use tokio::sync::watch;

use super::request_gate::RequestGate;
use super::state::UserCollection;
use crate::error::{RosterError, RosterResult};
use crate::gateway::RemoteGateway;

/// What happened to a load once its response arrived
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The response was written to the store
    Applied,
    /// A newer request was issued meanwhile; the response was discarded
    Superseded,
}

impl LoadOutcome {
    pub fn is_applied(self) -> bool {
        matches!(self, LoadOutcome::Applied)
    }
}

/// Owns the users cache and the selected-for-edit slot
pub struct CollectionStore {
    gateway: Arc<dyn RemoteGateway>,
    collection: watch::Sender<UserCollection>,
    selected: watch::Sender<Option<User>>,
    page_gate: RequestGate,
    selected_gate: RequestGate,
    /// Bumped by `reset`; mutations issued before it are not applied
    epoch: RequestGate,
    default_per_page: u32,
}

impl std::fmt::Debug for CollectionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let collection = self.collection.borrow();
        f.debug_struct("CollectionStore")
            .field("page", &collection.page())
            .field("cached", &collection.len())
            .field("total", &collection.total())
            .field("selected", &self.selected.borrow().as_ref().map(|u| u.id.clone()))
            .finish_non_exhaustive()
    }
}

impl CollectionStore {
    pub fn new(gateway: Arc<dyn RemoteGateway>, per_page: u32) -> Self {
        let (collection, _) = watch::channel(UserCollection::new(per_page));
        let (selected, _) = watch::channel(None);
        Self {
            gateway,
            collection,
            selected,
            page_gate: RequestGate::new(),
            selected_gate: RequestGate::new(),
            epoch: RequestGate::new(),
            default_per_page: per_page,
        }
    }

    /// Fetch page `page` (at least 1) and replace the cache with it.
    ///
    /// Only the most recently issued load may touch the store. An older
    /// response, success or failure, resolves to [`LoadOutcome::Superseded`].
    pub async fn load_page(&self, page: u32) -> RosterResult<LoadOutcome> {
        let page = page.max(1);
        let ticket = self.page_gate.issue();
        tracing::debug!("[Collection] Loading page {} (ticket {})", page, ticket);

        let result = self.gateway.fetch_users(page).await;
        if !self.page_gate.is_current(ticket) {
            tracing::debug!(
                "[Collection] Discarding stale response for page {} (ticket {})",
                page,
                ticket
            );
            return Ok(LoadOutcome::Superseded);
        }

        let fetched = result?;
        tracing::info!(
            "[Collection] Loaded page {} with {} users (total {})",
            fetched.page,
            fetched.data.len(),
            fetched.total
        );
        self.collection.send_modify(|collection| collection.replace_page(fetched));
        Ok(LoadOutcome::Applied)
    }

    /// Fetch one user into the selected slot, independent of the cache.
    /// The slot is emptied as soon as the request is issued.
    pub async fn load_one(&self, id: &UserId) -> RosterResult<LoadOutcome> {
        let ticket = self.selected_gate.issue();
        self.selected.send_replace(None);

        let result = self.gateway.fetch_user(id).await;
        if !self.selected_gate.is_current(ticket) {
            tracing::debug!("[Collection] Discarding stale response for user {}", id);
            return Ok(LoadOutcome::Superseded);
        }

        let user = result?;
        self.selected.send_replace(Some(user));
        Ok(LoadOutcome::Applied)
    }

    /// Create remotely, then show the new user first. `total` is left as
    /// is until the next page load. A reset while the request is in flight
    /// turns the result into [`RosterError::Cancelled`].
    pub async fn create(&self, payload: &UserPayload) -> RosterResult<User> {
        let epoch = self.epoch.current();
        let user = self.gateway.create_user(payload).await?;
        self.check_epoch(epoch, "create")?;
        tracing::info!("[Collection] Created user {}", user.id);
        self.collection
            .send_modify(|collection| collection.insert_front(user.clone()));
        Ok(user)
    }

    /// Update remotely, then merge the answer into the cached entity.
    /// Returns `None` when the user is not cached; nothing is inserted.
    pub async fn update(
        &self,
        id: &UserId,
        payload: &UserPayload,
    ) -> RosterResult<Option<User>> {
        let epoch = self.epoch.current();
        let patch = self.gateway.update_user(id, payload).await?;
        self.check_epoch(epoch, "update")?;

        let mut merged = None;
        self.collection.send_if_modified(|collection| {
            merged = collection.merge(id, &patch);
            merged.is_some()
        });
        if merged.is_none() {
            tracing::debug!(
                "[Collection] Update for uncached user {} not applied locally",
                id
            );
        }
        Ok(merged)
    }

    /// Delete remotely, then drop from the cache. Returns the removed
    /// entity, or `None` when it was not cached.
    pub async fn remove(&self, id: &UserId) -> RosterResult<Option<User>> {
        let epoch = self.epoch.current();
        self.gateway.delete_user(id).await?;
        self.check_epoch(epoch, "remove")?;

        let mut removed = None;
        self.collection.send_if_modified(|collection| {
            removed = collection.remove(id);
            removed.is_some()
        });
        tracing::info!("[Collection] Deleted user {}", id);
        Ok(removed)
    }

    /// Empty the selected slot. A pending `load_one` will not refill it.
    pub fn clear_selected(&self) {
        self.selected_gate.issue();
        self.selected.send_replace(None);
    }

    /// Move the page cursor without fetching
    pub fn set_page(&self, page: u32) {
        self.collection.send_if_modified(|collection| {
            let before = collection.page();
            collection.set_page(page);
            collection.page() != before
        });
    }

    /// Drop everything cached and invalidate in-flight loads and mutations
    pub fn reset(&self) {
        self.epoch.issue();
        self.page_gate.issue();
        self.selected_gate.issue();
        self.collection
            .send_replace(UserCollection::new(self.default_per_page));
        self.selected.send_replace(None);
    }

    fn check_epoch(&self, epoch: u64, operation: &str) -> RosterResult<()> {
        if self.epoch.is_current(epoch) {
            return Ok(());
        }
        tracing::debug!(
            "[Collection] Store was reset during {}, result not applied",
            operation
        );
        Err(RosterError::Cancelled("store reset while the request was in flight"))
    }

    pub fn snapshot(&self) -> UserCollection {
        self.collection.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<UserCollection> {
        self.collection.subscribe()
    }

    pub fn selected(&self) -> Option<User> {
        self.selected.borrow().clone()
    }

    pub fn subscribe_selected(&self) -> watch::Receiver<Option<User>> {
        self.selected.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{GatewayError, MockRemoteGateway};
    use roster_model::{UserPage, UserPatch};

    fn user(id: u64) -> User {
        User {
            id: UserId::from(id),
            email: format!("user{id}@reqres.in"),
            first_name: "George".into(),
            last_name: "Bluth".into(),
            avatar: None,
        }
    }

    #[tokio::test]
    async fn failed_page_load_leaves_cache_untouched() {
        let mut gateway = MockRemoteGateway::new();
        let mut calls = 0;
        gateway.expect_fetch_users().times(2).returning(move |page| {
            calls += 1;
            if calls == 1 {
                Ok(UserPage {
                    data: vec![user(1), user(2)],
                    page,
                    per_page: 6,
                    total: 12,
                    total_pages: Some(2),
                })
            } else {
                Err(GatewayError::Network("connection reset".into()))
            }
        });

        let store = CollectionStore::new(Arc::new(gateway), 6);
        store.load_page(1).await.unwrap();
        let before = store.snapshot();

        assert!(store.load_page(2).await.is_err());
        assert_eq!(store.snapshot(), before);
    }

    #[tokio::test]
    async fn update_of_uncached_user_is_dropped() {
        let mut gateway = MockRemoteGateway::new();
        gateway.expect_update_user().times(1).returning(|_, _| {
            Ok(UserPatch {
                first_name: Some("A".into()),
                ..UserPatch::default()
            })
        });

        let store = CollectionStore::new(Arc::new(gateway), 6);
        let payload =
            UserPayload::new("a@reqres.in", "A", "B", "https://reqres.in/a.jpg");
        let merged = store.update(&UserId::from(5u64), &payload).await.unwrap();

        assert!(merged.is_none());
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn failed_delete_keeps_entity() {
        let mut gateway = MockRemoteGateway::new();
        gateway.expect_fetch_users().returning(|page| {
            Ok(UserPage {
                data: vec![user(3)],
                page,
                per_page: 6,
                total: 1,
                total_pages: None,
            })
        });
        gateway.expect_delete_user().returning(|_| {
            Err(GatewayError::Rejected {
                status: 500,
                message: None,
            })
        });

        let store = CollectionStore::new(Arc::new(gateway), 6);
        store.load_page(1).await.unwrap();
        assert!(store.remove(&UserId::from(3u64)).await.is_err());
        assert!(store.snapshot().contains(&UserId::from(3u64)));
    }

    #[tokio::test]
    async fn failed_single_load_leaves_slot_empty() {
        let mut gateway = MockRemoteGateway::new();
        let mut calls = 0;
        gateway.expect_fetch_user().times(2).returning(move |id| {
            calls += 1;
            if calls == 1 {
                Ok(User {
                    id: id.clone(),
                    ..user(2)
                })
            } else {
                Err(GatewayError::Rejected {
                    status: 404,
                    message: None,
                })
            }
        });

        let store = CollectionStore::new(Arc::new(gateway), 6);
        store.load_one(&UserId::from(2u64)).await.unwrap();
        assert!(store.selected().is_some());

        let err = store.load_one(&UserId::from(23u64)).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(store.selected().is_none());
    }

    #[tokio::test]
    async fn load_then_remove_only_user() {
        let mut gateway = MockRemoteGateway::new();
        gateway.expect_fetch_users().times(1).returning(|page| {
            Ok(UserPage {
                data: vec![user(1)],
                page,
                per_page: 6,
                total: 6,
                total_pages: None,
            })
        });
        gateway.expect_delete_user().times(1).returning(|_| Ok(()));

        let store = CollectionStore::new(Arc::new(gateway), 6);
        assert_eq!(store.load_page(1).await.unwrap(), LoadOutcome::Applied);
        let loaded = store.snapshot();
        assert_eq!(loaded.ids(), &[UserId::from(1u64)]);
        assert_eq!(loaded.total(), 6);

        store.remove(&UserId::from(1u64)).await.unwrap();
        let after = store.snapshot();
        assert!(after.ids().is_empty());
        assert!(after.users().next().is_none());
        assert!(after.is_consistent());
    }

    #[tokio::test]
    async fn reset_only_cancels_mutations_issued_before_it() {
        let mut gateway = MockRemoteGateway::new();
        gateway.expect_fetch_users().returning(|page| {
            Ok(UserPage {
                data: vec![user(1), user(2)],
                page,
                per_page: 6,
                total: 2,
                total_pages: None,
            })
        });
        gateway.expect_delete_user().returning(|_| Ok(()));

        let store = CollectionStore::new(Arc::new(gateway), 6);
        let before_reset = store.epoch.current();
        store.reset();
        assert!(store.check_epoch(before_reset, "remove").unwrap_err().is_cancelled());

        store.load_page(1).await.unwrap();
        store.remove(&UserId::from(1u64)).await.unwrap();
        assert_eq!(store.snapshot().ids(), &[UserId::from(2u64)]);
    }

    #[test]
    fn set_page_clamps_to_one() {
        let store = CollectionStore::new(Arc::new(MockRemoteGateway::new()), 6);
        store.set_page(0);
        assert_eq!(store.snapshot().page(), 1);
        store.set_page(4);
        assert_eq!(store.snapshot().page(), 4);
    }
}
