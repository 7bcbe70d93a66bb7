use roster_model::{User, UserId, UserPage, UserPatch};
use std::collections::{HashMap, HashSet};

use crate::config::DEFAULT_PER_PAGE;

/// Normalized cache of the current users page
///
/// `ids` carries display order. Every id in `ids` has an entry in
/// `entities` and vice versa; `ids` never holds duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCollection {
    entities: HashMap<UserId, User>,
    ids: Vec<UserId>,
    page: u32,
    per_page: u32,
    total: u64,
}

impl Default for UserCollection {
    fn default() -> Self {
        Self::new(DEFAULT_PER_PAGE)
    }
}

impl UserCollection {
    pub fn new(per_page: u32) -> Self {
        Self {
            entities: HashMap::new(),
            ids: Vec::new(),
            page: 1,
            per_page: per_page.max(1),
            total: 0,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn ids(&self) -> &[UserId] {
        &self.ids
    }

    pub fn get(&self, id: &UserId) -> Option<&User> {
        self.entities.get(id)
    }

    pub fn contains(&self, id: &UserId) -> bool {
        self.entities.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Entities in display order
    pub fn users(&self) -> impl Iterator<Item = &User> + '_ {
        self.ids.iter().filter_map(|id| self.entities.get(id))
    }

    /// Swap in a freshly fetched page. Repeated ids keep their first
    /// position and their last payload.
    pub(crate) fn replace_page(&mut self, page: UserPage) {
        let mut entities = HashMap::with_capacity(page.data.len());
        let mut ids = Vec::with_capacity(page.data.len());
        for user in page.data {
            if !entities.contains_key(&user.id) {
                ids.push(user.id.clone());
            }
            entities.insert(user.id.clone(), user);
        }

        self.entities = entities;
        self.ids = ids;
        self.page = page.page.max(1);
        if page.per_page > 0 {
            self.per_page = page.per_page;
        }
        self.total = page.total;
    }

    /// Put `user` first, replacing any entity already cached under its id.
    pub(crate) fn insert_front(&mut self, user: User) {
        self.ids.retain(|id| id != &user.id);
        self.ids.insert(0, user.id.clone());
        self.entities.insert(user.id.clone(), user);
    }

    /// Shallow-merge `patch` into the cached entity. Returns the merged
    /// entity, or `None` when `id` is not cached.
    pub(crate) fn merge(&mut self, id: &UserId, patch: &UserPatch) -> Option<User> {
        let entity = self.entities.get_mut(id)?;
        entity.apply(patch);
        Some(entity.clone())
    }

    pub(crate) fn remove(&mut self, id: &UserId) -> Option<User> {
        let removed = self.entities.remove(id)?;
        self.ids.retain(|existing| existing != id);
        Some(removed)
    }

    pub(crate) fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    /// Structural invariants hold
    pub fn is_consistent(&self) -> bool {
        let unique: HashSet<&UserId> = self.ids.iter().collect();
        unique.len() == self.ids.len()
            && self.ids.len() == self.entities.len()
            && self.ids.iter().all(|id| self.entities.contains_key(id))
            && self.page >= 1
            && self.per_page >= 1
    }
}
