//! String key-value persistence for session and preference state
//!
//! Multi-key writes and removals are applied as one unit so a crash can never
//! leave half a session behind.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use std::fmt::Debug;

use crate::error::StorageError;

#[async_trait]
pub trait KeyValueStore: Send + Sync + Debug {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write every entry or none of them
    async fn set_many(
        &self,
        entries: &[(&str, String)],
    ) -> Result<(), StorageError>;

    /// Remove every key or none of them; absent keys are ignored
    async fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError>;

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.set_many(&[(key, value)]).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.remove_many(&[key]).await
    }
}
