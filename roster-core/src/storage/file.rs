use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use super::KeyValueStore;
use crate::error::StorageError;

pub(crate) const STATE_FILE: &str = "roster-state.json";

/// JSON file backed store
///
/// Every write replaces the whole file through a temp file and a rename, so
/// readers see either the old or the new contents.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Store under `dir` using the default file name
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(STATE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Ok(BTreeMap::new());
            }
            Err(err) => return Err(StorageError::ReadFailed(err)),
        };

        match serde_json::from_slice(&data) {
            Ok(map) => Ok(map),
            Err(err) => {
                tracing::warn!(
                    "[FileStore] Ignoring unreadable state file {}: {}",
                    self.path.display(),
                    err
                );
                Ok(BTreeMap::new())
            }
        }
    }

    async fn persist(
        &self,
        map: &BTreeMap<String, String>,
    ) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(StorageError::WriteFailed)?;
        }

        let json = serde_json::to_vec_pretty(map).map_err(StorageError::Encode)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(StorageError::WriteFailed)?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(StorageError::WriteFailed)?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load().await?.remove(key))
    }

    async fn set_many(
        &self,
        entries: &[(&str, String)],
    ) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.load().await?;
        for (key, value) in entries {
            map.insert((*key).to_string(), value.clone());
        }
        self.persist(&map).await
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.load().await?;
        let before = map.len();
        for key in keys {
            map.remove(*key);
        }
        if map.len() == before {
            return Ok(());
        }
        self.persist(&map).await
    }
}
