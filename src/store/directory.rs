//! Identity directory
//!
//! The bot's own handle → identifier cache, filled by watching chat traffic. The platform
//! only resolves handles of current members it has already seen, so this keeps handles
//! resolvable after a user leaves. A handle that never produced an observed message stays
//! unknown.

use super::StorageResult;
use super::persist::{read_yaml, write_yaml};
use crate::model::UserId;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Last observed identity behind a handle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub user_id: UserId,
    pub display_name: String,
}

/// Store for handle → identity mappings, keyed by lower-cased handle
#[derive(Clone)]
pub struct IdentityDirectory {
    records: Arc<DashMap<String, IdentityRecord>>,
    write_lock: Arc<Mutex<()>>,
    path: Arc<PathBuf>,
}

impl IdentityDirectory {
    /// Create an empty directory persisting to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            records: Arc::new(DashMap::new()),
            write_lock: Arc::new(Mutex::new(())),
            path: Arc::new(path.into()),
        }
    }

    /// Load the directory from `path`, starting empty if the file is missing or invalid
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let directory = Self::new(path);

        if let Some(raw) = read_yaml::<BTreeMap<String, IdentityRecord>>(&directory.path).await {
            for (handle, record) in raw {
                directory.records.insert(handle.to_lowercase(), record);
            }
        }

        debug!("Loaded {} known handles", directory.records.len());
        directory
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record that `handle` currently belongs to `user_id`, replacing any earlier mapping.
    ///
    /// Empty handles are ignored. Every accepted observation is persisted immediately.
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` if the directory cannot be written; the mapping is restored.
    pub async fn remember(
        &self,
        handle: &str,
        user_id: UserId,
        display_name: &str,
    ) -> StorageResult<()> {
        if handle.is_empty() {
            return Ok(());
        }

        let key = handle.to_lowercase();
        let record = IdentityRecord {
            user_id,
            display_name: display_name.to_string(),
        };

        let _guard = self.write_lock.lock().await;
        let previous = self.records.insert(key.clone(), record);

        if let Err(e) = self.persist().await {
            match previous {
                Some(previous) => {
                    self.records.insert(key, previous);
                }
                None => {
                    self.records.remove(&key);
                }
            }
            return Err(e);
        }

        Ok(())
    }

    /// Look up a handle, ignoring case
    #[must_use]
    pub fn lookup(&self, handle: &str) -> Option<IdentityRecord> {
        self.records
            .get(&handle.to_lowercase())
            .map(|entry| entry.value().clone())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    async fn persist(&self) -> StorageResult<()> {
        let snapshot: BTreeMap<String, IdentityRecord> = self
            .records
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        write_yaml(&self.path, &snapshot).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory_in(dir: &tempfile::TempDir) -> IdentityDirectory {
        IdentityDirectory::new(dir.path().join("identities.yaml"))
    }

    #[tokio::test]
    async fn test_lookup_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let directory = directory_in(&dir);
        directory.remember("Alice", UserId(42), "Alice").await.unwrap();

        assert_eq!(directory.lookup("ALICE").unwrap().user_id, UserId(42));
        assert_eq!(directory.lookup("alice").unwrap().user_id, UserId(42));
        assert!(directory.lookup("bob").is_none());
    }

    #[tokio::test]
    async fn test_latest_observation_wins() {
        let dir = tempfile::tempdir().unwrap();
        let directory = directory_in(&dir);
        directory.remember("handle", UserId(1), "First").await.unwrap();
        directory.remember("HANDLE", UserId(2), "Second").await.unwrap();

        let record = directory.lookup("handle").unwrap();
        assert_eq!(record.user_id, UserId(2));
        assert_eq!(record.display_name, "Second");
        assert_eq!(directory.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_handle_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let directory = directory_in(&dir);
        directory.remember("", UserId(1), "Nobody").await.unwrap();

        assert!(directory.is_empty());
        assert!(!directory.path().exists());
    }

    #[tokio::test]
    async fn test_every_observation_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let directory = directory_in(&dir);
        directory.remember("Carol", UserId(7), "Carol").await.unwrap();

        let reloaded = IdentityDirectory::load(directory.path().to_path_buf()).await;
        let record = reloaded.lookup("carol").unwrap();
        assert_eq!(record.user_id, UserId(7));
        assert_eq!(record.display_name, "Carol");
    }

    #[tokio::test]
    async fn test_invalid_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("identities.yaml");
        std::fs::write(&path, "- just\n- a list\n").unwrap();

        let directory = IdentityDirectory::load(path).await;
        assert!(directory.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_observations_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let directory = directory_in(&dir);

        let tasks: Vec<_> = (0..16u64)
            .map(|id| {
                let directory = directory.clone();
                tokio::spawn(async move {
                    directory
                        .remember(&format!("user{id}"), UserId(id), "Someone")
                        .await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let reloaded = IdentityDirectory::load(directory.path().to_path_buf()).await;
        assert_eq!(reloaded.len(), 16);
    }
}
