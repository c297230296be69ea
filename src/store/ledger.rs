//! Warning ledger
//!
//! Accumulated warning counts per (chat, user). A key is present only while its count is
//! non-zero: clearing removes the entry rather than storing zero.

use super::StorageResult;
use super::persist::{read_yaml, write_yaml};
use crate::model::{ChatId, UserId};
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Store for warning counts
#[derive(Clone)]
pub struct WarningLedger {
    counts: Arc<DashMap<(ChatId, UserId), u32>>,
    /// Held across every read-modify-persist sequence
    write_lock: Arc<Mutex<()>>,
    path: Arc<PathBuf>,
}

impl WarningLedger {
    /// Create an empty ledger persisting to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            counts: Arc::new(DashMap::new()),
            write_lock: Arc::new(Mutex::new(())),
            path: Arc::new(path.into()),
        }
    }

    /// Load the ledger from `path`.
    ///
    /// A missing file yields an empty ledger, and so does any file that is not a mapping of
    /// `"<chat>_<user>"` keys to counts. Zero counts are dropped.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let ledger = Self::new(path);

        if let Some(raw) = read_yaml::<BTreeMap<String, u32>>(&ledger.path).await {
            match decode(raw) {
                Some(entries) => {
                    for (key, count) in entries.into_iter().filter(|(_, count)| *count > 0) {
                        ledger.counts.insert(key, count);
                    }
                }
                None => warn!(
                    "Warning ledger {} has unrecognised keys, starting empty",
                    ledger.path.display()
                ),
            }
        }

        debug!("Loaded {} warning records", ledger.counts.len());
        ledger
    }

    /// Path of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current warning count, zero when absent
    #[must_use]
    pub fn get(&self, chat: ChatId, user: UserId) -> u32 {
        self.counts.get(&(chat, user)).map_or(0, |entry| *entry.value())
    }

    /// Add one warning and persist, returning the new count
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` if the ledger cannot be written; the increment is rolled back.
    pub async fn add(&self, chat: ChatId, user: UserId) -> StorageResult<u32> {
        let _guard = self.write_lock.lock().await;

        let previous = self.get(chat, user);
        let count = previous.saturating_add(1);
        self.counts.insert((chat, user), count);

        if let Err(e) = self.persist().await {
            self.restore(chat, user, previous);
            return Err(e);
        }

        Ok(count)
    }

    /// Remove all warnings for the pair and persist
    ///
    /// Returns `false` without touching the file when there was nothing to clear.
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` if the ledger cannot be written; the entry is restored.
    pub async fn clear(&self, chat: ChatId, user: UserId) -> StorageResult<bool> {
        let _guard = self.write_lock.lock().await;

        let Some((_, previous)) = self.counts.remove(&(chat, user)) else {
            return Ok(false);
        };

        if let Err(e) = self.persist().await {
            self.restore(chat, user, previous);
            return Err(e);
        }

        Ok(true)
    }

    /// Number of (chat, user) pairs holding warnings
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    fn restore(&self, chat: ChatId, user: UserId, previous: u32) {
        if previous == 0 {
            self.counts.remove(&(chat, user));
        } else {
            self.counts.insert((chat, user), previous);
        }
    }

    async fn persist(&self) -> StorageResult<()> {
        let snapshot: BTreeMap<String, u32> = self
            .counts
            .iter()
            .map(|entry| {
                let (chat, user) = entry.key();
                (encode_key(*chat, *user), *entry.value())
            })
            .collect();

        write_yaml(&self.path, &snapshot).await
    }
}

fn encode_key(chat: ChatId, user: UserId) -> String {
    format!("{chat}_{user}")
}

fn decode_key(key: &str) -> Option<(ChatId, UserId)> {
    let (chat, user) = key.rsplit_once('_')?;
    Some((ChatId(chat.parse().ok()?), UserId(user.parse().ok()?)))
}

fn decode(raw: BTreeMap<String, u32>) -> Option<Vec<((ChatId, UserId), u32)>> {
    raw.into_iter()
        .map(|(key, count)| decode_key(&key).map(|key| (key, count)))
        .collect()
}
