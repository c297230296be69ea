use super::{StorageError, StorageResult};
use serde::{Serialize, de::DeserializeOwned};
use std::io::ErrorKind;
use std::path::Path;
use tracing::warn;

/// Read a YAML store, treating a missing, unreadable or malformed file as absent.
///
/// Only a clean parse yields `Some`; callers fall back to an empty store otherwise so a
/// damaged file never blocks startup.
pub(crate) async fn read_yaml<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return None,
        Err(e) => {
            warn!("Could not read {}, starting empty: {e}", path.display());
            return None;
        }
    };

    match serde_yaml::from_str::<T>(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring invalid store file {}: {e}", path.display());
            None
        }
    }
}

/// Overwrite a YAML store with `value`.
///
/// The document is written to a sibling temporary file and renamed into place, so a crash
/// mid-write leaves the previous version intact.
pub(crate) async fn write_yaml<T: Serialize>(path: &Path, value: &T) -> StorageResult<()> {
    let yaml = serde_yaml::to_string(value)?;

    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| io_error(dir, source))?;
    }

    let tmp = path.with_extension("yaml.tmp");
    tokio::fs::write(&tmp, yaml)
        .await
        .map_err(|source| io_error(&tmp, source))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|source| io_error(path, source))?;

    Ok(())
}

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn test_missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let value: Option<BTreeMap<String, u32>> = read_yaml(&dir.path().join("nope.yaml")).await;
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_write_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.yaml");
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), 1u32);

        write_yaml(&path, &map).await.expect("write should succeed");

        let back: Option<BTreeMap<String, u32>> = read_yaml(&path).await;
        assert_eq!(back, Some(map));
        assert!(!path.with_extension("yaml.tmp").exists());
    }

    #[tokio::test]
    async fn test_write_into_file_path_fails_with_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let result = write_yaml(&blocker.join("store.yaml"), &BTreeMap::<String, u32>::new()).await;
        assert!(matches!(result, Err(StorageError::Io { .. })));
    }
}
