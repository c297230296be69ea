//! Persisted moderation state
//!
//! Both stores keep their records in a `DashMap` for lock-free reads and serialise every
//! read-modify-persist sequence behind a single per-store mutex, since persistence rewrites
//! the whole file.

mod directory;
mod ledger;
mod persist;

pub use directory::{IdentityDirectory, IdentityRecord};
pub use ledger::WarningLedger;

use std::path::PathBuf;
use thiserror::Error;

/// File name of the warning ledger inside the data directory
pub const WARNINGS_FILE: &str = "warnings.yaml";
/// File name of the identity directory inside the data directory
pub const IDENTITIES_FILE: &str = "identities.yaml";

/// Errors raised while persisting a store
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed
    #[error("Storage I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The store could not be encoded
    #[error("Failed to encode store: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

/// Result type for store operations
pub type StorageResult<T> = Result<T, StorageError>;
