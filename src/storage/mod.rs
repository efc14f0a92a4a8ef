//! Storage - the persistence adapter under every entity collection.
//!
//! A `Storage` maps string keys to JSON text, the same contract browser
//! local storage offers. Each entity store owns one key and rewrites the
//! whole collection under it after every mutation.
//!
//! ## Example
//!
//! ```ignore
//! use entity_store::{FileStorage, InMemoryStorage, Storage};
//!
//! let storage = InMemoryStorage::new();
//! storage.write("mock_project", "[]")?;
//! assert_eq!(storage.read("mock_project")?.as_deref(), Some("[]"));
//!
//! let on_disk = FileStorage::open("./data")?;
//! ```

mod file;
mod in_memory;

use thiserror::Error;

/// Key-value persistence for serialized collections.
pub trait Storage: Send + Sync {
    /// Read the value stored under `key`. Returns None if the key is absent.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Returns true if it existed.
    fn remove(&self, key: &str) -> Result<bool, StorageError>;

    /// All keys currently stored.
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// Error type for persistence adapter operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error on {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("storage quota exceeded writing {key} ({needed} bytes needed, quota {quota})")]
    QuotaExceeded {
        key: String,
        needed: usize,
        quota: usize,
    },
    #[error("storage lock poisoned during {0}")]
    LockPoisoned(&'static str),
}

pub use file::FileStorage;
pub use in_memory::InMemoryStorage;
