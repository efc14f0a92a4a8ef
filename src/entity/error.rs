use thiserror::Error;

use crate::storage::StorageError;

/// Error type for entity store operations.
///
/// Not-found is never an error: lookups return `Option` and deletes return
/// `bool`. These variants cover the conditions a caller cannot act around.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The persistence adapter failed (I/O, quota).
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// The stored collection is not a JSON array of records.
    #[error("stored collection {key} is corrupted: {message}")]
    Corrupted { key: String, message: String },
    /// Converting between records and typed values failed.
    #[error("record serialization error: {0}")]
    Serde(String),
    /// No unique id could be generated for a new record.
    #[error("could not generate a unique id for {entity} after {attempts} attempts")]
    DuplicateId { entity: String, attempts: usize },
    /// A collection lock was poisoned by a panicking writer.
    #[error("entity store lock poisoned during {0}")]
    LockPoisoned(&'static str),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serde(err.to_string())
    }
}
