//! EntityStore - one named collection of schema-less records.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use super::changes::ChangeKind;
#[cfg(feature = "emitter")]
use super::changes::ChangeFeed;
use super::StoreError;
use crate::query::{Filters, OrderBy, DEFAULT_LIST_ORDER};
use crate::record::{timestamp_now, Fields, IdStrategy, Record};
use crate::storage::Storage;

/// Prefix of every collection's storage key.
pub const DEFAULT_KEY_PREFIX: &str = "mock_";

const MAX_ID_ATTEMPTS: usize = 8;

/// Options shared by the stores of one application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    pub key_prefix: String,
    pub id_strategy: IdStrategy,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            id_strategy: IdStrategy::default(),
        }
    }
}

/// Storage key of an entity's collection: `<prefix><lowercased name>`.
pub fn storage_key(prefix: &str, entity: &str) -> String {
    format!("{}{}", prefix, entity.to_lowercase())
}

/// A uniform CRUD and query surface over one named collection.
///
/// The collection is loaded from storage when the store is opened and
/// rewritten in full after every mutation. Each mutation holds the
/// collection's write lock from the in-memory change through the storage
/// write, so concurrent writers to one collection are serialized. A failed
/// storage write rolls the in-memory change back.
pub struct EntityStore<S> {
    name: String,
    storage_key: String,
    id_strategy: IdStrategy,
    storage: S,
    records: RwLock<Vec<Record>>,
    #[cfg(feature = "emitter")]
    changes: ChangeFeed,
}

impl<S: Storage> EntityStore<S> {
    /// Open the collection for `name` with default options.
    pub fn open(name: impl Into<String>, storage: S) -> Result<Self, StoreError> {
        Self::open_with(name, storage, &StoreOptions::default())
    }

    /// Open the collection for `name`, loading any stored records.
    pub fn open_with(
        name: impl Into<String>,
        storage: S,
        options: &StoreOptions,
    ) -> Result<Self, StoreError> {
        let name = name.into();
        let storage_key = storage_key(&options.key_prefix, &name);
        let records = load(&storage, &storage_key)?;
        debug!(entity = %name, key = %storage_key, records = records.len(), "opened entity store");

        Ok(Self {
            name,
            storage_key,
            id_strategy: options.id_strategy,
            storage,
            records: RwLock::new(records),
            #[cfg(feature = "emitter")]
            changes: ChangeFeed::new(),
        })
    }

    /// The entity name this store was opened with.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn id_strategy(&self) -> IdStrategy {
        self.id_strategy
    }

    /// All records, sorted by `order_by` (default `-created_date`) and
    /// truncated to `limit` when it is positive.
    pub fn list(
        &self,
        order_by: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<Record>, StoreError> {
        self.query(
            &Filters::new(),
            Some(order_by.unwrap_or(DEFAULT_LIST_ORDER)),
            limit,
        )
    }

    /// Records matching every filter. Without `order_by` the result keeps
    /// insertion order.
    pub fn filter(
        &self,
        filters: &Filters,
        order_by: Option<&str>,
    ) -> Result<Vec<Record>, StoreError> {
        self.query(filters, order_by, None)
    }

    /// Same as `filter(filters, None)`: insertion order, unlike `list`.
    pub fn find(&self, filters: &Filters) -> Result<Vec<Record>, StoreError> {
        self.filter(filters, None)
    }

    /// Filter, then sort, then truncate. The collection itself is untouched.
    pub fn query(
        &self,
        filters: &Filters,
        order_by: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<Record>, StoreError> {
        let mut matched: Vec<Record> = {
            let records = self.read("query")?;
            records
                .iter()
                .filter(|r| filters.matches(r))
                .cloned()
                .collect()
        };

        if let Some(order) = order_by.and_then(OrderBy::parse) {
            order.sort(&mut matched);
        }
        if let Some(limit) = limit.filter(|n| *n > 0) {
            matched.truncate(limit);
        }
        Ok(matched)
    }

    /// The record with `id`, if any.
    pub fn find_one(&self, id: &str) -> Result<Option<Record>, StoreError> {
        let records = self.read("find_one")?;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    /// Alias for [`find_one`](Self::find_one).
    pub fn get(&self, id: &str) -> Result<Option<Record>, StoreError> {
        self.find_one(id)
    }

    /// First record in insertion order.
    pub fn first(&self) -> Result<Option<Record>, StoreError> {
        let records = self.read("first")?;
        Ok(records.first().cloned())
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        Ok(self.read("count")?.len())
    }

    /// Create a record from `data`. The store assigns `id` and
    /// `created_date`; caller values for those keys are discarded.
    pub fn create(&self, data: Fields) -> Result<Record, StoreError> {
        let record = {
            let mut records = self.write("create")?;
            let id = self.unique_id(&records)?;
            let record = Record::new(id, timestamp_now(), data);

            records.push(record.clone());
            if let Err(err) = self.persist(&records) {
                records.pop();
                return Err(err);
            }
            record
        };

        debug!(entity = %self.name, id = %record.id, "created record");
        self.notify(ChangeKind::Created, &record.id);
        Ok(record)
    }

    /// Shallow-merge `data` into the record with `id` and stamp
    /// `updated_date`. Returns None when no such record exists.
    pub fn update(&self, id: &str, data: Fields) -> Result<Option<Record>, StoreError> {
        let updated = {
            let mut records = self.write("update")?;
            let Some(index) = records.iter().position(|r| r.id == id) else {
                return Ok(None);
            };

            let previous = records[index].clone();
            let record = &mut records[index];
            record.merge(data);
            record.updated_date = Some(timestamp_now());
            let updated = record.clone();

            if let Err(err) = self.persist(&records) {
                records[index] = previous;
                return Err(err);
            }
            updated
        };

        debug!(entity = %self.name, id, "updated record");
        self.notify(ChangeKind::Updated, id);
        Ok(Some(updated))
    }

    /// Remove the record with `id`. Returns false when it does not exist.
    pub fn delete(&self, id: &str) -> Result<bool, StoreError> {
        {
            let mut records = self.write("delete")?;
            let Some(index) = records.iter().position(|r| r.id == id) else {
                return Ok(false);
            };

            let removed = records.remove(index);
            if let Err(err) = self.persist(&records) {
                records.insert(index, removed);
                return Err(err);
            }
        }

        debug!(entity = %self.name, id, "deleted record");
        self.notify(ChangeKind::Deleted, id);
        Ok(true)
    }

    /// Remove every record and the stored key. Returns how many were removed.
    pub fn clear(&self) -> Result<usize, StoreError> {
        let mut records = self.write("clear")?;
        self.storage.remove(&self.storage_key)?;
        let removed = records.len();
        records.clear();
        debug!(entity = %self.name, removed, "cleared collection");
        Ok(removed)
    }

    /// Re-read the collection from storage, discarding in-memory state.
    pub fn reload(&self) -> Result<usize, StoreError> {
        let loaded = load(&self.storage, &self.storage_key)?;
        let mut records = self.write("reload")?;
        *records = loaded;
        Ok(records.len())
    }

    /// Register a listener for one kind of change. The callback receives the
    /// record id, on a background thread, after the change is persisted.
    #[cfg(feature = "emitter")]
    pub fn on_change<F>(&self, kind: ChangeKind, callback: F) -> Result<(), StoreError>
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        self.changes.on(kind, callback)
    }

    fn unique_id(&self, records: &[Record]) -> Result<String, StoreError> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.id_strategy.generate();
            if !records.iter().any(|r| r.id == id) {
                return Ok(id);
            }
        }
        Err(StoreError::DuplicateId {
            entity: self.name.clone(),
            attempts: MAX_ID_ATTEMPTS,
        })
    }

    fn persist(&self, records: &[Record]) -> Result<(), StoreError> {
        let json = serde_json::to_string(records)?;
        self.storage.write(&self.storage_key, &json)?;
        Ok(())
    }

    #[cfg(feature = "emitter")]
    fn notify(&self, kind: ChangeKind, id: &str) {
        self.changes.emit(kind, id);
    }

    #[cfg(not(feature = "emitter"))]
    fn notify(&self, _kind: ChangeKind, _id: &str) {}

    fn read(&self, operation: &'static str) -> Result<RwLockReadGuard<'_, Vec<Record>>, StoreError> {
        self.records
            .read()
            .map_err(|_| StoreError::LockPoisoned(operation))
    }

    fn write(
        &self,
        operation: &'static str,
    ) -> Result<RwLockWriteGuard<'_, Vec<Record>>, StoreError> {
        self.records
            .write()
            .map_err(|_| StoreError::LockPoisoned(operation))
    }
}

fn load<S: Storage>(storage: &S, key: &str) -> Result<Vec<Record>, StoreError> {
    match storage.read(key)? {
        Some(json) => serde_json::from_str(&json).map_err(|e| StoreError::Corrupted {
            key: key.to_string(),
            message: e.to_string(),
        }),
        None => Ok(Vec::new()),
    }
}
