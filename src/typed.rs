//! Typed access - struct-shaped views over schema-less records.
//!
//! ## Example
//!
//! ```ignore
//! use entity_store::{EntityStore, InMemoryStorage, TypedEntity};
//!
//! #[derive(Serialize, Deserialize, TypedEntity)]
//! #[entity(name = "Client")]
//! struct Client {
//!     #[serde(default)]
//!     id: String,
//!     name: String,
//! }
//!
//! let clients = EntityStore::open(Client::ENTITY, InMemoryStorage::new())?;
//! let acme = clients.typed::<Client>().create(&Client { id: String::new(), name: "Acme".into() })?;
//! ```

use std::marker::PhantomData;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::entity::{EntityStore, StoreError};
use crate::query::Filters;
use crate::record::{Fields, Record};
use crate::storage::Storage;

/// A struct stored as records of one entity collection.
///
/// Usually derived: `#[derive(TypedEntity)]`, with `#[entity(name = "...")]`
/// when the entity name differs from the struct name.
pub trait TypedEntity: Serialize + DeserializeOwned {
    /// The entity (collection) name, e.g. "Project" or "DailyUpdate".
    const ENTITY: &'static str;
}

/// Typed wrapper over an [`EntityStore`].
///
/// Values are converted through JSON: the record's full object, including
/// `id` and the timestamps, is deserialized into `T`, and `T`'s fields are
/// merged into records on the way in.
pub struct TypedStore<'a, S, T> {
    store: &'a EntityStore<S>,
    _marker: PhantomData<T>,
}

impl<'a, S: Storage, T: TypedEntity> TypedStore<'a, S, T> {
    pub fn new(store: &'a EntityStore<S>) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    pub fn list(&self, order_by: Option<&str>, limit: Option<usize>) -> Result<Vec<T>, StoreError> {
        decode_all(self.store.list(order_by, limit)?)
    }

    pub fn filter(&self, filters: &Filters, order_by: Option<&str>) -> Result<Vec<T>, StoreError> {
        decode_all(self.store.filter(filters, order_by)?)
    }

    pub fn get(&self, id: &str) -> Result<Option<T>, StoreError> {
        self.store.get(id)?.map(|r| decode(&r)).transpose()
    }

    pub fn create(&self, value: &T) -> Result<T, StoreError> {
        decode(&self.store.create(encode(value)?)?)
    }

    /// Merge every serialized field of `value` into the record with `id`.
    pub fn update(&self, id: &str, value: &T) -> Result<Option<T>, StoreError> {
        self.store
            .update(id, encode(value)?)?
            .map(|r| decode(&r))
            .transpose()
    }

    pub fn delete(&self, id: &str) -> Result<bool, StoreError> {
        self.store.delete(id)
    }
}

impl<S: Storage> EntityStore<S> {
    /// A typed view of this store.
    pub fn typed<T: TypedEntity>(&self) -> TypedStore<'_, S, T> {
        TypedStore::new(self)
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Fields, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(fields) => Ok(fields),
        other => Err(StoreError::Serde(format!(
            "typed entity must serialize to an object, got {}",
            kind_name(&other)
        ))),
    }
}

fn decode<T: DeserializeOwned>(record: &Record) -> Result<T, StoreError> {
    Ok(serde_json::from_value(record.to_value())?)
}

fn decode_all<T: DeserializeOwned>(records: Vec<Record>) -> Result<Vec<T>, StoreError> {
    records.iter().map(decode).collect()
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
