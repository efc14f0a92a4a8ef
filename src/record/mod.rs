//! Records - schema-less JSON objects with store-owned identity and timestamps.
//!
//! The store owns `id`, `created_date` and `updated_date`; everything else is
//! caller data passed through untouched.

mod id;

use std::borrow::Cow;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use id::IdStrategy;

/// Field name of the record identifier.
pub const ID: &str = "id";
/// Field name of the creation timestamp.
pub const CREATED_DATE: &str = "created_date";
/// Field name of the last-update timestamp.
pub const UPDATED_DATE: &str = "updated_date";

/// Caller-defined record fields.
pub type Fields = Map<String, Value>;

/// A single stored record.
///
/// Serializes as one flat JSON object, e.g.
/// `{"id":"...","created_date":"2024-05-01T10:00:00.000Z","name":"Roof A"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub created_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<String>,
    #[serde(flatten)]
    pub fields: Fields,
}

impl Record {
    /// Build a new record. Store-owned keys in `data` are ignored.
    pub fn new(id: impl Into<String>, created_date: impl Into<String>, data: Fields) -> Self {
        let mut record = Self {
            id: id.into(),
            created_date: created_date.into(),
            updated_date: None,
            fields: Fields::new(),
        };
        record.merge(data);
        record
    }

    /// Look up a field by name, including the store-owned ones.
    pub fn get(&self, field: &str) -> Option<Cow<'_, Value>> {
        match field {
            ID => Some(Cow::Owned(Value::String(self.id.clone()))),
            CREATED_DATE => Some(Cow::Owned(Value::String(self.created_date.clone()))),
            UPDATED_DATE => self
                .updated_date
                .as_ref()
                .map(|d| Cow::Owned(Value::String(d.clone()))),
            _ => self.fields.get(field).map(Cow::Borrowed),
        }
    }

    /// Shallow merge: top-level keys in `data` replace existing ones, other
    /// fields are kept. `id`, `created_date` and `updated_date` are skipped.
    pub fn merge(&mut self, data: Fields) {
        for (key, value) in data {
            if is_store_owned(&key) {
                continue;
            }
            self.fields.insert(key, value);
        }
    }

    /// Parsed `created_date`, if it is valid RFC 3339.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.created_date)
    }

    /// Parsed `updated_date`, if present and valid RFC 3339.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_date.as_deref().and_then(parse_timestamp)
    }

    /// The record as a single JSON object.
    pub fn to_value(&self) -> Value {
        let mut object = Map::with_capacity(self.fields.len() + 3);
        object.insert(ID.into(), Value::String(self.id.clone()));
        object.insert(CREATED_DATE.into(), Value::String(self.created_date.clone()));
        if let Some(updated) = &self.updated_date {
            object.insert(UPDATED_DATE.into(), Value::String(updated.clone()));
        }
        for (key, value) in &self.fields {
            object.insert(key.clone(), value.clone());
        }
        Value::Object(object)
    }
}

/// True for the keys the store assigns itself.
pub fn is_store_owned(key: &str) -> bool {
    matches!(key, ID | CREATED_DATE | UPDATED_DATE)
}

/// Current time formatted like `Date.prototype.toISOString`:
/// UTC, millisecond precision, `Z` suffix.
pub fn timestamp_now() -> String {
    format_timestamp(Utc::now())
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}
