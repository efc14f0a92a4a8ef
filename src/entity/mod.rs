//! Entities - named record collections with list / filter / CRUD semantics.
//!
//! ## Example
//!
//! ```ignore
//! use entity_store::{EntityStore, Filters, InMemoryStorage};
//! use serde_json::json;
//!
//! let projects = EntityStore::open("Project", InMemoryStorage::new())?;
//! let roof = projects.create(json!({ "name": "Maple St reroof" }).as_object().cloned().unwrap())?;
//!
//! let newest = projects.list(None, Some(10))?;
//! let active = projects.filter(&Filters::new().eq("project_status", "active"), Some("-created_date"))?;
//! projects.update(&roof.id, json!({ "project_status": "active" }).as_object().cloned().unwrap())?;
//! ```

mod changes;
mod error;
mod store;
mod user;

pub use changes::ChangeKind;
pub use error::StoreError;
pub use store::{storage_key, EntityStore, StoreOptions, DEFAULT_KEY_PREFIX};
pub use user::{AuthError, Credentials, SessionState, UserEntity, EMAIL_FIELD};
