extern crate self as entity_store;

pub mod commands;
pub mod config;
pub mod entity;
#[cfg(feature = "http")]
pub mod http;
pub mod listing;
pub mod microsvc;
pub mod query;
pub mod record;
pub mod registry;
pub mod storage;
pub mod token;
mod typed;

pub use config::Config;
pub use entity::{
    AuthError, ChangeKind, Credentials, EntityStore, SessionState, StoreError, StoreOptions,
    UserEntity,
};
pub use listing::{list_projects, FallbackPolicy, ListParams, ProjectListing, ProjectQuery};
pub use query::{Filter, Filters, OrderBy, Predicate};
pub use record::{Fields, IdStrategy, Record};
pub use registry::{Entities, RegistryOptions};
pub use storage::{FileStorage, InMemoryStorage, Storage, StorageError};
pub use token::{Claims, TokenError, TokenVerifier};
pub use typed::{TypedEntity, TypedStore};

// Derive macro for `TypedEntity` (shares the trait's name, lives in the macro namespace)
pub use entity_store_macros::TypedEntity;
