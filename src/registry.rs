//! Entities - the application's stores, opened once at startup and shared.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::entity::{EntityStore, StoreError, StoreOptions, UserEntity};
use crate::storage::Storage;
use crate::typed::{TypedEntity, TypedStore};

pub const PROJECT: &str = "Project";
/// Read-side projection of projects used by the listing endpoint.
pub const PROJECT_DETAILS: &str = "ProjectDetails";
pub const CLIENT: &str = "Client";
pub const DAILY_UPDATE: &str = "DailyUpdate";
pub const PROJECT_COST: &str = "ProjectCost";
pub const USER: &str = "User";

/// Entities every registry opens.
pub const DEFAULT_ENTITIES: &[&str] = &[
    PROJECT,
    PROJECT_DETAILS,
    CLIENT,
    DAILY_UPDATE,
    PROJECT_COST,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryOptions {
    pub store: StoreOptions,
    /// Let `User.me()` fall back to the first user (development only).
    pub demo_login: bool,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            store: StoreOptions::default(),
            demo_login: true,
        }
    }
}

/// One store per entity name, all backed by the same storage adapter.
///
/// ## Example
///
/// ```ignore
/// let entities = Arc::new(Entities::open(InMemoryStorage::new(), RegistryOptions::default())?);
/// let projects = entities.projects();
/// let me = entities.users().me()?;
/// ```
pub struct Entities<S> {
    storage: S,
    options: RegistryOptions,
    stores: BTreeMap<String, EntityStore<S>>,
    users: UserEntity<S>,
}

impl<S: Storage + Clone> Entities<S> {
    /// Open the default entities plus `User`.
    pub fn open(storage: S, options: RegistryOptions) -> Result<Self, StoreError> {
        let users = UserEntity::new(
            EntityStore::open_with(USER, storage.clone(), &options.store)?,
            options.demo_login,
        );
        let mut entities = Self {
            storage,
            options,
            stores: BTreeMap::new(),
            users,
        };
        for name in DEFAULT_ENTITIES {
            entities.register(name)?;
        }
        Ok(entities)
    }

    /// Open an additional entity store. Re-registering a name keeps the
    /// existing store.
    pub fn register(&mut self, name: &str) -> Result<&EntityStore<S>, StoreError> {
        if name == USER {
            return Ok(self.users.store());
        }
        match self.stores.entry(name.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let store =
                    EntityStore::open_with(name, self.storage.clone(), &self.options.store)?;
                Ok(entry.insert(store))
            }
        }
    }
}

impl<S: Storage> Entities<S> {
    /// The store for `name`, including `User`.
    pub fn entity(&self, name: &str) -> Option<&EntityStore<S>> {
        if name == USER {
            return Some(self.users.store());
        }
        self.stores.get(name)
    }

    /// The store a typed entity lives in.
    pub fn typed<T: TypedEntity>(&self) -> Option<TypedStore<'_, S, T>> {
        self.entity(T::ENTITY).map(|store| store.typed::<T>())
    }

    /// Registered entity names, sorted, `User` included.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.stores.keys().map(String::as_str).collect();
        names.push(USER);
        names.sort_unstable();
        names
    }

    pub fn users(&self) -> &UserEntity<S> {
        &self.users
    }

    pub fn projects(&self) -> &EntityStore<S> {
        self.known(PROJECT)
    }

    pub fn project_details(&self) -> &EntityStore<S> {
        self.known(PROJECT_DETAILS)
    }

    pub fn clients(&self) -> &EntityStore<S> {
        self.known(CLIENT)
    }

    pub fn daily_updates(&self) -> &EntityStore<S> {
        self.known(DAILY_UPDATE)
    }

    pub fn project_costs(&self) -> &EntityStore<S> {
        self.known(PROJECT_COST)
    }

    /// The adapter every store writes through.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn known(&self, name: &str) -> &EntityStore<S> {
        &self.stores[name]
    }
}
