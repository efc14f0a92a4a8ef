//! UserEntity - a user collection plus the "currently signed in" state.

use std::ops::Deref;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use super::{EntityStore, StoreError};
use crate::query::Filters;
use crate::record::Record;
use crate::storage::Storage;

/// Field matched against `Credentials::email` on login.
pub const EMAIL_FIELD: &str = "email";

/// Login input. The password is accepted for API compatibility only; user
/// records carry no password to check it against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl Credentials {
    pub fn email(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Whether a user is currently signed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

/// The user collection with session state layered on top.
///
/// Derefs to the underlying [`EntityStore`] for CRUD.
///
/// With the demo fallback enabled, [`me`](Self::me) signs in the first user
/// of the collection when nobody is signed in. That is a development stub,
/// not authentication, and is logged as such.
pub struct UserEntity<S> {
    store: EntityStore<S>,
    current: RwLock<Option<String>>,
    demo_login: bool,
}

impl<S: Storage> UserEntity<S> {
    pub fn new(store: EntityStore<S>, demo_login: bool) -> Self {
        Self {
            store,
            current: RwLock::new(None),
            demo_login,
        }
    }

    /// Whether `me` falls back to the first user.
    pub fn demo_login(&self) -> bool {
        self.demo_login
    }

    /// The signed-in user.
    ///
    /// The record is re-read on every call, so it reflects updates; if the
    /// signed-in user was deleted the session drops back to anonymous.
    pub fn me(&self) -> Result<Option<Record>, StoreError> {
        if let Some(id) = self.current_id() {
            if let Some(user) = self.store.get(&id)? {
                return Ok(Some(user));
            }
            self.logout();
        }

        if !self.demo_login {
            return Ok(None);
        }

        let first = self.store.first()?;
        if let Some(user) = &first {
            warn!(user_id = %user.id, "no user signed in, using first user as demo login");
            self.set_current(Some(user.id.clone()));
        }
        Ok(first)
    }

    /// The first user whose email matches, without touching the session.
    pub fn authenticate(&self, credentials: &Credentials) -> Result<Record, AuthError> {
        let users = self.store.find(&Filters::new())?;
        users
            .into_iter()
            .find(|u| {
                u.fields.get(EMAIL_FIELD).and_then(|v| v.as_str())
                    == Some(credentials.email.as_str())
            })
            .ok_or(AuthError::InvalidCredentials)
    }

    /// Sign in the first user whose email matches.
    pub fn login(&self, credentials: &Credentials) -> Result<Record, AuthError> {
        let user = self.authenticate(credentials)?;
        info!(user_id = %user.id, "user signed in");
        self.set_current(Some(user.id.clone()));
        Ok(user)
    }

    /// Clear the session. Always succeeds.
    pub fn logout(&self) {
        self.set_current(None);
    }

    pub fn session_state(&self) -> SessionState {
        match self.current_id() {
            Some(_) => SessionState::Authenticated,
            None => SessionState::Anonymous,
        }
    }

    pub fn store(&self) -> &EntityStore<S> {
        &self.store
    }

    fn current_id(&self) -> Option<String> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_current(&self, id: Option<String>) {
        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = id;
    }
}

impl<S> Deref for UserEntity<S> {
    type Target = EntityStore<S>;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}
