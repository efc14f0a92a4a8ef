//! Context passed to command handlers.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::HandlerError;
use super::session::Session;
use crate::entity::EntityStore;
use crate::record::Record;
use crate::registry::{Entities, USER};
use crate::storage::Storage;
use crate::token::{Claims, TokenVerifier};

/// What a handler sees: its JSON input, the caller's session, the entity
/// registry and the token verifier the service was built with.
///
/// ## Example
///
/// ```ignore
/// pub fn handle<S: Storage>(ctx: &Context<S>) -> Result<Value, HandlerError> {
///     let user = ctx.current_user()?;
///     let store = ctx.store("Project")?;
///     // ...
/// }
/// ```
pub struct Context<'a, S> {
    input: Value,
    session: Session,
    entities: &'a Entities<S>,
    tokens: &'a TokenVerifier,
}

impl<'a, S: Storage> Context<'a, S> {
    pub(crate) fn new(
        input: Value,
        session: Session,
        entities: &'a Entities<S>,
        tokens: &'a TokenVerifier,
    ) -> Self {
        Self {
            input,
            session,
            entities,
            tokens,
        }
    }

    /// Deserialize the input payload.
    pub fn input<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
        serde_json::from_value(self.input.clone())
            .map_err(|e| HandlerError::DecodeFailed(e.to_string()))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The verified claims, or `Unauthorized` for anonymous callers.
    pub fn claims(&self) -> Result<&Claims, HandlerError> {
        self.session
            .claims()
            .ok_or_else(|| HandlerError::Unauthorized("sign in with a bearer token".into()))
    }

    pub fn user_id(&self) -> Result<&str, HandlerError> {
        self.claims().map(|c| c.user_id.as_str())
    }

    pub fn role(&self) -> Option<&str> {
        self.session.role()
    }

    /// The caller's user record, read fresh from the `User` store.
    pub fn current_user(&self) -> Result<Record, HandlerError> {
        let user_id = self.user_id()?;
        self.entities
            .users()
            .get(user_id)?
            .ok_or_else(|| HandlerError::Unauthorized(format!("user {} no longer exists", user_id)))
    }

    pub fn entities(&self) -> &'a Entities<S> {
        self.entities
    }

    pub fn tokens(&self) -> &'a TokenVerifier {
        self.tokens
    }

    /// The store named `name`. `User` records are only visible to signed-in
    /// callers.
    pub fn store(&self, name: &str) -> Result<&'a EntityStore<S>, HandlerError> {
        if name == USER {
            self.claims()?;
        }
        self.entities
            .entity(name)
            .ok_or_else(|| HandlerError::UnknownEntity(name.to_string()))
    }

    /// True when `field` is present and a non-empty string.
    pub fn has_str(&self, field: &str) -> bool {
        self.input
            .get(field)
            .and_then(Value::as_str)
            .is_some_and(|s| !s.is_empty())
    }

    /// True when `field` is present and a JSON object.
    pub fn has_object(&self, field: &str) -> bool {
        self.input.get(field).is_some_and(Value::is_object)
    }
}
