//! Service - command registry and dispatch over the entity registry.
//!
//! `Service<S>` owns the [`Entities`] registry and the [`TokenVerifier`]
//! that issued sessions are checked (and login tokens minted) with. Each
//! handler receives a [`Context`] and returns `Result<Value, HandlerError>`.
//!
//! ## Example
//!
//! ```ignore
//! let service = microsvc::Service::new(entities, TokenVerifier::unsigned())
//!     .register("project.count", |_| true, |ctx| {
//!         Ok(json!({ "count": ctx.entities().projects().count()? }))
//!     });
//!
//! let result = service.dispatch("project.count", json!({}), Session::new());
//! ```

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, warn};

use super::context::Context;
use super::error::HandlerError;
use super::session::Session;
use crate::registry::Entities;
use crate::storage::Storage;
use crate::token::TokenVerifier;

type Guard<S> = Box<dyn Fn(&Context<S>) -> bool + Send + Sync>;
type Handle<S> = Box<dyn Fn(&Context<S>) -> Result<Value, HandlerError> + Send + Sync>;

struct Command<S> {
    guard: Guard<S>,
    handle: Handle<S>,
}

/// Routes named commands to handler functions.
pub struct Service<S> {
    entities: Entities<S>,
    tokens: TokenVerifier,
    commands: BTreeMap<&'static str, Command<S>>,
}

impl<S: Storage + 'static> Service<S> {
    pub fn new(entities: Entities<S>, tokens: TokenVerifier) -> Self {
        Self {
            entities,
            tokens,
            commands: BTreeMap::new(),
        }
    }

    /// Register a command. A guard returning `false` rejects the input with
    /// `HandlerError::GuardRejected` before the handler runs. Re-registering
    /// a name replaces it.
    pub fn register<G, F>(mut self, name: &'static str, guard: G, handle: F) -> Self
    where
        G: Fn(&Context<S>) -> bool + Send + Sync + 'static,
        F: Fn(&Context<S>) -> Result<Value, HandlerError> + Send + Sync + 'static,
    {
        self.commands.insert(
            name,
            Command {
                guard: Box::new(guard),
                handle: Box::new(handle),
            },
        );
        self
    }

    pub fn dispatch(
        &self,
        command: &str,
        input: Value,
        session: Session,
    ) -> Result<Value, HandlerError> {
        let handler = self
            .commands
            .get(command)
            .ok_or_else(|| HandlerError::UnknownCommand(command.to_string()))?;

        let ctx = Context::new(input, session, &self.entities, &self.tokens);
        if !(handler.guard)(&ctx) {
            return Err(HandlerError::GuardRejected(command.to_string()));
        }

        debug!(command, user_id = ctx.session().user_id(), "dispatching command");
        let result = (handler.handle)(&ctx);
        if let Err(err) = &result {
            if err.status_code() >= 500 {
                warn!(command, error = %err, "command failed");
            }
        }
        result
    }

    /// Registered command names, sorted.
    pub fn commands(&self) -> Vec<&'static str> {
        self.commands.keys().copied().collect()
    }

    pub fn entities(&self) -> &Entities<S> {
        &self.entities
    }

    pub fn tokens(&self) -> &TokenVerifier {
        &self.tokens
    }
}
