//! Entity and user commands, in the handler-module convention: each module
//! exports `COMMAND`, `guard` and `handle`.
//!
//! ```ignore
//! let entities = Entities::open(InMemoryStorage::new(), RegistryOptions::default())?;
//! let service = commands::service(entities, TokenVerifier::unsigned());
//! let projects = service.dispatch(
//!     "entity.list",
//!     json!({ "entity": "Project", "order_by": "-created_date", "limit": 10 }),
//!     Session::new(),
//! )?;
//! ```

pub mod entity;
pub mod user;

use crate::microsvc::Service;
use crate::registry::Entities;
use crate::storage::Storage;
use crate::token::TokenVerifier;

/// A service with every entity and user command registered.
pub fn service<S>(entities: Entities<S>, tokens: TokenVerifier) -> Service<S>
where
    S: Storage + 'static,
{
    crate::register_handlers!(
        Service::new(entities, tokens),
        entity::list,
        entity::filter,
        entity::find,
        entity::get,
        entity::create,
        entity::update,
        entity::delete,
        user::login,
        user::me,
    )
}
