//! microsvc - convention-based command handlers.
//!
//! Commands are registered on a `Service` by name. Each handler receives a
//! `Context` holding the JSON input and the caller's [`Session`], which is
//! built per request from a verified bearer token and never shared between
//! callers. Through the context a handler also reaches the
//! [`Entities`](crate::registry::Entities) registry.
//!
//! ## Quick Start
//!
//! ```ignore
//! use entity_store::microsvc::{Service, Session};
//! use serde_json::json;
//!
//! let service = Service::new(entities, TokenVerifier::unsigned())
//!     .register("project.count", |_| true, |ctx| {
//!         Ok(json!({ "count": ctx.entities().projects().count()? }))
//!     });
//!
//! let result = service.dispatch("project.count", json!({}), Session::new())?;
//! ```
//!
//! ## Handler Convention
//!
//! ```ignore
//! pub mod get {
//!     pub const COMMAND: &str = "entity.get";
//!
//!     pub fn guard<S: Storage>(ctx: &Context<S>) -> bool {
//!         ctx.has_str("entity") && ctx.has_str("id")
//!     }
//!
//!     pub fn handle<S: Storage>(ctx: &Context<S>) -> Result<Value, HandlerError> {
//!         // ...
//!     }
//! }
//! ```

mod context;
mod error;
mod service;
mod session;

pub use context::Context;
pub use error::HandlerError;
pub use service::Service;
pub use session::Session;

/// Register handler modules with a service using the convention pattern.
///
/// Each handler module must export:
/// - `COMMAND: &str` - the command name
/// - `guard(ctx) -> bool` - input validation
/// - `handle(ctx) -> Result<Value, HandlerError>` - the handler
///
/// # Example
/// ```ignore
/// let service = entity_store::register_handlers!(
///     microsvc::Service::new(entities, tokens),
///     commands::entity::list,
///     commands::entity::get,
/// );
/// ```
#[macro_export]
macro_rules! register_handlers {
    ($service:expr, $( $($seg:ident)::+ ),+ $(,)?) => {
        $service
        $(
            .register(
                $($seg)::+::COMMAND,
                $($seg)::+::guard,
                $($seg)::+::handle,
            )
        )+
    };
}
