//! HTTP transport - axum routes over the command service and the project
//! listing.
//!
//! ## Routes
//!
//! - `GET /health` - `{ "ok": true, "entities": [...], "stored": [...], "commands": [...] }`.
//! - `GET /api/projects/list` - bearer-authenticated project listing; any
//!   other method answers 405.
//! - `POST /:command` - dispatch a command. Body = JSON input; the
//!   `Authorization` header, when present, must verify and becomes the
//!   request's session.
//!
//! Every error, extractor rejections included, answers with the JSON body
//! described in [`ErrorBody`].
//!
//! ## Example
//!
//! ```ignore
//! let entities = Entities::open(InMemoryStorage::new(), RegistryOptions::default())?;
//! let service = commands::service(entities, TokenVerifier::unsigned());
//! http::serve(AppState::new(service, FallbackPolicy::default()), "127.0.0.1:3001").await?;
//! ```

mod error;
mod projects;

pub use error::{ApiError, ErrorBody};
pub use projects::{ProjectsResponse, SOURCE};

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::{TcpListener, ToSocketAddrs};
use tracing::info;

use crate::listing::FallbackPolicy;
use crate::microsvc::{Service, Session};
use crate::storage::Storage;

/// Shared handler state.
pub struct AppState<S> {
    pub service: Arc<Service<S>>,
    pub fallback: FallbackPolicy,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            fallback: self.fallback,
        }
    }
}

impl<S: Storage + 'static> AppState<S> {
    pub fn new(service: Service<S>, fallback: FallbackPolicy) -> Self {
        Self {
            service: Arc::new(service),
            fallback,
        }
    }
}

pub fn router<S: Storage + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/health", get(health::<S>))
        .route(
            "/api/projects/list",
            get(projects::list::<S>).fallback(projects::method_not_allowed),
        )
        .route("/:command", post(command::<S>))
        .with_state(state)
}

/// Bind `addr` and serve until ctrl-c.
pub async fn serve<S, A>(state: AppState<S>, addr: A) -> Result<(), std::io::Error>
where
    S: Storage + 'static,
    A: ToSocketAddrs,
{
    let listener = TcpListener::bind(addr).await?;
    let local: SocketAddr = listener.local_addr()?;
    info!(
        addr = %local,
        signed_tokens = state.service.tokens().is_signed(),
        "listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await
}

async fn health<S: Storage + 'static>(
    State(state): State<AppState<S>>,
) -> Result<Json<Value>, ApiError> {
    let entities = state.service.entities();
    let stored = entities.storage().keys()?;
    Ok(Json(json!({
        "ok": true,
        "entities": entities.names(),
        "stored": stored,
        "commands": state.service.commands(),
    })))
}

async fn command<S: Storage + 'static>(
    State(state): State<AppState<S>>,
    Path(command): Path<String>,
    headers: HeaderMap,
    input: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .map(|v| v.to_str().unwrap_or_default());
    let session = Session::authenticate(state.service.tokens(), authorization)?;
    let Json(input) = input?;
    let value = state.service.dispatch(&command, input, session)?;
    Ok(Json(value))
}
