//! `GET /api/projects/list`.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::error::ApiError;
use super::AppState;
use crate::listing::{list_projects, ListParams, ProjectQuery};
use crate::record::Record;
use crate::storage::Storage;

/// Where listings claim to come from. Kept for client compatibility.
pub const SOURCE: &str = "supabase";

#[derive(Debug, Serialize)]
pub struct ProjectsResponse {
    pub projects: Vec<Record>,
    pub count: usize,
    pub message: String,
    pub source: &'static str,
    pub table: String,
    pub filters: Value,
}

pub async fn list<S: Storage + 'static>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<ProjectsResponse>, ApiError> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let claims = state.service.tokens().verify_header(authorization)?;
    let Query(params) = params?;

    let query = ProjectQuery::from_params(&params);
    let entities = state.service.entities();
    let listing = list_projects(entities, &query, state.fallback)?;

    let count = listing.projects.len();
    debug!(
        user_id = %claims.user_id,
        role = claims.role.as_deref(),
        count,
        table = %listing.table,
        "listed projects"
    );

    Ok(Json(ProjectsResponse {
        projects: listing.projects,
        count,
        message: format!("Found {} projects", count),
        source: SOURCE,
        table: listing.table,
        filters: query.filters.to_value(),
    }))
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed()
}
