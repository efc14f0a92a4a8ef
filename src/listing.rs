//! Project listing - the query behind `GET /api/projects/list`.
//!
//! Projects are read from the `ProjectDetails` projection. When that comes
//! back empty, the [`FallbackPolicy`] decides whether the base `Project`
//! collection is queried instead; the listing reports which one answered.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::entity::StoreError;
use crate::query::{Filters, DEFAULT_LIST_ORDER};
use crate::record::Record;
use crate::registry::Entities;
use crate::storage::Storage;

/// Query parameters that become filters. Each takes one value (equality)
/// or a comma-separated list (membership).
pub const FILTER_PARAMS: &[&str] = &[
    "id",
    "project_owner_id",
    "client_id",
    "project_status",
    "project_type",
];

/// What to do when the projection has no matching rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Re-run the query against the base `Project` collection.
    #[default]
    BaseTableOnEmpty,
    /// Return the empty result.
    Disabled,
}

impl fmt::Display for FallbackPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackPolicy::BaseTableOnEmpty => write!(f, "base_table_on_empty"),
            FallbackPolicy::Disabled => write!(f, "disabled"),
        }
    }
}

impl FromStr for FallbackPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "base_table_on_empty" | "base" => Ok(FallbackPolicy::BaseTableOnEmpty),
            "disabled" | "none" => Ok(FallbackPolicy::Disabled),
            other => Err(format!(
                "unknown fallback policy: {} (expected base_table_on_empty or disabled)",
                other
            )),
        }
    }
}

/// Raw query string of the listing endpoint. Everything arrives as text so
/// that a malformed `limit` is ignored rather than rejected.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub order: Option<String>,
    pub limit: Option<String>,
    pub id: Option<String>,
    pub project_owner_id: Option<String>,
    pub client_id: Option<String>,
    pub project_status: Option<String>,
    pub project_type: Option<String>,
}

impl ListParams {
    fn filter_value(&self, param: &str) -> Option<&str> {
        match param {
            "id" => self.id.as_deref(),
            "project_owner_id" => self.project_owner_id.as_deref(),
            "client_id" => self.client_id.as_deref(),
            "project_status" => self.project_status.as_deref(),
            "project_type" => self.project_type.as_deref(),
            _ => None,
        }
    }
}

/// A parsed listing request.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectQuery {
    pub order: String,
    pub limit: Option<usize>,
    pub filters: Filters,
}

impl Default for ProjectQuery {
    fn default() -> Self {
        Self {
            order: DEFAULT_LIST_ORDER.to_string(),
            limit: None,
            filters: Filters::new(),
        }
    }
}

impl ProjectQuery {
    pub fn from_params(params: &ListParams) -> Self {
        let order = params
            .order
            .as_deref()
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .unwrap_or(DEFAULT_LIST_ORDER)
            .to_string();

        let limit = params
            .limit
            .as_deref()
            .and_then(|l| l.trim().parse::<i64>().ok())
            .filter(|n| *n > 0)
            .map(|n| n as usize);

        let mut filters = Filters::new();
        for param in FILTER_PARAMS {
            if let Some(raw) = params.filter_value(param) {
                filters = with_param(filters, param, raw);
            }
        }

        Self {
            order,
            limit,
            filters,
        }
    }
}

fn with_param(filters: Filters, field: &str, raw: &str) -> Filters {
    let raw = raw.trim();
    if raw.is_empty() {
        return filters;
    }
    if raw.contains(',') {
        let values: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from)
            .collect();
        filters.is_in(field, values)
    } else {
        filters.eq(field, raw)
    }
}

/// Result of a listing, with the collection that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectListing {
    pub projects: Vec<Record>,
    pub table: String,
    pub fell_back: bool,
}

/// Run a listing against the projection, falling back per `policy`.
pub fn list_projects<S: Storage>(
    entities: &Entities<S>,
    query: &ProjectQuery,
    policy: FallbackPolicy,
) -> Result<ProjectListing, StoreError> {
    let primary = entities.project_details();
    let projects = primary.query(&query.filters, Some(query.order.as_str()), query.limit)?;

    if projects.is_empty() && policy == FallbackPolicy::BaseTableOnEmpty {
        let base = entities.projects();
        let projects = base.query(&query.filters, Some(query.order.as_str()), query.limit)?;
        warn!(
            primary = primary.name(),
            base = base.name(),
            count = projects.len(),
            "project projection empty, answered from base collection"
        );
        return Ok(ProjectListing {
            projects,
            table: base.name().to_string(),
            fell_back: true,
        });
    }

    Ok(ProjectListing {
        projects,
        table: primary.name().to_string(),
        fell_back: false,
    })
}
