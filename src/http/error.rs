//! JSON error responses: `{ error, message, details?, hint? }`.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use crate::entity::StoreError;
use crate::microsvc::HandlerError;
use crate::storage::StorageError;
use crate::token::TokenError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: error.into(),
                message: message.into(),
                details: None,
                hint: None,
            },
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.body.details = Some(details.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.body.hint = Some(hint.into());
        self
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Bad Request", message)
    }

    pub fn method_not_allowed() -> Self {
        Self::new(
            StatusCode::METHOD_NOT_ALLOWED,
            "Method not allowed",
            "only GET is supported on this endpoint",
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &ErrorBody {
        &self.body
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Misconfigured => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server misconfiguration",
                err.to_string(),
            )
            .with_hint("set ENTITY_STORE_TOKEN_SECRET or disable ENTITY_STORE_REQUIRE_SIGNED_TOKENS"),
            TokenError::Missing => Self::unauthorized(err.to_string())
                .with_hint("send `Authorization: Bearer <token>`"),
            other => Self::unauthorized(other.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Database error",
            "failed to read from the entity store",
        )
        .with_details(err.to_string())
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        Self::from(StoreError::from(err))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
            .with_hint("check the query string; each filter may appear once")
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let status = rejection.status();
        let label = status.canonical_reason().unwrap_or("Bad Request");
        Self::new(status, label, rejection.body_text())
            .with_hint("send a JSON object with `Content-Type: application/json`")
    }
}

impl From<HandlerError> for ApiError {
    fn from(err: HandlerError) -> Self {
        let err = match err {
            HandlerError::Token(token) => return Self::from(token),
            other => other,
        };
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let label = status.canonical_reason().unwrap_or("Error");
        Self::new(status, label, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(
                status = self.status.as_u16(),
                error = %self.body.error,
                message = %self.body.message,
                details = self.body.details.as_deref(),
                "request failed"
            );
        }
        (self.status, Json(self.body)).into_response()
    }
}
