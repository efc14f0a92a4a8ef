//! Error type for command handlers.

use thiserror::Error;

use crate::entity::{AuthError, StoreError};
use crate::token::TokenError;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("decode failed: {0}")]
    DecodeFailed(String),
    #[error("guard rejected command: {0}")]
    GuardRejected(String),
    #[error("unknown entity: {0}")]
    UnknownEntity(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<AuthError> for HandlerError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => HandlerError::InvalidCredentials,
            AuthError::Store(e) => HandlerError::Store(e),
        }
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        HandlerError::DecodeFailed(err.to_string())
    }
}

impl HandlerError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            HandlerError::UnknownCommand(_) => 404,
            HandlerError::DecodeFailed(_) => 400,
            HandlerError::GuardRejected(_) => 400,
            HandlerError::UnknownEntity(_) => 404,
            HandlerError::NotFound(_) => 404,
            HandlerError::Unauthorized(_) => 401,
            HandlerError::InvalidCredentials => 401,
            HandlerError::Forbidden(_) => 403,
            HandlerError::Token(TokenError::Misconfigured) => 500,
            HandlerError::Token(_) => 401,
            HandlerError::Store(_) => 500,
        }
    }
}
