//! The caller behind a dispatched command.

use crate::token::{Claims, TokenError, TokenVerifier};

/// Who is issuing a command: anonymous, or the subject of a verified token.
///
/// Sessions carry no server-side state; two callers never share one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    claims: Option<Claims>,
}

impl Session {
    /// An anonymous session.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_claims(claims: Claims) -> Self {
        Self {
            claims: Some(claims),
        }
    }

    /// Anonymous without an `Authorization` value; a value that is present
    /// must verify.
    pub fn authenticate(
        tokens: &TokenVerifier,
        authorization: Option<&str>,
    ) -> Result<Self, TokenError> {
        match authorization {
            None => Ok(Self::new()),
            Some(header) => tokens.verify_header(Some(header)).map(Self::from_claims),
        }
    }

    pub fn claims(&self) -> Option<&Claims> {
        self.claims.as_ref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.claims.as_ref().map(|c| c.user_id.as_str())
    }

    pub fn role(&self) -> Option<&str> {
        self.claims.as_ref().and_then(|c| c.role.as_deref())
    }

    pub fn is_anonymous(&self) -> bool {
        self.claims.is_none()
    }
}
