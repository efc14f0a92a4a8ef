//! Bearer tokens carrying `{ userId, role, exp }` claims.
//!
//! Two formats are accepted:
//!
//! - **Unsigned** (legacy): the token is base64 of the JSON claims, optionally
//!   prefixed with `Bearer.`. Nothing proves who issued it; any client can
//!   mint one. Only suitable for local development.
//! - **Signed**: `<base64url claims>.<base64url HMAC-SHA256(claims segment)>`,
//!   verified against a shared secret.
//!
//! A verifier built with a secret accepts only signed tokens.

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// `exp` values above this are read as epoch milliseconds, not seconds.
const MILLIS_THRESHOLD: i64 = 1_000_000_000_000;

const LEGACY_PREFIX: &str = "Bearer.";

/// Claims carried by a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Expiry, epoch seconds (or milliseconds for large values).
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: impl Into<String>, role: Option<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            role,
            exp: expires_at.timestamp(),
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        if self.exp > MILLIS_THRESHOLD {
            Utc.timestamp_millis_opt(self.exp).single()
        } else {
            Utc.timestamp_opt(self.exp, 0).single()
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().map_or(true, |at| at <= now)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("missing authorization header")]
    Missing,
    #[error("malformed token: {0}")]
    Malformed(String),
    #[error("token expired")]
    Expired,
    #[error("token signature mismatch")]
    BadSignature,
    #[error("signed tokens are required but no token secret is configured")]
    Misconfigured,
}

/// Decodes and checks bearer tokens.
#[derive(Clone)]
pub struct TokenVerifier {
    secret: Option<Vec<u8>>,
    require_signed: bool,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("signed", &self.secret.is_some())
            .field("require_signed", &self.require_signed)
            .finish()
    }
}

impl TokenVerifier {
    /// Accepts legacy unsigned tokens.
    pub fn unsigned() -> Self {
        Self {
            secret: None,
            require_signed: false,
        }
    }

    /// Accepts only tokens signed with `secret`.
    pub fn signed(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: Some(secret.as_ref().to_vec()),
            require_signed: true,
        }
    }

    /// From configuration. With `require_signed` and no secret every
    /// verification fails with [`TokenError::Misconfigured`].
    pub fn new(secret: Option<&str>, require_signed: bool) -> Self {
        match secret.filter(|s| !s.is_empty()) {
            Some(secret) => Self::signed(secret),
            None => Self {
                secret: None,
                require_signed,
            },
        }
    }

    pub fn is_signed(&self) -> bool {
        self.secret.is_some()
    }

    /// Verify an `Authorization` header value: `Bearer <token>`, or the
    /// legacy `Bearer.<token>` form with no space.
    pub fn verify_header(&self, header: Option<&str>) -> Result<Claims, TokenError> {
        self.verify_header_at(header, Utc::now())
    }

    pub fn verify_header_at(
        &self,
        header: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Claims, TokenError> {
        let header = header.map(str::trim).filter(|h| !h.is_empty());
        let header = header.ok_or(TokenError::Missing)?;
        self.verify_at(bearer_token(header)?, now)
    }

    /// Verify a bare token.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let claims = match &self.secret {
            Some(secret) => decode_signed(secret, token)?,
            None if self.require_signed => return Err(TokenError::Misconfigured),
            None => decode_unsigned(token)?,
        };

        if claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    /// Encode claims in the format this verifier accepts.
    pub fn issue(&self, claims: &Claims) -> Result<String, TokenError> {
        let json = serde_json::to_vec(claims).map_err(|e| TokenError::Malformed(e.to_string()))?;
        match &self.secret {
            Some(secret) => {
                let payload = URL_SAFE_NO_PAD.encode(json);
                let signature = URL_SAFE_NO_PAD.encode(sign(secret, payload.as_bytes())?);
                Ok(format!("{}.{}", payload, signature))
            }
            None if self.require_signed => Err(TokenError::Misconfigured),
            None => Ok(STANDARD.encode(json)),
        }
    }
}

fn bearer_token(header: &str) -> Result<&str, TokenError> {
    if let Some((scheme, token)) = header.split_once(' ') {
        if !scheme.eq_ignore_ascii_case("bearer") {
            return Err(TokenError::Malformed(format!("unsupported scheme {}", scheme)));
        }
        return Ok(token.trim());
    }

    match header.get(..LEGACY_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(LEGACY_PREFIX) => {
            Ok(&header[LEGACY_PREFIX.len()..])
        }
        _ => Err(TokenError::Malformed("expected `Bearer <token>`".into())),
    }
}

fn sign(secret: &[u8], payload: &[u8]) -> Result<Vec<u8>, TokenError> {
    let mut mac = mac(secret)?;
    mac.update(payload);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn mac(secret: &[u8]) -> Result<HmacSha256, TokenError> {
    <HmacSha256 as Mac>::new_from_slice(secret).map_err(|_| TokenError::Misconfigured)
}

fn decode_signed(secret: &[u8], token: &str) -> Result<Claims, TokenError> {
    let (payload, signature) = token
        .split_once('.')
        .ok_or_else(|| TokenError::Malformed("expected `<claims>.<signature>`".into()))?;
    let signature = decode_base64(signature)
        .ok_or_else(|| TokenError::Malformed("signature is not base64".into()))?;

    let mut mac = mac(secret)?;
    mac.update(payload.as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| TokenError::BadSignature)?;

    parse_claims(payload)
}

fn decode_unsigned(token: &str) -> Result<Claims, TokenError> {
    let token = token.strip_prefix(LEGACY_PREFIX).unwrap_or(token);
    match parse_claims(token) {
        Ok(claims) => Ok(claims),
        Err(err) => match token.split_once('.') {
            Some((first, _)) => parse_claims(first).map_err(|_| err),
            None => Err(err),
        },
    }
}

fn parse_claims(segment: &str) -> Result<Claims, TokenError> {
    let bytes = decode_base64(segment)
        .ok_or_else(|| TokenError::Malformed("claims are not base64".into()))?;
    serde_json::from_slice(&bytes).map_err(|e| TokenError::Malformed(e.to_string()))
}

fn decode_base64(segment: &str) -> Option<Vec<u8>> {
    [&STANDARD, &STANDARD_NO_PAD, &URL_SAFE, &URL_SAFE_NO_PAD]
        .into_iter()
        .find_map(|engine| engine.decode(segment).ok())
}
