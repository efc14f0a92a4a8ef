//! `user.*` commands. Identity comes from the caller's bearer token; the
//! server keeps no signed-in state between requests.

use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tracing::warn;

use crate::entity::Credentials;
use crate::microsvc::{Context, HandlerError};
use crate::storage::Storage;
use crate::token::Claims;

/// Lifetime of tokens minted by `user.login`.
pub const TOKEN_TTL_HOURS: i64 = 12;

/// User field copied into the token's `role` claim.
const ROLE_FIELD: &str = "role";

/// Development sign-in: exchanges an email for a bearer token. Records carry
/// no password, so this is only served when demo login is enabled.
pub mod login {
    use super::*;

    pub const COMMAND: &str = "user.login";

    pub fn guard<S: Storage>(ctx: &Context<S>) -> bool {
        ctx.has_str("email")
    }

    pub fn handle<S: Storage>(ctx: &Context<S>) -> Result<Value, HandlerError> {
        let users = ctx.entities().users();
        if !users.demo_login() {
            return Err(HandlerError::Forbidden(
                "email login is disabled; present a bearer token".into(),
            ));
        }

        let credentials = ctx.input::<Credentials>()?;
        let user = users.authenticate(&credentials)?;
        let role = user
            .fields
            .get(ROLE_FIELD)
            .and_then(Value::as_str)
            .map(String::from);
        let claims = Claims::new(
            user.id.clone(),
            role,
            Utc::now() + Duration::hours(TOKEN_TTL_HOURS),
        );
        let token = ctx.tokens().issue(&claims)?;
        warn!(user_id = %user.id, "issued token by email alone (demo login)");

        Ok(json!({
            "token": token,
            "token_type": "Bearer",
            "expires_at": claims.expires_at(),
            "user": user,
        }))
    }
}

pub mod me {
    use super::*;

    pub const COMMAND: &str = "user.me";

    pub fn guard<S: Storage>(_ctx: &Context<S>) -> bool {
        true
    }

    pub fn handle<S: Storage>(ctx: &Context<S>) -> Result<Value, HandlerError> {
        let user = ctx.current_user()?;
        Ok(json!({ "user": user, "role": ctx.role() }))
    }
}
