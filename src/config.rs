//! Runtime configuration.
//!
//! Read from command-line flags, falling back to `ENTITY_STORE_*` environment
//! variables (a `.env` file is loaded first by the binary), then defaults.

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::entity::{StoreOptions, DEFAULT_KEY_PREFIX};
use crate::listing::FallbackPolicy;
use crate::record::IdStrategy;
use crate::registry::RegistryOptions;
use crate::token::TokenVerifier;

pub const DEFAULT_BIND: &str = "127.0.0.1:3001";

#[derive(Debug, Clone, PartialEq, Eq, Parser, Serialize, Deserialize)]
#[command(author, version, about = "Entity store HTTP server", long_about = None)]
#[serde(default)]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "ENTITY_STORE_BIND", default_value = DEFAULT_BIND)]
    pub bind: String,

    /// Directory for JSON collection files (in-memory when unset)
    #[arg(long, env = "ENTITY_STORE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Prefix of each collection's storage key
    #[arg(long, env = "ENTITY_STORE_KEY_PREFIX", default_value = DEFAULT_KEY_PREFIX)]
    pub key_prefix: String,

    /// Record id format: uuid or legacy
    #[arg(long, env = "ENTITY_STORE_ID_STRATEGY", default_value_t = IdStrategy::Uuid)]
    pub id_strategy: IdStrategy,

    /// Development shortcut: `user.login` mints tokens by email alone
    #[arg(long, env = "ENTITY_STORE_DEMO_LOGIN", default_value_t = false, action = ArgAction::Set)]
    pub demo_login: bool,

    /// HMAC secret for signed bearer tokens
    #[arg(long, env = "ENTITY_STORE_TOKEN_SECRET", hide_env_values = true)]
    pub token_secret: Option<String>,

    /// Reject unsigned bearer tokens
    #[arg(long, env = "ENTITY_STORE_REQUIRE_SIGNED_TOKENS", default_value_t = false, action = ArgAction::Set)]
    pub require_signed_tokens: bool,

    /// Project listing fallback: base_table_on_empty or disabled
    #[arg(long, env = "ENTITY_STORE_PROJECT_FALLBACK", default_value_t = FallbackPolicy::BaseTableOnEmpty)]
    pub project_fallback: FallbackPolicy,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, env = "ENTITY_STORE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            data_dir: None,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            id_strategy: IdStrategy::default(),
            demo_login: false,
            token_secret: None,
            require_signed_tokens: false,
            project_fallback: FallbackPolicy::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            key_prefix: self.key_prefix.clone(),
            id_strategy: self.id_strategy,
        }
    }

    pub fn registry_options(&self) -> RegistryOptions {
        RegistryOptions {
            store: self.store_options(),
            demo_login: self.demo_login,
        }
    }

    /// Token verifier for the server. Also warns when demo login is on.
    pub fn token_verifier(&self) -> TokenVerifier {
        if self.demo_login {
            warn!("demo login enabled; user.login issues tokens without a password");
        }
        let verifier = TokenVerifier::new(self.token_secret.as_deref(), self.require_signed_tokens);
        if !verifier.is_signed() {
            if self.require_signed_tokens {
                warn!("signed tokens required but no token secret set; every request will fail");
            } else {
                warn!("accepting unsigned bearer tokens; anyone can forge one");
            }
        }
        verifier
    }
}
