//! Entity store server.
//!
//! Serves the project listing and the entity command service over HTTP.

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use entity_store::http::{self, AppState};
use entity_store::{commands, Config, Entities, FileStorage, InMemoryStorage, Storage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match &config.data_dir {
        Some(dir) => {
            let storage = FileStorage::open(dir)
                .with_context(|| format!("opening data dir {}", dir.display()))?;
            info!(data_dir = %dir.display(), "using file storage");
            run(storage, &config).await
        }
        None => {
            info!("using in-memory storage; data is lost on exit");
            run(InMemoryStorage::new(), &config).await
        }
    }
}

async fn run<S>(storage: S, config: &Config) -> anyhow::Result<()>
where
    S: Storage + Clone + 'static,
{
    let entities = Entities::open(storage, config.registry_options())
        .context("loading entity collections")?;
    let service = commands::service(entities, config.token_verifier());
    let state = AppState::new(service, config.project_fallback);
    http::serve(state, config.bind.as_str())
        .await
        .with_context(|| format!("serving on {}", config.bind))
}
