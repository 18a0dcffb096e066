//! Prepares the `PostgreSQL` registry store and reports its contents.
//!
//! Usage:
//!
//! ```text
//! DATABASE_URL=postgres://localhost/mlregistry mlregistry
//! ```
//!
//! Configuration is read from the environment (and `.env`, when present).
//! The registry tables are created if missing, then the number of endpoints
//! and algorithm versions is logged. Log verbosity follows `RUST_LOG` and
//! defaults to `info`.

use mlregistry::{
    config::RegistryConfig,
    registry::{
        adapters::postgres::PostgresRegistry, ports::AlgorithmFilter, services::RegistryService,
    },
};
use mockable::DefaultClock;
use std::{error::Error, sync::Arc};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = RegistryConfig::from_env()?;
    info!(pool_size = config.pool_size(), "connecting to registry store");

    let repository = PostgresRegistry::connect(&config)?;
    repository.apply_schema().await?;

    let service = RegistryService::new(Arc::new(repository), Arc::new(DefaultClock));
    let endpoints = service.list_endpoints().await?;
    let algorithms = service.list_algorithms(&AlgorithmFilter::new()).await?;
    info!(
        endpoints = endpoints.len(),
        algorithms = algorithms.len(),
        "registry store ready"
    );
    Ok(())
}
