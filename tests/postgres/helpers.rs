//! Shared test helpers for `PostgreSQL` integration tests.

pub use super::cluster::{BoxError, PostgresCluster, shared_test_cluster};
use super::cluster::TemporaryDatabase;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use mlregistry::registry::{
    adapters::postgres::{PostgresRegistry, RegistryPgPool},
    domain::{
        AlgorithmId, AlgorithmSpec, Description, Endpoint, EndpointId, MlAlgorithm,
        MlAlgorithmStatus, MlRequest, Payload, RequestPayloads, ShortText, SourceCode,
    },
    ports::RegistryRepository,
};
use mockable::DefaultClock;
use std::sync::Arc;
use tokio::runtime::Runtime;

/// SQL creating the registry tables.
pub const SCHEMA_SQL: &str =
    include_str!("../../migrations/2026-10-01-000000_create_registry_tables/up.sql");

/// Template database name for the pre-migrated schema.
pub const TEMPLATE_DB: &str = "mlregistry_test_template";

/// Connections per test pool; concurrent writers need more than one.
const POOL_SIZE: u32 = 4;

/// Creates a multi-threaded runtime for driving the async repository.
///
/// # Errors
///
/// Returns an error if the runtime cannot be built.
pub fn test_runtime() -> Result<Runtime, BoxError> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .map_err(|err| Box::new(err) as BoxError)
}

/// Ensures the template database exists with the schema applied.
///
/// # Errors
///
/// Returns an error if template creation or migration fails.
pub fn ensure_template(cluster: PostgresCluster) -> Result<(), BoxError> {
    cluster
        .ensure_template_exists(TEMPLATE_DB, |db_name| {
            let url = cluster.connection().database_url(db_name);
            let mut conn = PgConnection::establish(&url).map_err(|e| eyre::eyre!("{e}"))?;
            conn.batch_execute(SCHEMA_SQL)
                .map_err(|e| eyre::eyre!("schema error: {e}"))?;
            Ok(())
        })
        .map_err(|err| Box::new(err) as BoxError)?;
    Ok(())
}

/// Repository over a temporary database cloned from the template.
///
/// The repository is declared first so its pool closes before the database
/// is dropped.
pub struct PreparedRegistry {
    pub registry: Arc<PostgresRegistry>,
    pub database: TemporaryDatabase,
}

/// Creates a migrated temporary database and a repository over it.
///
/// # Errors
///
/// Returns an error if template setup, database creation, or pool
/// construction fails.
pub fn prepare_registry(
    cluster: PostgresCluster,
    prefix: &str,
) -> Result<PreparedRegistry, BoxError> {
    ensure_template(cluster)?;
    let database = TemporaryDatabase::from_template(cluster, prefix, TEMPLATE_DB)?;
    let manager = ConnectionManager::<PgConnection>::new(database.url());
    let pool: RegistryPgPool = Pool::builder()
        .max_size(POOL_SIZE)
        .build(manager)
        .map_err(|err| Box::new(err) as BoxError)?;
    Ok(PreparedRegistry {
        registry: Arc::new(PostgresRegistry::new(pool)),
        database,
    })
}

/// Builds a short text value.
///
/// # Panics
///
/// Panics if `value` is blank or too long.
#[must_use]
pub fn text(value: &str) -> ShortText {
    ShortText::new("value", value).expect("valid short text")
}

#[must_use]
pub fn endpoint(name: &str) -> Endpoint {
    Endpoint::new(text(name), text("admin"), &DefaultClock)
}

/// Builds an algorithm version under `endpoint`.
///
/// # Panics
///
/// Panics if the fixed description or code is rejected.
#[must_use]
pub fn algorithm(endpoint: EndpointId, name: &str, version: &str) -> MlAlgorithm {
    let spec = AlgorithmSpec {
        name: text(name),
        owner: text("admin"),
        version: text(version),
        description: Description::new("description", "Random forest classifier")
            .expect("valid description"),
        code: SourceCode::new("code", "class RandomForestClassifier: ...").expect("valid code"),
    };
    MlAlgorithm::new(endpoint, spec, &DefaultClock)
}

#[must_use]
pub fn status(algorithm: AlgorithmId, label: &str, active: bool) -> MlAlgorithmStatus {
    MlAlgorithmStatus::new(algorithm, text(label), active, text("admin"), &DefaultClock)
}

/// Builds a request record for `algorithm` with fixed payloads.
///
/// # Panics
///
/// Panics if a fixed payload is rejected.
#[must_use]
pub fn request(algorithm: AlgorithmId) -> MlRequest {
    let payloads = RequestPayloads {
        input_data: Payload::new("input_data", r#"{"age": 37}"#).expect("valid payload"),
        full_response: Payload::new("full_response", r#"{"label": "<=50K", "probability": 0.04}"#)
            .expect("valid payload"),
        response: Payload::new("response", r#"{"label": "<=50K"}"#).expect("valid payload"),
    };
    MlRequest::new(algorithm, payloads, &DefaultClock)
}

/// Inserts an endpoint holding one algorithm and returns both.
///
/// # Errors
///
/// Returns an error if either insert fails.
pub async fn seed_algorithm(
    registry: &PostgresRegistry,
    endpoint_name: &str,
) -> Result<(Endpoint, MlAlgorithm), BoxError> {
    let parent = endpoint(endpoint_name);
    registry.insert_endpoint(&parent).await?;
    let child = algorithm(parent.id(), "random forest", "0.0.1");
    registry.insert_algorithm(&child).await?;
    Ok((parent, child))
}
