//! `PostgreSQL` repository implementation for the registry.

use super::{
    models::{AlgorithmRow, EndpointRow, RequestRow, StatusRow},
    schema::{endpoints, ml_algorithm_statuses, ml_algorithms, ml_requests},
};
use crate::config::RegistryConfig;
use crate::registry::{
    domain::{
        AlgorithmId, AlgorithmStatusId, CascadeSummary, Endpoint, EndpointId, MlAlgorithm,
        MlAlgorithmStatus, MlRequest, RecordRef, RequestId,
    },
    ports::{AlgorithmFilter, RegistryError, RegistryRepository, RegistryResult},
};
use async_trait::async_trait;
use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;
use uuid::Uuid;

/// `PostgreSQL` connection pool type used by registry adapters.
pub type RegistryPgPool = Pool<ConnectionManager<PgConnection>>;

/// Schema applied by [`PostgresRegistry::apply_schema`].
const SCHEMA_SQL: &str =
    include_str!("../../../../migrations/2026-10-01-000000_create_registry_tables/up.sql");

/// `PostgreSQL`-backed registry repository.
#[derive(Debug, Clone)]
pub struct PostgresRegistry {
    pool: RegistryPgPool,
}

impl PostgresRegistry {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: RegistryPgPool) -> Self {
        Self { pool }
    }

    /// Builds a connection pool from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Persistence`] when the pool cannot be built.
    pub fn connect(config: &RegistryConfig) -> RegistryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(config.database_url());
        let pool = Pool::builder()
            .max_size(config.pool_size())
            .build(manager)
            .map_err(RegistryError::persistence)?;
        Ok(Self::new(pool))
    }

    /// Creates the registry tables and indices when they are missing.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Persistence`] when the DDL fails.
    pub async fn apply_schema(&self) -> RegistryResult<()> {
        self.run_blocking(|connection| {
            debug!("applying registry schema");
            connection.batch_execute(SCHEMA_SQL)?;
            Ok(())
        })
        .await
    }

    async fn run_blocking<F, T>(&self, f: F) -> RegistryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> RegistryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(RegistryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(RegistryError::persistence)?
    }
}

#[async_trait]
impl RegistryRepository for PostgresRegistry {
    async fn insert_endpoint(&self, endpoint: &Endpoint) -> RegistryResult<()> {
        let row = EndpointRow::from(endpoint);
        let record = RecordRef::Endpoint(endpoint.id());
        self.run_blocking(move |connection| {
            diesel::insert_into(endpoints::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| map_insert_error(err, record, record))?;
            Ok(())
        })
        .await
    }

    async fn find_endpoint(&self, id: EndpointId) -> RegistryResult<Option<Endpoint>> {
        self.run_blocking(move |connection| {
            let row = endpoints::table
                .find(id.into_inner())
                .select(EndpointRow::as_select())
                .first::<EndpointRow>(connection)
                .optional()?;
            row.map(Endpoint::try_from).transpose()
        })
        .await
    }

    async fn list_endpoints(&self) -> RegistryResult<Vec<Endpoint>> {
        self.run_blocking(move |connection| {
            let rows = endpoints::table
                .order((endpoints::created_at.asc(), endpoints::id.asc()))
                .select(EndpointRow::as_select())
                .load::<EndpointRow>(connection)?;
            rows.into_iter().map(Endpoint::try_from).collect()
        })
        .await
    }

    async fn delete_endpoint(&self, id: EndpointId) -> RegistryResult<CascadeSummary> {
        self.run_blocking(move |connection| {
            connection.transaction::<_, RegistryError, _>(|tx| {
                let algorithm_ids: Vec<Uuid> = ml_algorithms::table
                    .filter(ml_algorithms::parent_endpoint_id.eq(id.into_inner()))
                    .select(ml_algorithms::id)
                    .load(tx)?;
                let mut summary = delete_algorithm_rows(tx, &algorithm_ids)?;
                summary.endpoints =
                    diesel::delete(endpoints::table.find(id.into_inner())).execute(tx)?;
                if summary.endpoints == 0 {
                    return Err(RegistryError::NotFound(RecordRef::Endpoint(id)));
                }
                Ok(summary)
            })
        })
        .await
    }

    async fn insert_algorithm(&self, algorithm: &MlAlgorithm) -> RegistryResult<()> {
        let row = AlgorithmRow::from(algorithm);
        let record = RecordRef::Algorithm(algorithm.id());
        let parent = RecordRef::Endpoint(algorithm.parent_endpoint());
        self.run_blocking(move |connection| {
            diesel::insert_into(ml_algorithms::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| map_insert_error(err, record, parent))?;
            Ok(())
        })
        .await
    }

    async fn find_algorithm(&self, id: AlgorithmId) -> RegistryResult<Option<MlAlgorithm>> {
        self.run_blocking(move |connection| {
            let row = ml_algorithms::table
                .find(id.into_inner())
                .select(AlgorithmRow::as_select())
                .first::<AlgorithmRow>(connection)
                .optional()?;
            row.map(MlAlgorithm::try_from).transpose()
        })
        .await
    }

    async fn list_algorithms(
        &self,
        filter: &AlgorithmFilter,
    ) -> RegistryResult<Vec<MlAlgorithm>> {
        let filter = filter.clone();
        self.run_blocking(move |connection| {
            let mut query = ml_algorithms::table
                .select(AlgorithmRow::as_select())
                .order((ml_algorithms::created_at.asc(), ml_algorithms::id.asc()))
                .into_boxed();
            if let Some(endpoint) = filter.parent_endpoint() {
                query = query.filter(ml_algorithms::parent_endpoint_id.eq(endpoint.into_inner()));
            }
            if let Some(name) = filter.name() {
                query = query.filter(ml_algorithms::name.eq(name.to_owned()));
            }
            if let Some(version) = filter.version() {
                query = query.filter(ml_algorithms::version.eq(version.to_owned()));
            }
            let rows = query.load::<AlgorithmRow>(connection)?;
            rows.into_iter().map(MlAlgorithm::try_from).collect()
        })
        .await
    }

    async fn delete_algorithm(&self, id: AlgorithmId) -> RegistryResult<CascadeSummary> {
        self.run_blocking(move |connection| {
            connection.transaction::<_, RegistryError, _>(|tx| {
                let summary = delete_algorithm_rows(tx, &[id.into_inner()])?;
                if summary.algorithms == 0 {
                    return Err(RegistryError::NotFound(RecordRef::Algorithm(id)));
                }
                Ok(summary)
            })
        })
        .await
    }

    async fn insert_status(&self, status: &MlAlgorithmStatus) -> RegistryResult<()> {
        let row = StatusRow::from(status);
        let record = RecordRef::AlgorithmStatus(status.id());
        let parent = RecordRef::Algorithm(status.parent_mlalgorithm());
        self.run_blocking(move |connection| {
            connection.transaction::<_, RegistryError, _>(|tx| {
                // Serializes status writers per algorithm.
                ml_algorithms::table
                    .find(row.parent_mlalgorithm_id)
                    .select(ml_algorithms::id)
                    .for_update()
                    .first::<Uuid>(tx)
                    .optional()?
                    .ok_or(RegistryError::MissingParent(parent))?;
                if row.active {
                    diesel::update(
                        ml_algorithm_statuses::table
                            .filter(
                                ml_algorithm_statuses::parent_mlalgorithm_id
                                    .eq(row.parent_mlalgorithm_id),
                            )
                            .filter(ml_algorithm_statuses::active.eq(true)),
                    )
                    .set(ml_algorithm_statuses::active.eq(false))
                    .execute(tx)?;
                }
                diesel::insert_into(ml_algorithm_statuses::table)
                    .values(&row)
                    .execute(tx)
                    .map_err(|err| map_insert_error(err, record, parent))?;
                Ok(())
            })
        })
        .await
    }

    async fn find_status(
        &self,
        id: AlgorithmStatusId,
    ) -> RegistryResult<Option<MlAlgorithmStatus>> {
        self.run_blocking(move |connection| {
            let row = ml_algorithm_statuses::table
                .find(id.into_inner())
                .select(StatusRow::as_select())
                .first::<StatusRow>(connection)
                .optional()?;
            row.map(MlAlgorithmStatus::try_from).transpose()
        })
        .await
    }

    async fn list_statuses(
        &self,
        algorithm: AlgorithmId,
    ) -> RegistryResult<Vec<MlAlgorithmStatus>> {
        self.run_blocking(move |connection| {
            let rows = ml_algorithm_statuses::table
                .filter(ml_algorithm_statuses::parent_mlalgorithm_id.eq(algorithm.into_inner()))
                .order((
                    ml_algorithm_statuses::created_at.asc(),
                    ml_algorithm_statuses::id.asc(),
                ))
                .select(StatusRow::as_select())
                .load::<StatusRow>(connection)?;
            rows.into_iter().map(MlAlgorithmStatus::try_from).collect()
        })
        .await
    }

    async fn delete_status(&self, id: AlgorithmStatusId) -> RegistryResult<CascadeSummary> {
        self.run_blocking(move |connection| {
            let statuses =
                diesel::delete(ml_algorithm_statuses::table.find(id.into_inner()))
                    .execute(connection)?;
            if statuses == 0 {
                return Err(RegistryError::NotFound(RecordRef::AlgorithmStatus(id)));
            }
            Ok(CascadeSummary {
                statuses,
                ..CascadeSummary::default()
            })
        })
        .await
    }

    async fn insert_request(&self, request: &MlRequest) -> RegistryResult<()> {
        let row = RequestRow::from(request);
        let record = RecordRef::Request(request.id());
        let parent = RecordRef::Algorithm(request.parent_mlalgorithm());
        self.run_blocking(move |connection| {
            diesel::insert_into(ml_requests::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| map_insert_error(err, record, parent))?;
            Ok(())
        })
        .await
    }

    async fn update_request(&self, request: &MlRequest) -> RegistryResult<()> {
        let id = request.id();
        let feedback = request.feedback().map(|f| f.as_str().to_owned());
        self.run_blocking(move |connection| {
            let updated = diesel::update(ml_requests::table.find(id.into_inner()))
                .set(ml_requests::feedback.eq(feedback))
                .execute(connection)?;
            if updated == 0 {
                return Err(RegistryError::NotFound(RecordRef::Request(id)));
            }
            Ok(())
        })
        .await
    }

    async fn find_request(&self, id: RequestId) -> RegistryResult<Option<MlRequest>> {
        self.run_blocking(move |connection| {
            let row = ml_requests::table
                .find(id.into_inner())
                .select(RequestRow::as_select())
                .first::<RequestRow>(connection)
                .optional()?;
            row.map(MlRequest::try_from).transpose()
        })
        .await
    }

    async fn list_requests(&self, algorithm: AlgorithmId) -> RegistryResult<Vec<MlRequest>> {
        self.run_blocking(move |connection| {
            let rows = ml_requests::table
                .filter(ml_requests::parent_mlalgorithm_id.eq(algorithm.into_inner()))
                .order((ml_requests::created_at.asc(), ml_requests::id.asc()))
                .select(RequestRow::as_select())
                .load::<RequestRow>(connection)?;
            rows.into_iter().map(MlRequest::try_from).collect()
        })
        .await
    }

    async fn delete_request(&self, id: RequestId) -> RegistryResult<CascadeSummary> {
        self.run_blocking(move |connection| {
            let requests =
                diesel::delete(ml_requests::table.find(id.into_inner())).execute(connection)?;
            if requests == 0 {
                return Err(RegistryError::NotFound(RecordRef::Request(id)));
            }
            Ok(CascadeSummary {
                requests,
                ..CascadeSummary::default()
            })
        })
        .await
    }
}

/// Deletes the given algorithms after explicitly removing their children.
fn delete_algorithm_rows(
    connection: &mut PgConnection,
    algorithm_ids: &[Uuid],
) -> RegistryResult<CascadeSummary> {
    if algorithm_ids.is_empty() {
        return Ok(CascadeSummary::default());
    }

    let statuses = diesel::delete(
        ml_algorithm_statuses::table
            .filter(ml_algorithm_statuses::parent_mlalgorithm_id.eq_any(algorithm_ids)),
    )
    .execute(connection)?;
    let requests = diesel::delete(
        ml_requests::table.filter(ml_requests::parent_mlalgorithm_id.eq_any(algorithm_ids)),
    )
    .execute(connection)?;
    let algorithms =
        diesel::delete(ml_algorithms::table.filter(ml_algorithms::id.eq_any(algorithm_ids)))
            .execute(connection)?;

    Ok(CascadeSummary {
        endpoints: 0,
        algorithms,
        statuses,
        requests,
    })
}

fn map_insert_error(err: DieselError, record: RecordRef, parent: RecordRef) -> RegistryError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            RegistryError::Duplicate(record)
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            RegistryError::MissingParent(parent)
        }
        other => RegistryError::persistence(other),
    }
}
