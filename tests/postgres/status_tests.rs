//! Single active status tests for the `PostgreSQL` registry.

use crate::postgres::helpers::{
    BoxError, PostgresCluster, prepare_registry, seed_algorithm, shared_test_cluster, status,
    test_runtime,
};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_types;
use mlregistry::registry::{
    domain::{AlgorithmId, MlAlgorithmStatus},
    ports::RegistryRepository,
};
use rstest::rstest;
use std::sync::Arc;
use tokio::task::JoinSet;
use uuid::Uuid;

const INSERT_STATUS_SQL: &str = concat!(
    "INSERT INTO ml_algorithm_statuses ",
    "(id, status, active, created_by, created_at, parent_mlalgorithm_id) ",
    "VALUES ($1, 'production', $2, 'admin', NOW(), $3)",
);

fn insert_raw_status(
    conn: &mut PgConnection,
    algorithm: AlgorithmId,
    active: bool,
) -> QueryResult<usize> {
    diesel::sql_query(INSERT_STATUS_SQL)
        .bind::<sql_types::Uuid, _>(Uuid::new_v4())
        .bind::<sql_types::Bool, _>(active)
        .bind::<sql_types::Uuid, _>(algorithm.into_inner())
        .execute(conn)
}

#[rstest]
fn new_active_status_supersedes_previous(
    shared_test_cluster: PostgresCluster,
) -> Result<(), BoxError> {
    let prepared = prepare_registry(shared_test_cluster, "status_supersede")?;
    let registry = &prepared.registry;
    let rt = test_runtime()?;

    rt.block_on(async {
        let (_, parent) = seed_algorithm(registry, "income_classifier").await?;
        let testing = status(parent.id(), "testing", true);
        registry.insert_status(&testing).await?;
        let production = status(parent.id(), "production", true);
        registry.insert_status(&production).await?;

        let statuses = registry.list_statuses(parent.id()).await?;
        let active: Vec<_> = statuses
            .iter()
            .filter(|record| record.is_active())
            .map(MlAlgorithmStatus::id)
            .collect();
        assert_eq!(statuses.len(), 2);
        assert_eq!(active, vec![production.id()]);
        Ok::<(), BoxError>(())
    })
}

#[rstest]
fn inactive_status_keeps_current_active(
    shared_test_cluster: PostgresCluster,
) -> Result<(), BoxError> {
    let prepared = prepare_registry(shared_test_cluster, "status_inactive")?;
    let registry = &prepared.registry;
    let rt = test_runtime()?;

    rt.block_on(async {
        let (_, parent) = seed_algorithm(registry, "income_classifier").await?;
        let production = status(parent.id(), "production", true);
        registry.insert_status(&production).await?;
        registry
            .insert_status(&status(parent.id(), "ab_testing", false))
            .await?;

        let current = registry
            .find_status(production.id())
            .await?
            .expect("status should exist");
        assert!(current.is_active());
        Ok::<(), BoxError>(())
    })
}

#[rstest]
fn concurrent_active_statuses_leave_exactly_one_active(
    shared_test_cluster: PostgresCluster,
) -> Result<(), BoxError> {
    let prepared = prepare_registry(shared_test_cluster, "status_concurrent")?;
    let rt = test_runtime()?;

    rt.block_on(async {
        let (_, parent) = seed_algorithm(&prepared.registry, "income_classifier").await?;

        let mut writers = JoinSet::new();
        for index in 0..16 {
            let registry = Arc::clone(&prepared.registry);
            let parent_id = parent.id();
            writers.spawn(async move {
                let label = if index % 2 == 0 { "production" } else { "ab_testing" };
                registry.insert_status(&status(parent_id, label, true)).await
            });
        }
        while let Some(joined) = writers.join_next().await {
            joined?.expect("status insert should succeed");
        }

        let statuses = prepared.registry.list_statuses(parent.id()).await?;
        assert_eq!(statuses.len(), 16);
        assert_eq!(
            statuses.iter().filter(|record| record.is_active()).count(),
            1
        );
        Ok::<(), BoxError>(())
    })
}

#[rstest]
fn unique_index_rejects_second_active_row(
    shared_test_cluster: PostgresCluster,
) -> Result<(), BoxError> {
    let prepared = prepare_registry(shared_test_cluster, "status_index")?;
    let rt = test_runtime()?;
    let (_, parent) = rt.block_on(seed_algorithm(&prepared.registry, "income_classifier"))?;
    rt.block_on(
        prepared
            .registry
            .insert_status(&status(parent.id(), "testing", true)),
    )?;
    let mut conn = PgConnection::establish(prepared.database.url())?;

    insert_raw_status(&mut conn, parent.id(), false)?;
    let result = insert_raw_status(&mut conn, parent.id(), true);

    assert!(
        matches!(
            result,
            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _))
        ),
        "expected unique violation, got {result:?}"
    );
    Ok(())
}
