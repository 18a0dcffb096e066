//! Cascading delete tests for the `PostgreSQL` registry.

use crate::postgres::helpers::{
    BoxError, PostgresCluster, algorithm, endpoint, prepare_registry, request, seed_algorithm,
    shared_test_cluster, status, test_runtime,
};
use mlregistry::registry::{
    domain::{CascadeSummary, RecordRef},
    ports::{AlgorithmFilter, RegistryError, RegistryRepository},
};
use rstest::rstest;

#[rstest]
fn endpoint_delete_reports_cascade_summary(
    shared_test_cluster: PostgresCluster,
) -> Result<(), BoxError> {
    let prepared = prepare_registry(shared_test_cluster, "cascade_endpoint")?;
    let registry = &prepared.registry;
    let rt = test_runtime()?;

    rt.block_on(async {
        let (parent, first) = seed_algorithm(registry, "income_classifier").await?;
        let second = algorithm(parent.id(), "extra trees", "0.0.1");
        registry.insert_algorithm(&second).await?;
        registry.insert_status(&status(first.id(), "testing", true)).await?;
        registry.insert_status(&status(first.id(), "production", true)).await?;
        registry.insert_status(&status(second.id(), "staging", false)).await?;
        let logged = request(first.id());
        registry.insert_request(&logged).await?;
        registry.insert_request(&request(second.id())).await?;
        registry.insert_request(&request(second.id())).await?;

        let (other, untouched) = seed_algorithm(registry, "churn_predictor").await?;
        registry.insert_request(&request(untouched.id())).await?;

        let summary = registry.delete_endpoint(parent.id()).await?;

        assert_eq!(
            summary,
            CascadeSummary {
                endpoints: 1,
                algorithms: 2,
                statuses: 3,
                requests: 3,
            }
        );
        assert!(registry.find_endpoint(parent.id()).await?.is_none());
        assert!(registry.find_request(logged.id()).await?.is_none());
        let orphans = registry
            .list_algorithms(&AlgorithmFilter::new().with_parent_endpoint(parent.id()))
            .await?;
        assert!(orphans.is_empty());

        assert!(registry.find_endpoint(other.id()).await?.is_some());
        assert_eq!(registry.list_requests(untouched.id()).await?.len(), 1);
        Ok::<(), BoxError>(())
    })
}

#[rstest]
fn algorithm_delete_counts_children_and_keeps_siblings(
    shared_test_cluster: PostgresCluster,
) -> Result<(), BoxError> {
    let prepared = prepare_registry(shared_test_cluster, "cascade_algorithm")?;
    let registry = &prepared.registry;
    let rt = test_runtime()?;

    rt.block_on(async {
        let (parent, doomed) = seed_algorithm(registry, "income_classifier").await?;
        let sibling = algorithm(parent.id(), "random forest", "0.0.2");
        registry.insert_algorithm(&sibling).await?;
        registry.insert_status(&status(doomed.id(), "production", true)).await?;
        registry.insert_status(&status(sibling.id(), "testing", true)).await?;
        registry.insert_request(&request(doomed.id())).await?;

        let summary = registry.delete_algorithm(doomed.id()).await?;

        assert_eq!(
            summary,
            CascadeSummary {
                endpoints: 0,
                algorithms: 1,
                statuses: 1,
                requests: 1,
            }
        );
        assert!(registry.find_endpoint(parent.id()).await?.is_some());
        assert_eq!(registry.list_statuses(sibling.id()).await?.len(), 1);
        Ok::<(), BoxError>(())
    })
}

#[rstest]
fn second_delete_is_not_found(shared_test_cluster: PostgresCluster) -> Result<(), BoxError> {
    let prepared = prepare_registry(shared_test_cluster, "cascade_repeat")?;
    let registry = &prepared.registry;
    let rt = test_runtime()?;

    rt.block_on(async {
        let (parent, child) = seed_algorithm(registry, "income_classifier").await?;
        let recorded = status(child.id(), "production", true);
        registry.insert_status(&recorded).await?;
        let logged = request(child.id());
        registry.insert_request(&logged).await?;

        registry.delete_status(recorded.id()).await?;
        let status_again = registry.delete_status(recorded.id()).await;
        assert!(matches!(
            status_again,
            Err(RegistryError::NotFound(RecordRef::AlgorithmStatus(id))) if id == recorded.id()
        ));

        registry.delete_request(logged.id()).await?;
        let request_again = registry.delete_request(logged.id()).await;
        assert!(matches!(
            request_again,
            Err(RegistryError::NotFound(RecordRef::Request(id))) if id == logged.id()
        ));

        registry.delete_algorithm(child.id()).await?;
        let algorithm_again = registry.delete_algorithm(child.id()).await;
        assert!(matches!(
            algorithm_again,
            Err(RegistryError::NotFound(RecordRef::Algorithm(id))) if id == child.id()
        ));

        let summary = registry.delete_endpoint(parent.id()).await?;
        assert_eq!(summary.total(), 1);
        let endpoint_again = registry.delete_endpoint(parent.id()).await;
        assert!(matches!(
            endpoint_again,
            Err(RegistryError::NotFound(RecordRef::Endpoint(id))) if id == parent.id()
        ));
        Ok::<(), BoxError>(())
    })
}

#[rstest]
fn deleting_unknown_endpoint_is_not_found(
    shared_test_cluster: PostgresCluster,
) -> Result<(), BoxError> {
    let prepared = prepare_registry(shared_test_cluster, "cascade_unknown")?;
    let rt = test_runtime()?;
    let missing = endpoint("never_stored");

    let result = rt.block_on(prepared.registry.delete_endpoint(missing.id()));

    assert!(matches!(
        result,
        Err(RegistryError::NotFound(RecordRef::Endpoint(id))) if id == missing.id()
    ));
    Ok(())
}
