//! Repository contract tests against the in-memory registry.

use super::helpers::{algorithm, endpoint_at, instant, registry, request, status};
use mlregistry::registry::{
    adapters::memory::InMemoryRegistry,
    domain::{AlgorithmId, EndpointId, Payload, RecordRef},
    ports::{AlgorithmFilter, RegistryError, RegistryRepository},
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn endpoints_are_listed_in_creation_order(registry: InMemoryRegistry) {
    let late = endpoint_at("late", instant(20));
    let early = endpoint_at("early", instant(0));
    let middle = endpoint_at("middle", instant(10));
    for endpoint in [&late, &early, &middle] {
        registry
            .insert_endpoint(endpoint)
            .await
            .expect("insert should succeed");
    }

    let names: Vec<String> = registry
        .list_endpoints()
        .await
        .expect("listing should succeed")
        .iter()
        .map(|endpoint| endpoint.name().as_str().to_owned())
        .collect();

    assert_eq!(names, ["early", "middle", "late"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reinserting_an_endpoint_is_a_duplicate(registry: InMemoryRegistry) {
    let endpoint = endpoint_at("income_classifier", instant(0));
    registry
        .insert_endpoint(&endpoint)
        .await
        .expect("first insert should succeed");

    let result = registry.insert_endpoint(&endpoint).await;

    assert!(matches!(
        result,
        Err(RegistryError::Duplicate(RecordRef::Endpoint(id))) if id == endpoint.id()
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn children_of_missing_algorithm_are_rejected(registry: InMemoryRegistry) {
    let missing = AlgorithmId::new();

    let status_result = registry.insert_status(&status(missing, "testing", true)).await;
    let request_result = registry.insert_request(&request(missing)).await;

    for result in [status_result, request_result] {
        assert!(matches!(
            result,
            Err(RegistryError::MissingParent(RecordRef::Algorithm(id))) if id == missing
        ));
    }
    assert!(
        registry
            .list_statuses(missing)
            .await
            .expect("listing should succeed")
            .is_empty()
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn algorithm_of_missing_endpoint_is_rejected(registry: InMemoryRegistry) {
    let missing = EndpointId::new();

    let result = registry
        .insert_algorithm(&algorithm(missing, "random forest", "0.0.1"))
        .await;

    assert!(matches!(
        result,
        Err(RegistryError::MissingParent(RecordRef::Endpoint(id))) if id == missing
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn algorithm_filter_combines_restrictions(registry: InMemoryRegistry) {
    let first = endpoint_at("income_classifier", instant(0));
    let second = endpoint_at("churn_classifier", instant(1));
    registry.insert_endpoint(&first).await.expect("insert");
    registry.insert_endpoint(&second).await.expect("insert");
    let wanted = algorithm(first.id(), "random forest", "0.0.2");
    for record in [
        algorithm(first.id(), "random forest", "0.0.1"),
        wanted.clone(),
        algorithm(second.id(), "random forest", "0.0.2"),
    ] {
        registry.insert_algorithm(&record).await.expect("insert");
    }

    let filter = AlgorithmFilter::new()
        .with_parent_endpoint(first.id())
        .with_name("random forest")
        .with_version("0.0.2");
    let found = registry
        .list_algorithms(&filter)
        .await
        .expect("listing should succeed");

    assert_eq!(found, vec![wanted]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_request_only_changes_feedback(registry: InMemoryRegistry) {
    let endpoint = endpoint_at("income_classifier", instant(0));
    registry.insert_endpoint(&endpoint).await.expect("insert");
    let parent = algorithm(endpoint.id(), "random forest", "0.0.1");
    registry.insert_algorithm(&parent).await.expect("insert");
    let original = request(parent.id());
    registry.insert_request(&original).await.expect("insert");

    let mut edited = original.clone();
    edited.record_feedback(Payload::new("feedback", "correct").expect("valid feedback"));
    registry
        .update_request(&edited)
        .await
        .expect("update should succeed");

    let stored = registry
        .find_request(original.id())
        .await
        .expect("lookup should succeed")
        .expect("request should exist");
    assert_eq!(stored.feedback().map(Payload::as_str), Some("correct"));
    assert_eq!(stored.payloads(), original.payloads());
    assert_eq!(stored.parent_mlalgorithm(), parent.id());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn updating_missing_request_is_not_found(registry: InMemoryRegistry) {
    let orphan = request(AlgorithmId::new());

    let result = registry.update_request(&orphan).await;

    assert!(matches!(
        result,
        Err(RegistryError::NotFound(RecordRef::Request(id))) if id == orphan.id()
    ));
}
