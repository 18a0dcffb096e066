//! Repository port for registry record persistence.

use crate::registry::domain::{
    AlgorithmId, AlgorithmStatusId, CascadeSummary, Endpoint, EndpointId, MlAlgorithm,
    MlAlgorithmStatus, MlRequest, RecordRef, RequestId,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for registry repository operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Narrows an algorithm listing. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlgorithmFilter {
    parent_endpoint: Option<EndpointId>,
    name: Option<String>,
    version: Option<String>,
}

impl AlgorithmFilter {
    /// Creates a filter matching every algorithm.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the listing to algorithms owned by `endpoint`.
    #[must_use]
    pub const fn with_parent_endpoint(mut self, endpoint: EndpointId) -> Self {
        self.parent_endpoint = Some(endpoint);
        self
    }

    /// Restricts the listing to algorithms with exactly this name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Restricts the listing to algorithms with exactly this version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Returns the endpoint restriction, if set.
    #[must_use]
    pub const fn parent_endpoint(&self) -> Option<EndpointId> {
        self.parent_endpoint
    }

    /// Returns the name restriction, if set.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the version restriction, if set.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Returns whether `algorithm` satisfies every set restriction.
    #[must_use]
    pub fn matches(&self, algorithm: &MlAlgorithm) -> bool {
        self.parent_endpoint
            .is_none_or(|id| id == algorithm.parent_endpoint())
            && self
                .name
                .as_deref()
                .is_none_or(|name| name == algorithm.name().as_str())
            && self
                .version
                .as_deref()
                .is_none_or(|version| version == algorithm.version().as_str())
    }
}

/// Registry persistence contract.
///
/// Listings are ordered by creation time, then identifier. Deletes cascade
/// down the ownership tree and report what they removed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistryRepository: Send + Sync {
    /// Stores a new endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] when the identifier already
    /// exists.
    async fn insert_endpoint(&self, endpoint: &Endpoint) -> RegistryResult<()>;

    /// Finds an endpoint by identifier.
    async fn find_endpoint(&self, id: EndpointId) -> RegistryResult<Option<Endpoint>>;

    /// Returns every endpoint.
    async fn list_endpoints(&self) -> RegistryResult<Vec<Endpoint>>;

    /// Deletes an endpoint with all of its algorithms and their children.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when the endpoint does not exist.
    async fn delete_endpoint(&self, id: EndpointId) -> RegistryResult<CascadeSummary>;

    /// Stores a new algorithm.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::MissingParent`] when the parent endpoint does
    /// not exist, or [`RegistryError::Duplicate`] for a reused identifier.
    async fn insert_algorithm(&self, algorithm: &MlAlgorithm) -> RegistryResult<()>;

    /// Finds an algorithm by identifier.
    async fn find_algorithm(&self, id: AlgorithmId) -> RegistryResult<Option<MlAlgorithm>>;

    /// Returns every algorithm matching `filter`.
    async fn list_algorithms(&self, filter: &AlgorithmFilter)
    -> RegistryResult<Vec<MlAlgorithm>>;

    /// Deletes an algorithm with all of its statuses and requests.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when the algorithm does not exist.
    async fn delete_algorithm(&self, id: AlgorithmId) -> RegistryResult<CascadeSummary>;

    /// Stores a new status observation.
    ///
    /// When the status is active, every other active status of the same
    /// algorithm is deactivated in the same atomic step.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::MissingParent`] when the parent algorithm
    /// does not exist, or [`RegistryError::Duplicate`] for a reused
    /// identifier.
    async fn insert_status(&self, status: &MlAlgorithmStatus) -> RegistryResult<()>;

    /// Finds a status by identifier.
    async fn find_status(&self, id: AlgorithmStatusId)
    -> RegistryResult<Option<MlAlgorithmStatus>>;

    /// Returns the status history of an algorithm.
    async fn list_statuses(&self, algorithm: AlgorithmId)
    -> RegistryResult<Vec<MlAlgorithmStatus>>;

    /// Deletes a single status observation.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when the status does not exist.
    async fn delete_status(&self, id: AlgorithmStatusId) -> RegistryResult<CascadeSummary>;

    /// Stores a new request record.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::MissingParent`] when the parent algorithm
    /// does not exist, or [`RegistryError::Duplicate`] for a reused
    /// identifier.
    async fn insert_request(&self, request: &MlRequest) -> RegistryResult<()>;

    /// Persists the mutable part of a request (its feedback).
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when the request does not exist.
    async fn update_request(&self, request: &MlRequest) -> RegistryResult<()>;

    /// Finds a request by identifier.
    async fn find_request(&self, id: RequestId) -> RegistryResult<Option<MlRequest>>;

    /// Returns the request log of an algorithm.
    async fn list_requests(&self, algorithm: AlgorithmId) -> RegistryResult<Vec<MlRequest>>;

    /// Deletes a single request record.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when the request does not exist.
    async fn delete_request(&self, id: RequestId) -> RegistryResult<CascadeSummary>;
}

/// Errors returned by registry repository implementations.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    /// The referenced record does not exist.
    #[error("{0} not found")]
    NotFound(RecordRef),

    /// The parent referenced by a new record does not exist.
    #[error("parent {0} does not exist")]
    MissingParent(RecordRef),

    /// A record with the same identifier already exists.
    #[error("duplicate {0}")]
    Duplicate(RecordRef),

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl RegistryError {
    /// Wraps a data-quality or deserialization error from persisted rows.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

impl From<diesel::result::Error> for RegistryError {
    fn from(err: diesel::result::Error) -> Self {
        Self::persistence(err)
    }
}
