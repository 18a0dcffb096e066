//! Service layer for registry record management.
//!
//! Provides [`RegistryService`] which validates input, stamps creation times,
//! and coordinates create, read, feedback, and cascading delete operations
//! against a [`RegistryRepository`].

use crate::registry::{
    domain::{
        AlgorithmId, AlgorithmSpec, AlgorithmStatusId, CascadeSummary, Description, Endpoint,
        EndpointId, MlAlgorithm, MlAlgorithmStatus, MlRequest, Payload, RecordRef,
        RegistryDomainError, RequestId, RequestPayloads, ShortText, SourceCode,
    },
    ports::{AlgorithmFilter, RegistryError, RegistryRepository},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Request payload for creating an endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateEndpointRequest {
    name: String,
    owner: String,
}

impl CreateEndpointRequest {
    /// Creates a request with the endpoint name and owner.
    #[must_use]
    pub fn new(name: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            owner: owner.into(),
        }
    }
}

/// Request payload for creating an algorithm version under an endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAlgorithmRequest {
    parent_endpoint: EndpointId,
    name: String,
    version: String,
    owner: String,
    description: String,
    code: String,
}

impl CreateAlgorithmRequest {
    /// Creates a request with the identifying algorithm fields.
    ///
    /// Description and code default to empty text.
    #[must_use]
    pub fn new(
        parent_endpoint: EndpointId,
        name: impl Into<String>,
        version: impl Into<String>,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            parent_endpoint,
            name: name.into(),
            version: version.into(),
            owner: owner.into(),
            description: String::new(),
            code: String::new(),
        }
    }

    /// Sets the human-readable description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the opaque algorithm source.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }
}

/// Request payload for recording a status observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordStatusRequest {
    parent_mlalgorithm: AlgorithmId,
    status: String,
    active: bool,
    created_by: String,
}

impl RecordStatusRequest {
    /// Creates a request for a status observation on `parent_mlalgorithm`.
    #[must_use]
    pub fn new(
        parent_mlalgorithm: AlgorithmId,
        status: impl Into<String>,
        active: bool,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            parent_mlalgorithm,
            status: status.into(),
            active,
            created_by: created_by.into(),
        }
    }
}

/// Request payload for logging one inference call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogInferenceRequest {
    parent_mlalgorithm: AlgorithmId,
    input_data: String,
    full_response: String,
    response: String,
    feedback: Option<String>,
}

impl LogInferenceRequest {
    /// Creates a request carrying the three mandatory payloads.
    #[must_use]
    pub fn new(
        parent_mlalgorithm: AlgorithmId,
        input_data: impl Into<String>,
        full_response: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        Self {
            parent_mlalgorithm,
            input_data: input_data.into(),
            full_response: full_response.into(),
            response: response.into(),
            feedback: None,
        }
    }

    /// Attaches feedback that is already known at logging time.
    #[must_use]
    pub fn with_feedback(mut self, feedback: impl Into<String>) -> Self {
        self.feedback = Some(feedback.into());
        self
    }
}

/// Request payload for idempotent algorithm registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterAlgorithmRequest {
    endpoint_name: String,
    algorithm_name: String,
    version: String,
    status: String,
    owner: String,
    description: String,
    code: String,
}

impl RegisterAlgorithmRequest {
    /// Creates a registration for `algorithm_name` at `version` behind the
    /// endpoint called `endpoint_name`.
    #[must_use]
    pub fn new(
        endpoint_name: impl Into<String>,
        algorithm_name: impl Into<String>,
        version: impl Into<String>,
        status: impl Into<String>,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            endpoint_name: endpoint_name.into(),
            algorithm_name: algorithm_name.into(),
            version: version.into(),
            status: status.into(),
            owner: owner.into(),
            description: String::new(),
            code: String::new(),
        }
    }

    /// Sets the algorithm description used when the algorithm is created.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the algorithm source used when the algorithm is created.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }
}

/// Outcome of [`RegistryService::register_algorithm`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredAlgorithm {
    /// Endpoint serving the algorithm, found or created.
    pub endpoint: Endpoint,
    /// Algorithm version, found or created.
    pub algorithm: MlAlgorithm,
    /// Initial status, present only when the algorithm was created by this
    /// call.
    pub initial_status: Option<MlAlgorithmStatus>,
}

impl RegisteredAlgorithm {
    /// Returns whether this call created the algorithm.
    #[must_use]
    pub const fn is_new(&self) -> bool {
        self.initial_status.is_some()
    }
}

/// Coarse classification of service failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryErrorKind {
    /// Input failed field validation.
    Validation,
    /// The addressed record does not exist.
    NotFound,
    /// A new record referenced a parent that does not exist.
    ForeignKey,
    /// A record with the same identifier already exists.
    Conflict,
    /// The storage backend failed or returned unusable data.
    Storage,
}

/// Service-level errors for registry operations.
#[derive(Debug, Error)]
pub enum RegistryServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] RegistryDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] RegistryError),
}

impl RegistryServiceError {
    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> RegistryErrorKind {
        match self {
            Self::Domain(_) => RegistryErrorKind::Validation,
            Self::Repository(RegistryError::NotFound(_)) => RegistryErrorKind::NotFound,
            Self::Repository(RegistryError::MissingParent(_)) => RegistryErrorKind::ForeignKey,
            Self::Repository(RegistryError::Duplicate(_)) => RegistryErrorKind::Conflict,
            Self::Repository(
                RegistryError::InvalidPersistedData(_) | RegistryError::Persistence(_),
            ) => RegistryErrorKind::Storage,
        }
    }
}

/// Result type for registry service operations.
pub type RegistryServiceResult<T> = Result<T, RegistryServiceError>;

/// Registry record orchestration service.
#[derive(Clone)]
pub struct RegistryService<R, C>
where
    R: RegistryRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> RegistryService<R, C>
where
    R: RegistryRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new registry service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Creates an endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Domain`] when a field is missing or
    /// too long, or [`RegistryServiceError::Repository`] when persistence
    /// fails.
    pub async fn create_endpoint(
        &self,
        request: CreateEndpointRequest,
    ) -> RegistryServiceResult<Endpoint> {
        let CreateEndpointRequest { name, owner } = request;
        let endpoint = Endpoint::new(
            ShortText::new("name", name)?,
            ShortText::new("owner", owner)?,
            &*self.clock,
        );
        self.repository.insert_endpoint(&endpoint).await?;
        info!(endpoint_id = %endpoint.id(), name = %endpoint.name(), "created endpoint");
        Ok(endpoint)
    }

    /// Finds an endpoint by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Repository`] when persistence lookup
    /// fails.
    pub async fn find_endpoint(&self, id: EndpointId) -> RegistryServiceResult<Option<Endpoint>> {
        debug!(endpoint_id = %id, "finding endpoint");
        Ok(self.repository.find_endpoint(id).await?)
    }

    /// Returns every endpoint in creation order.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Repository`] when persistence lookup
    /// fails.
    pub async fn list_endpoints(&self) -> RegistryServiceResult<Vec<Endpoint>> {
        debug!("listing endpoints");
        Ok(self.repository.list_endpoints().await?)
    }

    /// Deletes an endpoint together with its algorithms, statuses, and
    /// requests.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Repository`] when the endpoint does
    /// not exist or persistence fails.
    pub async fn delete_endpoint(&self, id: EndpointId) -> RegistryServiceResult<CascadeSummary> {
        let summary = self.repository.delete_endpoint(id).await?;
        info!(
            endpoint_id = %id,
            algorithms = summary.algorithms,
            statuses = summary.statuses,
            requests = summary.requests,
            "deleted endpoint"
        );
        Ok(summary)
    }

    /// Creates an algorithm version under an existing endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Domain`] when a field is missing or
    /// too long, or [`RegistryServiceError::Repository`] when the endpoint
    /// does not exist or persistence fails.
    pub async fn create_algorithm(
        &self,
        request: CreateAlgorithmRequest,
    ) -> RegistryServiceResult<MlAlgorithm> {
        let CreateAlgorithmRequest {
            parent_endpoint,
            name,
            version,
            owner,
            description,
            code,
        } = request;

        let spec = AlgorithmSpec {
            name: ShortText::new("name", name)?,
            owner: ShortText::new("owner", owner)?,
            version: ShortText::new("version", version)?,
            description: Description::new("description", description)?,
            code: SourceCode::new("code", code)?,
        };
        let algorithm = MlAlgorithm::new(parent_endpoint, spec, &*self.clock);
        self.repository.insert_algorithm(&algorithm).await?;
        info!(
            algorithm_id = %algorithm.id(),
            endpoint_id = %parent_endpoint,
            name = %algorithm.name(),
            version = %algorithm.version(),
            "created algorithm"
        );
        Ok(algorithm)
    }

    /// Finds an algorithm by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Repository`] when persistence lookup
    /// fails.
    pub async fn find_algorithm(
        &self,
        id: AlgorithmId,
    ) -> RegistryServiceResult<Option<MlAlgorithm>> {
        debug!(algorithm_id = %id, "finding algorithm");
        Ok(self.repository.find_algorithm(id).await?)
    }

    /// Returns the algorithms matching `filter` in creation order.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Repository`] when persistence lookup
    /// fails.
    pub async fn list_algorithms(
        &self,
        filter: &AlgorithmFilter,
    ) -> RegistryServiceResult<Vec<MlAlgorithm>> {
        debug!(?filter, "listing algorithms");
        Ok(self.repository.list_algorithms(filter).await?)
    }

    /// Deletes an algorithm together with its statuses and requests.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Repository`] when the algorithm does
    /// not exist or persistence fails.
    pub async fn delete_algorithm(&self, id: AlgorithmId) -> RegistryServiceResult<CascadeSummary> {
        let summary = self.repository.delete_algorithm(id).await?;
        info!(
            algorithm_id = %id,
            statuses = summary.statuses,
            requests = summary.requests,
            "deleted algorithm"
        );
        Ok(summary)
    }

    /// Records a status observation for an algorithm.
    ///
    /// An active status supersedes the previously active one.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Domain`] when a field is missing or
    /// too long, or [`RegistryServiceError::Repository`] when the algorithm
    /// does not exist or persistence fails.
    pub async fn record_status(
        &self,
        request: RecordStatusRequest,
    ) -> RegistryServiceResult<MlAlgorithmStatus> {
        let RecordStatusRequest {
            parent_mlalgorithm,
            status,
            active,
            created_by,
        } = request;

        let record = MlAlgorithmStatus::new(
            parent_mlalgorithm,
            ShortText::new("status", status)?,
            active,
            ShortText::new("created_by", created_by)?,
            &*self.clock,
        );
        self.repository.insert_status(&record).await?;
        info!(
            status_id = %record.id(),
            algorithm_id = %parent_mlalgorithm,
            status = %record.status(),
            active,
            "recorded algorithm status"
        );
        Ok(record)
    }

    /// Finds a status observation by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Repository`] when persistence lookup
    /// fails.
    pub async fn find_status(
        &self,
        id: AlgorithmStatusId,
    ) -> RegistryServiceResult<Option<MlAlgorithmStatus>> {
        debug!(status_id = %id, "finding algorithm status");
        Ok(self.repository.find_status(id).await?)
    }

    /// Returns the status history of an algorithm in creation order.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Repository`] when persistence lookup
    /// fails.
    pub async fn list_statuses(
        &self,
        algorithm: AlgorithmId,
    ) -> RegistryServiceResult<Vec<MlAlgorithmStatus>> {
        debug!(algorithm_id = %algorithm, "listing algorithm statuses");
        Ok(self.repository.list_statuses(algorithm).await?)
    }

    /// Returns the currently effective status of an algorithm, if any.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Repository`] when persistence lookup
    /// fails.
    pub async fn active_status(
        &self,
        algorithm: AlgorithmId,
    ) -> RegistryServiceResult<Option<MlAlgorithmStatus>> {
        let statuses = self.list_statuses(algorithm).await?;
        Ok(statuses
            .into_iter()
            .rev()
            .find(MlAlgorithmStatus::is_active))
    }

    /// Deletes a single status observation.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Repository`] when the status does not
    /// exist or persistence fails.
    pub async fn delete_status(
        &self,
        id: AlgorithmStatusId,
    ) -> RegistryServiceResult<CascadeSummary> {
        let summary = self.repository.delete_status(id).await?;
        info!(status_id = %id, "deleted algorithm status");
        Ok(summary)
    }

    /// Logs one inference call against an algorithm.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Domain`] when a payload is too long,
    /// or [`RegistryServiceError::Repository`] when the algorithm does not
    /// exist or persistence fails.
    pub async fn log_request(
        &self,
        request: LogInferenceRequest,
    ) -> RegistryServiceResult<MlRequest> {
        let LogInferenceRequest {
            parent_mlalgorithm,
            input_data,
            full_response,
            response,
            feedback,
        } = request;

        let payloads = RequestPayloads {
            input_data: Payload::new("input_data", input_data)?,
            full_response: Payload::new("full_response", full_response)?,
            response: Payload::new("response", response)?,
        };
        let mut record = MlRequest::new(parent_mlalgorithm, payloads, &*self.clock);
        if let Some(value) = feedback {
            record = record.with_feedback(Payload::new("feedback", value)?);
        }

        self.repository.insert_request(&record).await?;
        info!(
            request_id = %record.id(),
            algorithm_id = %parent_mlalgorithm,
            "logged inference request"
        );
        Ok(record)
    }

    /// Finds a request record by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Repository`] when persistence lookup
    /// fails.
    pub async fn find_request(&self, id: RequestId) -> RegistryServiceResult<Option<MlRequest>> {
        debug!(request_id = %id, "finding inference request");
        Ok(self.repository.find_request(id).await?)
    }

    /// Returns the request log of an algorithm in creation order.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Repository`] when persistence lookup
    /// fails.
    pub async fn list_requests(
        &self,
        algorithm: AlgorithmId,
    ) -> RegistryServiceResult<Vec<MlRequest>> {
        debug!(algorithm_id = %algorithm, "listing inference requests");
        Ok(self.repository.list_requests(algorithm).await?)
    }

    /// Sets the feedback of an existing request, replacing any earlier
    /// feedback. Other fields are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Domain`] when the feedback is too
    /// long, or [`RegistryServiceError::Repository`] when the request does
    /// not exist or persistence fails.
    pub async fn record_feedback(
        &self,
        id: RequestId,
        feedback: impl Into<String> + Send,
    ) -> RegistryServiceResult<MlRequest> {
        let feedback = Payload::new("feedback", feedback)?;
        let mut record = self
            .repository
            .find_request(id)
            .await?
            .ok_or(RegistryError::NotFound(RecordRef::Request(id)))?;

        record.record_feedback(feedback);
        self.repository.update_request(&record).await?;
        info!(request_id = %id, "recorded request feedback");
        Ok(record)
    }

    /// Deletes a single request record.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Repository`] when the request does not
    /// exist or persistence fails.
    pub async fn delete_request(&self, id: RequestId) -> RegistryServiceResult<CascadeSummary> {
        let summary = self.repository.delete_request(id).await?;
        info!(request_id = %id, "deleted inference request");
        Ok(summary)
    }

    /// Finds or creates the endpoint and algorithm named by `request`.
    ///
    /// The endpoint is matched on name and owner; the algorithm on endpoint,
    /// name, version, and owner. A newly created algorithm receives an
    /// active initial status authored by the owner. When that status cannot
    /// be recorded, the new algorithm is deleted again before the error is
    /// returned, so a retry registers it afresh. Lookups and inserts are
    /// separate repository calls, so concurrent registrations of the same
    /// algorithm may both create records.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Domain`] when a field is missing or
    /// too long, or [`RegistryServiceError::Repository`] when persistence
    /// fails.
    pub async fn register_algorithm(
        &self,
        request: RegisterAlgorithmRequest,
    ) -> RegistryServiceResult<RegisteredAlgorithm> {
        let RegisterAlgorithmRequest {
            endpoint_name,
            algorithm_name,
            version,
            status,
            owner,
            description,
            code,
        } = request;

        let endpoint_name = ShortText::new("name", endpoint_name)?;
        let owner = ShortText::new("owner", owner)?;
        let spec = AlgorithmSpec {
            name: ShortText::new("name", algorithm_name)?,
            owner: owner.clone(),
            version: ShortText::new("version", version)?,
            description: Description::new("description", description)?,
            code: SourceCode::new("code", code)?,
        };
        let status = ShortText::new("status", status)?;

        let endpoint = self.find_or_create_endpoint(endpoint_name, owner).await?;

        let filter = AlgorithmFilter::new()
            .with_parent_endpoint(endpoint.id())
            .with_name(spec.name.as_str())
            .with_version(spec.version.as_str());
        let existing = self
            .repository
            .list_algorithms(&filter)
            .await?
            .into_iter()
            .find(|algorithm| algorithm.owner() == &spec.owner);

        if let Some(algorithm) = existing {
            debug!(algorithm_id = %algorithm.id(), "algorithm already registered");
            return Ok(RegisteredAlgorithm {
                endpoint,
                algorithm,
                initial_status: None,
            });
        }

        let created_by = spec.owner.clone();
        let algorithm = MlAlgorithm::new(endpoint.id(), spec, &*self.clock);
        self.repository.insert_algorithm(&algorithm).await?;

        let initial_status =
            MlAlgorithmStatus::new(algorithm.id(), status, true, created_by, &*self.clock);
        if let Err(err) = self.repository.insert_status(&initial_status).await {
            self.discard_algorithm(algorithm.id()).await;
            return Err(err.into());
        }

        info!(
            endpoint_id = %endpoint.id(),
            algorithm_id = %algorithm.id(),
            status = %initial_status.status(),
            "registered algorithm"
        );
        Ok(RegisteredAlgorithm {
            endpoint,
            algorithm,
            initial_status: Some(initial_status),
        })
    }

    /// Removes an algorithm whose initial status could not be recorded.
    async fn discard_algorithm(&self, id: AlgorithmId) {
        match self.repository.delete_algorithm(id).await {
            Ok(_) => debug!(algorithm_id = %id, "discarded partially registered algorithm"),
            Err(err) => warn!(
                algorithm_id = %id,
                error = %err,
                "failed to discard partially registered algorithm"
            ),
        }
    }

    async fn find_or_create_endpoint(
        &self,
        name: ShortText,
        owner: ShortText,
    ) -> RegistryServiceResult<Endpoint> {
        let existing = self
            .repository
            .list_endpoints()
            .await?
            .into_iter()
            .find(|endpoint| endpoint.name() == &name && endpoint.owner() == &owner);
        if let Some(endpoint) = existing {
            return Ok(endpoint);
        }

        let endpoint = Endpoint::new(name, owner, &*self.clock);
        self.repository.insert_endpoint(&endpoint).await?;
        info!(endpoint_id = %endpoint.id(), name = %endpoint.name(), "created endpoint");
        Ok(endpoint)
    }
}
