//! Diesel row models and their conversions to registry domain records.

use super::schema::{endpoints, ml_algorithm_statuses, ml_algorithms, ml_requests};
use crate::registry::{
    domain::{
        AlgorithmId, AlgorithmSpec, AlgorithmStatusId, BoundedText, Endpoint, EndpointId,
        MlAlgorithm, MlAlgorithmStatus, MlRequest, PersistedAlgorithmData, PersistedEndpointData,
        PersistedRequestData, PersistedStatusData, RequestId, RequestPayloads,
    },
    ports::{RegistryError, RegistryResult},
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Endpoint table row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = endpoints)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EndpointRow {
    /// Endpoint identifier.
    pub id: uuid::Uuid,
    /// Endpoint name.
    pub name: String,
    /// Owner name.
    pub owner: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Algorithm table row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = ml_algorithms)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AlgorithmRow {
    /// Algorithm identifier.
    pub id: uuid::Uuid,
    /// Algorithm name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Opaque source text.
    pub code: String,
    /// Version label.
    pub version: String,
    /// Owner name.
    pub owner: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Owning endpoint.
    pub parent_endpoint_id: uuid::Uuid,
}

/// Algorithm status table row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = ml_algorithm_statuses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct StatusRow {
    /// Status identifier.
    pub id: uuid::Uuid,
    /// Free-text status label.
    pub status: String,
    /// Effective flag.
    pub active: bool,
    /// Author name.
    pub created_by: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Owning algorithm.
    pub parent_mlalgorithm_id: uuid::Uuid,
}

/// Inference request table row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = ml_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RequestRow {
    /// Request identifier.
    pub id: uuid::Uuid,
    /// Input payload.
    pub input_data: String,
    /// Full algorithm output.
    pub full_response: String,
    /// Caller-facing response.
    pub response: String,
    /// Optional feedback payload.
    pub feedback: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Owning algorithm.
    pub parent_mlalgorithm_id: uuid::Uuid,
}

fn parse_text<const MAX: usize, const REQUIRED: bool>(
    field: &'static str,
    value: String,
) -> RegistryResult<BoundedText<MAX, REQUIRED>> {
    BoundedText::new(field, value).map_err(RegistryError::invalid_persisted_data)
}

impl From<&Endpoint> for EndpointRow {
    fn from(endpoint: &Endpoint) -> Self {
        Self {
            id: endpoint.id().into_inner(),
            name: endpoint.name().as_str().to_owned(),
            owner: endpoint.owner().as_str().to_owned(),
            created_at: endpoint.created_at(),
        }
    }
}

impl TryFrom<EndpointRow> for Endpoint {
    type Error = RegistryError;

    fn try_from(row: EndpointRow) -> RegistryResult<Self> {
        Ok(Self::from_persisted(PersistedEndpointData {
            id: EndpointId::from_uuid(row.id),
            name: parse_text("name", row.name)?,
            owner: parse_text("owner", row.owner)?,
            created_at: row.created_at,
        }))
    }
}

impl From<&MlAlgorithm> for AlgorithmRow {
    fn from(algorithm: &MlAlgorithm) -> Self {
        Self {
            id: algorithm.id().into_inner(),
            name: algorithm.name().as_str().to_owned(),
            description: algorithm.description().as_str().to_owned(),
            code: algorithm.code().as_str().to_owned(),
            version: algorithm.version().as_str().to_owned(),
            owner: algorithm.owner().as_str().to_owned(),
            created_at: algorithm.created_at(),
            parent_endpoint_id: algorithm.parent_endpoint().into_inner(),
        }
    }
}

impl TryFrom<AlgorithmRow> for MlAlgorithm {
    type Error = RegistryError;

    fn try_from(row: AlgorithmRow) -> RegistryResult<Self> {
        let spec = AlgorithmSpec {
            name: parse_text("name", row.name)?,
            owner: parse_text("owner", row.owner)?,
            version: parse_text("version", row.version)?,
            description: parse_text("description", row.description)?,
            code: parse_text("code", row.code)?,
        };
        Ok(Self::from_persisted(PersistedAlgorithmData {
            id: AlgorithmId::from_uuid(row.id),
            spec,
            created_at: row.created_at,
            parent_endpoint: EndpointId::from_uuid(row.parent_endpoint_id),
        }))
    }
}

impl From<&MlAlgorithmStatus> for StatusRow {
    fn from(status: &MlAlgorithmStatus) -> Self {
        Self {
            id: status.id().into_inner(),
            status: status.status().as_str().to_owned(),
            active: status.is_active(),
            created_by: status.created_by().as_str().to_owned(),
            created_at: status.created_at(),
            parent_mlalgorithm_id: status.parent_mlalgorithm().into_inner(),
        }
    }
}

impl TryFrom<StatusRow> for MlAlgorithmStatus {
    type Error = RegistryError;

    fn try_from(row: StatusRow) -> RegistryResult<Self> {
        Ok(Self::from_persisted(PersistedStatusData {
            id: AlgorithmStatusId::from_uuid(row.id),
            status: parse_text("status", row.status)?,
            active: row.active,
            created_by: parse_text("created_by", row.created_by)?,
            created_at: row.created_at,
            parent_mlalgorithm: AlgorithmId::from_uuid(row.parent_mlalgorithm_id),
        }))
    }
}

impl From<&MlRequest> for RequestRow {
    fn from(request: &MlRequest) -> Self {
        Self {
            id: request.id().into_inner(),
            input_data: request.input_data().as_str().to_owned(),
            full_response: request.full_response().as_str().to_owned(),
            response: request.response().as_str().to_owned(),
            feedback: request.feedback().map(|f| f.as_str().to_owned()),
            created_at: request.created_at(),
            parent_mlalgorithm_id: request.parent_mlalgorithm().into_inner(),
        }
    }
}

impl TryFrom<RequestRow> for MlRequest {
    type Error = RegistryError;

    fn try_from(row: RequestRow) -> RegistryResult<Self> {
        let payloads = RequestPayloads {
            input_data: parse_text("input_data", row.input_data)?,
            full_response: parse_text("full_response", row.full_response)?,
            response: parse_text("response", row.response)?,
        };
        let feedback = row
            .feedback
            .map(|value| parse_text("feedback", value))
            .transpose()?;
        Ok(Self::from_persisted(PersistedRequestData {
            id: RequestId::from_uuid(row.id),
            payloads,
            feedback,
            created_at: row.created_at,
            parent_mlalgorithm: AlgorithmId::from_uuid(row.parent_mlalgorithm_id),
        }))
    }
}
