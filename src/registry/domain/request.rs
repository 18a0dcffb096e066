//! Inference request audit records.

use super::{AlgorithmId, Payload, RequestId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Payloads captured for a single inference call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestPayloads {
    /// Input sent to the algorithm.
    pub input_data: Payload,
    /// Complete algorithm output, including diagnostics.
    pub full_response: Payload,
    /// Response returned to the caller.
    pub response: Payload,
}

/// Audit record of one inference call against one algorithm.
///
/// Only `feedback` may change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MlRequest {
    id: RequestId,
    payloads: RequestPayloads,
    feedback: Option<Payload>,
    created_at: DateTime<Utc>,
    parent_mlalgorithm: AlgorithmId,
}

/// Parameter object for reconstructing a persisted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedRequestData {
    /// Persisted request identifier.
    pub id: RequestId,
    /// Persisted payloads.
    pub payloads: RequestPayloads,
    /// Persisted feedback, if recorded.
    pub feedback: Option<Payload>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted owning algorithm.
    pub parent_mlalgorithm: AlgorithmId,
}

impl MlRequest {
    /// Creates a new request record with no feedback.
    #[must_use]
    pub fn new(
        parent_mlalgorithm: AlgorithmId,
        payloads: RequestPayloads,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: RequestId::new(),
            payloads,
            feedback: None,
            created_at: clock.utc(),
            parent_mlalgorithm,
        }
    }

    /// Sets feedback at creation time.
    #[must_use]
    pub fn with_feedback(mut self, feedback: Payload) -> Self {
        self.feedback = Some(feedback);
        self
    }

    /// Reconstructs a request from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedRequestData) -> Self {
        Self {
            id: data.id,
            payloads: data.payloads,
            feedback: data.feedback,
            created_at: data.created_at,
            parent_mlalgorithm: data.parent_mlalgorithm,
        }
    }

    /// Returns the request identifier.
    #[must_use]
    pub const fn id(&self) -> RequestId {
        self.id
    }

    /// Returns all captured payloads.
    #[must_use]
    pub const fn payloads(&self) -> &RequestPayloads {
        &self.payloads
    }

    /// Returns the input payload.
    #[must_use]
    pub const fn input_data(&self) -> &Payload {
        &self.payloads.input_data
    }

    /// Returns the full algorithm output.
    #[must_use]
    pub const fn full_response(&self) -> &Payload {
        &self.payloads.full_response
    }

    /// Returns the caller-facing response.
    #[must_use]
    pub const fn response(&self) -> &Payload {
        &self.payloads.response
    }

    /// Returns recorded feedback, if any.
    #[must_use]
    pub const fn feedback(&self) -> Option<&Payload> {
        self.feedback.as_ref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the owning algorithm.
    #[must_use]
    pub const fn parent_mlalgorithm(&self) -> AlgorithmId {
        self.parent_mlalgorithm
    }

    /// Records feedback, replacing any earlier value.
    pub fn record_feedback(&mut self, feedback: Payload) {
        self.feedback = Some(feedback);
    }

    /// Removes recorded feedback.
    pub fn clear_feedback(&mut self) {
        self.feedback = None;
    }
}
