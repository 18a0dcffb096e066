//! Algorithm record: one versioned unit of inference logic.

use super::{AlgorithmId, Description, EndpointId, ShortText, SourceCode};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Validated descriptive fields of an algorithm version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorithmSpec {
    /// Algorithm name, e.g. `random_forest`.
    pub name: ShortText,
    /// Owner name.
    pub owner: ShortText,
    /// Version label, e.g. `0.0.1`.
    pub version: ShortText,
    /// Short description of how the algorithm works.
    pub description: Description,
    /// Opaque source or configuration text.
    pub code: SourceCode,
}

/// A versioned algorithm bound to exactly one endpoint.
///
/// Algorithms are never edited in place. A new version is a new record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MlAlgorithm {
    id: AlgorithmId,
    spec: AlgorithmSpec,
    created_at: DateTime<Utc>,
    parent_endpoint: EndpointId,
}

/// Parameter object for reconstructing a persisted algorithm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedAlgorithmData {
    /// Persisted algorithm identifier.
    pub id: AlgorithmId,
    /// Persisted descriptive fields.
    pub spec: AlgorithmSpec,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted owning endpoint.
    pub parent_endpoint: EndpointId,
}

impl MlAlgorithm {
    /// Creates a new algorithm under `parent_endpoint`.
    #[must_use]
    pub fn new(parent_endpoint: EndpointId, spec: AlgorithmSpec, clock: &impl Clock) -> Self {
        Self {
            id: AlgorithmId::new(),
            spec,
            created_at: clock.utc(),
            parent_endpoint,
        }
    }

    /// Reconstructs an algorithm from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedAlgorithmData) -> Self {
        Self {
            id: data.id,
            spec: data.spec,
            created_at: data.created_at,
            parent_endpoint: data.parent_endpoint,
        }
    }

    /// Returns the algorithm identifier.
    #[must_use]
    pub const fn id(&self) -> AlgorithmId {
        self.id
    }

    /// Returns the validated descriptive fields.
    #[must_use]
    pub const fn spec(&self) -> &AlgorithmSpec {
        &self.spec
    }

    /// Returns the algorithm name.
    #[must_use]
    pub const fn name(&self) -> &ShortText {
        &self.spec.name
    }

    /// Returns the owner name.
    #[must_use]
    pub const fn owner(&self) -> &ShortText {
        &self.spec.owner
    }

    /// Returns the version label.
    #[must_use]
    pub const fn version(&self) -> &ShortText {
        &self.spec.version
    }

    /// Returns the description.
    #[must_use]
    pub const fn description(&self) -> &Description {
        &self.spec.description
    }

    /// Returns the stored source text.
    #[must_use]
    pub const fn code(&self) -> &SourceCode {
        &self.spec.code
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the owning endpoint.
    #[must_use]
    pub const fn parent_endpoint(&self) -> EndpointId {
        self.parent_endpoint
    }
}
