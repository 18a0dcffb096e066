//! Algorithm status observations.

use super::{AlgorithmId, AlgorithmStatusId, ShortText};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Conventional lifecycle labels for an algorithm.
///
/// Status labels are stored as free text; these are the values the serving
/// layer knows how to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnownStatus {
    /// Under evaluation.
    Testing,
    /// Pre-production.
    Staging,
    /// Serving live traffic.
    Production,
    /// Taking part in an A/B test.
    AbTesting,
}

impl KnownStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Testing => "testing",
            Self::Staging => "staging",
            Self::Production => "production",
            Self::AbTesting => "ab_testing",
        }
    }

    /// Matches a stored label against the conventional values.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "testing" => Some(Self::Testing),
            "staging" => Some(Self::Staging),
            "production" => Some(Self::Production),
            "ab_testing" => Some(Self::AbTesting),
            _ => None,
        }
    }
}

impl fmt::Display for KnownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A point-in-time status observation for one algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MlAlgorithmStatus {
    id: AlgorithmStatusId,
    status: ShortText,
    active: bool,
    created_by: ShortText,
    created_at: DateTime<Utc>,
    parent_mlalgorithm: AlgorithmId,
}

/// Parameter object for reconstructing a persisted status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedStatusData {
    /// Persisted status identifier.
    pub id: AlgorithmStatusId,
    /// Persisted status label.
    pub status: ShortText,
    /// Persisted active flag.
    pub active: bool,
    /// Persisted author name.
    pub created_by: ShortText,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted owning algorithm.
    pub parent_mlalgorithm: AlgorithmId,
}

impl MlAlgorithmStatus {
    /// Creates a new status observation for `parent_mlalgorithm`.
    #[must_use]
    pub fn new(
        parent_mlalgorithm: AlgorithmId,
        status: ShortText,
        active: bool,
        created_by: ShortText,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: AlgorithmStatusId::new(),
            status,
            active,
            created_by,
            created_at: clock.utc(),
            parent_mlalgorithm,
        }
    }

    /// Reconstructs a status from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedStatusData) -> Self {
        Self {
            id: data.id,
            status: data.status,
            active: data.active,
            created_by: data.created_by,
            created_at: data.created_at,
            parent_mlalgorithm: data.parent_mlalgorithm,
        }
    }

    /// Returns the status identifier.
    #[must_use]
    pub const fn id(&self) -> AlgorithmStatusId {
        self.id
    }

    /// Returns the free-text status label.
    #[must_use]
    pub const fn status(&self) -> &ShortText {
        &self.status
    }

    /// Returns the label as a conventional status, if it is one.
    #[must_use]
    pub fn known_status(&self) -> Option<KnownStatus> {
        KnownStatus::parse(self.status.as_str())
    }

    /// Returns whether this is the currently effective status.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the author name.
    #[must_use]
    pub const fn created_by(&self) -> &ShortText {
        &self.created_by
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

    /// Clears the active flag. Used when a newer status supersedes this one.
    pub const fn deactivate(&mut self) {
        self.active = false;
    }
}
