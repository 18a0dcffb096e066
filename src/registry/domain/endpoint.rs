//! Endpoint record: a named, owned API surface grouping algorithm versions.

use super::{EndpointId, ShortText};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A named, owned API endpoint.
///
/// Endpoint names are not unique; several endpoints may share one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    id: EndpointId,
    name: ShortText,
    owner: ShortText,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedEndpointData {
    /// Persisted endpoint identifier.
    pub id: EndpointId,
    /// Persisted endpoint name.
    pub name: ShortText,
    /// Persisted owner name.
    pub owner: ShortText,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Endpoint {
    /// Creates a new endpoint stamped with the current clock time.
    #[must_use]
    pub fn new(name: ShortText, owner: ShortText, clock: &impl Clock) -> Self {
        Self {
            id: EndpointId::new(),
            name,
            owner,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs an endpoint from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedEndpointData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            owner: data.owner,
            created_at: data.created_at,
        }
    }

    /// Returns the endpoint identifier.
    #[must_use]
    pub const fn id(&self) -> EndpointId {
        self.id
    }

    /// Returns the endpoint name.
    #[must_use]
    pub const fn name(&self) -> &ShortText {
        &self.name
    }

    /// Returns the owner name.
    #[must_use]
    pub const fn owner(&self) -> &ShortText {
        &self.owner
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
