//! Identifier types for registry records.
//!
//! Each record kind gets its own UUID newtype so an algorithm identifier can
//! never be passed where an endpoint identifier is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the wrapped UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl AsRef<Uuid> for $name {
            fn as_ref(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

record_id!(
    /// Unique identifier for an endpoint.
    EndpointId
);
record_id!(
    /// Unique identifier for an algorithm version.
    AlgorithmId
);
record_id!(
    /// Unique identifier for an algorithm status observation.
    AlgorithmStatusId
);
record_id!(
    /// Unique identifier for a logged inference request.
    RequestId
);

/// Reference to a single stored record of any kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum RecordRef {
    /// An endpoint record.
    Endpoint(EndpointId),
    /// An algorithm record.
    Algorithm(AlgorithmId),
    /// An algorithm status record.
    AlgorithmStatus(AlgorithmStatusId),
    /// An inference request record.
    Request(RequestId),
}

impl fmt::Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Endpoint(id) => write!(f, "endpoint {id}"),
            Self::Algorithm(id) => write!(f, "algorithm {id}"),
            Self::AlgorithmStatus(id) => write!(f, "algorithm status {id}"),
            Self::Request(id) => write!(f, "request {id}"),
        }
    }
}

impl From<EndpointId> for RecordRef {
    fn from(id: EndpointId) -> Self {
        Self::Endpoint(id)
    }
}

impl From<AlgorithmId> for RecordRef {
    fn from(id: AlgorithmId) -> Self {
        Self::Algorithm(id)
    }
}

impl From<AlgorithmStatusId> for RecordRef {
    fn from(id: AlgorithmStatusId) -> Self {
        Self::AlgorithmStatus(id)
    }
}

impl From<RequestId> for RecordRef {
    fn from(id: RequestId) -> Self {
        Self::Request(id)
    }
}
