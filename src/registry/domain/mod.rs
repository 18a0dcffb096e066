//! Domain model for the model-serving record store.
//!
//! Four record kinds form an ownership tree: an [`Endpoint`] owns
//! [`MlAlgorithm`] versions, and each algorithm owns its
//! [`MlAlgorithmStatus`] history and its [`MlRequest`] log. All text fields
//! are validated [`BoundedText`] values, so a record that exists is a record
//! that fits its storage columns.

mod algorithm;
mod cascade;
mod endpoint;
mod error;
mod ids;
mod request;
mod status;
mod text;

pub use algorithm::{AlgorithmSpec, MlAlgorithm, PersistedAlgorithmData};
pub use cascade::CascadeSummary;
pub use endpoint::{Endpoint, PersistedEndpointData};
pub use error::RegistryDomainError;
pub use ids::{AlgorithmId, AlgorithmStatusId, EndpointId, RecordRef, RequestId};
pub use request::{MlRequest, PersistedRequestData, RequestPayloads};
pub use status::{KnownStatus, MlAlgorithmStatus, PersistedStatusData};
pub use text::{
    BoundedText, CODE_MAX_CHARS, DESCRIPTION_MAX_CHARS, Description, PAYLOAD_MAX_CHARS, Payload,
    SHORT_TEXT_MAX_CHARS, ShortText, SourceCode,
};
