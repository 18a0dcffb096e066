//! Application services for registry record management.

mod registry;

pub use registry::{
    CreateAlgorithmRequest, CreateEndpointRequest, LogInferenceRequest, RecordStatusRequest,
    RegisterAlgorithmRequest, RegisteredAlgorithm, RegistryErrorKind, RegistryService,
    RegistryServiceError, RegistryServiceResult,
};
