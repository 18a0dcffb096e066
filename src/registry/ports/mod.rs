//! Port contracts for registry persistence.
//!
//! Ports define infrastructure-agnostic interfaces used by the registry
//! service.

pub mod repository;

#[cfg(test)]
pub use repository::MockRegistryRepository;
pub use repository::{AlgorithmFilter, RegistryError, RegistryRepository, RegistryResult};
