//! Mlregistry: administrative record store for served ML models.
//!
//! This crate keeps the records that describe a model-serving deployment:
//! endpoints, algorithm versions, status history, and an audit log of
//! inference requests. Deleting a record removes everything it owns.
//!
//! # Architecture
//!
//! Mlregistry follows hexagonal architecture principles:
//!
//! - **Domain**: Validated records with no infrastructure dependencies
//! - **Ports**: The repository trait the services depend on
//! - **Adapters**: In-memory and `PostgreSQL` repository implementations
//!
//! # Modules
//!
//! - [`registry`]: Records, persistence, and the registry service
//! - [`config`]: Environment-driven connection settings

pub mod config;
pub mod registry;
