//! `PostgreSQL` adapters for registry persistence.

mod models;
mod repository;
mod schema;

pub use repository::{PostgresRegistry, RegistryPgPool};
