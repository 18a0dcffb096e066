//! In-memory adapters for registry persistence.

mod repository;

pub use repository::InMemoryRegistry;
