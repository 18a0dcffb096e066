//! Cluster and temporary database helpers for `PostgreSQL` integration tests.

pub use pg_embedded_setup_unpriv::TestCluster;
pub use pg_embedded_setup_unpriv::test_support::shared_test_cluster;
use uuid::Uuid;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared `PostgreSQL` cluster handle for integration tests.
pub type PostgresCluster = &'static TestCluster;

/// Database cloned from a template and dropped again with the guard.
///
/// Anything holding connections to the database must be dropped first.
pub struct TemporaryDatabase {
    cluster: PostgresCluster,
    name: String,
    url: String,
}

impl TemporaryDatabase {
    /// Creates a uniquely named database from `template`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created.
    pub fn from_template(
        cluster: PostgresCluster,
        prefix: &str,
        template: &str,
    ) -> Result<Self, BoxError> {
        let name = format!("{prefix}_{}", Uuid::new_v4().simple());
        cluster
            .create_database_from_template(name.as_str(), template)
            .map_err(|err| Box::new(err) as BoxError)?;
        let url = cluster.connection().database_url(&name);
        Ok(Self { cluster, name, url })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for TemporaryDatabase {
    fn drop(&mut self) {
        drop(self.cluster.drop_database(self.name.as_str()));
    }
}
