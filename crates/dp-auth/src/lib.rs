//! Credential lookup for HTTP Digest authentication.
//!
//! Serves the precomputed `HA1 = MD5(username:realm:password)` hash that a
//! Digest challenge verifier needs. Passwords are never stored or returned;
//! provisioning writes the hash, this crate only reads it.

pub mod error;
pub mod postgres;
pub mod sqlite;

pub use error::CredentialError;
pub use postgres::PostgresCredentialLookup;
pub use sqlite::SqliteCredentialLookup;

use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, CredentialError>;

/// Table name used by a credential lookup backend.
#[derive(Debug, Clone)]
pub struct CredentialTableConfig {
    pub users_table: String,
}

impl Default for CredentialTableConfig {
    fn default() -> Self {
        Self {
            users_table: "users".to_string(),
        }
    }
}

/// Read-only source of Digest credential hashes.
#[async_trait]
pub trait CredentialLookup: Send + Sync {
    /// The stored HA1 hash for `username`, or `None` for an unknown user.
    ///
    /// The realm is part of the Digest protocol contract, but the reference
    /// schema keys credentials by username alone, so the same hash comes
    /// back whatever realm is presented. Deployments that need realm-scoped
    /// credentials must extend the schema and the lookup predicate together.
    async fn digest_hash(&self, realm: &str, username: &str) -> Result<Option<String>>;

    /// Creates the backing table if it does not exist.
    async fn init_schema(&self) -> Result<()>;
}
