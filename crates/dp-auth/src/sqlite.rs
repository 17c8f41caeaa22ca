//! SQLite implementation of the credential lookup.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

use crate::{CredentialLookup, CredentialTableConfig, Result};

/// SQLite-backed [`CredentialLookup`].
#[derive(Debug, Clone)]
pub struct SqliteCredentialLookup {
    pool: SqlitePool,
    tables: CredentialTableConfig,
}

impl SqliteCredentialLookup {
    /// Creates a lookup with the default table name.
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_config(pool, CredentialTableConfig::default())
    }

    /// Creates a lookup with a custom table name.
    pub fn with_config(pool: SqlitePool, tables: CredentialTableConfig) -> Self {
        Self { pool, tables }
    }

    /// The underlying pool, for callers sharing the connection.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl CredentialLookup for SqliteCredentialLookup {
    async fn digest_hash(&self, realm: &str, username: &str) -> Result<Option<String>> {
        let row = sqlx::query(&format!(
            "SELECT digesta1 FROM {} WHERE username = ?",
            self.tables.users_table
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        let hash = row
            .map(|row| row.try_get::<String, _>("digesta1"))
            .transpose()?;
        debug!(
            realm = %realm,
            username = %username,
            found = hash.is_some(),
            "Digest hash lookup"
        );
        Ok(hash)
    }

    async fn init_schema(&self) -> Result<()> {
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id INTEGER PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                digesta1 TEXT NOT NULL
            )",
            self.tables.users_table
        ))
        .execute(&self.pool)
        .await?;

        info!(users = %self.tables.users_table, "Initialized SQLite credential schema");
        Ok(())
    }
}
