use thiserror::Error;

/// Errors surfaced by the principal store.
///
/// Point-lookup misses are `Ok(None)`, not errors. Only the group
/// operations promote a missing *subject* principal to an error, because
/// they cannot answer anything about a principal that does not exist.
/// Underlying database failures pass through untranslated and unretried;
/// the source error is kept so callers can still classify constraint
/// violations.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Principal not found: {path}")]
    PrincipalNotFound { path: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub fn principal_not_found(path: impl Into<String>) -> Self {
        Self::PrincipalNotFound { path: path.into() }
    }
}
