//! Credential lookup errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
