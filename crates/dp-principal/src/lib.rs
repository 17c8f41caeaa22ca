//! Principal directory and group-membership store.
//!
//! A WebDAV access-control layer resolves identities, searches for users by
//! property, and answers group-membership questions through the
//! [`PrincipalStore`] trait. Records here are thin: a unique URI path plus
//! whichever recognized properties the deployment's [`FieldMap`] persists.
//! Group membership is a plain edge table replaced wholesale per group.
//!
//! Backends exist for SQLite ([`SqlitePrincipalStore`]) and PostgreSQL
//! ([`PostgresPrincipalStore`]); both run every operation as one or a small
//! fixed number of statements against a `sqlx` pool and delegate concurrency
//! correctness to the database.

pub mod entity;
pub mod error;
pub mod fields;
pub mod postgres;
pub mod sqlite;
pub mod store;

pub use entity::Principal;
pub use error::StoreError;
pub use fields::{FieldMap, PROP_DISPLAYNAME, PROP_EMAIL};
pub use postgres::PostgresPrincipalStore;
pub use sqlite::SqlitePrincipalStore;
pub use store::{
    PrincipalStore, PrincipalTableConfig, PropertyPatch, PropertyUpdate, SearchMode,
};

pub type Result<T> = std::result::Result<T, StoreError>;
