//! Shared plumbing for the Davenport WebDAV backend crates.
//!
//! Carries the pieces both storage components lean on without owning any
//! storage themselves: the slash-path helpers that scope listing and search
//! to a principal collection, and `tracing` subscriber setup for embedding
//! applications.

pub mod logging;
pub mod path;
