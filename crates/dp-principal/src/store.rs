//! Principal store contract.

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::entity::Principal;
use crate::Result;

/// Table names used by a principal store backend.
#[derive(Debug, Clone)]
pub struct PrincipalTableConfig {
    /// Principal rows, one per directory entry.
    pub principals_table: String,
    /// Membership edges between group rows and member rows.
    pub group_members_table: String,
}

impl Default for PrincipalTableConfig {
    fn default() -> Self {
        Self {
            principals_table: "principals".to_string(),
            group_members_table: "groupmembers".to_string(),
        }
    }
}

/// How multiple search criteria combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Every criterion must match.
    #[default]
    AllOf,
    /// Any one criterion suffices.
    AnyOf,
}

/// Requested property changes, keyed by property name. `Some` sets the
/// value, `None` clears it.
pub type PropertyPatch = IndexMap<String, Option<String>>;

/// Outcome of applying a [`PropertyPatch`].
///
/// Unhandled names were not recognized by the store's field map and were
/// left untouched; the caller decides whether that fails its own
/// operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyUpdate {
    pub applied: Vec<String>,
    pub unhandled: Vec<String>,
}

impl PropertyUpdate {
    pub fn fully_applied(&self) -> bool {
        self.unhandled.is_empty()
    }
}

/// Directory of principals and their group membership.
///
/// Paths are relative URIs without a trailing slash, such as
/// `principals/users/alice`. Collection scoping is always to direct
/// children: a prefix of `principals/users` covers
/// `principals/users/alice` but not `principals/users/staff/alice`.
///
/// Lookups that miss return `Ok(None)` or an empty collection. Only the
/// group operations, whose subject must exist for the operation to mean
/// anything, report a missing principal as
/// [`StoreError::PrincipalNotFound`](crate::StoreError::PrincipalNotFound).
#[async_trait]
pub trait PrincipalStore: Send + Sync {
    /// All principals that are direct children of `prefix`.
    async fn list_by_prefix(&self, prefix: &str) -> Result<Vec<Principal>>;

    /// The principal at `path`, or `None`.
    async fn find_by_path(&self, path: &str) -> Result<Option<Principal>>;

    /// Applies `patch` to the principal at `path`.
    ///
    /// Recognized properties are written in one statement; `None` values
    /// clear. Unrecognized names are reported back unchanged. An update
    /// against a missing path is a no-op with the same report.
    async fn update_properties(&self, path: &str, patch: &PropertyPatch)
        -> Result<PropertyUpdate>;

    /// URIs of direct children of `prefix` whose properties match the
    /// given criteria, case-insensitively and by substring.
    ///
    /// One unknown property name fails the entire search with an empty
    /// result rather than filtering on the rest. An empty criteria map is
    /// also an empty result.
    async fn search(
        &self,
        prefix: &str,
        properties: &IndexMap<String, String>,
        mode: SearchMode,
    ) -> Result<Vec<String>>;

    /// Resolves an external identity URI such as `mailto:alice@example.com`
    /// to a principal path under `prefix`.
    ///
    /// Unsupported schemes resolve to `None`. When several principals
    /// carry the identity, the oldest row wins.
    async fn find_by_uri(&self, uri: &str, prefix: &str) -> Result<Option<String>>;

    /// Paths of the direct members of the group at `path`.
    async fn group_members(&self, path: &str) -> Result<Vec<String>>;

    /// Paths of the groups the principal at `path` belongs to directly.
    async fn group_membership(&self, path: &str) -> Result<Vec<String>>;

    /// Replaces the member set of the group at `path` with `members`.
    ///
    /// Member paths that resolve to no principal are dropped silently.
    /// The replacement is atomic; concurrent readers observe either the
    /// old set or the new set.
    async fn set_group_members(&self, path: &str, members: &[String]) -> Result<()>;

    /// Creates a principal at `path` and applies `properties`.
    ///
    /// Fails if the path is already taken.
    async fn create_principal(&self, path: &str, properties: &PropertyPatch)
        -> Result<PropertyUpdate>;

    /// Creates the backing tables if they do not exist.
    async fn init_schema(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables() {
        let config = PrincipalTableConfig::default();
        assert_eq!(config.principals_table, "principals");
        assert_eq!(config.group_members_table, "groupmembers");
    }

    #[test]
    fn test_search_mode_serde_names() {
        assert_eq!(serde_json::to_string(&SearchMode::AllOf).unwrap(), "\"allof\"");
        assert_eq!(
            serde_json::from_str::<SearchMode>("\"anyof\"").unwrap(),
            SearchMode::AnyOf
        );
    }

    #[test]
    fn test_update_report_tracks_unhandled() {
        let report = PropertyUpdate {
            applied: vec!["{DAV:}displayname".to_string()],
            unhandled: vec![],
        };
        assert!(report.fully_applied());

        let report = PropertyUpdate {
            applied: vec![],
            unhandled: vec!["{DAV:}getetag".to_string()],
        };
        assert!(!report.fully_applied());
    }
}
