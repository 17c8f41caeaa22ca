//! Recognized-property registry.
//!
//! The store only reads, writes, and searches properties that the field map
//! knows about. Each entry maps a namespaced WebDAV property name to the
//! column that persists it; the map is configuration, extended per
//! deployment, never derived from record state. Property names outside the
//! map are left to the caller's PROPPATCH machinery on writes and fail the
//! whole query on searches.

use indexmap::IndexMap;

/// `{DAV:}displayname`, mapped by default.
pub const PROP_DISPLAYNAME: &str = "{DAV:}displayname";

/// Email address property, mapped by default. `mailto:` identity
/// resolution matches against its column.
pub const PROP_EMAIL: &str = "{http://davenport.dev/ns}email-address";

/// Default column for [`PROP_DISPLAYNAME`].
pub const COL_DISPLAYNAME: &str = "displayname";

/// Default column for [`PROP_EMAIL`].
pub const COL_EMAIL: &str = "email";

/// Ordered mapping from recognized property names to storage columns.
///
/// Registration order is preserved; result records and generated column
/// lists follow it.
#[derive(Debug, Clone)]
pub struct FieldMap {
    fields: IndexMap<String, String>,
}

impl Default for FieldMap {
    fn default() -> Self {
        let mut fields = IndexMap::new();
        fields.insert(PROP_DISPLAYNAME.to_string(), COL_DISPLAYNAME.to_string());
        fields.insert(PROP_EMAIL.to_string(), COL_EMAIL.to_string());
        Self { fields }
    }
}

impl FieldMap {
    /// An empty map, for deployments replacing the defaults entirely.
    pub fn empty() -> Self {
        Self {
            fields: IndexMap::new(),
        }
    }

    /// Registers a property-to-column mapping. A property that is already
    /// mapped keeps its position and gets the new column.
    pub fn with_field(mut self, property: impl Into<String>, column: impl Into<String>) -> Self {
        self.fields.insert(property.into(), column.into());
        self
    }

    /// The column persisting `property`, when the property is recognized.
    pub fn column_for(&self, property: &str) -> Option<&str> {
        self.fields.get(property).map(String::as_str)
    }

    /// Property/column pairs in registration order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.fields.iter().map(|(p, c)| (p.as_str(), c.as_str()))
    }

    /// Column names in registration order.
    pub fn columns(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.values().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
