//! Principal record type.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::fields::{PROP_DISPLAYNAME, PROP_EMAIL};

/// A principal as read from the directory.
///
/// `uri` is the principal's path and the stable identity exposed to
/// callers; `id` is the row key and only observable through ordering
/// guarantees. Properties hold only the values that are actually set,
/// keyed by namespaced property name in field-map order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: i64,
    pub uri: String,
    pub properties: IndexMap<String, String>,
}

impl Principal {
    /// The value of a property, when set.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    /// Shorthand for the `{DAV:}displayname` property.
    pub fn display_name(&self) -> Option<&str> {
        self.property(PROP_DISPLAYNAME)
    }

    /// Shorthand for the email-address property.
    pub fn email(&self) -> Option<&str> {
        self.property(PROP_EMAIL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Principal {
        let mut properties = IndexMap::new();
        properties.insert(PROP_DISPLAYNAME.to_string(), "Alice Smith".to_string());
        properties.insert(PROP_EMAIL.to_string(), "alice@example.com".to_string());
        Principal {
            id: 7,
            uri: "principals/users/alice".to_string(),
            properties,
        }
    }

    #[test]
    fn test_property_accessors() {
        let principal = sample();
        assert_eq!(principal.display_name(), Some("Alice Smith"));
        assert_eq!(principal.email(), Some("alice@example.com"));
        assert_eq!(principal.property("{DAV:}getetag"), None);
    }

    #[test]
    fn test_unset_properties_are_absent() {
        let principal = Principal {
            id: 1,
            uri: "principals/users/bob".to_string(),
            properties: IndexMap::new(),
        };
        assert_eq!(principal.display_name(), None);
        assert_eq!(principal.email(), None);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["uri"], "principals/users/alice");
        assert_eq!(json["properties"]["{DAV:}displayname"], "Alice Smith");
    }
}
