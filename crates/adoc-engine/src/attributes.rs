/*
 * attributes.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Document attribute storage.
//!
//! Attributes keep the order in which they were first defined. Redefining an
//! attribute updates its value in place; unsetting it removes the entry, so a
//! later definition is appended at the end.

use indexmap::IndexMap;
use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;

/// Characters that may not appear in an attribute name.
static INVALID_NAME_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w-]").unwrap());

/// Normalize an attribute name the way attribute entries and API attributes
/// are stored: invalid characters removed, lower-cased.
pub fn sanitize_name(name: &str) -> String {
    INVALID_NAME_CHARS.replace_all(name, "").to_lowercase()
}

/// An ordered map of document attributes.
///
/// Attributes set through the API are *locked*: attribute entries in the
/// document can neither change nor unset them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeMap {
    entries: IndexMap<String, String>,
    locked: IndexSet<String>,
}

impl AttributeMap {
    /// Create an empty attribute map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get an attribute value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Check whether an attribute is set.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Set an attribute unless it is locked. Returns `true` if the value was stored.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> bool {
        let name = name.into();
        if self.locked.contains(&name) {
            return false;
        }
        self.entries.insert(name, value.into());
        true
    }

    /// Remove an attribute unless it is locked. Returns `true` if it was removed.
    pub fn unset(&mut self, name: &str) -> bool {
        if self.locked.contains(name) {
            return false;
        }
        self.entries.shift_remove(name).is_some()
    }

    /// Set an attribute and lock it against changes from the document.
    pub fn set_locked(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.entries.insert(name.clone(), value.into());
        self.locked.insert(name);
    }

    /// Remove an attribute and lock it so the document cannot set it again.
    pub fn unset_locked(&mut self, name: &str) {
        self.entries.shift_remove(name);
        self.locked.insert(name.to_string());
    }

    /// Check whether an attribute is locked.
    pub fn is_locked(&self, name: &str) -> bool {
        self.locked.contains(name)
    }

    /// Iterate over attributes in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterate over attribute names in definition order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AttributeMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = AttributeMap::new();
        for (name, value) in iter {
            map.set(name, value);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("Product-Name"), "product-name");
        assert_eq!(sanitize_name("my attr!"), "myattr");
        assert_eq!(sanitize_name("snake_case"), "snake_case");
    }

    #[test]
    fn test_redefinition_keeps_position() {
        let mut attrs = AttributeMap::new();
        attrs.set("a", "1");
        attrs.set("b", "2");
        attrs.set("a", "3");

        let entries: Vec<_> = attrs.iter().collect();
        assert_eq!(entries, vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn test_unset_then_set_moves_to_end() {
        let mut attrs = AttributeMap::new();
        attrs.set("a", "1");
        attrs.set("b", "2");
        assert!(attrs.unset("a"));
        attrs.set("a", "again");

        let names: Vec<_> = attrs.names().collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_locked_attributes_resist_changes() {
        let mut attrs = AttributeMap::new();
        attrs.set_locked("experimental", "");

        assert!(!attrs.set("experimental", "changed"));
        assert!(!attrs.unset("experimental"));
        assert_eq!(attrs.get("experimental"), Some(""));

        attrs.unset_locked("icons");
        assert!(!attrs.set("icons", "font"));
        assert!(!attrs.contains("icons"));
    }
}
