// SPDX-FileCopyrightText: 2026 pwdman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The in-memory credential map: name -> element -> secret value.
//!
//! Invariant: no name maps to an empty element map. Every mutation that
//! empties an element map removes the name with it.

use std::collections::BTreeMap;
use std::fmt;

use pwdman_core::DEFAULT_ELEMENT;
use zeroize::Zeroize;

/// Element map of one credential.
pub type Elements = BTreeMap<String, String>;

/// Two-level credential map with sorted iteration.
///
/// All names, element keys and values are zeroized when the map is dropped
/// and when a value is overwritten or removed. `Debug` never prints values.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialMap {
    entries: BTreeMap<String, Elements>,
}

impl CredentialMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a decoded two-level tree, dropping names whose element map
    /// is empty.
    pub fn from_tree(mut tree: BTreeMap<String, Elements>) -> Self {
        tree.retain(|_, elements| !elements.is_empty());
        Self { entries: tree }
    }

    /// Lift a flat name -> value map, storing each value under
    /// [`DEFAULT_ELEMENT`].
    pub fn from_flat(flat: BTreeMap<String, String>) -> Self {
        let entries = flat
            .into_iter()
            .map(|(name, value)| (name, Elements::from([(DEFAULT_ELEMENT.to_string(), value)])))
            .collect();
        Self { entries }
    }

    pub(crate) fn as_tree(&self) -> &BTreeMap<String, Elements> {
        &self.entries
    }

    /// Insert or overwrite one value. Returns `true` if a value was replaced.
    pub fn insert(&mut self, name: &str, element: &str, value: &str) -> bool {
        let elements = self.entries.entry(name.to_string()).or_default();
        match elements.insert(element.to_string(), value.to_string()) {
            Some(mut old) => {
                old.zeroize();
                true
            }
            None => false,
        }
    }

    /// Remove a credential with all its elements.
    pub fn remove_credential(&mut self, name: &str) -> bool {
        match self.entries.remove(name) {
            Some(elements) => {
                wipe_elements(elements);
                true
            }
            None => false,
        }
    }

    /// Remove one element; the credential goes too once it has none left.
    pub fn remove_element(&mut self, name: &str, element: &str) -> bool {
        let Some(elements) = self.entries.get_mut(name) else {
            return false;
        };
        let Some(mut value) = elements.remove(element) else {
            return false;
        };
        value.zeroize();
        if elements.is_empty() {
            self.entries.remove(name);
        }
        true
    }

    pub fn get(&self, name: &str, element: &str) -> Option<&str> {
        self.entries
            .get(name)
            .and_then(|elements| elements.get(element))
            .map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Credential names in lexicographic order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Element names of one credential, [`DEFAULT_ELEMENT`] first and the
    /// rest sorted. `None` if the credential does not exist.
    pub fn elements(&self, name: &str) -> Option<Vec<&str>> {
        self.entries(name)
            .map(|entries| entries.into_iter().map(|(element, _)| element).collect())
    }

    /// `(element, value)` pairs of one credential in [`Self::elements`] order.
    pub fn entries(&self, name: &str) -> Option<Vec<(&str, &str)>> {
        let elements = self.entries.get(name)?;
        let default = elements
            .get_key_value(DEFAULT_ELEMENT)
            .map(|(k, v)| (k.as_str(), v.as_str()));
        let rest = elements
            .iter()
            .filter(|(k, _)| k.as_str() != DEFAULT_ELEMENT)
            .map(|(k, v)| (k.as_str(), v.as_str()));
        Some(default.into_iter().chain(rest).collect())
    }

    /// Number of credentials (not elements).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn wipe_elements(elements: Elements) {
    for (mut element, mut value) in elements {
        element.zeroize();
        value.zeroize();
    }
}

impl Drop for CredentialMap {
    fn drop(&mut self) {
        for (mut name, elements) in std::mem::take(&mut self.entries) {
            name.zeroize();
            wipe_elements(elements);
        }
    }
}

impl fmt::Debug for CredentialMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, elements) in &self.entries {
            map.entry(name, &elements.keys().collect::<Vec<_>>());
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removing_last_element_removes_name() {
        let mut map = CredentialMap::new();
        map.insert("x", "a", "1");
        map.insert("x", "b", "2");

        assert!(map.remove_element("x", "a"));
        assert!(map.contains("x"));
        assert!(map.remove_element("x", "b"));
        assert!(!map.contains("x"));
        assert!(map.is_empty());
    }

    #[test]
    fn remove_missing_element_is_noop() {
        let mut map = CredentialMap::new();
        map.insert("x", "a", "1");

        assert!(!map.remove_element("x", "zzz"));
        assert!(!map.remove_element("nope", "a"));
        assert!(!map.remove_credential("nope"));
        assert_eq!(map.get("x", "a"), Some("1"));
    }

    #[test]
    fn insert_reports_overwrite() {
        let mut map = CredentialMap::new();
        assert!(!map.insert("svc", "default", "old"));
        assert!(map.insert("svc", "default", "new"));
        assert_eq!(map.get("svc", "default"), Some("new"));
    }

    #[test]
    fn names_are_sorted() {
        let mut map = CredentialMap::new();
        map.insert("b", "default", "1");
        map.insert("a", "default", "1");
        map.insert("c", "default", "1");
        assert_eq!(map.names().collect::<Vec<_>>(), ["a", "b", "c"]);
    }

    #[test]
    fn default_element_listed_first() {
        let mut map = CredentialMap::new();
        map.insert("mail", "user", "me");
        map.insert("mail", "default", "pw");
        map.insert("mail", "api", "key");

        assert_eq!(map.elements("mail").unwrap(), ["default", "api", "user"]);
        assert_eq!(map.entries("mail").unwrap()[0], ("default", "pw"));
        assert!(map.elements("missing").is_none());
    }

    #[test]
    fn from_flat_lifts_under_default() {
        let flat = BTreeMap::from([("site".to_string(), "secret".to_string())]);
        let map = CredentialMap::from_flat(flat);
        assert_eq!(map.get("site", DEFAULT_ELEMENT), Some("secret"));
    }

    #[test]
    fn from_tree_drops_empty_element_maps() {
        let tree = BTreeMap::from([
            ("empty".to_string(), Elements::new()),
            (
                "full".to_string(),
                Elements::from([("u".to_string(), "v".to_string())]),
            ),
        ]);
        let map = CredentialMap::from_tree(tree);
        assert_eq!(map.names().collect::<Vec<_>>(), ["full"]);
    }

    #[test]
    fn debug_output_hides_values() {
        let mut map = CredentialMap::new();
        map.insert("bank", "pin", "8472-secret");
        let debug = format!("{map:?}");
        assert!(debug.contains("bank"));
        assert!(debug.contains("pin"));
        assert!(!debug.contains("8472-secret"));
    }
}
