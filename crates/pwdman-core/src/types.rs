// SPDX-FileCopyrightText: 2026 pwdman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential addressing shared by the store and the command interpreter.

use std::fmt;

/// Element key used when a credential is stored without an explicit element.
pub const DEFAULT_ELEMENT: &str = "default";

/// A `name.element` address of one credential entry.
///
/// An empty `element` means "not given"; the store resolves it to
/// [`DEFAULT_ELEMENT`] where a single value is needed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CredentialPath {
    pub name: String,
    pub element: String,
}

impl CredentialPath {
    pub fn new(name: impl Into<String>, element: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            element: element.into(),
        }
    }

    /// Address a whole credential (no element).
    pub fn name_only(name: impl Into<String>) -> Self {
        Self::new(name, String::new())
    }

    /// Split a dotted path at its last `.`.
    ///
    /// `"mail.work.password"` addresses element `password` of credential
    /// `mail.work`. Without a dot the whole input is the name.
    pub fn parse(path: &str) -> Self {
        match path.rsplit_once('.') {
            Some((name, element)) => Self::new(name, element),
            None => Self::name_only(path),
        }
    }

    pub fn has_element(&self) -> bool {
        !self.element.is_empty()
    }

    /// The element key, with an empty element resolved to [`DEFAULT_ELEMENT`].
    pub fn element_or_default(&self) -> &str {
        if self.element.is_empty() {
            DEFAULT_ELEMENT
        } else {
            &self.element
        }
    }
}

impl fmt::Display for CredentialPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.element.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}.{}", self.name, self.element)
        }
    }
}
