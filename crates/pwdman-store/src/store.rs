// SPDX-FileCopyrightText: 2026 pwdman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The password store: an in-memory credential map bound to a passphrase.
//!
//! The store is a plain value. The shell owns one instance and hands it the
//! [`StoreFile`] to persist to; nothing here is global.

use pwdman_core::{CredentialPath, PwdmanError, DEFAULT_ELEMENT};
use secrecy::SecretString;
use tracing::{debug, info};

use crate::credentials::CredentialMap;
use crate::file::StoreFile;
use crate::format::{self, Generation};

/// An unlocked password store.
///
/// Debug output intentionally omits the passphrase and every value.
pub struct PasswordStore {
    passphrase: SecretString,
    credentials: CredentialMap,
    /// Set by every mutation, cleared by [`Self::write_to`].
    dirty: bool,
}

impl std::fmt::Debug for PasswordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordStore")
            .field("passphrase", &"[REDACTED]")
            .field("credentials", &self.credentials.len())
            .field("dirty", &self.dirty)
            .finish()
    }
}

/// `None` and `Some("")` both address the default element.
fn element_or_default(element: Option<&str>) -> &str {
    match element {
        Some(e) if !e.is_empty() => e,
        _ => DEFAULT_ELEMENT,
    }
}

impl PasswordStore {
    /// Create an empty store protected by `passphrase`.
    pub fn new(passphrase: SecretString) -> Self {
        Self {
            passphrase,
            credentials: CredentialMap::new(),
            dirty: false,
        }
    }

    /// Read and unlock an existing store file.
    ///
    /// Returns the generation the file was written in so the caller can
    /// announce a pending upgrade.
    pub fn open(
        file: &StoreFile,
        passphrase: SecretString,
    ) -> Result<(Self, Generation), PwdmanError> {
        let bytes = file
            .read()?
            .ok_or_else(|| PwdmanError::not_found(file.path().display()))?;
        let (credentials, generation) = format::decode(&bytes, &passphrase)?;
        log_loaded(&credentials, generation);

        let store = Self {
            passphrase,
            credentials,
            dirty: false,
        };
        Ok((store, generation))
    }

    /// Insert or overwrite a value. An empty element means the default one.
    ///
    /// Returns `true` if an existing value was replaced.
    pub fn put(&mut self, name: &str, element: &str, value: &str) -> bool {
        let element = element_or_default(Some(element));
        let replaced = self.credentials.insert(name, element, value);
        self.dirty = true;
        debug!(name, element, replaced, "credential stored");
        replaced
    }

    /// Remove a whole credential, or one of its elements.
    ///
    /// Returns whether anything was removed. A credential left without
    /// elements disappears.
    pub fn remove(&mut self, name: &str, element: Option<&str>) -> bool {
        let removed = match element.filter(|e| !e.is_empty()) {
            Some(element) => self.credentials.remove_element(name, element),
            None => self.credentials.remove_credential(name),
        };
        if removed {
            self.dirty = true;
            debug!(name, ?element, "credential removed");
        }
        removed
    }

    /// Look up one value. Without an element the default one is returned.
    pub fn get(&self, name: &str, element: Option<&str>) -> Result<&str, PwdmanError> {
        self.credentials
            .get(name, element_or_default(element))
            .ok_or_else(|| PwdmanError::not_found(CredentialPath::new(name, element.unwrap_or(""))))
    }

    /// All credential names in sorted order, or the element names of `name`
    /// with the default element first.
    pub fn list(&self, name: Option<&str>) -> Result<Vec<&str>, PwdmanError> {
        match name {
            None => Ok(self.credentials.names().collect()),
            Some(name) => self
                .credentials
                .elements(name)
                .ok_or_else(|| PwdmanError::not_found(name)),
        }
    }

    /// Every `(element, value)` pair of one credential, default first.
    pub fn entries(&self, name: &str) -> Result<Vec<(&str, &str)>, PwdmanError> {
        self.credentials
            .entries(name)
            .ok_or_else(|| PwdmanError::not_found(name))
    }

    /// Replace the contents and passphrase from serialized bytes.
    ///
    /// On failure the store is left exactly as it was.
    pub fn load(
        &mut self,
        passphrase: SecretString,
        bytes: &[u8],
    ) -> Result<Generation, PwdmanError> {
        let (credentials, generation) = format::decode(bytes, &passphrase)?;
        log_loaded(&credentials, generation);

        self.credentials = credentials;
        self.passphrase = passphrase;
        self.dirty = false;
        Ok(generation)
    }

    /// Serialize the store in the current format under `passphrase`.
    ///
    /// The held passphrase is not changed; see [`Self::change_passphrase`].
    pub fn save(&self, passphrase: &SecretString) -> Result<Vec<u8>, PwdmanError> {
        let bytes = format::encode(&self.credentials, passphrase)?;
        debug!(credentials = self.credentials.len(), bytes = bytes.len(), "store encoded");
        Ok(bytes)
    }

    /// Save to `file` under the held passphrase, replacing it atomically.
    pub fn write_to(&mut self, file: &StoreFile) -> Result<(), PwdmanError> {
        let bytes = self.save(&self.passphrase)?;
        file.write(&bytes)?;
        self.dirty = false;
        info!(path = %file.path().display(), credentials = self.credentials.len(), "store saved");
        Ok(())
    }

    /// Use a new passphrase from the next save on.
    pub fn change_passphrase(&mut self, passphrase: SecretString) {
        self.passphrase = passphrase;
        self.dirty = true;
        info!("store passphrase changed; takes effect on next save");
    }

    /// Whether there are mutations not yet written with [`Self::write_to`].
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of credentials.
    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    pub fn credentials(&self) -> &CredentialMap {
        &self.credentials
    }
}

fn log_loaded(credentials: &CredentialMap, generation: Generation) {
    info!(%generation, credentials = credentials.len(), "store loaded");
    if generation.needs_upgrade() {
        info!(%generation, "legacy store will be upgraded on next save");
    }
}
