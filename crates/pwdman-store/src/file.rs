// SPDX-FileCopyrightText: 2026 pwdman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! On-disk location of a store and crash-safe replacement of its contents.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use pwdman_core::PwdmanError;
use tracing::debug;

const TEMP_PREFIX: &str = ".pwdman-";

/// Path to a store file. Holds no open handle; every operation hits the
/// filesystem afresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreFile {
    path: PathBuf,
}

impl StoreFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read the whole file. `Ok(None)` if it does not exist.
    pub fn read(&self) -> Result<Option<Vec<u8>>, PwdmanError> {
        match fs::read(&self.path) {
            Ok(bytes) => {
                debug!(path = %self.path.display(), bytes = bytes.len(), "store file read");
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the file contents atomically.
    ///
    /// The bytes go to a temporary file in the same directory, which is
    /// synced, restricted to owner read/write on Unix, then renamed over the
    /// target. On failure the previous file is untouched and the temporary
    /// file is removed.
    pub fn write(&self, bytes: &[u8]) -> Result<(), PwdmanError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(dir)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file()
                .set_permissions(fs::Permissions::from_mode(0o600))?;
        }

        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| PwdmanError::from(e.error))?;

        debug!(path = %self.path.display(), bytes = bytes.len(), "store file written");
        Ok(())
    }
}
