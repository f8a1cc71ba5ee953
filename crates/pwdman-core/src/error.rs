// SPDX-FileCopyrightText: 2026 pwdman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for pwdman.

use thiserror::Error;

/// The error type shared by the store, the persistence layer and the shell.
///
/// Every variant renders as a single line suitable for showing to the user.
/// Cryptographic failures all collapse into [`PwdmanError::Authentication`]
/// so that callers cannot tell a wrong passphrase from a damaged file.
#[derive(Debug, Error)]
pub enum PwdmanError {
    /// Wrong passphrase, tampered ciphertext, or a structurally broken blob.
    #[error("invalid password")]
    Authentication,

    /// The file carries the store magic but a version this build cannot read.
    #[error("unsupported store format version {version}")]
    UnsupportedFormat { version: u32 },

    /// The requested credential or element does not exist.
    #[error("'{path}' not found")]
    NotFound { path: String },

    /// Decrypted data matched none of the known plaintext shapes.
    ///
    /// Authentication already succeeded when this is raised, so it points at
    /// a defect rather than at user input. The message is a fixed description
    /// and never contains plaintext.
    #[error("malformed store contents: {0}")]
    MalformedPlaintext(&'static str),

    /// Reading or writing the store file failed.
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors (RNG failure, key setup failure).
    #[error("internal error: {0}")]
    Internal(String),
}

impl PwdmanError {
    /// Shorthand for a [`PwdmanError::NotFound`] on any displayable path.
    pub fn not_found(path: impl std::fmt::Display) -> Self {
        Self::NotFound {
            path: path.to_string(),
        }
    }
}

impl From<std::io::Error> for PwdmanError {
    fn from(e: std::io::Error) -> Self {
        Self::Storage {
            source: Box::new(e),
        }
    }
}
