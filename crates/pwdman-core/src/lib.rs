// SPDX-FileCopyrightText: 2026 pwdman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core types for pwdman.
//!
//! This crate provides the error taxonomy and the credential addressing type
//! used by the store library, the configuration system and the shell.

pub mod error;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::PwdmanError;
pub use types::{CredentialPath, DEFAULT_ELEMENT};
