// SPDX-FileCopyrightText: 2026 pwdman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Encrypted, versioned credential store for pwdman.
//!
//! A store file holds one AES-256-GCM envelope keyed from the passphrase via
//! Argon2id, behind a magic + version header. Older headerless files, sealed
//! with AES-128-CBC and HMAC-SHA256, are still read and are rewritten in the
//! current layout on the next save.

pub mod codec;
pub mod credentials;
pub mod crypto;
pub mod envelope;
pub mod file;
pub mod format;
pub mod kdf;
pub mod legacy;
pub mod prompt;
pub mod store;

pub use credentials::CredentialMap;
pub use file::StoreFile;
pub use format::Generation;
pub use prompt::{get_new_passphrase, get_passphrase};
pub use store::PasswordStore;
