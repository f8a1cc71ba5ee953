// SPDX-FileCopyrightText: 2026 pwdman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Argon2id key derivation from the store passphrase.
//!
//! The cost parameters are part of the on-disk format. Raising them means
//! shipping a new format version, never editing [`STORE_KDF`] in place.

use pwdman_core::PwdmanError;
use zeroize::Zeroizing;

use crate::crypto::{self, KEY_LEN};

/// Length of the random per-save salt.
pub const SALT_LEN: usize = 16;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub memory_cost: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

/// Parameters of every format generation written so far (OWASP Argon2id
/// baseline: 19 MiB, 2 passes, 1 lane).
pub const STORE_KDF: KdfParams = KdfParams {
    memory_cost: 19_456,
    iterations: 2,
    parallelism: 1,
};

/// Derive a 32-byte key from passphrase and salt using Argon2id v0x13.
///
/// The returned key is wiped on drop.
pub fn derive_key(
    passphrase: &[u8],
    salt: &[u8; SALT_LEN],
    params: &KdfParams,
) -> Result<Zeroizing<[u8; KEY_LEN]>, PwdmanError> {
    let argon_params = argon2::Params::new(
        params.memory_cost,
        params.iterations,
        params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| PwdmanError::Internal(format!("invalid Argon2id parameters: {e}")))?;

    let argon2 = argon2::Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon_params,
    );

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    argon2
        .hash_password_into(passphrase, salt, key.as_mut())
        .map_err(|e| PwdmanError::Internal(format!("Argon2id key derivation failed: {e}")))?;

    Ok(key)
}

/// Generate a fresh random salt.
pub fn generate_salt() -> Result<[u8; SALT_LEN], PwdmanError> {
    let mut salt = [0u8; SALT_LEN];
    crypto::fill_random(&mut salt)?;
    Ok(salt)
}
