// SPDX-FileCopyrightText: 2026 pwdman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Passphrase-keyed authenticated encryption of one plaintext blob.
//!
//! Raw blob layout, hex-encoded before it is written:
//!
//! ```text
//! [salt 16B][nonce 12B][ciphertext][GCM tag 16B]
//! ```
//!
//! The salt and nonce are fresh on every call to [`encrypt`]; the passphrase
//! is the only secret needed to open the blob again.

use pwdman_core::PwdmanError;
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

use crate::crypto::{self, NONCE_LEN, TAG_LEN};
use crate::kdf::{self, SALT_LEN, STORE_KDF};

/// Smallest raw blob: salt, nonce and tag around an empty ciphertext.
pub const MIN_BLOB_LEN: usize = SALT_LEN + NONCE_LEN + TAG_LEN;

/// Encrypt `plaintext` under `passphrase` and hex-encode the result.
pub fn encrypt(plaintext: &[u8], passphrase: &SecretString) -> Result<String, PwdmanError> {
    let salt = kdf::generate_salt()?;
    let key = kdf::derive_key(passphrase.expose_secret().as_bytes(), &salt, &STORE_KDF)?;
    let (ciphertext, nonce) = crypto::seal(&key, plaintext)?;

    let mut raw = Vec::with_capacity(SALT_LEN + NONCE_LEN + ciphertext.len());
    raw.extend_from_slice(&salt);
    raw.extend_from_slice(&nonce);
    raw.extend_from_slice(&ciphertext);

    Ok(hex::encode(raw))
}

/// Decode and decrypt a hex blob produced by [`encrypt`].
///
/// Only lower-case hex is accepted, so every byte of the blob has exactly one
/// valid spelling. Malformed hex, a truncated blob, a wrong passphrase and a
/// failed tag check all return the same [`PwdmanError::Authentication`].
pub fn decrypt(
    blob: &[u8],
    passphrase: &SecretString,
) -> Result<Zeroizing<Vec<u8>>, PwdmanError> {
    if !blob.iter().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
        return Err(PwdmanError::Authentication);
    }
    let raw = hex::decode(blob).map_err(|_| PwdmanError::Authentication)?;
    if raw.len() < MIN_BLOB_LEN {
        return Err(PwdmanError::Authentication);
    }

    let (salt, rest) = raw.split_at(SALT_LEN);
    let (nonce, ciphertext) = rest.split_at(NONCE_LEN);
    let salt: &[u8; SALT_LEN] = salt.try_into().map_err(|_| PwdmanError::Authentication)?;
    let nonce: &[u8; NONCE_LEN] = nonce.try_into().map_err(|_| PwdmanError::Authentication)?;

    let key = kdf::derive_key(passphrase.expose_secret().as_bytes(), salt, &STORE_KDF)?;
    crypto::open(&key, nonce, ciphertext)
}
