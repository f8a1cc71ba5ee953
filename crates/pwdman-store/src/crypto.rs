// SPDX-FileCopyrightText: 2026 pwdman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Low-level AES-256-GCM seal/open operations.
//!
//! Every call to [`seal`] draws a fresh 96-bit nonce from the system CSPRNG.

use pwdman_core::PwdmanError;
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM};
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

pub const KEY_LEN: usize = 32;
pub const NONCE_LEN: usize = 12;
pub const TAG_LEN: usize = 16;

fn aead_key(key: &[u8; KEY_LEN]) -> Result<LessSafeKey, PwdmanError> {
    UnboundKey::new(&AES_256_GCM, key)
        .map(LessSafeKey::new)
        .map_err(|_| PwdmanError::Internal("failed to create AES-256-GCM key".to_string()))
}

/// Encrypt `plaintext`, returning `(ciphertext_with_tag, nonce)`.
pub fn seal(
    key: &[u8; KEY_LEN],
    plaintext: &[u8],
) -> Result<(Vec<u8>, [u8; NONCE_LEN]), PwdmanError> {
    let key = aead_key(key)?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    fill_random(&mut nonce_bytes)?;
    let nonce = Nonce::assume_unique_for_key(nonce_bytes);

    let mut in_out = plaintext.to_vec();
    key.seal_in_place_append_tag(nonce, Aad::empty(), &mut in_out)
        .map_err(|_| PwdmanError::Internal("AES-256-GCM encryption failed".to_string()))?;

    Ok((in_out, nonce_bytes))
}

/// Decrypt and authenticate `ciphertext` (tag appended).
///
/// A wrong key and tampered data are indistinguishable: both yield
/// [`PwdmanError::Authentication`]. The working buffer is wiped on every path
/// since a failed open may leave unauthenticated plaintext in it.
pub fn open(
    key: &[u8; KEY_LEN],
    nonce: &[u8; NONCE_LEN],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>, PwdmanError> {
    let key = aead_key(key)?;
    let nonce = Nonce::assume_unique_for_key(*nonce);

    let mut in_out = Zeroizing::new(ciphertext.to_vec());
    let plaintext = key
        .open_in_place(nonce, Aad::empty(), in_out.as_mut_slice())
        .map_err(|_| PwdmanError::Authentication)?;
    let len = plaintext.len();
    in_out.truncate(len);

    Ok(in_out)
}

/// Fill `buf` from the system CSPRNG.
pub fn fill_random(buf: &mut [u8]) -> Result<(), PwdmanError> {
    SystemRandom::new()
        .fill(buf)
        .map_err(|_| PwdmanError::Internal("system random generator failed".to_string()))
}
