// SPDX-FileCopyrightText: 2026 pwdman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reader for the envelope of headerless store files (generations 0 and 1).
//!
//! Such a file is the upper-case hex encoding of
//!
//! ```text
//! [salt 8B][AES-128-CBC, PKCS#7 ( check 16B ‖ plaintext ‖ HMAC-SHA256 32B )]
//! ```
//!
//! Key and IV are a 2500-round SHA-256 mash of `passphrase ‖ salt`. The check
//! block is the first 16 bytes of `SHA-256(passphrase ‖ salt)`. The MAC key is
//! a single mash round over the passphrase alone. These files are only ever
//! read; saving rewrites them in the current format.

use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use pwdman_core::PwdmanError;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

/// Length of the salt stored in front of the ciphertext.
pub const SALT_LEN: usize = 8;

/// Rounds of the key/IV mash.
pub const MASH_ROUNDS: u32 = 2500;

const BLOCK_LEN: usize = 16;
const KEY_LEN: usize = 16;
const MAC_KEY_LEN: usize = 16;
const TAG_LEN: usize = 32;
const DIGEST_LEN: usize = 32;

type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;
type HmacSha256 = Hmac<Sha256>;

/// Decode and decrypt a headerless store file.
///
/// Either hex case is accepted, as is surrounding whitespace. Every failure,
/// from bad hex to a wrong passphrase or a MAC mismatch, is
/// [`PwdmanError::Authentication`].
pub fn decrypt(
    file: &[u8],
    passphrase: &SecretString,
) -> Result<Zeroizing<Vec<u8>>, PwdmanError> {
    let raw = Zeroizing::new(
        hex::decode(file.trim_ascii()).map_err(|_| PwdmanError::Authentication)?,
    );
    let (salt, ciphertext) = raw
        .split_first_chunk::<SALT_LEN>()
        .ok_or(PwdmanError::Authentication)?;
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
        return Err(PwdmanError::Authentication);
    }

    let passphrase = legacy_passphrase(passphrase);
    let keys = LegacyKeys::derive(passphrase, salt);

    let decrypted = Zeroizing::new(
        Aes128CbcDec::new_from_slices(keys.key(), keys.iv())
            .map_err(|e| PwdmanError::Internal(format!("AES-128-CBC setup failed: {e}")))?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| PwdmanError::Authentication)?,
    );
    if decrypted.len() < BLOCK_LEN + TAG_LEN {
        return Err(PwdmanError::Authentication);
    }

    let (check, rest) = decrypted.split_at(BLOCK_LEN);
    if check != keys.check.as_slice() {
        return Err(PwdmanError::Authentication);
    }

    let (plaintext, tag) = rest.split_at(rest.len() - TAG_LEN);
    let mut mac = HmacSha256::new_from_slice(keys.mac_key.as_ref())
        .map_err(|e| PwdmanError::Internal(format!("HMAC-SHA256 setup failed: {e}")))?;
    mac.update(plaintext);
    mac.verify_slice(tag)
        .map_err(|_| PwdmanError::Authentication)?;

    Ok(Zeroizing::new(plaintext.to_vec()))
}

/// Legacy writers stopped reading the passphrase at the first NUL byte.
fn legacy_passphrase(passphrase: &SecretString) -> &[u8] {
    let bytes = passphrase.expose_secret().as_bytes();
    bytes.split(|&b| b == 0).next().unwrap_or(bytes)
}

struct LegacyKeys {
    key_iv: Zeroizing<[u8; KEY_LEN + BLOCK_LEN]>,
    check: [u8; BLOCK_LEN],
    mac_key: Zeroizing<[u8; MAC_KEY_LEN]>,
}

impl LegacyKeys {
    fn derive(passphrase: &[u8], salt: &[u8; SALT_LEN]) -> Self {
        let mut seed = Zeroizing::new(Vec::with_capacity(passphrase.len() + SALT_LEN));
        seed.extend_from_slice(passphrase);
        seed.extend_from_slice(salt);

        let mut key_iv = Zeroizing::new([0u8; KEY_LEN + BLOCK_LEN]);
        mash(&seed, key_iv.as_mut(), MASH_ROUNDS);

        let mut check = [0u8; BLOCK_LEN];
        check.copy_from_slice(&Sha256::digest(&seed[..])[..BLOCK_LEN]);

        let mut mac_key = Zeroizing::new([0u8; MAC_KEY_LEN]);
        mash(passphrase, mac_key.as_mut(), 1);

        Self {
            key_iv,
            check,
            mac_key,
        }
    }

    fn key(&self) -> &[u8] {
        &self.key_iv[..KEY_LEN]
    }

    fn iv(&self) -> &[u8] {
        &self.key_iv[KEY_LEN..]
    }
}

/// Iterated SHA-256 stretching. Each 32-byte output chunk is
/// `SHA-256(offset as u16 BE ‖ input)`; later rounds hash the whole previous
/// buffer instead of `input`.
fn mash(input: &[u8], out: &mut [u8], rounds: u32) {
    let buf_len = out.len().div_ceil(DIGEST_LEN) * DIGEST_LEN;
    let mut buf = Zeroizing::new(vec![0u8; buf_len]);
    fill_chunks(&mut buf, input);

    for _ in 1..rounds {
        let previous = Zeroizing::new(buf.to_vec());
        fill_chunks(&mut buf, &previous);
    }

    out.copy_from_slice(&buf[..out.len()]);
}

fn fill_chunks(buf: &mut [u8], data: &[u8]) {
    for (i, chunk) in buf.chunks_exact_mut(DIGEST_LEN).enumerate() {
        // Offsets never exceed a few hundred bytes.
        let offset = (i * DIGEST_LEN) as u16;
        let mut hasher = Sha256::new();
        hasher.update(offset.to_be_bytes());
        hasher.update(data);
        chunk.copy_from_slice(&hasher.finalize());
    }
}

/// Build a headerless file with a fixed salt, for fixtures.
#[cfg(test)]
pub(crate) fn seal_with_salt(plaintext: &[u8], passphrase: &str, salt: [u8; SALT_LEN]) -> String {
    use cbc::cipher::BlockEncryptMut;

    let keys = LegacyKeys::derive(passphrase.as_bytes(), &salt);
    let mut mac = HmacSha256::new_from_slice(keys.mac_key.as_ref()).unwrap();
    mac.update(plaintext);

    let mut inner = keys.check.to_vec();
    inner.extend_from_slice(plaintext);
    inner.extend_from_slice(&mac.finalize().into_bytes());

    let ciphertext = cbc::Encryptor::<aes::Aes128>::new_from_slices(keys.key(), keys.iv())
        .unwrap()
        .encrypt_padded_vec_mut::<Pkcs7>(&inner);

    let mut raw = salt.to_vec();
    raw.extend_from_slice(&ciphertext);
    hex::encode_upper(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `{"site":"secret"}` under passphrase `old`, salt `01..08`.
    const FLAT_FILE: &str = "010203040506070881B3A327A5F147D0703C4015D2A1CA366F9F8CE499BA4EB4\
        AA5E3C925508A4613DEA548550913A7B367C284912B32DB9F83D26E58E9241E5\
        5DC0E17933AB5DE7E04750583B79D6327D441AF1EB20202E";

    fn pass(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    #[test]
    fn mash_single_round_known_answer() {
        let mut out = [0u8; 16];
        mash(b"old", &mut out, 1);
        assert_eq!(hex::encode(out), "0b0a809c3fb8f5b7c5d0f74086d281e0");
    }

    #[test]
    fn decrypts_known_file() {
        let plaintext = decrypt(FLAT_FILE.as_bytes(), &pass("old")).unwrap();
        assert_eq!(&plaintext[..], br#"{"site":"secret"}"#);
    }

    #[test]
    fn sealing_reproduces_known_file() {
        let sealed = seal_with_salt(br#"{"site":"secret"}"#, "old", [1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(sealed, FLAT_FILE);
    }

    #[test]
    fn lowercase_and_trailing_newline_accepted() {
        let relaxed = format!("{}\n", FLAT_FILE.to_ascii_lowercase());
        let plaintext = decrypt(relaxed.as_bytes(), &pass("old")).unwrap();
        assert_eq!(&plaintext[..], br#"{"site":"secret"}"#);
    }

    #[test]
    fn wrong_passphrase_fails() {
        assert!(matches!(
            decrypt(FLAT_FILE.as_bytes(), &pass("new")),
            Err(PwdmanError::Authentication)
        ));
    }

    #[test]
    fn passphrase_ends_at_nul() {
        let plaintext = decrypt(FLAT_FILE.as_bytes(), &pass("old\0ignored")).unwrap();
        assert_eq!(&plaintext[..], br#"{"site":"secret"}"#);
    }

    #[test]
    fn every_byte_is_authenticated() {
        let file = FLAT_FILE.as_bytes();
        for i in 0..file.len() {
            let mut damaged = file.to_vec();
            damaged[i] = if damaged[i] == b'0' { b'1' } else { b'0' };
            assert!(
                matches!(decrypt(&damaged, &pass("old")), Err(PwdmanError::Authentication)),
                "byte {i} was not authenticated"
            );
        }
    }

    #[test]
    fn structural_damage_is_authentication_error() {
        let file = FLAT_FILE.as_bytes();
        let salt_only = &file[..2 * SALT_LEN];
        let partial_block = &file[..file.len() - 2];
        let odd_length = &file[..file.len() - 1];

        for damaged in [b"".as_slice(), salt_only, partial_block, odd_length, b"zz"] {
            assert!(matches!(
                decrypt(damaged, &pass("old")),
                Err(PwdmanError::Authentication)
            ));
        }
    }
}
