// SPDX-FileCopyrightText: 2026 pwdman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Self-describing store file format and its backward-compatible readers.
//!
//! Three generations have been written over time:
//!
//! | generation | layout                                 | envelope           | plaintext               |
//! |------------|----------------------------------------|--------------------|-------------------------|
//! | 0          | `HEX blob`                             | [`legacy`]         | `name -> value`         |
//! | 1          | `HEX blob`                             | [`legacy`]         | `name -> elem -> value` |
//! | 2          | `MAGIC[8] ‖ version u32 LE ‖ hex blob` | [`envelope`] (v1)  | `name -> elem -> value` |
//!
//! Writers always produce generation 2. Readers accept all three; a file is
//! only upgraded when it is next saved.
//!
//! [`legacy`]: crate::legacy
//! [`envelope`]: crate::envelope

use std::fmt;

use pwdman_core::PwdmanError;
use secrecy::SecretString;
use tracing::debug;

use crate::codec;
use crate::credentials::CredentialMap;
use crate::envelope;
use crate::legacy;

/// Leading bytes of a framed store file. Contains bytes outside the hex
/// alphabet so it can never be mistaken for a headerless blob.
pub const MAGIC: [u8; 8] = *b"\x8aPWDMAN\x1a";

/// Framed version written by this build.
pub const CURRENT_VERSION: u32 = 1;

const VERSION_LEN: usize = 4;

/// The format generation a store was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generation {
    /// Generation 0: headerless, flat `name -> value` plaintext.
    FlatLegacy,
    /// Generation 1: headerless, two-level plaintext.
    NestedLegacy,
    /// Generation 2: magic + version header.
    Framed { version: u32 },
}

impl Generation {
    /// Whether saving would write the file in a different layout.
    pub fn needs_upgrade(&self) -> bool {
        *self != Generation::Framed {
            version: CURRENT_VERSION,
        }
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FlatLegacy => f.write_str("generation 0 (legacy, flat)"),
            Self::NestedLegacy => f.write_str("generation 1 (legacy, headerless)"),
            Self::Framed { version } => write!(f, "generation 2 (framed v{version})"),
        }
    }
}

type Decoder = fn(&[u8], &SecretString) -> Result<CredentialMap, PwdmanError>;

/// Decoders for framed files, indexed by version number. Slot 0 was never
/// assigned.
const FRAMED_DECODERS: [Option<Decoder>; 2] = [None, Some(decode_framed_v1)];

/// Serialize, encrypt and frame a credential map in the current format.
pub fn encode(map: &CredentialMap, passphrase: &SecretString) -> Result<Vec<u8>, PwdmanError> {
    let plaintext = codec::encode(map)?;
    let blob = envelope::encrypt(&plaintext, passphrase)?;

    let mut out = Vec::with_capacity(MAGIC.len() + VERSION_LEN + blob.len());
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&CURRENT_VERSION.to_le_bytes());
    out.extend_from_slice(blob.as_bytes());
    Ok(out)
}

/// Read a store file of any known generation.
pub fn decode(
    bytes: &[u8],
    passphrase: &SecretString,
) -> Result<(CredentialMap, Generation), PwdmanError> {
    let Some(framed) = bytes.strip_prefix(&MAGIC) else {
        return decode_headerless(bytes, passphrase);
    };

    // A header cut short is structural damage, reported like any other.
    let (version, body) = framed
        .split_first_chunk::<VERSION_LEN>()
        .ok_or(PwdmanError::Authentication)?;
    let version = u32::from_le_bytes(*version);

    let decoder = usize::try_from(version)
        .ok()
        .and_then(|slot| FRAMED_DECODERS.get(slot).copied().flatten())
        .ok_or(PwdmanError::UnsupportedFormat { version })?;

    let map = decoder(body, passphrase)?;
    Ok((map, Generation::Framed { version }))
}

fn decode_framed_v1(body: &[u8], passphrase: &SecretString) -> Result<CredentialMap, PwdmanError> {
    let plaintext = envelope::decrypt(body, passphrase)?;
    codec::decode(&plaintext)
}

/// Generations 0 and 1 share a layout and envelope; only the decrypted
/// plaintext tells them apart.
fn decode_headerless(
    bytes: &[u8],
    passphrase: &SecretString,
) -> Result<(CredentialMap, Generation), PwdmanError> {
    let plaintext = legacy::decrypt(bytes, passphrase)?;

    if let Ok(map) = codec::decode(&plaintext) {
        return Ok((map, Generation::NestedLegacy));
    }
    debug!("headerless plaintext is not nested, trying flat layout");
    let map = codec::decode_flat(&plaintext)
        .map_err(|_| PwdmanError::MalformedPlaintext("plaintext matches no known layout"))?;
    Ok((map, Generation::FlatLegacy))
}
