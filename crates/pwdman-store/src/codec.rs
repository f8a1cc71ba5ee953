// SPDX-FileCopyrightText: 2026 pwdman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plaintext encoding of the credential map.
//!
//! The map is serialized as a JSON object of objects of strings. Keys come
//! out sorted, so equal maps always encode to identical bytes.

use std::collections::BTreeMap;

use pwdman_core::PwdmanError;
use zeroize::Zeroizing;

use crate::credentials::{CredentialMap, Elements};

/// Encode a credential map into a plaintext buffer wiped on drop.
pub fn encode(map: &CredentialMap) -> Result<Zeroizing<Vec<u8>>, PwdmanError> {
    serde_json::to_vec(map.as_tree())
        .map(Zeroizing::new)
        .map_err(|_| PwdmanError::Internal("failed to encode credential map".to_string()))
}

/// Decode a two-level `name -> element -> value` plaintext.
// serde_json errors quote the offending input, so they are never forwarded.
pub fn decode(plaintext: &[u8]) -> Result<CredentialMap, PwdmanError> {
    serde_json::from_slice::<BTreeMap<String, Elements>>(plaintext)
        .map(CredentialMap::from_tree)
        .map_err(|_| PwdmanError::MalformedPlaintext("expected a map of element maps"))
}

/// Decode a flat `name -> value` plaintext, lifting each value under the
/// default element.
pub fn decode_flat(plaintext: &[u8]) -> Result<CredentialMap, PwdmanError> {
    serde_json::from_slice::<BTreeMap<String, String>>(plaintext)
        .map(CredentialMap::from_flat)
        .map_err(|_| PwdmanError::MalformedPlaintext("expected a map of values"))
}
