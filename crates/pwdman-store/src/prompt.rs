// SPDX-FileCopyrightText: 2026 pwdman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Passphrase acquisition via TTY prompt or PWDMAN_PASSPHRASE environment variable.

use std::io::IsTerminal;

use pwdman_core::PwdmanError;
use secrecy::{ExposeSecret, SecretString};

/// The environment variable name for providing the store passphrase.
pub const PASSPHRASE_ENV_VAR: &str = "PWDMAN_PASSPHRASE";

const NO_PASSPHRASE: &str =
    "no passphrase provided; set PWDMAN_PASSPHRASE or run interactively";

fn from_env() -> Option<SecretString> {
    match std::env::var(PASSPHRASE_ENV_VAR) {
        Ok(key) if !key.is_empty() => Some(SecretString::from(key)),
        _ => None,
    }
}

fn read_hidden(prompt: &str) -> Result<SecretString, PwdmanError> {
    rpassword::prompt_password(prompt)
        .map(SecretString::from)
        .map_err(|e| PwdmanError::Config(format!("failed to read passphrase: {e}")))
}

/// Get the passphrase of an existing store.
///
/// Priority:
/// 1. `PWDMAN_PASSPHRASE` environment variable (for scripts)
/// 2. Interactive TTY prompt via `rpassword`
pub fn get_passphrase() -> Result<SecretString, PwdmanError> {
    if let Some(passphrase) = from_env() {
        return Ok(passphrase);
    }

    if std::io::stdin().is_terminal() {
        return read_hidden("Password: ");
    }

    Err(PwdmanError::Config(NO_PASSPHRASE.to_string()))
}

/// Get the passphrase for a new store, asking twice until both entries match.
///
/// The environment variable needs no confirmation.
pub fn get_new_passphrase() -> Result<SecretString, PwdmanError> {
    if let Some(passphrase) = from_env() {
        return Ok(passphrase);
    }

    if !std::io::stdin().is_terminal() {
        return Err(PwdmanError::Config(NO_PASSPHRASE.to_string()));
    }

    loop {
        let first = read_hidden("Password: ")?;
        let second = read_hidden("Confirm : ")?;

        if first.expose_secret() != second.expose_secret() {
            eprintln!("Password mismatch. Try again");
            continue;
        }
        if first.expose_secret().is_empty() {
            eprintln!("Empty password not allowed. Try again");
            continue;
        }
        return Ok(first);
    }
}
