// SPDX-FileCopyrightText: 2026 pwdman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup: `~/.config/pwdman/pwdman.toml` < `./pwdman.toml`, with environment
//! variable overrides via the `PWDMAN_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::PwdmanConfig;

/// Name of the configuration file in each lookup location.
pub const CONFIG_FILE_NAME: &str = "pwdman.toml";

/// Load configuration from the standard lookup locations with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `~/.config/pwdman/pwdman.toml` (user XDG config)
/// 3. `./pwdman.toml` (local directory)
/// 4. `PWDMAN_*` environment variables
pub fn load_config() -> Result<PwdmanConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<PwdmanConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PwdmanConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from one explicit file path with env var overrides.
///
/// The standard lookup locations are skipped; the given file replaces them.
pub fn load_config_from_path(path: &Path) -> Result<PwdmanConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PwdmanConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for standard config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(PwdmanConfig::default()))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(CONFIG_FILE_NAME))
        .merge(env_provider())
}

/// Path of the per-user configuration file, if a config directory exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pwdman").join(CONFIG_FILE_NAME))
}

/// Environment provider mapping `PWDMAN_<SECTION>_<KEY>` to `section.key`.
///
/// Uses `Env::map()` rather than `Env::split("_")` because keys such as
/// `history_size` contain underscores. `PWDMAN_PASSPHRASE` carries the store
/// passphrase, not configuration, and is excluded.
fn env_provider() -> Env {
    Env::prefixed("PWDMAN_")
        .ignore(&["passphrase"])
        .map(|key| {
            // `key` is the lowercased variable name with the prefix stripped.
            // Example: PWDMAN_SHELL_HISTORY_SIZE -> "shell_history_size"
            let mapped = key
                .as_str()
                .replacen("store_", "store.", 1)
                .replacen("log_", "log.", 1)
                .replacen("shell_", "shell.", 1)
                .replacen("clipboard_", "clipboard.", 1);
            mapped.into()
        })
}
