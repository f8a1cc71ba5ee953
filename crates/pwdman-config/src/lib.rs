// SPDX-FileCopyrightText: 2026 pwdman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for pwdman.
//!
//! TOML configuration with strict key checking (`deny_unknown_fields`), user
//! and local file lookup, `PWDMAN_*` environment overrides, and miette
//! diagnostics with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use pwdman_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("store: {:?}", config.store.resolved_path());
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::PwdmanConfig;

/// Load configuration from the standard locations and validate it.
pub fn load_and_validate() -> Result<PwdmanConfig, Vec<ConfigError>> {
    finish(loader::load_config(), collect_toml_sources)
}

/// Load configuration from one explicit file and validate it.
pub fn load_and_validate_path(path: &Path) -> Result<PwdmanConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_path(path), || {
        read_source(path).into_iter().collect()
    })
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<PwdmanConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

fn finish(
    loaded: Result<PwdmanConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<PwdmanConfig, Vec<ConfigError>> {
    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            tracing::debug!(store = ?config.store.path, "configuration loaded");
            Ok(config)
        }
        Err(err) => Err(diagnostic::collect_errors(err, &sources())),
    }
}

/// Contents of the standard TOML files, for error span resolution.
fn collect_toml_sources() -> Vec<(String, String)> {
    let local = std::env::current_dir()
        .map(|d| d.join(loader::CONFIG_FILE_NAME))
        .unwrap_or_else(|_| loader::CONFIG_FILE_NAME.into());

    loader::user_config_path()
        .into_iter()
        .chain(std::iter::once(local))
        .filter_map(|path| read_source(&path))
        .collect()
}

fn read_source(path: &Path) -> Option<(String, String)> {
    std::fs::read_to_string(path)
        .ok()
        .map(|content| (path.display().to_string(), content))
}
