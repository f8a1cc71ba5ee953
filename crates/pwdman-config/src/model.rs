// SPDX-FileCopyrightText: 2026 pwdman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for pwdman.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so that a misspelled key
//! is reported at startup instead of being silently ignored.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// File name of the store inside the home directory.
pub const DEFAULT_STORE_FILE: &str = ".pwdman";

/// Top-level pwdman configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PwdmanConfig {
    /// Store file location.
    #[serde(default)]
    pub store: StoreConfig,

    /// Diagnostic logging.
    #[serde(default)]
    pub log: LogConfig,

    /// Interactive shell behavior.
    #[serde(default)]
    pub shell: ShellConfig,

    /// Clipboard integration for the `copy` command.
    #[serde(default)]
    pub clipboard: ClipboardConfig,
}

/// Store file configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Path of the encrypted store file. `None` means `$HOME/.pwdman`.
    #[serde(default)]
    pub path: Option<String>,
}

impl StoreConfig {
    /// Resolve the store path, falling back to the home directory default.
    ///
    /// Returns `None` only when no path is configured and the home directory
    /// cannot be determined.
    pub fn resolved_path(&self) -> Option<PathBuf> {
        match &self.path {
            Some(path) => Some(expand_home(path)),
            None => dirs::home_dir().map(|home| home.join(DEFAULT_STORE_FILE)),
        }
    }
}

/// Expand a leading `~/` to the home directory.
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Level for pwdman's own targets (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Interactive shell configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ShellConfig {
    /// Prompt shown before each command.
    #[serde(default = "default_prompt")]
    pub prompt: String,

    /// Maximum number of in-memory history entries.
    #[serde(default = "default_history_size")]
    pub history_size: usize,

    /// Tab completion of credential names and elements.
    #[serde(default = "default_completion")]
    pub completion: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: default_prompt(),
            history_size: default_history_size(),
            completion: default_completion(),
        }
    }
}

fn default_prompt() -> String {
    ">> ".to_string()
}

fn default_history_size() -> usize {
    100
}

fn default_completion() -> bool {
    true
}

/// Clipboard configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClipboardConfig {
    /// Explicit copy command and arguments, e.g. `["xclip", "-selection", "clipboard"]`.
    /// The secret is written to its stdin. `None` auto-detects a platform tool.
    #[serde(default)]
    pub command: Option<Vec<String>>,
}
