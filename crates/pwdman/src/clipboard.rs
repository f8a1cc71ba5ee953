// SPDX-FileCopyrightText: 2026 pwdman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! System clipboard access through the platform's copy tool.
//!
//! The secret is written to the tool's stdin so it never shows up in the
//! process table.

use std::io::Write;
use std::process::{Command, Stdio};

use pwdman_config::model::ClipboardConfig;
use pwdman_core::PwdmanError;
use tracing::debug;

const NO_ARGS: [&str; 0] = [];

/// An external command that copies its stdin to the clipboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clipboard {
    program: String,
    args: Vec<String>,
}

impl Clipboard {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// The configured command if there is one, otherwise whatever the
    /// platform offers.
    pub fn from_config(config: &ClipboardConfig) -> Option<Self> {
        match config.command.as_deref() {
            Some([program, args @ ..]) => Some(Self::new(program.clone(), args.iter().cloned())),
            _ => Self::detect(),
        }
    }

    /// Detect a copy tool for the current platform.
    pub fn detect() -> Option<Self> {
        #[cfg(target_os = "macos")]
        {
            return Self::command_exists("pbcopy").then(|| Self::new("pbcopy", NO_ARGS));
        }

        #[cfg(target_os = "windows")]
        {
            return Some(Self::new("clip.exe", NO_ARGS));
        }

        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        {
            if std::env::var_os("WSL_DISTRO_NAME").is_some() && Self::command_exists("clip.exe") {
                return Some(Self::new("clip.exe", NO_ARGS));
            }
            if std::env::var_os("WAYLAND_DISPLAY").is_some() && Self::command_exists("wl-copy") {
                return Some(Self::new("wl-copy", NO_ARGS));
            }
            if Self::command_exists("xclip") {
                return Some(Self::new("xclip", ["-selection", "clipboard"]));
            }
            if Self::command_exists("xsel") {
                return Some(Self::new("xsel", ["--clipboard", "--input"]));
            }
            None
        }
    }

    fn command_exists(cmd: &str) -> bool {
        Command::new("which")
            .arg(cmd)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Put `text` on the clipboard.
    pub fn copy(&self, text: &str) -> Result<(), PwdmanError> {
        let failed = |e: std::io::Error| {
            PwdmanError::Internal(format!("clipboard command '{}' failed: {e}", self.program))
        };

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(failed)?;

        // The pipe is closed at the end of the match so the tool sees EOF.
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(text.as_bytes()),
            None => Ok(()),
        };

        // Reap the child even when the write failed.
        let status = child.wait().map_err(failed)?;
        written.map_err(failed)?;
        if !status.success() {
            return Err(PwdmanError::Internal(format!(
                "clipboard command '{}' exited with {status}",
                self.program
            )));
        }

        debug!(program = %self.program, "value copied to clipboard");
        Ok(())
    }
}
