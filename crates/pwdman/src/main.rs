// SPDX-FileCopyrightText: 2026 pwdman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! pwdman - a local encrypted password manager.
//!
//! This is the binary entry point: it resolves the store file, unlocks or
//! initializes it, and hands it to the interactive shell.

mod clipboard;
mod command;
mod shell;

use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use pwdman_config::PwdmanConfig;
use pwdman_core::PwdmanError;
use pwdman_store::{get_new_passphrase, get_passphrase, PasswordStore, StoreFile};
use tracing::{debug, warn};

use crate::clipboard::Clipboard;
use crate::shell::Session;

/// pwdman - a local encrypted password manager.
#[derive(Parser, Debug)]
#[command(name = "pwdman", version, about, long_about = None)]
struct Cli {
    /// Password store file [default: ~/.pwdman].
    #[arg(short, long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Configuration file, replacing the standard lookup locations.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let loaded = match cli.config.as_deref() {
        Some(path) => pwdman_config::load_and_validate_path(path),
        None => pwdman_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            pwdman_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.log.level);

    if let Err(e) = run(cli, config) {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

fn run(cli: Cli, config: PwdmanConfig) -> Result<(), PwdmanError> {
    let path = cli
        .file
        .or_else(|| config.store.resolved_path())
        .ok_or_else(|| {
            PwdmanError::Config("cannot determine home directory; pass --file".to_string())
        })?;
    let file = StoreFile::new(path);
    let store = open_or_initialize(&file)?;

    let clipboard = Clipboard::from_config(&config.clipboard);
    match &clipboard {
        Some(clipboard) => debug!(program = clipboard.program(), "clipboard tool selected"),
        None => warn!("no clipboard tool found; 'copy' is unavailable"),
    }

    shell::run(Session::new(store, file, clipboard), &config.shell)
}

/// Unlock the existing store, or start an empty one under a new passphrase.
fn open_or_initialize(file: &StoreFile) -> Result<PasswordStore, PwdmanError> {
    if !file.exists() {
        println!(
            "Password file '{}' not found; initializing empty password store.",
            file.path().display()
        );
        return Ok(PasswordStore::new(get_new_passphrase()?));
    }

    println!("Reading password file '{}'", file.path().display());
    let (store, generation) = PasswordStore::open(file, get_passphrase()?)?;
    if generation.needs_upgrade() {
        println!(
            "{}",
            format!("Password file is in {generation}; it will be upgraded on the next write.")
                .yellow()
        );
    }
    Ok(store)
}

/// Log to stderr so REPL output on stdout stays clean. `RUST_LOG` wins over
/// the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pwdman={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}
