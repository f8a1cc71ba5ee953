// SPDX-FileCopyrightText: 2026 pwdman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parsing of shell command lines.
//!
//! A line is `<verb> [path] [value]`. Tokens are separated by spaces. A
//! backslash makes the next character literal, and arguments may be wrapped
//! in single or double quotes (no escapes inside quotes). The verb itself is
//! never quoted.

use pwdman_core::CredentialPath;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// A parsed shell command.
#[derive(Debug)]
pub enum Command {
    Add {
        path: CredentialPath,
        value: SecretString,
    },
    Remove(CredentialPath),
    Get(CredentialPath),
    Copy(CredentialPath),
    List(Option<CredentialPath>),
    Help,
    Write,
    Quit,
    WriteQuit,
}

impl Command {
    /// Whether the line that produced this command may go into history.
    /// `add` lines carry a secret and never do.
    pub fn records_history(&self) -> bool {
        !matches!(self, Self::Add { .. })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Invalid command '{0}'")]
    UnknownVerb(String),

    #[error(
        "Invalid number of arguments given to command '{0}'. Type 'h' or 'help' for command help."
    )]
    Arity(&'static str),

    #[error("Invalid command; expected token {0}")]
    UnterminatedQuote(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arity {
    PathValue,
    Path,
    OptionalPath,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    Add,
    Remove,
    Get,
    Copy,
    List,
    Help,
    Write,
    Quit,
    WriteQuit,
}

impl Verb {
    const ALL: [Verb; 9] = [
        Verb::Add,
        Verb::Remove,
        Verb::Get,
        Verb::Copy,
        Verb::List,
        Verb::Help,
        Verb::Write,
        Verb::Quit,
        Verb::WriteQuit,
    ];

    /// Accepted spellings; the first is the canonical name.
    fn aliases(self) -> &'static [&'static str] {
        match self {
            Verb::Add => &["add", "a"],
            Verb::Remove => &["remove", "r"],
            Verb::Get => &["get", "g"],
            Verb::Copy => &["copy", "c"],
            Verb::List => &["list", "l"],
            Verb::Help => &["help", "h"],
            Verb::Write => &["write", "w"],
            Verb::Quit => &["quit", "q", "exit"],
            Verb::WriteQuit => &["wq"],
        }
    }

    fn arity(self) -> Arity {
        match self {
            Verb::Add => Arity::PathValue,
            Verb::Remove | Verb::Get | Verb::Copy => Arity::Path,
            Verb::List => Arity::OptionalPath,
            Verb::Help | Verb::Write | Verb::Quit | Verb::WriteQuit => Arity::None,
        }
    }

    fn lookup(token: &str) -> Option<Verb> {
        Self::ALL.into_iter().find(|verb| {
            verb.aliases()
                .iter()
                .any(|alias| alias.eq_ignore_ascii_case(token))
        })
    }

    fn name(self) -> &'static str {
        self.aliases()[0]
    }
}

/// Canonical verb names, for completion.
pub fn verb_names() -> impl Iterator<Item = &'static str> {
    Verb::ALL.into_iter().map(Verb::name)
}

/// Splits a line into tokens one at a time.
struct Tokenizer<'a> {
    rest: &'a str,
}

impl<'a> Tokenizer<'a> {
    fn new(line: &'a str) -> Self {
        Self { rest: line }
    }

    /// Next token, or an empty string at end of line.
    fn next_token(&mut self, allow_quotes: bool) -> Result<String, CommandError> {
        self.rest = self.rest.trim_start_matches(' ');

        let Some(first) = self.rest.chars().next() else {
            return Ok(String::new());
        };

        if allow_quotes && (first == '\'' || first == '"') {
            let body = &self.rest[1..];
            let end = body
                .find(first)
                .ok_or(CommandError::UnterminatedQuote(first))?;
            self.rest = &body[end + 1..];
            return Ok(body[..end].to_string());
        }

        let mut token = String::new();
        let mut consumed = self.rest.len();
        let mut chars = self.rest.char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                '\\' => {
                    if let Some((_, escaped)) = chars.next() {
                        token.push(escaped);
                    }
                }
                ' ' => {
                    consumed = i + 1;
                    break;
                }
                _ => token.push(c),
            }
        }
        self.rest = &self.rest[consumed..];
        Ok(token)
    }

    fn is_exhausted(&self) -> bool {
        self.rest.trim_matches(' ').is_empty()
    }
}

/// A path token addresses nothing when empty or when its name part is empty.
fn parse_path(token: &str) -> Option<CredentialPath> {
    if token.is_empty() {
        return None;
    }
    Some(CredentialPath::parse(token)).filter(|path| !path.name.is_empty())
}

/// Parse one input line. A blank line yields `Ok(None)`.
pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let mut tokens = Tokenizer::new(line);

    let verb_token = tokens.next_token(false)?;
    if verb_token.is_empty() {
        return Ok(None);
    }
    let verb = Verb::lookup(&verb_token).ok_or(CommandError::UnknownVerb(verb_token))?;

    let path = parse_path(&tokens.next_token(true)?);
    let value = SecretString::from(tokens.next_token(true)?);
    let has_value = !value.expose_secret().is_empty();

    let arity_error = CommandError::Arity(verb.name());
    if !tokens.is_exhausted() {
        return Err(arity_error);
    }

    let command = match (verb.arity(), path, has_value) {
        (Arity::PathValue, Some(path), true) => match verb {
            Verb::Add => Command::Add { path, value },
            _ => return Err(arity_error),
        },
        (Arity::Path, Some(path), false) => match verb {
            Verb::Remove => Command::Remove(path),
            Verb::Get => Command::Get(path),
            Verb::Copy => Command::Copy(path),
            _ => return Err(arity_error),
        },
        (Arity::OptionalPath, path, false) => Command::List(path),
        (Arity::None, None, false) => match verb {
            Verb::Help => Command::Help,
            Verb::Write => Command::Write,
            Verb::Quit => Command::Quit,
            Verb::WriteQuit => Command::WriteQuit,
            _ => return Err(arity_error),
        },
        _ => return Err(arity_error),
    };
    Ok(Some(command))
}

/// Backslash-escape spaces for display on a command line. Existing
/// backslashes are dropped first.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(mut c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next) => c = next,
                None => break,
            }
        }
        if c == ' ' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Remove backslash escapes.
pub fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next()),
            _ => out.push(c),
        }
    }
    out
}
