// SPDX-FileCopyrightText: 2026 pwdman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interactive REPL over an unlocked store.
//!
//! Readline editing with tab completion of credential paths and in-memory
//! history. Lines that add a password never reach the history.

use std::collections::BTreeMap;
use std::io::{self, Write};

use colored::Colorize;
use pwdman_config::model::ShellConfig;
use pwdman_core::{CredentialPath, PwdmanError};
use pwdman_store::{PasswordStore, StoreFile};
use rustyline::completion::Completer;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::{DefaultHistory, History};
use rustyline::validate::Validator;
use rustyline::{CompletionType, Context, Editor, Helper};
use secrecy::ExposeSecret;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::clipboard::Clipboard;
use crate::command::{self, escape, unescape, Command};

const HELP: &str = "
Usage:
    (a)dd     <name>[.<element>] <password> : add/overwrite a stored password
    (c)opy    <name>[.<element>]            : copy a stored password to clipboard
    (g)et     <name>[.<element>]            : show a stored password, or every element of <name>
    (l)ist    [<name>[.<element>]]          : list stored passwords, or the elements of <name>
    (r)emove  <name>[.<element>]            : remove a stored password or one of its elements
    (w)rite                                 : write changes to password file
    wq                                      : write changes and terminate
    (h)elp                                  : show this help
    (q)uit|exit                             : terminate

An omitted element means 'default'. Quote arguments or escape spaces with '\\'.
";

/// What the REPL does after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// The store being edited and where it is saved.
pub struct Session {
    store: PasswordStore,
    file: StoreFile,
    clipboard: Option<Clipboard>,
    /// Set after a quit was refused because of unsaved changes.
    quit_pending: bool,
}

impl Session {
    pub fn new(store: PasswordStore, file: StoreFile, clipboard: Option<Clipboard>) -> Self {
        Self {
            store,
            file,
            clipboard,
            quit_pending: false,
        }
    }

    pub fn store(&self) -> &PasswordStore {
        &self.store
    }

    /// Run one command, writing user-facing output to `out`.
    pub fn execute(&mut self, command: Command, out: &mut impl Write) -> io::Result<Flow> {
        if !matches!(command, Command::Quit) {
            self.quit_pending = false;
        }

        match command {
            Command::Add { path, value } => {
                self.store
                    .put(&path.name, &path.element, value.expose_secret());
            }
            Command::Remove(path) => self.remove(&path, out)?,
            Command::Get(path) => self.get(&path, out)?,
            Command::Copy(path) => self.copy(&path, out)?,
            Command::List(path) => self.list(path.as_ref(), out)?,
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Write => {
                self.write(out)?;
            }
            Command::Quit => {
                if self.store.is_dirty() && !self.quit_pending {
                    self.quit_pending = true;
                    writeln!(
                        out,
                        "{}",
                        "Unsaved changes. Type 'wq' to save and quit, or 'q' again to discard them."
                            .yellow()
                    )?;
                    return Ok(Flow::Continue);
                }
                writeln!(out, "Bye!")?;
                return Ok(Flow::Quit);
            }
            Command::WriteQuit => {
                if self.write(out)? {
                    writeln!(out, "Bye!")?;
                    return Ok(Flow::Quit);
                }
            }
        }
        Ok(Flow::Continue)
    }

    fn remove(&mut self, path: &CredentialPath, out: &mut impl Write) -> io::Result<()> {
        if !self.store.credentials().contains(&path.name) {
            return not_found(out, &path.name);
        }
        if !path.has_element() {
            self.store.remove(&path.name, None);
            return writeln!(out, "{}", format!("'{}' removed", path.name).green());
        }
        if !self.store.remove(&path.name, Some(&path.element)) {
            return not_found(out, path);
        }
        // The credential goes with its last element.
        let removed: &dyn std::fmt::Display = if self.store.credentials().contains(&path.name) {
            path
        } else {
            &path.name
        };
        writeln!(out, "{}", format!("'{removed}' removed").green())
    }

    fn get(&self, path: &CredentialPath, out: &mut impl Write) -> io::Result<()> {
        let Ok(entries) = self.store.entries(&path.name) else {
            return not_found(out, &path.name);
        };
        if path.has_element() {
            return match self.store.get(&path.name, Some(&path.element)) {
                Ok(value) => writeln!(out, "{}: {value}", path.to_string().bold()),
                Err(_) => not_found(out, path),
            };
        }

        writeln!(out, "{}: {{", path.name.bold())?;
        for (element, value) in entries {
            writeln!(out, "    {element}: {value}")?;
        }
        writeln!(out, "}}")
    }

    fn copy(&self, path: &CredentialPath, out: &mut impl Write) -> io::Result<()> {
        let resolved = CredentialPath::new(path.name.clone(), path.element_or_default());
        let Ok(value) = self.store.get(&resolved.name, Some(&resolved.element)) else {
            return not_found(out, &resolved);
        };

        let result = match &self.clipboard {
            Some(clipboard) => clipboard.copy(value),
            None => Err(PwdmanError::Config(
                "no clipboard tool found; set clipboard.command".to_string(),
            )),
        };
        match result {
            Ok(()) => writeln!(
                out,
                "{}",
                format!("Password '{resolved}' copied to clipboard").green()
            ),
            Err(e) => {
                warn!(error = %e, "clipboard copy failed");
                writeln!(
                    out,
                    "{}",
                    "An error occurred while copying data to clipboard".red()
                )
            }
        }
    }

    fn list(&self, path: Option<&CredentialPath>, out: &mut impl Write) -> io::Result<()> {
        let Some(path) = path else {
            let names = self.store.list(None).unwrap_or_default();
            if names.is_empty() {
                return writeln!(out, "{}", "<Empty>".dimmed());
            }
            for name in names {
                writeln!(out, "{name}")?;
            }
            return Ok(());
        };

        let Ok(elements) = self.store.list(Some(&path.name)) else {
            return not_found(out, &path.name);
        };
        if path.has_element() {
            return if elements.contains(&path.element.as_str()) {
                writeln!(out, "{path}")
            } else {
                not_found(out, path)
            };
        }
        for element in elements {
            writeln!(out, "{element}")?;
        }
        Ok(())
    }

    /// Save the store; reports the outcome and returns whether it worked.
    fn write(&mut self, out: &mut impl Write) -> io::Result<bool> {
        match self.store.write_to(&self.file) {
            Ok(()) => {
                writeln!(
                    out,
                    "{}",
                    format!("Password file '{}' written", self.file.path().display()).green()
                )?;
                Ok(true)
            }
            Err(e) => {
                writeln!(out, "{}: {e}", "error".red())?;
                Ok(false)
            }
        }
    }
}

fn not_found(out: &mut impl Write, path: &dyn std::fmt::Display) -> io::Result<()> {
    writeln!(out, "{}", format!("'{path}' not found").yellow())
}

/// Readline helper completing verbs and credential paths.
struct ShellHelper {
    enabled: bool,
    /// Credential names and their element names, refreshed after every
    /// command. Holds no values.
    index: BTreeMap<String, Vec<String>>,
}

impl ShellHelper {
    fn new(enabled: bool) -> Self {
        Self {
            enabled,
            index: BTreeMap::new(),
        }
    }

    fn refresh(&mut self, store: &PasswordStore) {
        let credentials = store.credentials();
        self.index = credentials
            .names()
            .map(|name| {
                let elements = credentials
                    .elements(name)
                    .unwrap_or_default()
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                (name.to_string(), elements)
            })
            .collect();
    }

    /// Replacement start and candidates for the word under the cursor.
    fn candidates(&self, line: &str, pos: usize) -> (usize, Vec<String>) {
        let head = &line[..pos];
        let start = word_start(head);
        let word = &head[start..];

        match head[..start].split_whitespace().count() {
            0 => {
                let verbs = command::verb_names()
                    .filter(|verb| verb.starts_with(&word.to_ascii_lowercase()))
                    .map(str::to_string)
                    .collect();
                (start, verbs)
            }
            1 => (start, self.path_candidates(word)),
            _ => (start, Vec::new()),
        }
    }

    fn path_candidates(&self, word: &str) -> Vec<String> {
        let (quote, typed) = match word.chars().next() {
            Some(q @ ('\'' | '"')) => (Some(q), word[1..].to_string()),
            _ => (None, unescape(word)),
        };
        let render = |s: &str| match quote {
            Some(q) => format!("{q}{s}"),
            None => escape(s),
        };

        let mut out: Vec<String> = self
            .index
            .keys()
            .filter(|name| name.starts_with(&typed))
            .map(|name| render(name))
            .collect();

        if let Some((name, prefix)) = typed.rsplit_once('.')
            && let Some(elements) = self.index.get(name)
        {
            out.extend(
                elements
                    .iter()
                    .filter(|element| element.starts_with(prefix))
                    .map(|element| render(&format!("{name}.{element}"))),
            );
        }
        out
    }
}

/// Byte offset just past the last unescaped space.
fn word_start(head: &str) -> usize {
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in head.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            ' ' => start = i + 1,
            _ => {}
        }
    }
    start
}

impl Completer for ShellHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        if !self.enabled {
            return Ok((pos, Vec::new()));
        }
        Ok(self.candidates(line, pos))
    }
}

impl Hinter for ShellHelper {
    type Hint = String;
}

impl Highlighter for ShellHelper {}

impl Validator for ShellHelper {}

impl Helper for ShellHelper {}

fn readline_error(e: ReadlineError) -> PwdmanError {
    PwdmanError::Internal(format!("failed to initialize readline: {e}"))
}

/// Run the REPL until the user quits.
pub fn run(mut session: Session, config: &ShellConfig) -> Result<(), PwdmanError> {
    let rl_config = rustyline::Config::builder()
        .max_history_size(config.history_size)
        .map_err(readline_error)?
        .auto_add_history(false)
        .completion_type(CompletionType::List)
        .build();
    let mut rl: Editor<ShellHelper, DefaultHistory> =
        Editor::with_config(rl_config).map_err(readline_error)?;

    let mut helper = ShellHelper::new(config.completion);
    helper.refresh(session.store());
    rl.set_helper(Some(helper));

    let mut stdout = io::stdout();
    loop {
        let line = match rl.readline(&config.prompt) {
            Ok(line) => Zeroizing::new(line),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                if session.store().is_dirty() {
                    println!("{}", "Unsaved changes discarded.".yellow());
                }
                break;
            }
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        };

        let command = match command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{}", e.to_string().red());
                continue;
            }
        };

        record_history(rl.history_mut(), &command, line.as_str());

        let flow = session.execute(command, &mut stdout)?;
        stdout.flush()?;
        if let Some(helper) = rl.helper_mut() {
            helper.refresh(session.store());
        }
        if flow == Flow::Quit {
            break;
        }
    }

    debug!("shell exited");
    Ok(())
}

/// Add `line` to the history unless the command carries a secret.
fn record_history(history: &mut impl History, command: &Command, line: &str) {
    if !command.records_history() {
        return;
    }
    if let Err(e) = history.add(line) {
        warn!(error = %e, "failed to record history entry");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    struct Fixture {
        dir: tempfile::TempDir,
        session: Session,
    }

    impl Fixture {
        fn new() -> Self {
            colored::control::set_override(false);
            let dir = tempfile::tempdir().unwrap();
            let file = StoreFile::new(dir.path().join(".pwdman"));
            let store = PasswordStore::new(SecretString::from("pw".to_string()));
            Self {
                dir,
                session: Session::new(store, file, None),
            }
        }

        fn run(&mut self, line: &str) -> (Flow, String) {
            let command = command::parse(line).unwrap().unwrap();
            let mut out = Vec::new();
            let flow = self.session.execute(command, &mut out).unwrap();
            (flow, String::from_utf8(out).unwrap())
        }

        fn output(&mut self, line: &str) -> String {
            self.run(line).1
        }
    }

    #[test]
    fn history_skips_add_lines() {
        let mut history = DefaultHistory::new();
        for line in ["add mail.user me", "get mail.user", "a bank.pin 1234", "list"] {
            let command = command::parse(line).unwrap().unwrap();
            record_history(&mut history, &command, line);
        }

        let recorded: Vec<&str> = history.iter().map(String::as_str).collect();
        assert_eq!(recorded, ["get mail.user", "list"]);
    }

    #[test]
    fn add_is_silent_and_get_shows_value() {
        let mut fx = Fixture::new();
        assert_eq!(fx.output("add mail.user me"), "");
        assert_eq!(fx.output("get mail.user"), "mail.user: me\n");
    }

    #[test]
    fn get_name_shows_all_elements_default_first() {
        let mut fx = Fixture::new();
        fx.output("add mail.user me");
        fx.output("add mail pw");
        assert_eq!(
            fx.output("get mail"),
            "mail: {\n    default: pw\n    user: me\n}\n"
        );
    }

    #[test]
    fn get_missing_reports_not_found() {
        let mut fx = Fixture::new();
        assert_eq!(fx.output("get nope"), "'nope' not found\n");
        fx.output("add mail x");
        assert_eq!(fx.output("get mail.user"), "'mail.user' not found\n");
    }

    #[test]
    fn remove_messages() {
        let mut fx = Fixture::new();
        fx.output("add mail.user me");
        fx.output("add mail.pass pw");

        assert_eq!(fx.output("remove mail.user"), "'mail.user' removed\n");
        assert_eq!(fx.output("remove mail.user"), "'mail.user' not found\n");
        assert_eq!(fx.output("remove mail.pass"), "'mail' removed\n");
        assert_eq!(fx.output("remove mail"), "'mail' not found\n");

        fx.output("add bank pin");
        assert_eq!(fx.output("r bank"), "'bank' removed\n");
    }

    #[test]
    fn list_outputs() {
        let mut fx = Fixture::new();
        assert_eq!(fx.output("list"), "<Empty>\n");

        fx.output("add b.user x");
        fx.output("add b y");
        fx.output("add a z");
        assert_eq!(fx.output("list"), "a\nb\n");
        assert_eq!(fx.output("list b"), "default\nuser\n");
        assert_eq!(fx.output("list b.user"), "b.user\n");
        assert_eq!(fx.output("list b.nope"), "'b.nope' not found\n");
        assert_eq!(fx.output("list zz"), "'zz' not found\n");
    }

    #[test]
    fn copy_without_clipboard_reports_error() {
        let mut fx = Fixture::new();
        fx.output("add svc secret");
        assert_eq!(
            fx.output("copy svc"),
            "An error occurred while copying data to clipboard\n"
        );
        assert_eq!(fx.output("copy svc.user"), "'svc.user' not found\n");
    }

    #[cfg(unix)]
    #[test]
    fn copy_resolves_default_element() {
        let mut fx = Fixture::new();
        let target = fx.dir.path().join("clip");
        let script = format!("cat > '{}'", target.display());
        fx.session.clipboard = Some(Clipboard::new("sh", ["-c", script.as_str()]));

        fx.output("add svc secret");
        assert_eq!(
            fx.output("c svc"),
            "Password 'svc.default' copied to clipboard\n"
        );
        assert_eq!(std::fs::read_to_string(target).unwrap(), "secret");
    }

    #[test]
    fn quit_with_unsaved_changes_asks_twice() {
        let mut fx = Fixture::new();
        assert_eq!(fx.run("quit").0, Flow::Quit);

        let mut fx = Fixture::new();
        fx.output("add svc secret");
        let (flow, out) = fx.run("q");
        assert_eq!(flow, Flow::Continue);
        assert!(out.starts_with("Unsaved changes."));

        assert_eq!(fx.run("q"), (Flow::Quit, "Bye!\n".to_string()));
    }

    #[test]
    fn other_command_rearms_quit_warning() {
        let mut fx = Fixture::new();
        fx.output("add svc secret");
        assert_eq!(fx.run("q").0, Flow::Continue);
        fx.output("list");
        assert_eq!(fx.run("q").0, Flow::Continue);
    }

    #[test]
    fn write_quit_saves_store() {
        let mut fx = Fixture::new();
        fx.output("add svc secret");

        let (flow, out) = fx.run("wq");
        assert_eq!(flow, Flow::Quit);
        assert!(out.ends_with("Bye!\n"));
        assert!(!fx.session.store().is_dirty());

        let file = StoreFile::new(fx.dir.path().join(".pwdman"));
        let (store, _) =
            PasswordStore::open(&file, SecretString::from("pw".to_string())).unwrap();
        assert_eq!(store.get("svc", None).unwrap(), "secret");
    }

    #[test]
    fn help_lists_commands() {
        let mut fx = Fixture::new();
        let out = fx.output("help");
        for verb in command::verb_names() {
            assert!(out.contains(verb), "{verb}");
        }
    }

    fn helper() -> ShellHelper {
        let mut store = PasswordStore::new(SecretString::from("pw".to_string()));
        store.put("mail", "user", "x");
        store.put("mail", "", "x");
        store.put("my bank", "pin", "x");
        let mut helper = ShellHelper::new(true);
        helper.refresh(&store);
        helper
    }

    #[test]
    fn completes_verbs() {
        let (start, candidates) = helper().candidates("li", 2);
        assert_eq!(start, 0);
        assert_eq!(candidates, ["list"]);
    }

    #[test]
    fn completes_names_with_escaped_spaces() {
        let (start, candidates) = helper().candidates("get my", 6);
        assert_eq!(start, 4);
        assert_eq!(candidates, [r"my\ bank"]);
    }

    #[test]
    fn completes_elements_after_dot() {
        let line = "get mail.";
        let (start, candidates) = helper().candidates(line, line.len());
        assert_eq!(start, 4);
        assert_eq!(candidates, ["mail.default", "mail.user"]);

        let line = r"g my\ bank.p";
        let (_, candidates) = helper().candidates(line, line.len());
        assert_eq!(candidates, [r"my\ bank.pin"]);
    }

    #[test]
    fn completes_quoted_names() {
        let line = "get 'my";
        let (start, candidates) = helper().candidates(line, line.len());
        assert_eq!(start, 4);
        assert_eq!(candidates, ["'my bank"]);
    }

    #[test]
    fn no_completion_for_value_argument() {
        let line = "add mail.user ma";
        let (_, candidates) = helper().candidates(line, line.len());
        assert!(candidates.is_empty());
    }

    #[test]
    fn index_holds_no_values() {
        let helper = helper();
        assert_eq!(helper.index["mail"], ["default", "user"]);
    }
}
