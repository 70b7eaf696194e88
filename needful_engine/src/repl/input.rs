//! Terminal input handling for the control REPL.
//!
//! Wraps rustyline configuration and completion over the control keywords and
//! the names of saved macros, with a plain stdin fallback.

use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use log::{info, warn};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use needful_script::help::VERBS;

/// Outcome of reading a line from the REPL input.
pub enum InputEvent {
    Line(String),
    Eof,
    Interrupted,
}

const CONTROL_KEYWORDS: &[&str] = &[
    "run", "run loop", "pause", "pause loop", "resume", "step", "stop", "stop loop", "status", "list", "help",
    "login", "logout", "exec", "quit",
];

lazy_static! {
    static ref COMMAND_TERMS: Vec<String> = build_command_terms();
}

fn build_command_terms() -> Vec<String> {
    let mut terms: Vec<String> = CONTROL_KEYWORDS.iter().map(|t| (*t).to_string()).collect();
    terms.extend(VERBS.iter().map(|verb| format!("help {}", verb.name)));
    terms.sort_unstable();
    terms.dedup();
    terms
}

type ReplEditor = rustyline::Editor<NeedfulHelper, DefaultHistory>;

#[derive(Default)]
struct NeedfulHelper {
    macro_names: Vec<String>,
}

impl Helper for NeedfulHelper {}

impl Completer for NeedfulHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Self::Candidate>)> {
        let (start, prefix) = current_prefix(line, pos);
        if prefix.is_empty() {
            return Ok((start, Vec::new()));
        }
        let lower = prefix.to_lowercase();
        if let Some((replacement_start, candidates)) = macro_name_completions(&self.macro_names, &prefix, start) {
            return Ok((replacement_start, candidates));
        }
        let pairs = COMMAND_TERMS
            .iter()
            .filter(|term| term.starts_with(&lower))
            .map(|term| Pair {
                display: term.clone(),
                replacement: term.clone(),
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for NeedfulHelper {
    type Hint = String;
}

impl Highlighter for NeedfulHelper {}

impl Validator for NeedfulHelper {}

fn current_prefix(line: &str, pos: usize) -> (usize, String) {
    let slice = &line[..pos];
    let trimmed = slice.trim_start_matches(char::is_whitespace);
    let start = pos - trimmed.len();
    (start, trimmed.to_string())
}

/// Complete the macro name after `run ` or `run loop N `.
fn macro_name_completions(names: &[String], prefix: &str, start: usize) -> Option<(usize, Vec<Pair>)> {
    let lower = prefix.to_ascii_lowercase();
    let after_run = lower.strip_prefix("run ")?;
    let mut offset = lower.len() - after_run.trim_start().len();
    if let Some(after_loop) = lower[offset..].strip_prefix("loop ") {
        let trimmed = after_loop.trim_start();
        let digits = trimmed.chars().take_while(char::is_ascii_digit).count();
        if digits > 0 && trimmed[digits..].starts_with(' ') {
            offset = lower.len() - trimmed[digits..].trim_start().len();
        }
    }
    let partial = &lower[offset..];
    let pairs = names
        .iter()
        .filter(|name| name.to_ascii_lowercase().starts_with(partial))
        .map(|name| Pair {
            display: name.clone(),
            replacement: name.clone(),
        })
        .collect();
    Some((start + offset, pairs))
}

/// Helper responsible for managing the interactive input backend.
///
/// Prefers `rustyline` when an interactive terminal is available, falling back to
/// a basic stdin reader otherwise.
pub struct InputManager {
    backend: Backend,
}

impl InputManager {
    pub fn new(macro_names: Vec<String>) -> Self {
        let backend = if io::stdin().is_terminal() {
            match RustylineInput::new(macro_names) {
                Ok(editor) => {
                    info!("using rustyline-backed REPL input");
                    Backend::Rustyline(editor)
                },
                Err(err) => {
                    warn!("failed to initialize rustyline ({err}), falling back to basic stdin");
                    Backend::plain()
                },
            }
        } else {
            info!("stdin is not a TTY; using basic input mode");
            Backend::plain()
        };

        Self { backend }
    }

    /// Read a line from the current backend. If the interactive backend reports an
    /// unrecoverable error, switch to the plain stdin backend and retry once.
    pub fn read_line(&mut self, prompt: &str) -> io::Result<InputEvent> {
        match self.backend.read_line(prompt) {
            Ok(event) => Ok(event),
            Err(err) => {
                if self.backend.is_rustyline() {
                    warn!("rustyline input failed: {err} -- switching to basic stdin");
                    self.backend = Backend::plain();
                    self.backend.read_line(prompt)
                } else {
                    Err(err)
                }
            },
        }
    }
}

enum Backend {
    Rustyline(RustylineInput),
    Plain(StdinInput),
}

impl Backend {
    fn plain() -> Self {
        Backend::Plain(StdinInput::default())
    }

    fn is_rustyline(&self) -> bool {
        matches!(self, Backend::Rustyline(_))
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<InputEvent> {
        match self {
            Backend::Rustyline(editor) => editor.read_line(prompt),
            Backend::Plain(stdin) => stdin.read_line(prompt),
        }
    }
}

struct RustylineInput {
    editor: ReplEditor,
    history_path: Option<PathBuf>,
}

impl RustylineInput {
    fn new(macro_names: Vec<String>) -> io::Result<Self> {
        let mut editor = rustyline::Editor::<NeedfulHelper, _>::new().map_err(map_io_err)?;
        editor.set_helper(Some(NeedfulHelper { macro_names }));
        let history_path = history_file_path();

        if let Some(path) = history_path.as_ref() {
            if let Some(dir) = path.parent()
                && let Err(err) = fs::create_dir_all(dir)
            {
                warn!("failed to create history directory {}: {err}", dir.display());
            }

            if let Err(err) = editor.load_history(path) {
                match err {
                    ReadlineError::Io(ref io_err) if io_err.kind() == io::ErrorKind::NotFound => {
                        info!("no prior history found at {}, starting fresh", path.display());
                    },
                    other => {
                        warn!("failed to load history from {}: {other}", path.display());
                    },
                }
            }
        }

        Ok(Self { editor, history_path })
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<InputEvent> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    if let Err(err) = self.editor.add_history_entry(line.as_str()) {
                        warn!("failed to append to history: {err}");
                    }
                    if let Some(path) = self.history_path.as_ref()
                        && let Err(err) = self.editor.save_history(path)
                    {
                        warn!("failed to persist history to {}: {err}", path.display());
                    }
                }
                Ok(InputEvent::Line(line))
            },
            Err(err) => convert_readline_error(err),
        }
    }
}

#[derive(Default)]
struct StdinInput {
    buffer: String,
}

impl StdinInput {
    fn read_line(&mut self, prompt: &str) -> io::Result<InputEvent> {
        print!("{prompt}");
        io::stdout().flush()?;

        self.buffer.clear();
        let bytes = io::stdin().read_line(&mut self.buffer)?;
        if bytes == 0 {
            return Ok(InputEvent::Eof);
        }

        if self.buffer.ends_with('\n') {
            self.buffer.pop();
            if self.buffer.ends_with('\r') {
                self.buffer.pop();
            }
        }

        Ok(InputEvent::Line(self.buffer.clone()))
    }
}

fn convert_readline_error(err: ReadlineError) -> io::Result<InputEvent> {
    match err {
        ReadlineError::Interrupted => Ok(InputEvent::Interrupted),
        ReadlineError::Eof => Ok(InputEvent::Eof),
        ReadlineError::Io(io_err) => Err(io_err),
        other => Err(io::Error::other(other)),
    }
}

fn map_io_err(err: ReadlineError) -> io::Error {
    match err {
        ReadlineError::Io(io_err) => io_err,
        other => io::Error::other(other),
    }
}

fn history_file_path() -> Option<PathBuf> {
    dirs::data_dir()
        .or_else(dirs::data_local_dir)
        .map(|base| build_history_path(&base))
}

fn build_history_path(base: &Path) -> PathBuf {
    let mut path = base.to_path_buf();
    path.push("needful");
    path.push("history.txt");
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        vec!["Bronze Ingot".to_string(), "Iron Ingot".to_string(), "Gather".to_string()]
    }

    #[test]
    fn converts_readline_ctrl_c_to_interrupt() {
        let result = convert_readline_error(ReadlineError::Interrupted).unwrap();
        assert!(matches!(result, InputEvent::Interrupted));
    }

    #[test]
    fn history_path_appends_components() {
        let base = PathBuf::from("/tmp/needful-test");
        let path = build_history_path(&base);
        assert!(path.ends_with(Path::new("needful/history.txt")));
    }

    #[test]
    fn command_terms_include_control_and_verb_help() {
        assert!(COMMAND_TERMS.iter().any(|term| term == "pause loop"));
        assert!(COMMAND_TERMS.iter().any(|term| term == "help waitaddon"));
    }

    #[test]
    fn completes_macro_names_after_run() {
        let (start, pairs) = macro_name_completions(&names(), "run br", 0).unwrap();
        assert_eq!(start, 4);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].replacement, "Bronze Ingot");
    }

    #[test]
    fn completes_macro_names_after_a_loop_count() {
        let (start, pairs) = macro_name_completions(&names(), "run loop 3 ir", 0).unwrap();
        assert_eq!(start, 11);
        assert_eq!(pairs[0].replacement, "Iron Ingot");
    }

    #[test]
    fn other_commands_are_not_name_completed() {
        assert!(macro_name_completions(&names(), "pause", 0).is_none());
    }
}
