use crate::command::ExitCode;
use crate::error::ShellError;
use crate::history::History;
use crate::session::Session;
use crate::{builtin, expand, external, lexer, parser};
use anyhow::{Context, Result};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{BufRead, Write};
use std::path::Path;

/// Outcome of asking an input source for one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Line(String),
    /// The user pressed Ctrl-C; the partial line is gone.
    Interrupted,
    Eof,
}

/// Source of input lines.
pub trait LineReader {
    fn read_line(&mut self, prompt: &str) -> Result<Input>;
}

/// Interactive terminal input with line editing.
pub struct EditorReader {
    editor: DefaultEditor,
}

impl EditorReader {
    /// Create an editor whose recall list starts with `history`.
    pub fn new(history: &History) -> Result<Self> {
        let mut editor = DefaultEditor::new().context("can't initialise line editor")?;
        for line in history.lines() {
            editor.add_history_entry(line)?;
        }
        Ok(Self { editor })
    }
}

impl LineReader for EditorReader {
    fn read_line(&mut self, prompt: &str) -> Result<Input> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.editor.add_history_entry(line.as_str())?;
                }
                Ok(Input::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(Input::Interrupted),
            Err(ReadlineError::Eof) => Ok(Input::Eof),
            Err(err) => Err(err.into()),
        }
    }
}

/// Non-interactive input from a script or redirected standard input.
pub struct StreamReader<R> {
    reader: R,
}

impl<R: BufRead> StreamReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineReader for StreamReader<R> {
    fn read_line(&mut self, _prompt: &str) -> Result<Input> {
        let mut bytes = Vec::new();
        if self.reader.read_until(b'\n', &mut bytes)? == 0 {
            return Ok(Input::Eof);
        }
        if bytes.ends_with(b"\n") {
            bytes.pop();
            if bytes.ends_with(b"\r") {
                bytes.pop();
            }
        }
        // invalid UTF-8 is replaced rather than ending the session
        Ok(Input::Line(String::from_utf8_lossy(&bytes).into_owned()))
    }
}

/// Run one input line through the whole pipeline.
///
/// Blank and comment-only lines do nothing beyond being counted. Every other
/// line is recorded in history, split into sub-commands, and each sub-command
/// whose chain operator allows it is expanded, tokenized and run. Stops early
/// when `exit` is requested.
pub fn run_line(raw_line: &str, session: &mut Session) {
    session.line_count += 1;
    let segments = parser::split_chain(raw_line);
    if segments.is_empty() {
        return;
    }
    session.history.push(raw_line.trim_end());

    for segment in segments {
        if session.should_exit() {
            break;
        }
        if !segment.op.should_run(session.last_status) {
            log::debug!(
                "skipping {:?} after {} (status {})",
                segment.text,
                segment.op.as_str(),
                session.last_status
            );
            continue;
        }
        run_segment(segment.text, session);
    }

    if let Err(e) = session.streams.flush() {
        log::warn!("failed to flush output: {}", e);
    }
}

fn run_segment(mut text: String, session: &mut Session) {
    expand::expand(&mut text, session);
    let argv = lexer::split_words(&text);
    let Some(name) = argv.first() else {
        return;
    };
    log::debug!("running {:?}", argv);

    if builtin::dispatch(&argv, session).is_some() {
        return;
    }
    match external::resolve(name, &session.env) {
        Some(path) => {
            log::debug!("resolved {} to {}", name, path.display());
            external::execute(&path, &argv, session);
        }
        None => {
            let error = if name.contains('/') && session.env.absolutize(Path::new(name)).exists() {
                ShellError::NotExecutable
            } else {
                ShellError::NotFound
            };
            session.fail(name, error);
        }
    }
}

/// Line-oriented command interpreter driving a [`Session`].
///
/// Example
/// ```no_run
/// use hsh::{Interpreter, Session, Environment, History, Streams};
/// let env = Environment::from_process();
/// let session = Session::new("hsh", env, History::default(), Streams::standard());
/// let mut sh = Interpreter::new(session);
/// assert_eq!(sh.run_line("true && echo hello"), 0);
/// ```
pub struct Interpreter {
    session: Session,
    prompt: String,
}

impl Interpreter {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            prompt: String::from("$ "),
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Run a single line and return the resulting last status.
    pub fn run_line(&mut self, line: &str) -> ExitCode {
        run_line(line, &mut self.session);
        self.session.last_status
    }

    /// Read and run lines until end of input or `exit`.
    ///
    /// Returns the status the process should exit with.
    pub fn run(&mut self, reader: &mut dyn LineReader) -> Result<ExitCode> {
        loop {
            let prompt = if self.session.interactive {
                self.prompt.as_str()
            } else {
                ""
            };
            match reader.read_line(prompt)? {
                Input::Line(line) => {
                    self.run_line(&line);
                    if self.session.should_exit() {
                        break;
                    }
                }
                Input::Interrupted => continue,
                Input::Eof => {
                    if self.session.interactive {
                        writeln!(self.session.streams.out)?;
                    }
                    break;
                }
            }
        }
        self.session.streams.flush()?;
        Ok(self.session.exit_status())
    }
}
