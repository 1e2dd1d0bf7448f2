use crate::command::ExitCode;
use crate::env::Environment;
use crate::error::ShellError;
use crate::history::History;
use crate::io_adapters::Streams;
use crate::store::Store;
use std::io::Write;

/// State owned by one interpreter run and passed to every pipeline stage.
pub struct Session {
    /// Program name used as the prefix of diagnostics.
    pub argv0: String,
    pub env: Environment,
    /// Alias name to replacement text.
    pub aliases: Store,
    pub history: History,
    /// Status of the most recently executed sub-command.
    pub last_status: ExitCode,
    /// Lines read so far.
    pub line_count: usize,
    /// Whether input comes from a terminal.
    pub interactive: bool,
    /// Set by `exit`; the driver stops once this is present.
    pub exit_request: Option<ExitCode>,
    /// Value substituted for `$$`.
    pub pid: u32,
    pub streams: Streams,
}

impl Session {
    pub fn new(
        argv0: impl Into<String>,
        env: Environment,
        history: History,
        streams: Streams,
    ) -> Self {
        Self {
            argv0: argv0.into(),
            env,
            aliases: Store::new(),
            history,
            last_status: 0,
            line_count: 0,
            interactive: false,
            exit_request: None,
            pid: std::process::id(),
            streams,
        }
    }

    pub fn should_exit(&self) -> bool {
        self.exit_request.is_some()
    }

    /// Status the process should terminate with.
    pub fn exit_status(&self) -> ExitCode {
        self.exit_request.unwrap_or(self.last_status)
    }

    /// Write `<argv0>: <line>: <command>: <message>` to the error stream.
    ///
    /// Pending output is flushed first and the diagnostic right after, so
    /// messages keep their place relative to what earlier commands printed.
    pub fn report(&mut self, command: &str, error: &ShellError) {
        let written = self.streams.out.flush().and_then(|()| {
            writeln!(
                self.streams.err,
                "{}: {}: {}: {}",
                self.argv0, self.line_count, command, error
            )?;
            self.streams.err.flush()
        });
        if let Err(e) = written {
            log::warn!("failed to report {}: {}: {}", command, error, e);
        }
    }

    /// Report `error` and record its status.
    pub fn fail(&mut self, command: &str, error: ShellError) -> ExitCode {
        self.report(command, &error);
        self.last_status = error.status();
        self.last_status
    }
}
