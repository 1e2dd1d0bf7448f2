use crate::command::{self, ExitCode};
use crate::env::Environment;
use crate::error::ShellError;
use crate::session::Session;
use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, sigaction};
use nix::unistd::{AccessFlags, access};
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

/// Resolve a command name to an executable file the way a typical shell would.
///
/// Behavior:
/// - Name containing `/`: taken as a path (relative paths are resolved against
///   the working directory) and returned if it is executable.
/// - Otherwise each directory in `PATH` is tried in order and the first
///   executable match wins. An empty `PATH` entry means the working directory.
/// - No `PATH` at all: nothing is found.
/// - Empty name: `None`.
pub fn resolve(name: &str, env: &Environment) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }
    if name.contains('/') {
        let path = env.absolutize(Path::new(name));
        return is_executable(&path).then_some(path);
    }
    let search_paths = env.get_var("PATH")?;
    find_in_path(search_paths, name, env)
}

fn find_in_path(search_paths: &str, cmd: &str, env: &Environment) -> Option<PathBuf> {
    search_paths
        .split(':')
        .map(|dir| {
            if dir.is_empty() {
                env.current_dir.join(cmd)
            } else {
                env.absolutize(Path::new(dir)).join(cmd)
            }
        })
        .find(|candidate| is_executable(candidate))
}

/// A regular file the current user may execute.
pub fn is_executable(path: &Path) -> bool {
    path.is_file() && access(path, AccessFlags::X_OK).is_ok()
}

/// Run `path` with `argv` in a child process and wait for it.
///
/// The child sees `argv[0]` as typed, exactly the session's variables, and the
/// session's working directory. Failures to start the child are reported and
/// turned into status 126; the interpreter itself keeps going.
pub fn execute(path: &Path, argv: &[String], session: &mut Session) -> ExitCode {
    if let Err(e) = session.streams.flush() {
        log::warn!("failed to flush output: {}", e);
    }
    let name = argv.first().map(String::as_str).unwrap_or_default();
    let result = if session.interactive {
        match InterruptGuard::install() {
            Ok(_guard) => spawn_and_wait(path, argv, &session.env),
            Err(e) => {
                log::warn!("failed to install SIGINT handler: {}", e);
                spawn_and_wait(path, argv, &session.env)
            }
        }
    } else {
        spawn_and_wait(path, argv, &session.env)
    };
    match result {
        Ok(status) => {
            log::debug!("{} exited with {}", path.display(), status);
            session.last_status = status;
            status
        }
        Err(e) => session.fail(name, e),
    }
}

fn spawn_and_wait(path: &Path, argv: &[String], env: &Environment) -> Result<ExitCode, ShellError> {
    let mut cmd = std::process::Command::new(path);
    if let Some((arg0, args)) = argv.split_first() {
        cmd.arg0(arg0).args(args);
    }
    let mut child = cmd
        .env_clear()
        .envs(env.vars.iter().map(|e| (e.key.as_str(), e.value.as_str())))
        .current_dir(&env.current_dir)
        .spawn()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => ShellError::NotExecutable,
            _ => ShellError::Spawn(e),
        })?;
    let exit_status = child.wait().map_err(ShellError::Spawn)?;
    Ok(match exit_status.code() {
        Some(x) => x,
        None => terminated_by_signal(exit_status),
    })
}

fn terminated_by_signal(exit_status: ExitStatus) -> ExitCode {
    match exit_status.signal() {
        Some(signal) => command::SIGNAL_BASE + signal,
        None => command::FAILURE,
    }
}

extern "C" fn on_interrupt(_: nix::libc::c_int) {}

/// Keeps SIGINT from killing the interpreter while a foreground child runs.
///
/// A caught signal reverts to its default action across `exec`, so the child
/// still dies on Ctrl-C while the interpreter survives it.
struct InterruptGuard {
    previous: SigAction,
}

impl InterruptGuard {
    fn install() -> nix::Result<Self> {
        let action = SigAction::new(
            SigHandler::Handler(on_interrupt),
            SaFlags::SA_RESTART,
            SigSet::empty(),
        );
        // SAFETY: the handler has an empty body, which is async-signal-safe.
        let previous = unsafe { sigaction(Signal::SIGINT, &action) }?;
        Ok(Self { previous })
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        // SAFETY: restores the disposition returned by the earlier sigaction call.
        let _ = unsafe { sigaction(Signal::SIGINT, &self.previous) };
    }
}
