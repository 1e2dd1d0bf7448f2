//! Exit status conventions.

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells.
pub type ExitCode = i32;

pub const SUCCESS: ExitCode = 0;

/// Generic failure of a builtin, e.g. `cd` into a missing directory.
pub const FAILURE: ExitCode = 1;

/// Malformed builtin arguments.
pub const USAGE: ExitCode = 2;

/// The command was found but could not be executed.
pub const NOT_EXECUTABLE: ExitCode = 126;

/// The command was not found.
pub const NOT_FOUND: ExitCode = 127;

/// Added to the signal number when a child is killed by a signal.
pub const SIGNAL_BASE: ExitCode = 128;
