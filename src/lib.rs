//! A small line-oriented command interpreter.
//!
//! Each input line goes through the same pipeline: it is split into chained
//! sub-commands (`;`, `&&`, `||`), each sub-command has its alias and
//! variables expanded, is split into words, and is then either handled by a
//! builtin or resolved on `PATH` and run as a child process. The exit status
//! of every executed sub-command feeds the chain decisions and `$?`.
//!
//! The main entry point is [`Interpreter`], which drives a [`Session`] holding
//! the environment, aliases, history and last status. The modules are public
//! so the individual stages can be used and tested on their own.

pub mod builtin;
pub mod command;
pub mod config;
pub mod env;
pub mod error;
pub mod expand;
pub mod external;
pub mod history;
pub mod interpreter;
pub mod io_adapters;
pub mod lexer;
pub mod logging;
pub mod parser;
pub mod session;
pub mod store;

pub use env::Environment;
pub use error::ShellError;
pub use history::History;
pub use interpreter::Interpreter;
pub use io_adapters::Streams;
pub use session::Session;
