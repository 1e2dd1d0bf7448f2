use crate::store::Store;
use std::env as stdenv;
use std::path::{Path, PathBuf};

/// Mutable, user-level view of the process environment used by the interpreter.
///
/// The environment contains:
/// - `vars`: an ordered copy of the environment variables, passed verbatim to
///   every executed command.
/// - `current_dir`: the working directory for command execution.
///
/// The copy is taken once at startup; changes made through `setenv`, `unsetenv`
/// or `cd` never touch the interpreter's own OS environment.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Variables in definition order (e.g., PATH, HOME).
    pub vars: Store,
    /// The current working directory for command execution.
    pub current_dir: PathBuf,
}

impl Environment {
    /// Capture the current process state into a new `Environment` instance.
    pub fn from_process() -> Self {
        let vars = stdenv::vars().collect();
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        Self { vars, current_dir }
    }

    /// Build an environment from explicit variables, rooted at `current_dir`.
    pub fn with_vars<K, V>(vars: impl IntoIterator<Item = (K, V)>, current_dir: PathBuf) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars.into_iter().collect(),
            current_dir,
        }
    }

    pub fn get_var(&self, key: &str) -> Option<&str> {
        self.vars.get(key)
    }

    /// Set or override a variable.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key, val);
    }

    pub fn unset_var(&mut self, key: &str) -> bool {
        self.vars.remove(key)
    }

    /// Resolve `path` against the logical working directory.
    pub fn absolutize(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.current_dir.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_set_and_get_var() {
        let mut env = Environment::with_vars(Vec::<(String, String)>::new(), PathBuf::from("/"));

        assert_eq!(env.get_var("SOME_RANDOM_ENV_VAR_12345"), None);

        env.set_var("KEY", "VALUE");
        assert_eq!(env.get_var("KEY"), Some("VALUE"));

        assert!(env.unset_var("KEY"));
        assert!(!env.unset_var("KEY"));
        assert_eq!(env.get_var("KEY"), None);
    }

    #[test]
    fn test_env_reads_from_process_env() {
        let env = Environment::from_process();
        assert!(env.get_var("PATH").is_some());
    }

    #[test]
    fn test_absolutize_relative_to_current_dir() {
        let env = Environment::with_vars([("A", "b")], PathBuf::from("/srv"));
        assert_eq!(env.absolutize(Path::new("bin/tool")), PathBuf::from("/srv/bin/tool"));
        assert_eq!(env.absolutize(Path::new("/usr/bin")), PathBuf::from("/usr/bin"));
    }
}
