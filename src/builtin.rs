use crate::command::{self, ExitCode};
use crate::env::Environment;
use crate::error::ShellError;
use crate::session::Session;
use nix::unistd::{AccessFlags, access};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Commands implemented inside the interpreter.
///
/// Builtins run in-process, never go through path resolution, and always set
/// the session's last status: 0 on success, a positive code on failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Exit,
    Cd,
    Help,
    Env,
    Setenv,
    Unsetenv,
    History,
    Alias,
}

impl Builtin {
    pub const ALL: [Builtin; 8] = [
        Builtin::Exit,
        Builtin::Cd,
        Builtin::Help,
        Builtin::Env,
        Builtin::Setenv,
        Builtin::Unsetenv,
        Builtin::History,
        Builtin::Alias,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }

    /// Canonical name of the command, e.g. "exit" or "cd".
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Exit => "exit",
            Builtin::Cd => "cd",
            Builtin::Help => "help",
            Builtin::Env => "env",
            Builtin::Setenv => "setenv",
            Builtin::Unsetenv => "unsetenv",
            Builtin::History => "history",
            Builtin::Alias => "alias",
        }
    }

    pub fn usage(self) -> &'static str {
        match self {
            Builtin::Exit => "exit [n]: exit the shell with status n, or the last status",
            Builtin::Cd => "cd [dir|-|~]: change the working directory (default: $HOME)",
            Builtin::Help => "help [builtin]: show usage of the builtins",
            Builtin::Env => "env: print the environment, one NAME=value per line",
            Builtin::Setenv => "setenv NAME VALUE: set or replace an environment variable",
            Builtin::Unsetenv => "unsetenv NAME...: remove environment variables",
            Builtin::History => "history: list previously entered lines",
            Builtin::Alias => {
                "alias [name[=value ...] ...]: define or print aliases; \
                 words after a definition that are not definitions extend its value"
            }
        }
    }

    fn run(self, args: &[String], session: &mut Session) -> Result<ExitCode, ShellError> {
        match self {
            Builtin::Exit => exit(args, session),
            Builtin::Cd => cd(args, session),
            Builtin::Help => help(args, session),
            Builtin::Env => env(session),
            Builtin::Setenv => setenv(args, session),
            Builtin::Unsetenv => unsetenv(args, session),
            Builtin::History => history(session),
            Builtin::Alias => alias(args, session),
        }
    }
}

/// Run `argv` if it names a builtin.
///
/// Returns `None` when `argv[0]` is not a builtin, leaving the session
/// untouched. Otherwise the returned status has already been stored in
/// `session.last_status` and any error has been reported.
pub fn dispatch(argv: &[String], session: &mut Session) -> Option<ExitCode> {
    let (name, args) = argv.split_first()?;
    let builtin = Builtin::from_name(name)?;
    log::debug!("builtin {} {:?}", name, args);
    let status = match builtin.run(args, session) {
        Ok(status) => {
            session.last_status = status;
            status
        }
        Err(e) => session.fail(name, e),
    };
    Some(status)
}

fn exit(args: &[String], session: &mut Session) -> Result<ExitCode, ShellError> {
    let code = match args.first() {
        None => session.last_status,
        Some(arg) => parse_exit_code(arg)
            .ok_or_else(|| ShellError::Usage(format!("Illegal number: {}", arg)))?,
    };
    session.exit_request = Some(code);
    Ok(code)
}

/// Unsigned decimal with an optional leading `+`, within `i32`.
fn parse_exit_code(arg: &str) -> Option<ExitCode> {
    let digits = arg.strip_prefix('+').unwrap_or(arg);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn cd(args: &[String], session: &mut Session) -> Result<ExitCode, ShellError> {
    let env = &session.env;
    let home = env.get_var("HOME").map(str::to_owned);
    let (target, announce) = match args.first().map(String::as_str) {
        None | Some("~") => (home.or_else(|| env.get_var("PWD").map(str::to_owned)), false),
        Some("-") => match env.get_var("OLDPWD") {
            Some(old) => (Some(old.to_owned()), true),
            None => return Err(ShellError::NoPreviousDirectory),
        },
        Some(dir) => match (dir.strip_prefix("~/"), home) {
            (Some(rest), Some(home)) => (Some(format!("{}/{}", home, rest)), false),
            _ => (Some(dir.to_owned()), false),
        },
    };
    let Some(target) = target else {
        return Ok(command::SUCCESS);
    };

    let new_dir = check_directory(&target, env)?;
    let old_dir = std::mem::replace(&mut session.env.current_dir, new_dir.clone());
    session.env.set_var("OLDPWD", old_dir.to_string_lossy().into_owned());
    session.env.set_var("PWD", new_dir.to_string_lossy().into_owned());
    if announce {
        writeln!(session.streams.out, "{}", new_dir.display())?;
    }
    Ok(command::SUCCESS)
}

/// Canonical form of `target` if it is a directory the user may enter.
fn check_directory(target: &str, env: &Environment) -> Result<PathBuf, ShellError> {
    let path = env.absolutize(Path::new(target));
    let canonical =
        fs::canonicalize(&path).map_err(|_| ShellError::Directory(target.to_owned()))?;
    if !canonical.is_dir() || access(&canonical, AccessFlags::X_OK).is_err() {
        return Err(ShellError::Directory(target.to_owned()));
    }
    Ok(canonical)
}

fn help(args: &[String], session: &mut Session) -> Result<ExitCode, ShellError> {
    let out = &mut session.streams.out;
    match args.first().and_then(|topic| Builtin::from_name(topic)) {
        Some(builtin) => writeln!(out, "{}", builtin.usage())?,
        None => {
            writeln!(out, "Builtin commands:")?;
            for builtin in Builtin::ALL {
                writeln!(out, "  {}", builtin.usage())?;
            }
            writeln!(out, "Commands may be chained with ';', '&&' and '||'.")?;
        }
    }
    Ok(command::SUCCESS)
}

fn env(session: &mut Session) -> Result<ExitCode, ShellError> {
    for entry in session.env.vars.iter() {
        writeln!(session.streams.out, "{}", entry.joined())?;
    }
    Ok(command::SUCCESS)
}

fn setenv(args: &[String], session: &mut Session) -> Result<ExitCode, ShellError> {
    let [name, value] = args else {
        return Err(ShellError::Usage("Incorrect number of arguments".into()));
    };
    if name.is_empty() || name.contains('=') {
        return Err(ShellError::Usage(format!("invalid variable name: {}", name)));
    }
    session.env.set_var(name.as_str(), value.as_str());
    Ok(command::SUCCESS)
}

fn unsetenv(args: &[String], session: &mut Session) -> Result<ExitCode, ShellError> {
    if args.is_empty() {
        return Err(ShellError::Usage("Too few arguments".into()));
    }
    for name in args {
        session.env.unset_var(name);
    }
    Ok(command::SUCCESS)
}

fn history(session: &mut Session) -> Result<ExitCode, ShellError> {
    for entry in session.history.iter() {
        writeln!(session.streams.out, "{}: {}", entry.number, entry.line)?;
    }
    Ok(command::SUCCESS)
}

fn alias(args: &[String], session: &mut Session) -> Result<ExitCode, ShellError> {
    if args.is_empty() {
        for entry in session.aliases.iter() {
            writeln!(session.streams.out, "{}='{}'", entry.key, entry.value)?;
        }
        return Ok(command::SUCCESS);
    }

    let mut status = command::SUCCESS;
    let mut rest = args.iter().peekable();
    while let Some(arg) = rest.next() {
        if let Some((name, value)) = definition(arg) {
            // following words that are not definitions themselves belong to this value
            let mut words = vec![value];
            while let Some(word) = rest.next_if(|w| definition(w).is_none()) {
                words.push(word.as_str());
            }
            let value = words.join(" ");
            let value = strip_quotes(value.trim());
            if value.is_empty() {
                session.aliases.remove(name);
            } else {
                session.aliases.insert(name, value);
            }
        } else if arg.contains('=') {
            session.report("alias", &ShellError::Usage(format!("invalid alias: {}", arg)));
            status = command::USAGE;
        } else {
            match session.aliases.get(arg) {
                Some(value) => writeln!(session.streams.out, "{}='{}'", arg, value)?,
                None => {
                    session.report("alias", &ShellError::Lookup(format!("{} not found", arg)));
                    status = command::FAILURE;
                }
            }
        }
    }
    Ok(status)
}

/// Split `name=value` when `name` is usable as an alias name.
fn definition(word: &str) -> Option<(&str, &str)> {
    let (name, value) = word.split_once('=')?;
    let valid = !name.is_empty()
        && !name.starts_with('-')
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || "_.-!%@,".contains(c));
    valid.then_some((name, value))
}

fn strip_quotes(value: &str) -> &str {
    value
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::History;
    use crate::io_adapters::{Captured, Streams, take_text};

    struct Fixture {
        session: Session,
        out: Captured,
        err: Captured,
    }

    fn fixture(cwd: &Path) -> Fixture {
        let (streams, out, err) = Streams::captured();
        let env = Environment::with_vars(
            [("PATH", "/bin:/usr/bin"), ("HOME", "/")],
            cwd.to_path_buf(),
        );
        Fixture {
            session: Session::new("hsh", env, History::default(), streams),
            out,
            err,
        }
    }

    fn run(f: &mut Fixture, line: &str) -> Option<ExitCode> {
        let argv: Vec<String> = line.split_whitespace().map(str::to_owned).collect();
        dispatch(&argv, &mut f.session)
    }

    #[test]
    fn test_not_a_builtin() {
        let mut f = fixture(Path::new("/"));
        f.session.last_status = 5;
        assert_eq!(run(&mut f, "ls -l"), None);
        assert_eq!(f.session.last_status, 5);
    }

    #[test]
    fn test_exit_with_code() {
        let mut f = fixture(Path::new("/"));
        assert_eq!(run(&mut f, "exit 7"), Some(7));
        assert_eq!(f.session.exit_request, Some(7));
        assert_eq!(f.session.exit_status(), 7);
    }

    #[test]
    fn test_exit_without_code_uses_last_status() {
        let mut f = fixture(Path::new("/"));
        f.session.last_status = 3;
        assert_eq!(run(&mut f, "exit"), Some(3));
        assert_eq!(f.session.exit_request, Some(3));
    }

    #[test]
    fn test_exit_rejects_non_numeric() {
        let mut f = fixture(Path::new("/"));
        f.session.line_count = 4;
        for bad in ["abc", "-1", "1x", "99999999999"] {
            assert_eq!(run(&mut f, &format!("exit {}", bad)), Some(2));
            assert!(!f.session.should_exit());
            assert_eq!(
                take_text(&f.err),
                format!("hsh: 4: exit: Illegal number: {}\n", bad)
            );
        }
        assert_eq!(run(&mut f, "exit +4"), Some(4));
    }

    #[test]
    fn test_cd_updates_pwd_and_oldpwd() {
        let dir = tempfile::tempdir().unwrap();
        let target = fs::canonicalize(dir.path()).unwrap();
        let mut f = fixture(Path::new("/"));

        assert_eq!(run(&mut f, &format!("cd {}", target.display())), Some(0));
        assert_eq!(f.session.env.current_dir, target);
        assert_eq!(f.session.env.get_var("PWD"), Some(target.to_str().unwrap()));
        assert_eq!(f.session.env.get_var("OLDPWD"), Some("/"));

        assert_eq!(run(&mut f, "cd -"), Some(0));
        assert_eq!(f.session.env.current_dir, PathBuf::from("/"));
        assert_eq!(take_text(&f.out), "/\n");
    }

    #[test]
    fn test_cd_relative_and_home() {
        let dir = tempfile::tempdir().unwrap();
        let base = fs::canonicalize(dir.path()).unwrap();
        fs::create_dir(base.join("sub")).unwrap();
        let mut f = fixture(&base);

        assert_eq!(run(&mut f, "cd sub"), Some(0));
        assert_eq!(f.session.env.current_dir, base.join("sub"));

        assert_eq!(run(&mut f, "cd"), Some(0));
        assert_eq!(f.session.env.current_dir, PathBuf::from("/"));
    }

    #[test]
    fn test_cd_nonexistent_keeps_directory() {
        let mut f = fixture(Path::new("/"));
        assert_eq!(run(&mut f, "cd /nonexistent_dir_xyz"), Some(1));
        assert_eq!(f.session.env.current_dir, PathBuf::from("/"));
        assert_eq!(f.session.env.get_var("PWD"), None);
        assert_eq!(take_text(&f.err), "hsh: 0: cd: can't cd to /nonexistent_dir_xyz\n");
    }

    #[test]
    fn test_cd_into_file_fails() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut f = fixture(Path::new("/"));
        assert_eq!(run(&mut f, &format!("cd {}", file.path().display())), Some(1));
        assert_eq!(f.session.env.current_dir, PathBuf::from("/"));
    }

    #[test]
    fn test_cd_dash_without_oldpwd() {
        let mut f = fixture(Path::new("/"));
        assert_eq!(run(&mut f, "cd -"), Some(1));
        assert_eq!(take_text(&f.err), "hsh: 0: cd: OLDPWD not set\n");
    }

    #[test]
    fn test_setenv_env_unsetenv() {
        let mut f = fixture(Path::new("/"));
        assert_eq!(run(&mut f, "setenv FOO bar"), Some(0));
        assert_eq!(run(&mut f, "env"), Some(0));
        let listed = take_text(&f.out);
        assert!(listed.lines().any(|l| l == "FOO=bar"), "{}", listed);
        assert!(listed.starts_with("PATH=/bin:/usr/bin\nHOME=/\n"));

        assert_eq!(run(&mut f, "setenv FOO baz"), Some(0));
        assert_eq!(f.session.env.get_var("FOO"), Some("baz"));

        assert_eq!(run(&mut f, "unsetenv FOO"), Some(0));
        assert_eq!(run(&mut f, "env"), Some(0));
        assert!(!take_text(&f.out).contains("FOO="));

        // removing something absent is fine
        assert_eq!(run(&mut f, "unsetenv FOO"), Some(0));
    }

    #[test]
    fn test_setenv_argument_count() {
        let mut f = fixture(Path::new("/"));
        assert_eq!(run(&mut f, "setenv FOO"), Some(2));
        assert_eq!(run(&mut f, "setenv A B C"), Some(2));
        assert_eq!(run(&mut f, "unsetenv"), Some(2));
        let errors = take_text(&f.err);
        assert_eq!(errors.lines().count(), 3);
        assert!(errors.starts_with("hsh: 0: setenv: Incorrect number of arguments\n"));
    }

    #[test]
    fn test_alias_define_print_and_remove() {
        let mut f = fixture(Path::new("/"));
        assert_eq!(run(&mut f, "alias ll=ls -l"), Some(0));
        assert_eq!(f.session.aliases.get("ll"), Some("ls -l"));

        assert_eq!(run(&mut f, "alias la='ls -a' g=grep"), Some(0));
        assert_eq!(f.session.aliases.get("la"), Some("ls -a"));
        assert_eq!(f.session.aliases.get("g"), Some("grep"));

        assert_eq!(run(&mut f, "alias ll"), Some(0));
        assert_eq!(take_text(&f.out), "ll='ls -l'\n");

        assert_eq!(run(&mut f, "alias"), Some(0));
        assert_eq!(take_text(&f.out), "ll='ls -l'\nla='ls -a'\ng='grep'\n");

        assert_eq!(run(&mut f, "alias g="), Some(0));
        assert_eq!(f.session.aliases.get("g"), None);
    }

    #[test]
    fn test_alias_value_may_contain_options_with_equals() {
        let mut f = fixture(Path::new("/"));
        assert_eq!(run(&mut f, "alias ll=ls --color=auto -l la=ls"), Some(0));
        assert_eq!(f.session.aliases.get("ll"), Some("ls --color=auto -l"));
        assert_eq!(f.session.aliases.get("la"), Some("ls"));
        assert_eq!(f.session.aliases.get("--color"), None);

        assert_eq!(run(&mut f, "alias =ls"), Some(2));
        assert_eq!(take_text(&f.err), "hsh: 0: alias: invalid alias: =ls\n");
        assert_eq!(f.session.aliases.len(), 2);
    }

    #[test]
    fn test_alias_unknown_name() {
        let mut f = fixture(Path::new("/"));
        run(&mut f, "alias ll=ls");
        assert_eq!(run(&mut f, "alias nope ll"), Some(1));
        assert_eq!(take_text(&f.err), "hsh: 0: alias: nope not found\n");
        assert_eq!(take_text(&f.out), "ll='ls'\n");
    }

    #[test]
    fn test_history_lists_numbered_entries() {
        let mut f = fixture(Path::new("/"));
        f.session.history.push("ls");
        f.session.history.push("history");
        assert_eq!(run(&mut f, "history"), Some(0));
        assert_eq!(take_text(&f.out), "0: ls\n1: history\n");
    }

    #[test]
    fn test_help() {
        let mut f = fixture(Path::new("/"));
        assert_eq!(run(&mut f, "help"), Some(0));
        let text = take_text(&f.out);
        for builtin in Builtin::ALL {
            assert!(text.contains(builtin.usage()));
        }
        assert_eq!(run(&mut f, "help cd"), Some(0));
        assert_eq!(take_text(&f.out), format!("{}\n", Builtin::Cd.usage()));
        assert_eq!(run(&mut f, "help bogus"), Some(0));
    }
}
