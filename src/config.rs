use crate::history::{HISTORY_FILE, HISTORY_MAX};
use anyhow::{Context, Result};
use argh::FromArgs;
use log::LevelFilter;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration file looked up in `$HOME` when `--config` is not given.
pub const CONFIG_FILE: &str = ".hshrc.toml";

const DEFAULT_PROMPT: &str = "$ ";

#[derive(FromArgs, Debug, Clone, Default)]
/// A small line-oriented command interpreter.
pub struct Args {
    #[argh(positional)]
    /// file to read commands from instead of standard input
    pub script: Option<PathBuf>,

    #[argh(option)]
    /// history file (default: $HOME/.hsh_history)
    pub history_file: Option<PathBuf>,

    #[argh(option)]
    /// maximum number of history entries kept (default: 4096)
    pub history_max: Option<usize>,

    #[argh(option)]
    /// log level: off, error, warn, info, debug or trace (default: off)
    pub log_level: Option<LevelFilter>,

    #[argh(option)]
    /// configuration file (default: $HOME/.hshrc.toml)
    pub config: Option<PathBuf>,
}

// ── File config ──

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Default)]
pub struct HistoryConfig {
    pub file: Option<PathBuf>,
    pub max: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
pub struct LoggingConfig {
    pub level: Option<String>,
    /// Append log records here instead of standard error.
    pub file: Option<PathBuf>,
}

impl Config {
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid configuration")
    }

    /// Load `path`; a missing file gives the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => Self::parse(&text).with_context(|| path.display().to_string()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e).with_context(|| format!("can't read {}", path.display())),
        }
    }
}

// ── Merged settings ──

/// Effective settings: command line over config file over defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub script: Option<PathBuf>,
    pub prompt: String,
    /// `None` when there is no `HOME` to put the default file in.
    pub history_file: Option<PathBuf>,
    pub history_max: usize,
    pub log_level: LevelFilter,
    pub log_file: Option<PathBuf>,
}

impl Settings {
    /// Settings from `args` and the configuration file at `path`.
    ///
    /// A configuration file that cannot be read or holds invalid values is
    /// ignored; the problem is returned alongside defaults-based settings so it
    /// can be logged once logging is up.
    pub fn load(
        args: Args,
        path: Option<&Path>,
        home: Option<&Path>,
    ) -> (Self, Option<anyhow::Error>) {
        let config = match path.map(Config::load).transpose() {
            Ok(config) => config.unwrap_or_default(),
            Err(e) => return (Self::defaults(args, home), Some(e)),
        };
        match Self::resolve(args.clone(), config, home) {
            Ok(settings) => (settings, None),
            Err(e) => (Self::defaults(args, home), Some(e)),
        }
    }

    fn defaults(args: Args, home: Option<&Path>) -> Self {
        let log_level = args.log_level.unwrap_or(LevelFilter::Off);
        Self::merge(args, Config::default(), home, log_level)
    }

    pub fn resolve(args: Args, config: Config, home: Option<&Path>) -> Result<Self> {
        let log_level = match (args.log_level, &config.logging.level) {
            (Some(level), _) => level,
            (None, Some(level)) => level
                .parse::<LevelFilter>()
                .with_context(|| format!("invalid log level {:?}", level))?,
            (None, None) => LevelFilter::Off,
        };
        Ok(Self::merge(args, config, home, log_level))
    }

    fn merge(args: Args, config: Config, home: Option<&Path>, log_level: LevelFilter) -> Self {
        Self {
            script: args.script,
            prompt: config.prompt.unwrap_or_else(|| DEFAULT_PROMPT.to_string()),
            history_file: args
                .history_file
                .or(config.history.file)
                .or_else(|| home.map(|h| h.join(HISTORY_FILE))),
            history_max: args
                .history_max
                .or(config.history.max)
                .unwrap_or(HISTORY_MAX),
            log_level,
            log_file: config.logging.file,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_config() {
        let settings =
            Settings::resolve(Args::default(), Config::default(), Some(Path::new("/home/me")))
                .unwrap();
        assert_eq!(settings.prompt, "$ ");
        assert_eq!(settings.history_file, Some(PathBuf::from("/home/me/.hsh_history")));
        assert_eq!(settings.history_max, 4096);
        assert_eq!(settings.log_level, LevelFilter::Off);
        assert_eq!(settings.log_file, None);
    }

    #[test]
    fn test_no_home_means_no_history_file() {
        let settings = Settings::resolve(Args::default(), Config::default(), None).unwrap();
        assert_eq!(settings.history_file, None);
    }

    #[test]
    fn test_config_file_values() {
        let config = Config::parse(
            r#"
            prompt = "hsh> "

            [history]
            file = "/tmp/h"
            max = 10

            [logging]
            level = "debug"
            file = "/tmp/hsh.log"
            "#,
        )
        .unwrap();
        let settings = Settings::resolve(Args::default(), config, None).unwrap();
        assert_eq!(settings.prompt, "hsh> ");
        assert_eq!(settings.history_file, Some(PathBuf::from("/tmp/h")));
        assert_eq!(settings.history_max, 10);
        assert_eq!(settings.log_level, LevelFilter::Debug);
        assert_eq!(settings.log_file, Some(PathBuf::from("/tmp/hsh.log")));
    }

    #[test]
    fn test_command_line_overrides_config() {
        let config = Config::parse("[history]\nmax = 10\n[logging]\nlevel = \"debug\"\n").unwrap();
        let args = Args::from_args(
            &["hsh"],
            &["--history-max", "3", "--log-level", "warn", "script.sh"],
        )
        .unwrap_or_else(|e| panic!("{}", e.output));
        let settings = Settings::resolve(args, config, None).unwrap();
        assert_eq!(settings.history_max, 3);
        assert_eq!(settings.log_level, LevelFilter::Warn);
        assert_eq!(settings.script, Some(PathBuf::from("script.sh")));
    }

    #[test]
    fn test_invalid_config() {
        assert!(Config::parse("prompt = [").is_err());
        let config = Config::parse("[logging]\nlevel = \"loud\"\n").unwrap();
        assert!(Settings::resolve(Args::default(), config, None).is_err());
    }

    #[test]
    fn test_broken_config_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "prompt = [").unwrap();
        let args = Args {
            history_max: Some(5),
            ..Args::default()
        };

        let (settings, problem) = Settings::load(args, Some(path.as_path()), Some(dir.path()));
        assert!(problem.is_some());
        assert_eq!(settings.prompt, "$ ");
        assert_eq!(settings.history_max, 5);
        assert_eq!(settings.history_file, Some(dir.path().join(".hsh_history")));
    }

    #[test]
    fn test_bad_log_level_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "prompt = \"> \"\n[logging]\nlevel = \"loud\"\n").unwrap();

        let (settings, problem) = Settings::load(Args::default(), Some(path.as_path()), None);
        let problem = problem.expect("invalid level is reported");
        assert!(format!("{:#}", problem).contains("loud"));
        assert_eq!(settings.log_level, LevelFilter::Off);
        assert_eq!(settings.prompt, "$ ");
    }

    #[test]
    fn test_load_reads_valid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "prompt = \"> \"\n").unwrap();

        let (settings, problem) = Settings::load(Args::default(), Some(path.as_path()), None);
        assert!(problem.is_none());
        assert_eq!(settings.prompt, "> ");
    }

    #[test]
    fn test_missing_config_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert!(config.prompt.is_none());
    }
}
