use anyhow::Result;
use hsh::config::{Args, CONFIG_FILE, Settings};
use hsh::history::{self, History};
use hsh::interpreter::{EditorReader, LineReader, StreamReader};
use hsh::{Environment, Interpreter, Session, Streams, command, logging};
use std::fs::File;
use std::io::{self, BufReader, IsTerminal};
use std::path::PathBuf;

fn main() {
    let args: Args = argh::from_env();
    let argv0 = std::env::args().next().unwrap_or_else(|| "hsh".to_string());
    match run(&argv0, args) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}: {:#}", argv0, e);
            std::process::exit(command::FAILURE);
        }
    }
}

fn run(argv0: &str, args: Args) -> Result<i32> {
    let env = Environment::from_process();
    let home = env.get_var("HOME").map(PathBuf::from);
    let config_path = args
        .config
        .clone()
        .or_else(|| home.as_ref().map(|h| h.join(CONFIG_FILE)));
    let (settings, problem) = Settings::load(args, config_path.as_deref(), home.as_deref());
    logging::init(settings.log_level, settings.log_file.as_deref())?;
    if let Some(e) = problem {
        log::warn!("ignoring configuration: {:#}", e);
        eprintln!("{}: ignoring configuration: {:#}", argv0, e);
    }

    let saved = match &settings.history_file {
        Some(path) => history::load_history(path).unwrap_or_else(|e| {
            log::warn!("{:#}", e);
            Vec::new()
        }),
        None => Vec::new(),
    };
    log::info!("loaded {} history entries", saved.len());
    let mut session = Session::new(
        argv0,
        env,
        History::from_lines(saved, settings.history_max),
        Streams::standard(),
    );

    let mut reader: Box<dyn LineReader> = match &settings.script {
        Some(script) => match File::open(script) {
            Ok(file) => Box::new(StreamReader::new(BufReader::new(file))),
            Err(e) => {
                log::debug!("{}: {}", script.display(), e);
                eprintln!("{}: 0: Can't open {}", argv0, script.display());
                return Ok(command::NOT_FOUND);
            }
        },
        None if io::stdin().is_terminal() => {
            session.interactive = true;
            Box::new(EditorReader::new(&session.history)?)
        }
        None => Box::new(StreamReader::new(io::stdin().lock())),
    };

    let mut interpreter = Interpreter::new(session).with_prompt(settings.prompt);
    let result = interpreter.run(reader.as_mut());

    if let Some(path) = &settings.history_file {
        let history = &interpreter.session().history;
        match history::save_history(path, history.lines()) {
            Ok(()) => log::info!("saved {} history entries to {}", history.len(), path.display()),
            Err(e) => log::warn!("{:#}", e),
        }
    }
    result
}
