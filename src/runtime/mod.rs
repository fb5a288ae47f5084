use std::env;
use std::path::PathBuf;
use std::sync::mpsc;

use anyhow::Context;
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::AppEvent;

mod event_loop;
mod logging;
mod settings;
mod startup;

const USAGE: &str = "\
usage: vinyl [--print-config] [PATH ...]

Each PATH is an audio file or a folder; all of them are added as one batch.
Inside the player press `o` to open more, or drop files onto the terminal.";

/// What the command line asked for.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Run(Vec<PathBuf>),
    PrintConfig,
    Help,
    Version,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> anyhow::Result<Command> {
    let mut paths = Vec::new();
    let mut only_paths = false;
    for arg in args {
        if only_paths {
            paths.push(PathBuf::from(arg));
            continue;
        }
        match arg.as_str() {
            "--" => only_paths = true,
            "-h" | "--help" => return Ok(Command::Help),
            "-V" | "--version" => return Ok(Command::Version),
            "--print-config" => return Ok(Command::PrintConfig),
            flag if flag.starts_with('-') && flag.len() > 1 => {
                anyhow::bail!("unknown option {flag}\n\n{USAGE}");
            }
            _ => paths.push(PathBuf::from(arg)),
        }
    }
    Ok(Command::Run(paths))
}

pub fn run() -> anyhow::Result<()> {
    let inputs = match parse_args(env::args().skip(1))? {
        Command::Run(paths) => paths,
        Command::Help => {
            println!("{USAGE}");
            return Ok(());
        }
        Command::Version => {
            println!("vinyl {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Command::PrintConfig => {
            let (settings, _) = settings::load_settings();
            print!("{}", settings.to_toml().context("failed to render config")?);
            return Ok(());
        }
    };

    let (settings, config_notice) = settings::load_settings();
    let log_path = logging::init_logging(&settings.log);
    info!(log = ?log_path, inputs = inputs.len(), "vinyl starting");
    if let Some(notice) = config_notice {
        warn!("{notice}");
    }

    let (events_tx, events_rx) = mpsc::channel::<AppEvent>();
    let player = startup::open_audio(&settings, events_tx.clone())
        .context("cannot start audio output")?;
    let tap = player.tap();
    let mut app = startup::build_app(player, &settings, inputs);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = {
        let mut state = event_loop::EventLoopState::new(&settings, tap);
        event_loop::run(
            &mut terminal,
            &settings,
            &mut app,
            &events_tx,
            &events_rx,
            &mut state,
        )
    };

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    info!("vinyl stopped");
    run_result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn paths_form_one_run() {
        assert_eq!(
            parse_args(args(&["a.mp3", "music/"])).unwrap(),
            Command::Run(vec![PathBuf::from("a.mp3"), PathBuf::from("music/")])
        );
        assert_eq!(parse_args(args(&[])).unwrap(), Command::Run(vec![]));
    }

    #[test]
    fn flags_are_recognised() {
        assert_eq!(
            parse_args(args(&["--print-config"])).unwrap(),
            Command::PrintConfig
        );
        assert_eq!(parse_args(args(&["x", "-h"])).unwrap(), Command::Help);
        assert_eq!(parse_args(args(&["--version"])).unwrap(), Command::Version);
        assert!(parse_args(args(&["--nope"])).is_err());
    }

    #[test]
    fn double_dash_ends_options() {
        assert_eq!(
            parse_args(args(&["--", "-weird.mp3"])).unwrap(),
            Command::Run(vec![PathBuf::from("-weird.mp3")])
        );
    }
}
