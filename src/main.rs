mod audio;
mod chain;
mod engine_api;
mod middle;
mod params;
mod settings;
mod shared;
mod tui;

use std::fs::File;
use std::path::{Path, PathBuf};
use crossterm::terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use audio::CpalEngine;
use chain::ChainController;
use middle::Middle;
use shared::InputEvent;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

// the terminal belongs to the tui, so logs go to <config dir>/fluentty.log
fn init_logging(config_dir: &Path, verbose: bool) {
    use simplelog::{Config, LevelFilter, WriteLogger};

    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    let _ = std::fs::create_dir_all(config_dir);
    let log_path = config_dir.join("fluentty.log");
    match File::create(&log_path) {
        Ok(file) => {
            if WriteLogger::init(level, Config::default(), file).is_ok() {
                log::info!("fluentty starting (log level: {level:?})");
            }
        }
        Err(e) => eprintln!("fluentty: logging disabled, cannot create {}: {e}", log_path.display()),
    }
}

fn run() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let verbose = args.iter().any(|a| a == "--verbose" || a == "-v");
    let config_dir: PathBuf = args
        .iter()
        .find(|a| !a.starts_with('-'))
        .map(PathBuf::from)
        .unwrap_or_else(settings::default_config_dir);
    init_logging(&config_dir, verbose);

    let stored = settings::load_settings(&config_dir);
    let chain = ChainController::with_settings(CpalEngine::new(), stored);
    let mut middle = Middle::new(chain, audio::list_input_devices());
    middle.start_chain();

    terminal::enable_raw_mode()?;
    let _guard = RawModeGuard; // auto drops when out of scope

    let backend = CrosstermBackend::new(std::io::stdout());
    let mut term = Terminal::new(backend)?;
    term.clear()?;

    let tick_rate = std::time::Duration::from_millis(16); // ~60fps, keeps the meter moving
    let mut tui_state = tui::mode::TuiState::default();

    loop {
        let ds = middle.display_state();
        tui_state.sync(&ds);

        term.draw(|frame| {
            tui::view::render(frame, frame.area(), &ds);
        })?;

        for event in tui::input::poll_input(tick_rate, &tui_state)? {
            if event == InputEvent::Quit {
                // save before quitting
                if let Err(e) = settings::save_settings(&config_dir, middle.chain.settings()) {
                    log::error!(target: "settings", "could not save settings: {e:#}");
                }
                middle.chain.stop();
                term.clear()?;
                return Ok(());
            }
            middle.handle_input(event);
        }
    }
}

struct RawModeGuard;
impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}
