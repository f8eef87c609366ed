mod terminal;

use std::{
    fs::OpenOptions,
    sync::{
        mpsc::{self, Receiver},
        Arc, Mutex,
    },
};

use clap::{Parser, ValueEnum};
use metronome_core::{
    render, AppEvent, Flow, LogConfig, MetronomeConfig, MetronomeError, SessionController,
    SessionIds, Styles, ThreadTimer, TickMode,
};
use tracing_subscriber::EnvFilter;

use crate::terminal::Tui;

type Controller = SessionController<ThreadTimer>;

fn main() {
    let cli = Cli::parse();
    let config = MetronomeConfig::default().with_tick_mode(cli.tick_mode.into());

    if let Err(err) = init_tracing(&config.log) {
        eprintln!("{err}");
    }

    let (controller, tui, inbox) = match start(&config) {
        Ok(parts) => parts,
        Err(err) => {
            tracing::error!(%err, "startup failed");
            eprintln!("could not start program: {err}");
            std::process::exit(1);
        }
    };

    let styles = Styles::from_palette(&config.palette);
    if let Err(err) = run(controller, tui, inbox, &styles) {
        tracing::error!(%err, "metronome stopped");
        eprintln!("metronome stopped: {err}");
        std::process::exit(1);
    }
    tracing::info!("bye");
}

fn start(
    config: &MetronomeConfig,
) -> metronome_core::Result<(Controller, Tui, Receiver<AppEvent>)> {
    match config.to_json() {
        Ok(json) => tracing::debug!(config = %json, "effective configuration"),
        Err(err) => tracing::warn!(%err, "could not serialise configuration"),
    }

    let (events, inbox) = mpsc::channel();
    let timer = ThreadTimer::spawn(events.clone())?;
    let controller = SessionController::new(config, Arc::new(SessionIds::new()), timer)?;

    let tui = Tui::setup().map_err(MetronomeError::Startup)?;
    terminal::spawn_input_reader(events).map_err(MetronomeError::Startup)?;
    Ok((controller, tui, inbox))
}

fn run(
    mut controller: Controller,
    mut tui: Tui,
    inbox: Receiver<AppEvent>,
    styles: &Styles,
) -> metronome_core::Result<()> {
    tui.draw(&render(&controller.view(), styles))?;

    for event in inbox {
        match controller.handle(event)? {
            Flow::Redraw => tui.draw(&render(&controller.view(), styles))?,
            Flow::Idle => {}
            Flow::Quit => break,
        }
    }
    Ok(())
}

/// Sends diagnostics to the append-only log file. If the file cannot be
/// opened no subscriber is installed and the program runs without logging.
fn init_tracing(config: &LogConfig) -> metronome_core::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.path)
        .map_err(|source| MetronomeError::LogFileUnavailable {
            path: config.path.clone(),
            source,
        })?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.default_filter)),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Terminal metronome with a flashing beat indicator", long_about = None)]
struct Cli {
    /// How the flash cadence is derived.
    #[arg(long, value_enum, default_value_t = TickModeArg::Fixed)]
    tick_mode: TickModeArg,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum TickModeArg {
    /// Flash at a constant rate; the typed tempo is only displayed.
    Fixed,
    /// Advance one frame per beat at the typed tempo.
    Tempo,
}

impl From<TickModeArg> for TickMode {
    fn from(arg: TickModeArg) -> Self {
        match arg {
            TickModeArg::Fixed => TickMode::FixedRate,
            TickModeArg::Tempo => TickMode::TempoDriven,
        }
    }
}
