use clap::Parser;
use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod controller;
mod dataset;
mod domain;
mod inputter;
mod model;
mod notify;
mod progress;
mod search;
mod ui;

use controller::Controller;
use domain::{TSConfig, TSError};
use model::{Model, Status};
use ui::TableUI;

/// Load a csv file and search it for text in all columns.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// CSV file to upload at start-up
    file: Option<PathBuf>,

    /// Milliseconds to wait for terminal events
    #[arg(long, default_value_t = 100)]
    poll_ms: u64,

    /// Milliseconds between two steps of the upload progress bar
    #[arg(long, default_value_t = 100)]
    progress_step_ms: u64,

    /// Milliseconds error messages stay visible
    #[arg(long, default_value_t = 4000)]
    toast_ms: u64,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(e) = init_logging(&args) {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    let res = run(args);
    ratatui::restore();
    match res {
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

// The terminal belongs to the UI, so logs only go to a file.
fn init_logging(args: &Args) -> Result<(), TSError> {
    let Some(path) = &args.log_file else {
        return Ok(());
    };
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .map_err(|e| TSError::InvalidArgument(format!("log level: {e}")))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(ErrorLayer::default())
        .init();
    Ok(())
}

fn run(args: Args) -> Result<(), TSError> {
    info!("Starting tsearch!");

    let cfg = TSConfig::default()
        .event_poll_time(args.poll_ms)
        .progress_step_time(args.progress_step_ms)
        .toast_duration(args.toast_ms);

    let mut terminal = ratatui::init();
    let size = terminal.size()?;
    let mut model = Model::init(&cfg, size.width as usize, size.height as usize);
    if args.file.is_some() {
        model.upload(args.file);
    }

    let ui = TableUI::new();
    let mut controller = Controller::new(&cfg);

    while model.status != Status::QUITTING {
        // Render the current view
        terminal.draw(|f| ui.draw(&model, f))?;

        // Handle events and map to a Message
        let message = controller.handle_event(&model)?;
        model.update(message)?;
    }

    info!("Bye!");
    Ok(())
}
