use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::WrapErr;
use jiff::Timestamp;
use tripboard::components::edit_form::FormEnv;
use tripboard::config::{AppConfig, KeybindingsConfig};
use tripboard::controllers::TripController;
use tripboard::worker::PersistenceWorker;
use tripboard::{App, init_logging};
use tripboard_core::backend::ApiBackend;
use tripboard_core::{Backend, FileBackend, MemoryBackend};

#[derive(Parser, Debug)]
#[command(name = "tripboard")]
#[command(about = "A terminal trip planner")]
struct Args {
    /// Path to the data directory (default: ~/.tripboard/)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Base URL of a trip API server, overrides config.yaml
    #[arg(short, long)]
    server: Option<String>,

    /// Run against an in-memory sample trip; nothing is written
    #[arg(long, conflicts_with = "server")]
    demo: bool,
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".tripboard")
}

fn open_backend(args: &Args, config: &AppConfig, data_dir: PathBuf) -> color_eyre::Result<Box<dyn Backend>> {
    if args.demo {
        tracing::info!("Using in-memory sample trip");
        return Ok(Box::new(MemoryBackend::sample()?));
    }
    if let Some(url) = args.server.as_ref().or(config.server_url.as_ref()) {
        tracing::info!(%url, "Using trip API");
        return Ok(Box::new(ApiBackend::new(url, config.authorization.clone())?));
    }

    let backend = FileBackend::new(data_dir);
    if !backend.exists() {
        tracing::info!(root = %backend.root().display(), "Creating data directory with a sample trip");
    }
    backend.init(true)?;
    Ok(Box::new(backend))
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let data_dir = args.data_dir.clone().unwrap_or_else(default_data_dir);

    init_logging(&data_dir, &args.log_level)?;

    let config = AppConfig::load_or_default(&data_dir);
    let keys = KeybindingsConfig::load_or_default(&data_dir);

    let backend = open_backend(&args, &config, data_dir)?;
    let points = backend.load_points().wrap_err("Failed to load trip points")?;
    let catalog = backend.load_catalog().wrap_err("Failed to load destinations and offers")?;
    tracing::info!(points = points.len(), "Trip loaded");

    let env = FormEnv::new(catalog, config.time_zone(), config.shake_duration());
    let worker = PersistenceWorker::new(backend);
    let trip = TripController::new(points, env, Box::new(worker), Timestamp::now());
    let mut app = App::new(trip, keys);

    ratatui::run(|terminal| app.run(terminal))?;

    tracing::info!("Application shutting down");

    if let Err(err) = ratatui::try_restore() {
        tracing::error!("Failed to restore terminal: {err}");
    }

    Ok(())
}
