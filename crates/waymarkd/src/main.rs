//! waymarkd - background GPS track recording service
//!
//! Wires together all the components:
//! - Configuration loading
//! - SQLite archive store and the resume marker
//! - gpsd position source
//! - The recorder state machine
//!
//! Recording is controlled with signals: SIGUSR1 starts a session, SIGUSR2
//! stops it. SIGTERM/SIGINT/SIGHUP shut the daemon down, finalizing any
//! running session on the way out.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal::unix::{SignalKind, signal};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use waymark_config::{Settings, load_config};
use waymark_core::{LogNotifier, Notifier, Recorder};
use waymark_gpsd::GpsdSource;
use waymark_source::PositionSource;
use waymark_store::{ArchiveNamer, ArchiveOpener, SqliteOpener};
use waymark_util::{WAYMARK_DATA_DIR_ENV, default_config_path};

/// waymarkd - GPS track recording service
#[derive(Parser, Debug)]
#[command(name = "waymarkd")]
#[command(about = "Background GPS track recording service", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/waymark/config.toml)
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Data directory override (or set WAYMARK_DATA_DIR env var)
    #[arg(short, long, env = WAYMARK_DATA_DIR_ENV)]
    data_dir: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

/// Main service state
struct Service {
    recorder: Arc<Recorder>,
}

impl Service {
    fn new(args: &Args) -> Result<Self> {
        let settings = if args.config.exists() {
            let settings = load_config(&args.config)
                .with_context(|| format!("Failed to load config from {:?}", args.config))?;
            info!(config_path = %args.config.display(), "Configuration loaded");
            settings
        } else {
            info!(
                config_path = %args.config.display(),
                "No configuration file, using defaults"
            );
            Settings::default()
        };

        let data_dir = args
            .data_dir
            .clone()
            .unwrap_or_else(|| settings.daemon.data_dir.clone());

        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

        let opener: Arc<dyn ArchiveOpener> = Arc::new(SqliteOpener::new(&data_dir));
        let namer = ArchiveNamer::new(&data_dir);
        let source: Arc<dyn PositionSource> =
            Arc::new(GpsdSource::new(&settings.gpsd.host, settings.gpsd.port));
        let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);

        info!(
            data_dir = %data_dir.display(),
            gpsd_host = %settings.gpsd.host,
            gpsd_port = settings.gpsd.port,
            "Store and position source initialized"
        );

        let recorder = Recorder::new(settings.recorder.clone(), opener, namer, source, notifier);

        Ok(Self {
            recorder: Arc::new(recorder),
        })
    }

    async fn run(self) -> Result<()> {
        let mut sigterm =
            signal(SignalKind::terminate()).context("Failed to create SIGTERM handler")?;
        let mut sigint =
            signal(SignalKind::interrupt()).context("Failed to create SIGINT handler")?;
        let mut sighup = signal(SignalKind::hangup()).context("Failed to create SIGHUP handler")?;
        let mut sigusr1 =
            signal(SignalKind::user_defined1()).context("Failed to create SIGUSR1 handler")?;
        let mut sigusr2 =
            signal(SignalKind::user_defined2()).context("Failed to create SIGUSR2 handler")?;

        self.recorder.on_init().await;

        info!("Service running (SIGUSR1 starts recording, SIGUSR2 stops)");

        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully");
                    break;
                }
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully");
                    break;
                }
                _ = sighup.recv() => {
                    info!("Received SIGHUP, shutting down gracefully");
                    break;
                }
                _ = sigusr1.recv() => {
                    info!("Received SIGUSR1");
                    if let Err(e) = self.recorder.start().await {
                        error!(error = %e, "Could not start recording");
                    }
                }
                _ = sigusr2.recv() => {
                    info!("Received SIGUSR2");
                    if let Err(e) = self.recorder.stop().await {
                        error!(error = %e, "Could not stop recording");
                    }
                }
            }
        }

        info!("Shutting down waymarkd");
        self.recorder.on_shutdown().await;
        info!("Shutdown complete");

        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(version = env!("CARGO_PKG_VERSION"), "Starting waymarkd");

    let service = Service::new(&args)?;
    service.run().await
}
