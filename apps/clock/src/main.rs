use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use calendar::HebrewCalendar;
use clap::Parser;
use clock_core::{
    config::DEFAULT_CONFIG_PATH, load_settings, ClockService, DisplayModel, NotificationSink,
    RenderSink, SystemTimeSource,
};
use shared::protocol::ClockNotification;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Args {
    /// TOML settings file. A missing file means defaults.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Print one display line, waiting for the Hebrew date, then exit.
    #[arg(long)]
    once: bool,
    /// Tracing filter directives; falls back to RUST_LOG, then `info`.
    #[arg(long)]
    log_filter: Option<String>,
}

struct StdoutDisplay;

impl RenderSink for StdoutDisplay {
    fn present(&mut self, model: &DisplayModel) {
        println!("{model}");
    }
}

struct JsonNotifier;

impl NotificationSink for JsonNotifier {
    fn notify(&mut self, notification: ClockNotification) {
        match serde_json::to_string(&notification) {
            Ok(line) => println!("{line}"),
            Err(err) => error!("failed to encode notification: {err}"),
        }
    }
}

fn init_tracing(filter: Option<&str>) {
    let filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_filter.as_deref());

    let settings = load_settings(&args.config)?;
    let service = ClockService::new(
        &settings,
        Arc::new(SystemTimeSource),
        Arc::new(HebrewCalendar),
    )
    .context("invalid clock settings")?;

    if args.once {
        println!("{}", service.snapshot().await);
        return Ok(());
    }

    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("shutdown requested"),
            Err(err) => {
                error!("failed to listen for ctrl-c: {err}");
                std::future::pending::<()>().await;
            }
        }
    };
    service
        .run(&mut StdoutDisplay, &mut JsonNotifier, shutdown)
        .await?;
    Ok(())
}
