//! Autopilot entry point.

mod cli;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use autopilot_browser::discovery;
use autopilot_host::{
    Coordinator, CoordinatorOptions, FileStore, FocusSignal, LogNotifier, StateStore,
};

use crate::cli::{Cli, Commands};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}

fn open_store(cli: &Cli) -> anyhow::Result<FileStore> {
    match &cli.state_file {
        Some(path) => Ok(FileStore::new(path)),
        None => FileStore::default_location().context("resolving state file location"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let store = open_store(&cli)?;

    match cli.command.unwrap_or(Commands::Status) {
        Commands::Run {
            flavor,
            background,
            poll_interval_ms,
            deny,
            tier,
            ide_program,
        } => {
            let config = cli::build_config(flavor, background, poll_interval_ms, &deny, tier);
            let options = CoordinatorOptions {
                ide_program,
                initial_config: config,
            };

            // The coordinator drives this from per-page focus probes.
            let coordinator = Arc::new(Coordinator::new(
                Arc::new(store),
                Arc::new(LogNotifier),
                options,
                FocusSignal::new(),
            ));

            info!("autopilot starting");
            tokio::select! {
                _ = coordinator.clone().run() => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("interrupt received, shutting down");
                }
            }
            coordinator.shutdown().await;
        }

        Commands::Status => {
            let endpoints = discovery::discover().await?;
            if endpoints.is_empty() {
                println!(
                    "no debugging endpoints on ports {}-{}",
                    discovery::PORT_RANGE.start(),
                    discovery::PORT_RANGE.end()
                );
                println!("launch your IDE with --remote-debugging-port=<port> to enable autopilot");
            }
            for endpoint in &endpoints {
                let pages = discovery::list_pages(endpoint.port).await?;
                let workbenches = pages.iter().filter(|p| p.is_workbench()).count();
                println!(
                    "port {}: {} ({} workbench page(s))",
                    endpoint.port, endpoint.version.browser, workbenches
                );
            }

            let roi = store.load()?.roi;
            println!(
                "this week: {} click(s), {} blocked, {} session(s), ~{} min saved",
                roi.clicks_this_week,
                roi.blocked_this_week,
                roi.sessions_this_week,
                roi.estimated_minutes_saved()
            );
        }
    }

    Ok(())
}
