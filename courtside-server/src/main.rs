use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::BufReader;
use tracing::{info, warn};

use courtside_events::logging::{init_logging, init_logging_from_env, LoggingMode};
use courtside_events::{shutdown_channel, BroadcastHub, Broadcaster, ReadinessTracker};
use courtside_listener::DeviceListener;
use courtside_ticker::seed::seed_scripts;
use courtside_ticker::{CourtScript, TickerService};

pub mod config;
pub mod console;
pub mod feed;

use config::{Args, ServerConfig};
use console::Console;

/// How long the runtime waits for blocking work (the stdin reader) on exit
const RUNTIME_SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

fn main() -> Result<()> {
    let args = Args::parse();

    match &args.log_mode {
        Some(mode) => init_logging(mode.parse::<LoggingMode>()?)?,
        None => init_logging_from_env()?,
    }

    let config = ServerConfig::from_args(&args)?;
    config.print_summary();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    let result = runtime.block_on(run(config));

    // A pending stdin read cannot be cancelled; do not wait on it forever.
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN_GRACE);
    result
}

async fn run(config: ServerConfig) -> Result<()> {
    let hub = Arc::new(BroadcastHub::new(config.hub.clone()));
    let readiness = Arc::new(ReadinessTracker::new());
    let (trigger, shutdown) = shutdown_channel();

    let feed = tokio::spawn(feed::run(
        hub.subscribe(),
        std::io::stdout(),
        shutdown.clone(),
    ));
    readiness.mark_hub_ready();

    let broadcaster: Arc<dyn Broadcaster> = hub.clone();

    let ticker = if config.ticker_enabled {
        let scripts = match &config.script_path {
            Some(path) => CourtScript::load(path)
                .with_context(|| format!("Failed to load court scripts from {}", path.display()))?,
            None => seed_scripts(),
        };
        let service = Arc::new(TickerService::new(
            config.ticker.clone(),
            scripts,
            Arc::clone(&broadcaster),
            Arc::clone(&readiness),
        )?);
        let handle = service.start(shutdown.clone());
        info!(courts = ?service.courts(), "Court ticker running");
        Some((service, handle))
    } else {
        None
    };

    let listener = if config.listener_enabled {
        let listener = Arc::new(DeviceListener::new(
            config.listener.clone(),
            Arc::clone(&broadcaster),
        ));
        let task = tokio::spawn({
            let listener = Arc::clone(&listener);
            let shutdown = shutdown.clone();
            async move { listener.run(shutdown).await }
        });
        Some((listener, task))
    } else {
        None
    };

    let console = Console {
        ticker: ticker.as_ref().map(|(service, _)| Arc::clone(service)),
        listener: listener.as_ref().map(|(listener, _)| Arc::clone(listener)),
        readiness: Arc::clone(&readiness),
    };
    let console_shutdown = shutdown.clone();
    let console_task = tokio::spawn(async move {
        console
            .run(BufReader::new(tokio::io::stdin()), console_shutdown)
            .await
    });

    info!(ready = readiness.is_ready(), "Courtside running, press Ctrl+C to stop");

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C, shutting down");
    }
    info!("Shutdown requested");
    trigger.trigger();

    let ticker_done = async {
        if let Some((_, handle)) = ticker {
            handle.join().await;
        }
    };
    let listener_done = async {
        if let Some((_, task)) = listener {
            if let Err(e) = task.await {
                warn!(error = %e, "Device listener task failed");
            }
        }
    };
    futures::join!(ticker_done, listener_done);

    if let Err(e) = feed.await {
        warn!(error = %e, "Viewer feed task failed");
    }
    // The console may be parked on a blocking stdin read.
    console_task.abort();

    info!("Courtside stopped");
    Ok(())
}
