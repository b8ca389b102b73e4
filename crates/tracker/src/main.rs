//! Gas Tracker - multi-chain fee monitor
//!
//! Main entry point: polls every configured chain and logs a cost report

use std::env;

use tokio::signal;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use gas_feed::{GasTracker, StoreEvent};
use gas_tracker::{config_path, load_config, report};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    init_logging();

    info!("Starting Gas Tracker v{}", env!("CARGO_PKG_VERSION"));

    let path = config_path(env::args().nth(1));
    let config = load_config(&path)?;
    info!(
        "Loaded configuration from {} ({} chains, fetch timeout {:?})",
        path,
        config.chains.len(),
        config.fetch_timeout()
    );

    let tracker = GasTracker::from_config(&config)?;
    let mut events = tracker.subscribe();

    tracker.start();
    info!("Press Ctrl+C to shutdown");

    let mut report_interval = tokio::time::interval(config.report_interval());
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = report_interval.tick() => {
                for line in report::render(&tracker) {
                    info!("{}", line);
                }
            }
            event = events.recv() => match event {
                Ok(StoreEvent::ChainFailed(chain)) => debug!("{} offline", chain),
                Ok(event) => debug!(?event, "Store updated"),
                Err(RecvError::Lagged(skipped)) => warn!("Dropped {} store events", skipped),
                Err(RecvError::Closed) => break,
            },
            _ = &mut shutdown => break,
        }
    }

    tracker.stop().await;
    info!("Shutdown complete");
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    if env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C");
        }
        _ = terminate => {
            info!("Received termination signal");
        }
    }
}
