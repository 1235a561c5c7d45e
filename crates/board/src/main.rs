//! pitwall session board entry point.
//!
//! Runs the session loop: each cycle wires a fresh session, loads the
//! configured resources through the two-tier cache, then waits for a reload
//! request or SIGHUP before starting the next cycle. Logging goes to stderr
//! as JSON.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

mod drivers;
mod invalidate;
mod loader;
mod session;

use drivers::DriverDirectory;
use pitwall_client::ParseConfig;
use pitwall_core::AppConfig;
use session::{ReloadSignal, Session};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let reload = ReloadSignal::new();

    tracing::info!("Starting pitwall session board for {}", config.base_url);

    loop {
        let session = Session::new(&config, reload.clone())?;

        if let Err(e) = session.init_cache().await {
            tracing::warn!("durable cache unavailable for this cycle: {}", e);
        }

        if let Err(e) = run_cycle(&session, &config).await {
            tracing::error!("session cycle failed: {}", e);
        }

        tokio::select! {
            _ = reload.requested() => {
                tracing::info!("reload requested; starting new session cycle");
            }
            _ = hangup() => {
                tracing::info!("SIGHUP received; invalidating caches");
                session.invalidator().trigger();
                reload.requested().await;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                break;
            }
        }
    }

    Ok(())
}

/// Load the driver catalog and every configured resource once.
///
/// A catalog failure aborts the cycle; individual resource failures are
/// logged and skipped so one bad file cannot take down the board.
async fn run_cycle(session: &Session, config: &AppConfig) -> Result<()> {
    let loader = session.loader();
    let parse = ParseConfig::default();

    let catalog = loader.load(&config.driver_info, &parse).await?;
    let directory = DriverDirectory::from_table(&catalog);
    tracing::info!("driver catalog ready with {} entries", directory.len());

    for name in &config.resources {
        match loader.load(name, &parse).await {
            Ok(table) => tracing::info!("loaded {} ({} rows)", name, table.row_count()),
            Err(e) => tracing::error!("failed to load {}: {}", name, e),
        }
    }

    Ok(())
}

/// Resolve when SIGHUP arrives; never resolves on platforms without it.
async fn hangup() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::hangup()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!("failed to install SIGHUP handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    }

    #[cfg(not(unix))]
    std::future::pending::<()>().await;
}
