//! Application startup: logging, gateways, shared state and background tasks.

use std::time::Duration;

use tokio::{net::TcpListener, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::server::{
    cache::ProfileCaches,
    config::Config,
    error::Error,
    gateway::{EsiGateway, HttpGateway, RetryPolicy, ZkillGateway},
    model::{app::AppState, esi::ServerStatus},
    router,
    service::profile::{ProfileService, ProfileSettings},
    worker::{BatchPool, BatchPoolConfig},
};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence; otherwise logs at `info`, or `debug` when `DEBUG` is set.
pub fn init_logging(config: &Config) {
    let default_level = if config.debug { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build the ESI and zKillboard gateways from the configuration
pub fn build_gateways(config: &Config) -> Result<(EsiGateway, ZkillGateway), Error> {
    let retry = RetryPolicy::new(config.upstream_max_attempts, config.upstream_backoff());

    let esi = HttpGateway::new(
        config.esi_url.as_str(),
        &config.user_agent,
        config.upstream_timeout(),
        retry,
    )?;
    let zkill = HttpGateway::new(
        config.zkill_url.as_str(),
        &config.user_agent,
        config.upstream_timeout(),
        retry,
    )?;

    Ok((EsiGateway::new(esi), ZkillGateway::new(zkill)))
}

/// Build the shared application state around a fresh set of caches
pub fn build_state(config: &Config, esi: EsiGateway, zkill: ZkillGateway) -> AppState {
    let profiles = ProfileService::new(
        esi,
        zkill,
        ProfileCaches::new(config.cache_ttl()),
        ProfileSettings::from(config),
    );

    AppState {
        pool: BatchPool::new(BatchPoolConfig::from(config), profiles),
    }
}

/// Check that ESI is reachable, logging the number of players online
pub async fn check_esi_connectivity(esi: &EsiGateway) -> Result<ServerStatus, Error> {
    let status = esi.server_status(&CancellationToken::new()).await?;

    tracing::info!(
        "ESI reachable, {} players online (server version {})",
        status.players,
        status.server_version.as_deref().unwrap_or("unknown")
    );

    Ok(status)
}

/// Periodically drop expired cache entries until `shutdown` is cancelled
pub fn start_cache_janitor(
    profiles: ProfileService,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately, nothing has expired yet
        ticker.tick().await;

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let purged = profiles.caches().purge_expired();
                    tracing::debug!("Cache janitor purged {} expired entries", purged);
                }
            }
        }
    })
}

/// Run the server until Ctrl-C or SIGTERM
pub async fn run(config: Config) -> Result<(), Error> {
    let (esi, zkill) = build_gateways(&config)?;
    check_esi_connectivity(&esi).await?;

    let state = build_state(&config, esi, zkill);

    let shutdown = CancellationToken::new();
    let janitor = start_cache_janitor(
        state.pool.profiles().clone(),
        config.cache_cleanup_interval().max(Duration::from_secs(1)),
        shutdown.clone(),
    );

    let app = router::routes().with_state(state);

    let address = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|e| Error::InternalError(format!("Failed to bind {}: {}", address, e)))?;

    tracing::info!("Listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::InternalError(format!("Server error: {}", e)))?;

    shutdown.cancel();
    if let Err(e) = janitor.await {
        tracing::error!("Cache janitor panicked: {:?}", e);
    }

    tracing::info!("Server shut down cleanly");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
