use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use swarm_tracker::core::config::Config;
use swarm_tracker::core::routes::build_router;
use swarm_tracker::core::state::AppState;
use swarm_tracker::core::tracing_init::init_tracing;
use swarm_tracker::metrics::Metrics;
use swarm_tracker::storage::MemoryStorage;
use tokio::net::TcpListener;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{debug, error, info, Level};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let config_path = if args.len() > 1 {
        PathBuf::from(&args[1])
    } else {
        PathBuf::from("config.toml")
    };

    let config = Config::from_file(&config_path).context(format!(
        "Failed to load configuration from '{}'. \
        Copy config.example.toml to config.toml and adjust the values.",
        config_path.display()
    ))?;

    init_tracing(&config.logging)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.num_threads)
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    runtime.block_on(async_main(config, config_path))
}

async fn async_main(config: Config, config_path: PathBuf) -> Result<()> {
    info!(
        config_path = %config_path.display(),
        port = config.server.port,
        num_threads = config.server.num_threads,
        log_level = %config.logging.level,
        log_format = %config.logging.format,
        "Tracker starting"
    );

    let port = config.server.port;
    let state = AppState::with_memory_storage(config);

    info!(
        priority = state.policy.priority_name(),
        sampling = state.policy.sampling_name(),
        limit = state.config.peer_handout.limit,
        interval = state.config.peer_handout.interval,
        strict_client_errors = state.config.announce.strict_client_errors,
        "Peer handout policy configured"
    );

    if let Some(memory) = &state.memory {
        spawn_cleanup_task(
            Arc::clone(memory),
            Arc::clone(&state.metrics),
            state.config.storage.cleanup_interval,
            state.config.storage.peer_timeout,
        );

        info!(
            cleanup_interval_seconds = state.config.storage.cleanup_interval,
            peer_timeout_seconds = state.config.storage.peer_timeout,
            "Peer cleanup task started"
        );
    }

    let app = build_router(Arc::new(state)).layer(
        ServiceBuilder::new().layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
        ),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind TCP listener to {}", addr))?;

    info!(address = %addr, "TCP listener bound, serving");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("HTTP server error")?;

    info!("Shutting down gracefully");

    Ok(())
}

/// Periodically drop peers that stopped or went silent
fn spawn_cleanup_task(
    memory: Arc<MemoryStorage>,
    metrics: Arc<Metrics>,
    cleanup_interval: u64,
    peer_timeout: i64,
) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(cleanup_interval));

        loop {
            interval.tick().await;

            debug!("Running peer cleanup");
            let removed = memory.reap(peer_timeout);
            metrics.add_reaped(removed);

            if removed > 0 {
                info!(
                    removed_peers = removed,
                    active_peers = memory.total_peers(),
                    active_swarms = memory.active_swarms(),
                    "Peer cleanup completed"
                );
            } else {
                debug!("Peer cleanup completed, no stale peers found");
            }
        }
    });
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
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
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
