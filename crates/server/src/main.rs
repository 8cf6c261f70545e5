//! Voice dialogue server entry point

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use voice_dialogue_config::{load_settings, Settings};
use voice_dialogue_server::{create_router, init_metrics, AppState, EngineSet, SessionManager};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Priority: env vars > config/{env}.toml > config/default.toml > defaults
    let env = std::env::var("VOICE_DIALOGUE_ENV").ok();
    let settings = match load_settings(env.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            // tracing not initialized yet
            eprintln!("Warning: failed to load config: {e}. Using defaults.");
            Settings::default()
        },
    };

    init_tracing();
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = env.as_deref().unwrap_or("default"),
        "Starting voice dialogue server"
    );

    let _metrics_handle = init_metrics().context("failed to install metrics recorder")?;
    tracing::info!("Prometheus metrics at /metrics");

    // Dev engine stubs until real model services are wired in
    let state = AppState::new(settings.clone(), EngineSet::dev_stubs());
    spawn_idle_eviction(state.sessions.clone());
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("invalid server address")?;
    tracing::info!(%addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Live calls poll `/state` every turn, so a session this idle is an
/// abandoned browser tab
const SESSION_IDLE_LIMIT: Duration = Duration::from_secs(30 * 60);
const EVICTION_INTERVAL: Duration = Duration::from_secs(60);

fn spawn_idle_eviction(sessions: Arc<SessionManager>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(EVICTION_INTERVAL);
        loop {
            ticker.tick().await;
            let evicted = sessions.evict_idle(SESSION_IDLE_LIMIT);
            if evicted > 0 {
                tracing::info!(evicted, "Idle sessions evicted");
            }
        }
    });
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "voice_dialogue=info,tower_http=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
