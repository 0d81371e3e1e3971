mod auth;
mod config;
mod db;
mod handlers;
mod models;
mod provisioning;
mod router;
mod utils;

use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use auth::SessionStore;
use config::Config;
use db::Store;

/// Application state shared across handlers
pub struct AppState {
    pub store: Store,
    pub sessions: Arc<dyn SessionStore>,
    pub config: Config,
}

impl AppState {
    /// State backed by a single store, which also keeps the sessions
    pub fn new(store: Store, config: Config) -> Self {
        Self {
            sessions: Arc::new(store.clone()),
            store,
            config,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "netnova=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let cfg = Config::load();
    tracing::info!("Starting {} ({})", cfg.app_name, cfg.environment);
    tracing::info!("Database: {}", cfg.db_path);
    tracing::info!("Listen: {}", cfg.listen_addr);

    // Initialize database
    let store = Store::with_pool_size(&cfg.db_path, cfg.db_max_connections).await?;
    tracing::info!("Database initialized (pool_size={})", cfg.db_max_connections);

    store
        .bootstrap_admin(&cfg.admin_password, cfg.bcrypt_cost)
        .await?;

    // Drop expired sessions once an hour
    {
        let store_cleanup = store.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(3600));
            loop {
                interval.tick().await;
                match store_cleanup.purge_expired_sessions().await {
                    Ok(count) if count > 0 => {
                        tracing::info!("Purged {} expired sessions", count);
                    }
                    Err(e) => {
                        tracing::warn!("Session cleanup failed: {}", e);
                    }
                    _ => {}
                }
            }
        });
    }

    let listen_addr = cfg.listen_addr.clone();
    let state = Arc::new(AppState::new(store, cfg));

    // Build router
    let app = router::build(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    tracing::info!("NetNova listening on {}", listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("NetNova shutting down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => { sig.recv().await; }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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
}
