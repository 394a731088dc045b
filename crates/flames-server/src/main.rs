mod config;
mod sweeper;

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::Utc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use flames_api::AppStateInner;
use flames_crypto::CredentialHasher;
use flames_db::{Database, NoteStore};

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "flames=debug,flames_api=debug,flames_db=debug,tower_http=debug".into()
            }),
        )
        .init();

    let config = Config::from_env()?;

    // Init database and note store
    let db = Arc::new(Database::open(&config.db_path)?);
    let hasher = CredentialHasher::new(config.hash_cost)?;
    let store = NoteStore::new(db, hasher).with_retention_days(config.retention_days)?;

    // Purge anything that expired while we were down, then keep sweeping
    sweeper::run_once(&store, Utc::now()).await;
    tokio::spawn(sweeper::run_sweep_loop(store.clone(), config.sweep_interval_secs));

    let retention_days = store.retention().num_days();
    let state = AppStateInner::new(store, &config.public_url);

    let app = flames_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Flames server listening on {}", addr);
    info!(
        "Notes expire after {} days; sweeping every {}s; links under {}",
        retention_days, config.sweep_interval_secs, config.public_url
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("SIGTERM handler unavailable ({}), waiting for Ctrl+C", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
