//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, worker spawning, and Axum server lifecycle.

use crate::config::Config;
use crate::domain::send_worker::{run_claim_sweeper, run_send_worker};
use crate::infrastructure::persistence::PgQueueRepository;
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::Result;
use axum::{extract::Request, ServiceExt};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool and migrations
/// - Background send worker draining the command channel
/// - Stale-claim sweeper enforcing the claim lease
/// - Axum HTTP server
///
/// # Errors
///
/// Returns an error if:
/// - Database connection fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations").run(&pool).await?;

    let (send_tx, send_rx) = mpsc::channel(config.send_queue_capacity);

    let pool = Arc::new(pool);
    let state = AppState::new(
        pool.clone(),
        send_tx,
        &config.tracking_base_url,
        config.send_batch_size,
        config.restart_includes_bounced,
    );

    tokio::spawn(run_send_worker(send_rx, state.processor.clone()));
    tracing::info!("Send worker started");

    tokio::spawn(run_claim_sweeper(
        Arc::new(PgQueueRepository::new(pool)),
        Duration::from_secs(config.claim_lease_seconds),
        Duration::from_secs(config.claim_sweep_interval_seconds),
    ));
    tracing::info!(
        lease_seconds = config.claim_lease_seconds,
        "Claim sweeper started"
    );

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Completes on Ctrl-C, letting in-flight requests finish.
///
/// Claimed jobs interrupted by shutdown are released by the lease sweeper
/// on the next run.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl-C handler");
    }
}
