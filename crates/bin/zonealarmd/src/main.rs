//! # zonealarmd: zone alarm daemon
//!
//! Composition root that wires all adapters together and runs the scheduler.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars) and initialise logging
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct the clock, time-sync and byte store adapters
//! - Construct the scheduler and dispatcher, load the last snapshot
//! - Drive the periodic tick and the stdin console
//! - Build the axum router, bind to a TCP port and serve
//! - Handle graceful shutdown (Ctrl-C)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;
mod console;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::FixedOffset;
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing_subscriber::EnvFilter;

use zonealarm_adapter_clock::{HostTimeSync, SystemClock};
use zonealarm_adapter_http_axum::state::AppState;
use zonealarm_adapter_storage_sqlite_sqlx::byte_store::SqliteByteStore;
use zonealarm_adapter_storage_sqlite_sqlx::pool::Config as StorageConfig;
use zonealarm_app::dispatcher::Dispatcher;
use zonealarm_app::firing_bus::InProcessFiringBus;
use zonealarm_app::ports::{AlarmSink, ByteStore, ClockSource, TimeSync};
use zonealarm_app::scheduler::Scheduler;
use zonealarm_domain::firing::Firing;

use crate::config::Config;

type SharedDispatcher<B, S, C, T> = Arc<Mutex<Dispatcher<B, S, C, T>>>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .with_writer(std::io::stderr)
        .init();

    // Database
    let db = StorageConfig {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await
    .context("failed to open database")?;
    let store = SqliteByteStore::new(db.pool().clone());

    // Clock
    let offset = FixedOffset::east_opt(config.clock.utc_offset_secs)
        .context("utc offset out of range")?;
    let clock = SystemClock::new(offset, config.clock.trust_host_time);
    let time_sync = HostTimeSync::new(offset);

    // Firing bus
    let firing_bus = Arc::new(InProcessFiringBus::new(256));

    // Scheduler
    let mut scheduler = Scheduler::new(store, clock);
    for zone in config.zone_ids() {
        scheduler.register_sink(zone, Arc::clone(&firing_bus));
    }
    scheduler.boot().await;
    let dispatcher = Arc::new(Mutex::new(Dispatcher::new(scheduler, time_sync)));

    // Background tasks
    let mut tasks = vec![
        spawn_ticker(Arc::clone(&dispatcher), config.tick_interval()),
        spawn_firing_log(firing_bus.subscribe()),
    ];
    if config.console.enabled {
        tasks.push(spawn_console(Arc::clone(&dispatcher)));
    }

    // HTTP
    let state = AppState::from_arcs(Arc::clone(&dispatcher), firing_bus);
    let app = zonealarm_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(address = %bind_addr, "zonealarmd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    for task in tasks {
        task.abort();
    }
    flush(&dispatcher).await;

    tracing::info!("zonealarmd stopped");
    Ok(())
}

/// Evaluate every zone once per `period`.
fn spawn_ticker<B, S, C, T>(
    dispatcher: SharedDispatcher<B, S, C, T>,
    period: Duration,
) -> JoinHandle<()>
where
    B: ByteStore + Send + Sync + 'static,
    S: AlarmSink + Send + Sync + 'static,
    C: ClockSource + Send + Sync + 'static,
    T: TimeSync + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            dispatcher.lock().await.scheduler_mut().tick().await;
        }
    })
}

fn spawn_firing_log(mut firings: broadcast::Receiver<Firing>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match firings.recv().await {
                Ok(firing) => tracing::info!(
                    zone = firing.zone.get(),
                    slot = firing.slot.get(),
                    action = %firing.action,
                    at = %firing.at_display(),
                    payload = %firing.payload.to_value(),
                    "firing delivered"
                ),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "firing log lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

fn spawn_console<B, S, C, T>(dispatcher: SharedDispatcher<B, S, C, T>) -> JoinHandle<()>
where
    B: ByteStore + Send + Sync + 'static,
    S: AlarmSink + Send + Sync + 'static,
    C: ClockSource + Send + Sync + 'static,
    T: TimeSync + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        if let Err(err) = console::run(stdin, tokio::io::stdout(), dispatcher).await {
            tracing::warn!(error = %err, "console stopped");
        }
    })
}

/// Retry a save that failed earlier, so nothing is lost on exit.
async fn flush<B, S, C, T>(dispatcher: &SharedDispatcher<B, S, C, T>)
where
    B: ByteStore,
    S: AlarmSink,
    C: ClockSource,
    T: TimeSync,
{
    let mut dispatcher = dispatcher.lock().await;
    let scheduler = dispatcher.scheduler_mut();
    if scheduler.is_dirty() {
        if let Err(err) = scheduler.save_snapshot().await {
            tracing::error!(error = %err, "final snapshot save failed");
        }
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
