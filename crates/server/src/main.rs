// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod config;
mod error;
mod locks;
mod operator;
mod routes;

#[cfg(test)]
mod tests;

use axum::Router;
use clap::Parser;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, OwnedMutexGuard};
use tokio::time::Instant;
use tracing::info;
use vacation_ledger_api::DEFAULT_MAX_CONFLICT_RETRIES;
use vacation_ledger_persistence::SqlitePersistence;

use crate::config::{DEFAULT_LOCK_TIMEOUT_MS, LedgerConfig};
use crate::locks::{EmployeeLocks, LockError, lock_store_until};
use crate::routes::build_router;

/// Vacation Ledger Server - HTTP server for the vacation-cycle ledger
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Address to bind the server to
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,

    /// How long a mutation waits for the employee's lock, in milliseconds
    #[arg(long, default_value_t = DEFAULT_LOCK_TIMEOUT_MS)]
    lock_timeout_ms: u64,

    /// How many times a conflicting mutation is re-applied
    #[arg(long, default_value_t = DEFAULT_MAX_CONFLICT_RETRIES)]
    max_conflict_retries: u32,
}

/// Application state shared across handlers.
///
/// The store sits behind one async mutex; mutations additionally hold the
/// affected employee's lock from [`EmployeeLocks`]. Every wait for either is
/// bounded by the configured lock timeout.
#[derive(Clone)]
pub struct AppState {
    /// The persistence layer.
    pub persistence: Arc<Mutex<SqlitePersistence>>,
    /// Per-employee mutation locks.
    pub locks: Arc<EmployeeLocks>,
    /// Runtime settings.
    pub config: LedgerConfig,
}

impl AppState {
    /// Wraps a store with fresh locks.
    #[must_use]
    pub fn new(persistence: SqlitePersistence, config: LedgerConfig) -> Self {
        Self {
            persistence: Arc::new(Mutex::new(persistence)),
            locks: Arc::new(EmployeeLocks::new()),
            config,
        }
    }

    /// Waits for the store, for reads and request lookups.
    ///
    /// # Errors
    ///
    /// Returns `LockError::StoreBusy` if the store stays held past the lock timeout.
    pub async fn store(&self) -> Result<MutexGuard<'_, SqlitePersistence>, LockError> {
        lock_store_until(&self.persistence, Instant::now() + self.config.lock_timeout).await
    }

    /// Takes the employee's lock and then the store, both within one lock timeout.
    ///
    /// # Errors
    ///
    /// Returns a `LockError` if either is still held when the timeout runs out.
    pub async fn lock_employee(
        &self,
        employee_id: i64,
    ) -> Result<(OwnedMutexGuard<()>, MutexGuard<'_, SqlitePersistence>), LockError> {
        let deadline: Instant = Instant::now() + self.config.lock_timeout;
        let guard: OwnedMutexGuard<()> = self.locks.acquire(employee_id, deadline).await?;
        let persistence: MutexGuard<'_, SqlitePersistence> =
            lock_store_until(&self.persistence, deadline).await?;
        Ok((guard, persistence))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Vacation Ledger Server");

    // Initialize persistence (in-memory or file-based based on CLI argument)
    let persistence: SqlitePersistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        SqlitePersistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        SqlitePersistence::new_in_memory()?
    };

    let config: LedgerConfig = LedgerConfig::new(args.lock_timeout_ms, args.max_conflict_retries);
    info!(
        lock_timeout_ms = args.lock_timeout_ms,
        max_conflict_retries = args.max_conflict_retries,
        "Ledger configuration"
    );

    // Build router
    let app: Router = build_router(AppState::new(persistence, config));

    // Bind to address
    let addr: std::net::SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener: tokio::net::TcpListener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
