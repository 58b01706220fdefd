/// Public library interface for the Habit Maker MCP server
///
/// This module exports the main server implementation and public types
/// that can be used by other applications or tests.

use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::mpsc;

// Internal modules
pub mod domain;
pub mod progress;
pub mod reminders;
pub mod storage;
pub mod lifecycle;
mod tools;
mod mcp;

// Re-export public modules and types
pub use domain::*;
pub use storage::{SqliteStorage, StorageError, HabitStorage};
pub use progress::{Clock, FixedClock, SystemClock};
pub use reminders::{FiredReminder, JobScheduler, ReminderError, TokioJobScheduler};
pub use lifecycle::{CheckOutcome, Lifecycle, ReconcileReport};

/// Errors that can occur during server operation
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] storage::StorageError),

    #[error("Domain validation error: {0}")]
    Domain(#[from] domain::DomainError),

    #[error("Reminder error: {0}")]
    Reminder(#[from] reminders::ReminderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Main habit maker server that implements the MCP protocol
///
/// This server keeps habits in a SQLite database, runs reminder timers on
/// the tokio runtime and exposes tools for creating and checking habits.
pub struct HabitMakerServer {
    storage: SqliteStorage,
    scheduler: TokioJobScheduler,
    clock: SystemClock,
    fired: Option<mpsc::UnboundedReceiver<FiredReminder>>,
}

impl HabitMakerServer {
    /// Create a new habit maker server with the specified database path
    ///
    /// This will initialize the SQLite database with the required schema
    /// if it doesn't already exist. Must be called inside a tokio runtime.
    pub async fn new(db_path: PathBuf) -> Result<Self, ServerError> {
        tracing::info!("Initializing Habit Maker server with database: {:?}", db_path);

        let storage = SqliteStorage::new(db_path)?;
        let (scheduler, fired) = TokioJobScheduler::new();

        Ok(Self {
            storage,
            scheduler,
            clock: SystemClock,
            fired: Some(fired),
        })
    }

    /// Serve JSON-RPC over stdin/stdout until stdin closes.
    ///
    /// Fired reminders are pushed to the client as notifications while
    /// serving. Run `lifecycle().reconcile_on_startup()` first so stats and
    /// pending reminders reflect today.
    pub async fn serve(mut self) -> Result<(), ServerError> {
        let fired = self.fired.take().unwrap_or_else(|| {
            // Only reachable if the receiver was already handed out
            let (_, receiver) = mpsc::unbounded_channel();
            receiver
        });

        tracing::info!("Serving MCP over stdio");
        let mut mcp_server = mcp::McpServer::new(self, fired);
        mcp_server.run().await
    }

    /// Collaborators bundled for a lifecycle operation
    pub fn lifecycle(&self) -> Lifecycle<'_, SqliteStorage, TokioJobScheduler, SystemClock> {
        Lifecycle::new(&self.storage, &self.scheduler, &self.clock)
    }

    /// Get a reference to the storage layer (useful for testing)
    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    /// Get a reference to the reminder scheduler (useful for testing)
    pub fn scheduler(&self) -> &TokioJobScheduler {
        &self.scheduler
    }
}
