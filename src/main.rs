/// Command line entry point for the Habit Maker MCP server
///
/// Startup has three steps: open the database, reconcile stored stats and
/// pending reminders against today's date, then serve MCP over stdio.

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use habit_maker_mcp::{HabitMakerServer, ReconcileReport};

#[derive(Parser, Debug)]
#[command(author, version, about = "Habit streaks, points and reminders over MCP", long_about = None)]
struct Args {
    /// SQLite database file [default: <data dir>/habit-maker/habits.db]
    #[arg(long, value_name = "FILE")]
    database: Option<PathBuf>,

    /// Log at info level
    #[arg(short, long)]
    debug: bool,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    /// Reconcile stats, print a summary and exit without serving
    #[arg(long)]
    reconcile_only: bool,
}

impl Args {
    fn log_level(&self) -> &'static str {
        match (self.verbose, self.debug) {
            (true, _) => "debug",
            (false, true) => "info",
            _ => "warn",
        }
    }

    fn database_path(&self) -> PathBuf {
        self.database.clone().unwrap_or_else(default_database_path)
    }
}

/// Platform data directory, then the home directory, then the temp directory
fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("habit-maker"))
        .or_else(|| dirs::home_dir().map(|home| home.join(".habit-maker")))
        .unwrap_or_else(|| std::env::temp_dir().join("habit-maker"))
        .join("habits.db")
}

fn init_logging(level: &str) {
    // RUST_LOG wins over the flags when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("habit_maker_mcp={}", level)));

    // stdout carries the protocol
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn summary(report: &ReconcileReport) -> String {
    format!(
        "{} habit(s): {} recomputed, {} kept from yesterday, {} reminder(s) pending",
        report.habits, report.recomputed, report.kept, report.reminders_scheduled
    )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(args.log_level());

    let db_path = args.database_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    info!("Using database at {}", db_path.display());

    // Reminder timers live on this runtime
    let server = HabitMakerServer::new(db_path).await?;
    let report = server.lifecycle().reconcile_on_startup()?;

    if args.reconcile_only {
        println!("{}", summary(&report));
        return Ok(());
    }

    server.serve().await?;
    info!("Stdin closed, shutting down");
    Ok(())
}
