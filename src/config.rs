//! Command-line and environment configuration.

use crate::application::portal::DispatchSettings;
use crate::infrastructure::gateway::GatewayPolicy;
use crate::telemetry::LogFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(author, version, about = "Student records and tuition payments", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub settings: Settings,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand. Each can also come from the
/// environment.
#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, global = true, env = "GOLLIS_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// JSON file with users, sessions and courses to load at startup.
    #[arg(long, global = true, env = "GOLLIS_SEED")]
    pub seed: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty, env = "GOLLIS_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Delivery attempts per notification before giving up.
    #[arg(long, global = true, default_value_t = 3, env = "GOLLIS_NOTIFY_ATTEMPTS")]
    pub notify_attempts: u32,

    /// Pause between notification attempts, in milliseconds.
    #[arg(long, global = true, default_value_t = 200, env = "GOLLIS_NOTIFY_BACKOFF_MS")]
    pub notify_backoff_ms: u64,

    /// How the payment gateway stubs answer settlement checks.
    #[arg(long, global = true, value_enum, default_value_t = GatewayPolicy::Approve, env = "GOLLIS_GATEWAY")]
    pub gateway: GatewayPolicy,
}

impl Settings {
    pub fn dispatch(&self) -> DispatchSettings {
        DispatchSettings {
            max_attempts: self.notify_attempts,
            backoff: Duration::from_millis(self.notify_backoff_ms),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API.
    Serve(ServeArgs),
    /// Record grades from a CSV file and print the resulting GPAs.
    ImportGrades(ImportArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1", env = "GOLLIS_HOST")]
    pub host: String,

    #[arg(long, default_value_t = 5000, env = "GOLLIS_PORT")]
    pub port: u16,
}

#[derive(Debug, Clone, Args)]
pub struct ImportArgs {
    /// Grades CSV: student_id, course_code, grade, semester, academic_year.
    pub input: PathBuf,

    /// Id of the faculty or admin user recorded as submitter.
    #[arg(long)]
    pub submitted_by: uuid::Uuid,
}
