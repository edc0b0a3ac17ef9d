use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "attendance-tracker")]
#[command(version, about = "Attendance event log and time tracking server")]
pub struct Cli {
    /// Override the configured port for this run only
    #[arg(long, global = true)]
    pub port: Option<u16>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server and the reconciliation scheduler (default)
    Serve,
    /// Create a user and print its API token
    AddUser { name: String },
    /// Record a leave day for a user
    AddLeave {
        user_id: i64,
        /// Local date, YYYY-MM-DD
        date: String,
        /// One of sick, holiday, planned, personal, other
        leave_type: String,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Close forgotten sessions once and exit
    Reconcile,
}
