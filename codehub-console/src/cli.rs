use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use codehub_models::core::Action;

#[derive(Debug, Parser)]
#[command(
    name = "codehub",
    about = "Console and scheduler agent for the Codehub control plane"
)]
pub struct Cli {
    /// Base URL of the control-plane API.
    #[arg(long, global = true, default_value = "http://localhost:9000")]
    pub base_url: String,

    /// Path of the scheduled-task store file.
    #[arg(long, global = true, default_value = "codehub-tasks.json")]
    pub store: PathBuf,

    /// Per-request timeout for control-plane calls, in seconds.
    #[arg(long, global = true, default_value_t = 30)]
    pub api_timeout_seconds: u64,

    /// Log file path.
    #[arg(long, global = true, default_value = "codehub.log")]
    pub log_file: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the containers known to the control plane.
    Containers,
    /// Print container logs for a codebase.
    Logs {
        dir_name: String,
        /// Keep re-fetching until interrupted.
        #[arg(long, default_value_t = false)]
        follow: bool,
        /// Refresh interval when following.
        #[arg(long, default_value_t = 5)]
        interval_seconds: u64,
    },
    /// Run the startup script for a codebase now.
    Exec { dir_name: String },
    /// Start a code-server instance for a codebase now.
    CodeServer { dir_name: String },
    /// Roll a codebase back to a commit and restart it.
    Rollback { dir_name: String, commit_id: String },
    /// Stop the running process for a codebase.
    Stop {
        dir_name: String,
        /// Also stop IDE processes.
        #[arg(long, default_value_t = false)]
        ides: bool,
    },
    /// Upload an artifact (e.g. a container image) to the control plane.
    Upload { file: PathBuf },
    /// Schedule a remote action for later execution.
    Schedule {
        /// Task label shown in listings.
        #[arg(long)]
        name: String,
        /// Target codebase (must be a known container).
        #[arg(long)]
        codebase: String,
        #[arg(long, value_enum)]
        action: ActionArg,
        /// Commit id, required for rollback tasks.
        #[arg(long)]
        commit_id: Option<String>,
        /// When to run: RFC 3339, or local time as YYYY-MM-DDTHH:MM.
        #[arg(long)]
        at: String,
    },
    /// List scheduled tasks.
    Tasks,
    /// Delete a scheduled task.
    Delete {
        id: String,
        /// Skip the confirmation prompt.
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
    /// Run the scheduler agent: restore pending timers and serve them until
    /// interrupted.
    Agent,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ActionArg {
    RunStartupScript,
    StartServer,
    Rollback,
    StopProcess,
}

impl From<ActionArg> for Action {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::RunStartupScript => Action::RunStartupScript,
            ActionArg::StartServer => Action::StartServer,
            ActionArg::Rollback => Action::Rollback,
            ActionArg::StopProcess => Action::StopProcess,
        }
    }
}
