use clap::Parser;

use crate::cmd::Commands;

/// Assign tasks to members of your team.
/// Connection settings come from ASSIGN_* environment variables or a .env file.
#[derive(Parser)]
#[command(name = "assign", version, about = "Assign tasks to your team from the terminal")]
pub struct Cli {
    /// Base URL of the API, e.g. http://localhost:8000/api.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Bearer token for the signed-in manager.
    #[arg(long, global = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}
