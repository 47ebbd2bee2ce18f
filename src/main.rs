//! # assign - Team Task Assignment
//!
//! A terminal page for managers to assign a new task to one member of their
//! team, backed by the project-management REST API.
//!
//! ## Key Features
//!
//! - **Assign Page**: Loads the member and the project list, checks the member
//!   is on your team, and submits a task assigned to them
//! - **Headless Mode**: The same load and submit workflow from flags, for scripts
//! - **Team and Project Listings**: Quick lookups of member ids and project ids
//!
//! ## Quick Start
//!
//! ```bash
//! export ASSIGN_API_URL=http://localhost:8000/api
//! export ASSIGN_API_TOKEN=<token>
//!
//! # Open the assign page for member 42
//! assign ui 42
//!
//! # Or assign without the page
//! assign task 42 --title "Fix bug" --project Alpha --due tomorrow
//! ```
//!
//! Logs go to `~/.assign/assign.log` (override with `ASSIGN_LOG_FILE`); set
//! `RUST_LOG=team_assign=debug` for more detail.

use std::fs::{self, File};
use std::path::Path;
use std::process;
use std::sync::{Arc, Mutex};

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod due;
pub mod fields;
pub mod loader;
pub mod page;
pub mod project;
pub mod session;
pub mod submit;
pub mod task;
pub mod user;
pub mod view;
#[cfg(test)]
mod testing;
pub mod tui {
    pub mod colors;
    pub mod app;
    pub mod enums;
    pub mod input;
    pub mod run;
    pub mod task_form;
    pub mod utils;
}

use api::HttpApi;
use cli::Cli;
use cmd::*;
use config::Config;

/// Send tracing output to `path`. The terminal belongs to the page, so
/// nothing is written to stdout or stderr.
fn init_tracing(path: &Path) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = File::options().create(true).append(true).open(path)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "team_assign=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("{}", msg);
    process::exit(1);
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Completions need neither the backend nor a log file.
    if let Commands::Completions { shell } = cli.command {
        cmd_completions(shell);
        return;
    }

    let mut config = Config::from_env().unwrap_or_else(|e| fail(e));
    if let Some(url) = cli.api_url {
        config = config.with_api_url(url).unwrap_or_else(|e| fail(e));
    }
    if let Some(token) = cli.token {
        config.token = Some(token);
    }

    if let Err(e) = init_tracing(&config.log_file) {
        eprintln!("Failed to open log file {}: {}", config.log_file.display(), e);
    }
    tracing::info!(api_url = %config.api_url, "starting");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| fail(format!("Failed to start runtime: {}", e)));
    let api = HttpApi::new(&config).unwrap_or_else(|e| fail(e));
    let ctx = Context { api: Arc::new(api), runtime };

    let result = match cli.command {
        Commands::Ui { user_id } => cmd_ui(&ctx, &user_id),
        Commands::Task { user_id, title, project, desc, due, status } =>
            cmd_task(&ctx, &user_id, title, project, desc, due, status),
        Commands::Team => cmd_team(&ctx),
        Commands::Projects => cmd_projects(&ctx),
        Commands::Completions { .. } => Ok(()),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "command failed");
        fail(e);
    }
}
