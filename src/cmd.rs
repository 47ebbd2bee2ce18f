//! Command implementations for the CLI interface.
//!
//! This module contains the subcommands: the interactive assign page, a
//! headless assign that runs the same load and submit workflow, the team and
//! project listings, and shell completions.

use std::io;
use std::sync::Arc;

use clap::Subcommand;
use clap_complete::{generate, Shell};
use tokio::runtime::Runtime;

use crate::api::{ApiError, HttpApi, TaskApi};
use crate::due::due_arg;
use crate::fields::*;
use crate::loader::{load_page, LoadError};
use crate::page::Route;
use crate::project::{find_project, Project};
use crate::session::Session;
use crate::submit::{submit_task, SubmitError, SUCCESS_MESSAGE};
use crate::task::TaskDraft;
use crate::tui::app::PageExit;
use crate::tui::run::run_tui;
use crate::user::display_role;

#[derive(Subcommand)]
pub enum Commands {
    /// Open the interactive assign-task page for a team member.
    Ui {
        /// Id of the team member to assign a task to.
        user_id: String,
    },

    /// Assign a task to a team member without the interactive page.
    Task {
        /// Id of the team member to assign the task to.
        user_id: String,
        /// Short title for the task.
        #[arg(long)]
        title: String,
        /// Project id or name.
        #[arg(long)]
        project: String,
        /// Optional longer description.
        #[arg(long)]
        desc: Option<String>,
        /// Due date: YYYY-MM-DDTHH:MM, YYYY-MM-DD, "today", "tomorrow" or "in Nd".
        #[arg(long, value_parser = due_arg)]
        due: Option<String>,
        /// Initial status: todo | in-progress | done.
        #[arg(long, value_enum, default_value_t = TaskStatus::Todo)]
        status: TaskStatus,
    },

    /// List the members of your team.
    Team,

    /// List the projects tasks can be filed under.
    Projects,

    /// Generate shell completions.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Failures surfaced by a command.
#[derive(Debug, thiserror::Error)]
pub enum CmdError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Submit(#[from] SubmitError),

    #[error("Terminal error: {0}")]
    Io(#[from] io::Error),
}

/// Everything a command needs to reach the backend.
pub struct Context {
    pub api: Arc<HttpApi>,
    pub runtime: Runtime,
}

/// Run the interactive page, then follow wherever it navigated.
pub fn cmd_ui(ctx: &Context, user_id: &str) -> Result<(), CmdError> {
    let session = ctx.runtime.block_on(Session::establish(ctx.api.as_ref()));
    let exit = run_tui(Arc::clone(&ctx.api), session, user_id, ctx.runtime.handle().clone())?;

    match exit {
        PageExit::Navigate(Route::Team) => cmd_team(ctx),
        PageExit::Navigate(Route::Login) => {
            println!("Logged out. Set ASSIGN_API_TOKEN or pass --token to sign in again.");
            Ok(())
        }
        PageExit::Quit => Ok(()),
    }
}

/// Resolve `--project` as an id first, then as a case-insensitive name.
/// Unknown values pass through for the submitter to reject.
fn resolve_project(projects: &[Project], value: &str) -> String {
    if let Some(p) = find_project(projects, value) {
        return p.form_value();
    }
    projects
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(value.trim()))
        .map(Project::form_value)
        .unwrap_or_else(|| value.to_string())
}

/// Load the page for `user_id` and submit one task, printing the outcome.
pub fn cmd_task(ctx: &Context, user_id: &str, title: String, project: String, desc: Option<String>,
                due: Option<String>, status: TaskStatus) -> Result<(), CmdError> {
    let api = ctx.api.as_ref();
    let page = ctx.runtime.block_on(load_page(api, user_id))?;

    let mut draft = TaskDraft::new();
    draft.update(DraftField::Title, title);
    draft.update(DraftField::Description, desc.unwrap_or_default());
    draft.update(DraftField::Project, resolve_project(&page.projects, &project));
    draft.update(DraftField::DueDate, due.unwrap_or_default());
    draft.update(DraftField::Status, status.as_str());

    let task = ctx.runtime.block_on(submit_task(api, &draft, page.target_user.id))?;

    println!("{}", SUCCESS_MESSAGE);
    let project_name = task
        .project
        .and_then(|id| page.projects.iter().find(|p| p.id == id))
        .map(|p| p.name.as_str())
        .unwrap_or("-");
    println!("Task #{} \"{}\" → {} ({})", task.id, task.title, page.target_user.username, project_name);
    if let Some(due) = &task.due_date {
        println!("Due: {}", due);
    }
    Ok(())
}

/// Print the manager's team roster.
pub fn cmd_team(ctx: &Context) -> Result<(), CmdError> {
    let team = ctx.runtime.block_on(ctx.api.get_team())?;
    if team.is_empty() {
        println!("Your team has no members.");
        return Ok(());
    }
    println!("{:<6} {:<20} {:<32} {}", "ID", "Username", "Email", "Role");
    for m in team {
        println!(
            "{:<6} {:<20} {:<32} {}",
            m.id,
            truncate(m.username.as_deref().unwrap_or("-"), 20),
            truncate(m.email.as_deref().unwrap_or("-"), 32),
            display_role(m.role.as_deref().unwrap_or("")),
        );
    }
    Ok(())
}

/// Print the available projects.
pub fn cmd_projects(ctx: &Context) -> Result<(), CmdError> {
    let projects = ctx.runtime.block_on(ctx.api.get_projects())?.ok_or(LoadError::NoProjects)?;
    println!("{:<6} {:<32} {}", "ID", "Project", "Owner");
    for p in projects {
        println!("{:<6} {:<32} {}", p.id, truncate(&p.name, 32), p.owner_username.as_deref().unwrap_or("-"));
    }
    Ok(())
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

/// Shorten `s` to at most `max` characters, marking the cut with `…`.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::project;

    #[test]
    fn test_resolve_project_by_id_or_name() {
        let projects = vec![project(1, "Alpha"), project(2, "Beta")];
        assert_eq!(resolve_project(&projects, "2"), "2");
        assert_eq!(resolve_project(&projects, "beta"), "2");
        assert_eq!(resolve_project(&projects, "Gamma"), "Gamma");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long username", 8), "a very …");
    }
}
