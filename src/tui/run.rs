//! TUI entry point and terminal setup.

use std::{io, sync::Arc};

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::CrosstermBackend, Terminal};
use tokio::runtime::Handle;

use crate::api::TaskApi;
use crate::session::Session;
use crate::tui::app::{App, PageExit};

/// Initialise the terminal and run the assign-task page for `user_id`.
/// Returns how the page was left.
pub fn run_tui<A: TaskApi + 'static>(
    api: Arc<A>,
    session: Session,
    user_id: &str,
    runtime: Handle,
) -> io::Result<PageExit> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(api, session, user_id, runtime);
    let result = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}
