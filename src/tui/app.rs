//! Main application logic for the terminal user interface.
//!
//! This module contains the `App` struct which drives the assign-task page:
//! it owns the page state and the form widget, spawns loads and submits on
//! the async runtime, applies their results as they arrive, handles key
//! presses and renders whichever view the page is in.

use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::runtime::Handle;
use tracing::debug;

use crate::{
    api::TaskApi,
    loader::{load_page, LoadError, LoadedPage},
    page::{AssignTaskPage, LoadTicket, Route},
    session::Session,
    submit::{send_request, SubmitError},
    task::{CreatedTask, TaskCreateRequest},
    user::{display_role, UserRecord},
    view::{current_view, View},
    tui::{
        colors::{DANGER, MUTED, PRIMARY, SUCCESS},
        enums::{FormAction, Overlay},
        input::InputField,
        task_form::{
            AssignForm, CANCEL_GLOBAL_ORDER, DESCRIPTION_GLOBAL_ORDER, DUE_GLOBAL_ORDER,
            PROJECT_SELECTOR_GLOBAL_ORDER, STATUS_GLOBAL_ORDER, SUBMIT_GLOBAL_ORDER, TITLE_GLOBAL_ORDER,
        },
        utils::centered_rect,
    },
};

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Completion of background work, delivered to the event loop.
#[derive(Debug)]
pub enum PageEvent {
    Loaded { generation: u64, result: Result<LoadedPage, LoadError> },
    Submitted(Result<CreatedTask, SubmitError>),
}

/// How the page was left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageExit {
    Navigate(Route),
    Quit,
}

/// Terminal application for the assign-task page.
pub struct App<A: TaskApi + 'static> {
    api: Arc<A>,
    runtime: Handle,
    session: Session,
    page: AssignTaskPage,
    form: AssignForm,
    overlay: Overlay,
    status_message: String,
    events_tx: Sender<PageEvent>,
    events_rx: Receiver<PageEvent>,
    tick: usize,
    exit: Option<PageExit>,
}

impl<A: TaskApi + 'static> App<A> {
    /// Enter the page for `user_id` and start loading it.
    pub fn new(api: Arc<A>, session: Session, user_id: &str, runtime: Handle) -> Self {
        let (page, ticket) = AssignTaskPage::new(user_id);
        let form = AssignForm::from_draft(page.draft(), page.projects());
        let (events_tx, events_rx) = mpsc::channel();

        let app = App {
            api,
            runtime,
            session,
            page,
            form,
            overlay: Overlay::None,
            status_message: String::new(),
            events_tx,
            events_rx,
            tick: 0,
            exit: None,
        };
        app.spawn_load(ticket);
        app
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run a load in the background; its result arrives as a [`PageEvent`].
    fn spawn_load(&self, ticket: LoadTicket) {
        debug!(generation = ticket.generation, user_id = %ticket.user_id, "spawning load");
        let api = Arc::clone(&self.api);
        let tx = self.events_tx.clone();
        self.runtime.spawn(async move {
            let result = load_page(api.as_ref(), &ticket.user_id).await;
            // The receiver is gone once the page has been left.
            let _ = tx.send(PageEvent::Loaded { generation: ticket.generation, result });
        });
    }

    fn spawn_submit(&self, request: TaskCreateRequest) {
        let api = Arc::clone(&self.api);
        let tx = self.events_tx.clone();
        self.runtime.spawn(async move {
            let result = send_request(api.as_ref(), &request).await;
            let _ = tx.send(PageEvent::Submitted(result));
        });
    }

    /// Apply every completed background result.
    pub fn poll_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply_event(event);
        }
    }

    fn apply_event(&mut self, event: PageEvent) {
        match event {
            PageEvent::Loaded { generation, result } => {
                if self.page.finish_load(generation, result) {
                    self.form = AssignForm::from_draft(self.page.draft(), self.page.projects());
                }
            }
            PageEvent::Submitted(result) => {
                self.status_message.clear();
                let alert = self.page.finish_submit(result);
                let focus = self.form.current_field;
                self.form = AssignForm::from_draft(self.page.draft(), self.page.projects());
                self.form.current_field = focus;
                self.form.update_active_field();
                self.overlay = Overlay::Alert(alert);
            }
        }
    }

    fn set_status_message(&mut self, msg: String) {
        self.status_message = msg;
    }

    fn navigate(&mut self, route: Route) {
        self.exit = Some(PageExit::Navigate(route));
    }

    /// Change the route parameter, reloading when it differs.
    fn go_to_member(&mut self, user_id: &str) {
        if let Some(ticket) = self.page.set_route(user_id) {
            self.spawn_load(ticket);
        }
    }

    fn submit(&mut self) {
        match self.page.prepare_submit() {
            Err(alert) => self.overlay = Overlay::Alert(alert),
            Ok(None) => {}
            Ok(Some(request)) => {
                self.set_status_message("Assigning task...".to_string());
                self.spawn_submit(request);
            }
        }
    }

    /// Handle a single key press.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            let alert_open = matches!(self.overlay, Overlay::Alert(_));
            match key.code {
                KeyCode::Char('c') => {
                    self.exit = Some(PageExit::Quit);
                    return;
                }
                // An open alert is acknowledged first.
                KeyCode::Char('l' | 'g') if alert_open => return,
                KeyCode::Char('l') => {
                    self.session.logout();
                    self.navigate(Route::Login);
                    return;
                }
                KeyCode::Char('g') => {
                    self.overlay = Overlay::GoTo(InputField::new());
                    return;
                }
                _ => {}
            }
        }

        match &mut self.overlay {
            Overlay::Alert(alert) => {
                let then = alert.then.clone();
                self.overlay = Overlay::None;
                if let Some(route) = then {
                    self.navigate(route);
                }
                return;
            }
            Overlay::GoTo(input) => {
                match key.code {
                    KeyCode::Esc => self.overlay = Overlay::None,
                    KeyCode::Enter => {
                        let user_id = input.value.trim().to_string();
                        self.overlay = Overlay::None;
                        if !user_id.is_empty() {
                            self.go_to_member(&user_id);
                        }
                    }
                    KeyCode::Backspace => input.handle_backspace(),
                    KeyCode::Left => input.move_cursor_left(),
                    KeyCode::Right => input.move_cursor_right(),
                    KeyCode::Char(c) if c.is_ascii_digit() => input.handle_char(c),
                    _ => {}
                }
                return;
            }
            Overlay::None => {}
        }

        let on_form = matches!(current_view(&self.page), View::Form { .. });
        if !on_form {
            // Loading, error and not-found screens only offer the way back.
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('b')) {
                self.navigate(Route::Team);
            }
            return;
        }

        match self.handle_form_key(key.code) {
            FormAction::Submit => self.submit(),
            FormAction::Cancel => self.navigate(Route::Team),
            FormAction::Edited | FormAction::Nothing => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyCode) -> FormAction {
        let update = match key {
            KeyCode::Esc => return FormAction::Cancel,
            KeyCode::Enter => {
                return if self.form.current_field == CANCEL_GLOBAL_ORDER {
                    FormAction::Cancel
                } else {
                    FormAction::Submit
                };
            }
            KeyCode::Tab | KeyCode::Down => {
                self.form.next_field();
                None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.form.prev_field();
                None
            }
            KeyCode::Left => self.form.handle_left_right(false),
            KeyCode::Right => self.form.handle_left_right(true),
            KeyCode::Home => {
                for input in [&mut self.form.title, &mut self.form.description, &mut self.form.due] {
                    if input.active {
                        input.move_cursor_home();
                    }
                }
                None
            }
            KeyCode::End => {
                for input in [&mut self.form.title, &mut self.form.description, &mut self.form.due] {
                    if input.active {
                        input.move_cursor_end();
                    }
                }
                None
            }
            KeyCode::Backspace => self.form.handle_backspace(),
            KeyCode::Delete => self.form.handle_delete(),
            KeyCode::Char(c) => self.form.handle_char(c),
            _ => None,
        };

        match update {
            Some((field, value)) => {
                self.page.update_field(field, value);
                FormAction::Edited
            }
            None => FormAction::Nothing,
        }
    }

    /// Render the navigation header.
    fn render_header(&self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(" Assign Task to Team Member ", Style::default().add_modifier(Modifier::BOLD)));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let mut spans = Vec::new();
        let username = self.session.username();
        if !username.is_empty() {
            spans.push(Span::styled(username.to_string(), Style::default().add_modifier(Modifier::BOLD)));
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled("Esc", Style::default().fg(PRIMARY)));
        spans.push(Span::raw(" Back to My Team  "));
        spans.push(Span::styled("Ctrl+L", Style::default().fg(PRIMARY)));
        spans.push(Span::raw(" Logout "));
        f.render_widget(Paragraph::new(Line::from(spans)).alignment(Alignment::Right), inner);
    }

    fn render_loading(&self, f: &mut Frame, area: Rect) {
        let frame = SPINNER[(self.tick / 2) % SPINNER.len()];
        let area = centered_rect(30, 20, area);
        let paragraph = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(format!("{} Loading...", frame), Style::default().fg(PRIMARY))),
        ])
        .alignment(Alignment::Center);
        f.render_widget(paragraph, area);
    }

    /// Centered message panel with the back-to-team action.
    fn render_message_panel(&self, f: &mut Frame, area: Rect, message: &str, color: Color) {
        let area = centered_rect(60, 30, area);
        let mut text = vec![Line::from("")];
        text.extend(message.lines().map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(color)))));
        text.push(Line::from(""));
        text.push(Line::from(vec![
            Span::styled("[ Back to My Team ]", Style::default().fg(Color::White).bg(PRIMARY)),
        ]));
        text.push(Line::from(Span::styled("Press Enter", Style::default().fg(MUTED))));

        let paragraph = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn field_block(&self, title: &'static str, order: usize) -> Block<'static> {
        let style = if self.form.current_field == order {
            Style::default().fg(PRIMARY)
        } else {
            Style::default()
        };
        Block::default().borders(Borders::ALL).title(title).border_style(style)
    }

    /// Text input with a muted placeholder when empty.
    fn render_input(&self, f: &mut Frame, area: Rect, input: &InputField, title: &'static str,
                    order: usize, placeholder: &'static str) {
        let content = if input.value.is_empty() {
            Line::from(Span::styled(placeholder, Style::default().fg(MUTED)))
        } else {
            Line::from(input.value.clone())
        };
        let paragraph = Paragraph::new(content)
            .block(self.field_block(title, order))
            .wrap(Wrap { trim: false });
        f.render_widget(paragraph, area);

        if input.active && matches!(self.overlay, Overlay::None) {
            let width = area.width.saturating_sub(2).max(1);
            let cursor = input.cursor as u16;
            let x = area.x + 1 + cursor % width;
            let y = area.y + 1 + (cursor / width).min(area.height.saturating_sub(3));
            f.set_cursor_position((x, y));
        }
    }

    fn render_selector(&self, f: &mut Frame, area: Rect, title: &'static str, order: usize, label: &str) {
        let paragraph = Paragraph::new(format!("< {} >", label)).block(self.field_block(title, order));
        f.render_widget(paragraph, area);
    }

    fn render_button(&self, f: &mut Frame, area: Rect, label: &str, order: usize, primary: bool) {
        let focused = self.form.current_field == order;
        let style = match (focused, primary) {
            (true, _) => Style::default().fg(Color::White).bg(PRIMARY).add_modifier(Modifier::BOLD),
            (false, true) => Style::default().fg(PRIMARY),
            (false, false) => Style::default(),
        };
        let paragraph = Paragraph::new(label.to_string())
            .style(style)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).border_style(style));
        f.render_widget(paragraph, area);
    }

    fn render_form(&self, f: &mut Frame, area: Rect, banner: Option<&str>, target: &UserRecord) {
        let banner = banner.filter(|b| !b.is_empty());
        let mut constraints = vec![Constraint::Length(2)];
        if banner.is_some() {
            constraints.push(Constraint::Length(3));
        }
        constraints.extend([
            Constraint::Length(3), // Title | Project
            Constraint::Length(5), // Description
            Constraint::Length(3), // Due Date | Status
            Constraint::Length(3), // Buttons
            Constraint::Length(4), // Team member information
            Constraint::Min(0),
        ]);
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);
        let mut row = 0;
        let mut next_row = || {
            row += 1;
            rows[row - 1]
        };

        let heading = Paragraph::new(vec![
            Line::from(Span::styled(
                format!("Assign Task to {}", target.username),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("Create a new task and assign it to your team member {}", target.username),
                Style::default().fg(MUTED),
            )),
        ]);
        f.render_widget(heading, next_row());

        if let Some(message) = banner {
            let banner_widget = Paragraph::new(message.to_string())
                .style(Style::default().fg(DANGER))
                .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(DANGER)));
            f.render_widget(banner_widget, next_row());
        }

        let halves = |r: Rect| {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(r)
        };

        let top = halves(next_row());
        self.render_input(f, top[0], &self.form.title, "Task Title *", TITLE_GLOBAL_ORDER, "Enter task title");
        let project_label = if self.form.project_count() == 0 {
            "No projects available"
        } else {
            self.form.selected_project_label()
        };
        self.render_selector(f, top[1], "Project *", PROJECT_SELECTOR_GLOBAL_ORDER, project_label);

        self.render_input(f, next_row(), &self.form.description, "Description", DESCRIPTION_GLOBAL_ORDER,
                          "Describe the task in detail");

        let middle = halves(next_row());
        self.render_input(f, middle[0], &self.form.due, "Due Date", DUE_GLOBAL_ORDER, "YYYY-MM-DDTHH:MM");
        self.render_selector(f, middle[1], "Initial Status", STATUS_GLOBAL_ORDER, self.form.selected_status().label());

        let buttons = halves(next_row());
        let submit_label = if self.page.is_submitting() { "Assigning..." } else { "Assign Task" };
        self.render_button(f, buttons[0], submit_label, SUBMIT_GLOBAL_ORDER, true);
        self.render_button(f, buttons[1], "Cancel", CANCEL_GLOBAL_ORDER, false);

        self.render_member_info(f, next_row(), target);
    }

    /// Read-only summary of the target user.
    fn render_member_info(&self, f: &mut Frame, area: Rect, target: &UserRecord) {
        let block = Block::default().borders(Borders::ALL).title("Team Member Information");
        let inner = block.inner(area);
        f.render_widget(block, area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 3), Constraint::Ratio(1, 3), Constraint::Ratio(1, 3)])
            .split(inner);
        let entries = [
            ("Username", target.username.clone()),
            ("Email", target.email.clone()),
            ("Role", display_role(&target.role)),
        ];
        for ((label, value), column) in entries.into_iter().zip(columns.iter()) {
            let paragraph = Paragraph::new(vec![
                Line::from(Span::styled(label, Style::default().fg(MUTED))),
                Line::from(Span::styled(value, Style::default().add_modifier(Modifier::BOLD))),
            ]);
            f.render_widget(paragraph, *column);
        }
    }

    fn render_overlay(&self, f: &mut Frame, area: Rect) {
        match &self.overlay {
            Overlay::None => {}
            Overlay::Alert(alert) => {
                let color = if alert.then.is_some() { SUCCESS } else { DANGER };
                let block = Block::default()
                    .title("Notice")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color));

                let height = (alert.message.lines().count() as u16 + 6).max(7);
                let popup = centered_rect(60, 20, area);
                let popup = Rect { height: height.min(area.height), y: area.y + area.height.saturating_sub(height) / 2, ..popup };
                f.render_widget(Clear, popup);

                let mut text = vec![Line::from("")];
                text.extend(alert.message.lines().map(|l| Line::from(l.to_string())));
                text.push(Line::from(""));
                text.push(Line::from(Span::styled("Press any key to continue", Style::default().fg(MUTED))));

                let paragraph = Paragraph::new(text)
                    .block(block)
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true });
                f.render_widget(paragraph, popup);
            }
            Overlay::GoTo(input) => {
                let popup = centered_rect(40, 20, area);
                let popup = Rect { height: 5u16.min(area.height), ..popup };
                f.render_widget(Clear, popup);
                let paragraph = Paragraph::new(vec![
                    Line::from(input.value.clone()),
                    Line::from(""),
                    Line::from(Span::styled("Enter open  Esc cancel", Style::default().fg(MUTED))),
                ])
                .block(Block::default().borders(Borders::ALL).title("Go to team member (id)"));
                f.render_widget(paragraph, popup);
                f.set_cursor_position((popup.x + 1 + input.cursor as u16, popup.y + 1));
            }
        }
    }

    /// Render the status bar at the bottom of the screen.
    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let status_text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            match current_view(&self.page) {
                View::Loading => format!("Loading team member {}...", self.page.user_id()),
                View::Error { .. } | View::NotFound => "Enter back to My Team | Ctrl+G go to member".to_string(),
                View::Form { .. } => {
                    "Tab/Up/Down move | Left/Right change | Enter assign | Esc cancel | Ctrl+G go to member"
                        .to_string()
                }
            }
        };

        let status = Paragraph::new(status_text)
            .style(Style::default().bg(PRIMARY).fg(Color::White))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    /// Main render function that dispatches to the view renderers.
    fn render(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());

        self.render_header(f, chunks[0]);
        let body = chunks[1].inner(ratatui::layout::Margin { horizontal: 1, vertical: 0 });

        match current_view(&self.page) {
            View::Loading => self.render_loading(f, body),
            View::Error { message } => self.render_message_panel(f, body, message, DANGER),
            View::NotFound => self.render_message_panel(f, body, "User not found.", MUTED),
            View::Form { banner, target_user, .. } => self.render_form(f, body, banner, target_user),
        }

        self.render_status_bar(f, chunks[2]);
        self.render_overlay(f, f.area());
    }

    /// Main event loop for the page.
    ///
    /// Applies background results, renders and processes input until the
    /// page is left.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<PageExit> {
        loop {
            self.poll_events();
            terminal.draw(|f| self.render(f))?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }
            self.tick = self.tick.wrapping_add(1);

            if let Some(exit) = self.exit.take() {
                return Ok(exit);
            }
        }
    }
}
