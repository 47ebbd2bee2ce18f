//! Task form handling for the terminal user interface.
//!
//! This module provides the `AssignForm` structure that tracks focus, text
//! cursors and selector positions for the assign-task form. The draft itself
//! lives in the page; every edit the form makes is reported back as a single
//! field update.

use crate::{
    fields::{DraftField, TaskStatus},
    project::Project,
    task::TaskDraft,
    tui::input::InputField,
};

/// Global order constants for the assign form, matching the visual layout.
pub const TITLE_GLOBAL_ORDER: usize = 0;
pub const PROJECT_SELECTOR_GLOBAL_ORDER: usize = 1;
pub const DESCRIPTION_GLOBAL_ORDER: usize = 2;
pub const DUE_GLOBAL_ORDER: usize = 3;
pub const STATUS_GLOBAL_ORDER: usize = 4;
pub const SUBMIT_GLOBAL_ORDER: usize = 5;
pub const CANCEL_GLOBAL_ORDER: usize = 6;

const FIELD_COUNT: usize = 7;

/// Placeholder shown while no project is selected.
pub const NO_PROJECT_LABEL: &str = "Select a project";

/// A change the form wants applied to the draft.
pub type FieldUpdate = (DraftField, String);

/// Form widget state for assigning a task.
pub struct AssignForm {
    pub title: InputField,
    pub description: InputField,
    pub due: InputField,
    /// 0 is "no project"; `n` selects `project_ids[n - 1]`.
    pub project_selector: usize,
    pub status: usize,
    pub current_field: usize,
    project_ids: Vec<u64>,
    project_names: Vec<String>,
    statuses: Vec<TaskStatus>,
}

impl AssignForm {
    /// Build the form for an existing draft and the loaded projects.
    pub fn from_draft(draft: &TaskDraft, projects: &[Project]) -> Self {
        let project_ids: Vec<u64> = projects.iter().map(|p| p.id).collect();
        let selected = draft.project.trim().parse::<u64>().ok();
        let project_selector = selected
            .and_then(|id| project_ids.iter().position(|&p| p == id))
            .map(|i| i + 1)
            .unwrap_or(0);
        let statuses = TaskStatus::ALL.to_vec();
        let status = statuses.iter().position(|&s| s == draft.status).unwrap_or(0);

        let mut form = Self {
            title: InputField::with_value(&draft.title),
            description: InputField::with_value(&draft.description),
            due: InputField::with_value(&draft.due_date),
            project_selector,
            status,
            current_field: TITLE_GLOBAL_ORDER,
            project_ids,
            project_names: projects.iter().map(|p| p.name.clone()).collect(),
            statuses,
        };
        form.update_active_field();
        form
    }

    /// Move to the next field in the form.
    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % FIELD_COUNT;
        self.update_active_field();
    }

    /// Move to the previous field in the form.
    pub fn prev_field(&mut self) {
        self.current_field = if self.current_field == 0 {
            FIELD_COUNT - 1
        } else {
            self.current_field - 1
        };
        self.update_active_field();
    }

    /// Update which text field is currently active for editing.
    pub fn update_active_field(&mut self) {
        self.title.active = self.current_field == TITLE_GLOBAL_ORDER;
        self.description.active = self.current_field == DESCRIPTION_GLOBAL_ORDER;
        self.due.active = self.current_field == DUE_GLOBAL_ORDER;
    }

    fn active_input(&mut self) -> Option<(DraftField, &mut InputField)> {
        match self.current_field {
            TITLE_GLOBAL_ORDER => Some((DraftField::Title, &mut self.title)),
            DESCRIPTION_GLOBAL_ORDER => Some((DraftField::Description, &mut self.description)),
            DUE_GLOBAL_ORDER => Some((DraftField::DueDate, &mut self.due)),
            _ => None,
        }
    }

    fn edit(&mut self, apply: impl FnOnce(&mut InputField)) -> Option<FieldUpdate> {
        let (field, input) = self.active_input()?;
        let before = input.value.clone();
        apply(input);
        (input.value != before).then(|| (field, input.value.clone()))
    }

    /// Handle character input for the currently active field.
    pub fn handle_char(&mut self, c: char) -> Option<FieldUpdate> {
        self.edit(|input| input.handle_char(c))
    }

    /// Handle backspace input for the currently active field.
    pub fn handle_backspace(&mut self) -> Option<FieldUpdate> {
        self.edit(InputField::handle_backspace)
    }

    /// Handle delete input for the currently active field.
    pub fn handle_delete(&mut self) -> Option<FieldUpdate> {
        self.edit(InputField::handle_delete)
    }

    /// Handle left/right arrow keys for cursor movement or selector changes.
    pub fn handle_left_right(&mut self, right: bool) -> Option<FieldUpdate> {
        match self.current_field {
            PROJECT_SELECTOR_GLOBAL_ORDER => {
                let options = self.project_ids.len() + 1;
                self.project_selector = cycle(self.project_selector, options, right);
                Some((DraftField::Project, self.selected_project_value()))
            }
            STATUS_GLOBAL_ORDER => {
                self.status = cycle(self.status, self.statuses.len(), right);
                Some((DraftField::Status, self.statuses[self.status].as_str().to_string()))
            }
            SUBMIT_GLOBAL_ORDER | CANCEL_GLOBAL_ORDER => {
                self.current_field = if right { CANCEL_GLOBAL_ORDER } else { SUBMIT_GLOBAL_ORDER };
                None
            }
            _ => {
                if let Some((_, input)) = self.active_input() {
                    if right { input.move_cursor_right() } else { input.move_cursor_left() }
                }
                None
            }
        }
    }

    /// The project id as the draft stores it, empty when none is selected.
    pub fn selected_project_value(&self) -> String {
        match self.project_selector {
            0 => String::new(),
            n => self.project_ids.get(n - 1).map(u64::to_string).unwrap_or_default(),
        }
    }

    /// Label of the selected project.
    pub fn selected_project_label(&self) -> &str {
        match self.project_selector {
            0 => NO_PROJECT_LABEL,
            n => self.project_names.get(n - 1).map(String::as_str).unwrap_or(NO_PROJECT_LABEL),
        }
    }

    pub fn selected_status(&self) -> TaskStatus {
        self.statuses[self.status]
    }

    pub fn project_count(&self) -> usize {
        self.project_ids.len()
    }
}

fn cycle(index: usize, len: usize, forward: bool) -> usize {
    if len == 0 {
        return 0;
    }
    if forward {
        (index + 1) % len
    } else if index == 0 {
        len - 1
    } else {
        index - 1
    }
}
