//! Task draft and wire structures.
//!
//! This module defines the `TaskDraft` edited by the form, the declarative
//! set of client-side constraints checked before submitting, and the request
//! and response records exchanged with the backend when a task is created.

use serde::{Deserialize, Serialize};

use crate::fields::*;

/// The in-progress, unsaved form state for a new task.
///
/// Every field is held as entered. `project` holds the selected project id
/// in textual form and `due_date` a date-time-local string; both are empty
/// when nothing was chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub project: String,
    pub due_date: String,
    pub status: TaskStatus,
}

impl TaskDraft {
    /// Create an empty draft with status `todo`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace exactly one field, leaving the others untouched.
    ///
    /// Returns `false` when the value is not acceptable for the field, which
    /// can only happen for `Status`; the draft is then unchanged.
    pub fn update(&mut self, field: DraftField, value: impl Into<String>) -> bool {
        let value = value.into();
        match field {
            DraftField::Title => self.title = value,
            DraftField::Description => self.description = value,
            DraftField::Project => self.project = value,
            DraftField::DueDate => self.due_date = value,
            DraftField::Status => match TaskStatus::from_wire(&value) {
                Some(status) => self.status = status,
                None => return false,
            },
        }
        true
    }

    /// Current value of a field in its textual form.
    pub fn value(&self, field: DraftField) -> &str {
        match field {
            DraftField::Title => &self.title,
            DraftField::Description => &self.description,
            DraftField::Project => &self.project,
            DraftField::DueDate => &self.due_date,
            DraftField::Status => self.status.as_str(),
        }
    }
}

/// A client-side requirement on a single draft field.
#[derive(Debug, PartialEq, Eq)]
pub struct Constraint {
    pub field: DraftField,
    /// Blocking prompt shown when the field is missing.
    pub prompt: &'static str,
}

/// Fields that must be filled before a request is built, in check order.
pub const REQUIRED_FIELDS: &[Constraint] = &[
    Constraint { field: DraftField::Title, prompt: "Please enter a task title" },
    Constraint { field: DraftField::Project, prompt: "Please select a project" },
];

/// Return the first violated constraint, if any.
pub fn first_violation(draft: &TaskDraft) -> Option<&'static Constraint> {
    REQUIRED_FIELDS
        .iter()
        .find(|c| draft.value(c.field).trim().is_empty())
}

/// Payload for `POST /projects/tasks/`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TaskCreateRequest {
    pub title: String,
    pub description: String,
    pub project: u64,
    pub assigned_to: u64,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

/// Task representation returned by the backend after creation.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CreatedTask {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub project: Option<u64>,
    #[serde(default)]
    pub assigned_to: Option<u64>,
    #[serde(default)]
    pub assigned_to_username: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}
