//! Enumerations and field types for task assignment.
//!
//! This module defines the structured values a task draft is made of: the
//! status a task starts in and the names of the editable draft fields.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Task status as understood by the backend.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    #[value(alias = "in_progress")]
    InProgress,
    Done,
}

impl TaskStatus {
    /// All statuses in the order the form offers them.
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done];

    /// The value sent over the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }

    /// Human-readable label for selectors.
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
        }
    }

    /// Parse a wire value back into a status.
    pub fn from_wire(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

/// Editable fields of a task draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    Title,
    Description,
    Project,
    DueDate,
    Status,
}

impl DraftField {
    /// The field name used on the wire and in validation messages.
    pub fn name(&self) -> &'static str {
        match self {
            DraftField::Title => "title",
            DraftField::Description => "description",
            DraftField::Project => "project",
            DraftField::DueDate => "due_date",
            DraftField::Status => "status",
        }
    }
}
