//! Task submission.
//!
//! Checks the draft against the client-side constraints, turns it into the
//! wire payload and posts it. Backend failures are interpreted into a single
//! user-visible message; nothing is retried.

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api::{ApiError, TaskApi};
use crate::task::{first_violation, CreatedTask, TaskCreateRequest, TaskDraft};

/// Shown once the backend accepted the task.
pub const SUCCESS_MESSAGE: &str = "Task assigned successfully!";

/// Why a submit did not create a task. `Display` is the alert text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    /// A client-side constraint failed; no request was made.
    #[error("{0}")]
    Guard(&'static str),

    /// The backend explained the failure in a single `detail` message.
    #[error("{0}")]
    Detail(String),

    /// The backend rejected individual fields.
    #[error("Failed to assign task:\n{}", format_field_errors(.0))]
    Validation(Vec<(String, Vec<String>)>),

    #[error("Failed to assign task. Please try again.")]
    Generic,
}

impl From<ApiError> for SubmitError {
    fn from(e: ApiError) -> Self {
        e.body().map(interpret_error_body).unwrap_or(SubmitError::Generic)
    }
}

/// Classify a failure body: `{detail}` first, then field-keyed messages.
fn interpret_error_body(body: &Value) -> SubmitError {
    if let Some(detail) = body.get("detail").and_then(Value::as_str) {
        if !detail.is_empty() {
            return SubmitError::Detail(detail.to_string());
        }
    }

    match body.as_object() {
        Some(fields) if !fields.is_empty() => SubmitError::Validation(
            fields
                .iter()
                .map(|(field, messages)| (field.clone(), messages_of(messages)))
                .collect(),
        ),
        _ => SubmitError::Generic,
    }
}

fn messages_of(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().flat_map(messages_of).collect(),
        Value::String(s) => vec![s.clone()],
        Value::Null => Vec::new(),
        other => vec![other.to_string()],
    }
}

/// One `field: message, message` line per rejected field.
fn format_field_errors(errors: &[(String, Vec<String>)]) -> String {
    errors
        .iter()
        .map(|(field, messages)| format!("{}: {}", field, messages.join(", ")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the request for `draft`, assigning the task to `assigned_to`.
pub fn build_request(draft: &TaskDraft, assigned_to: u64) -> Result<TaskCreateRequest, SubmitError> {
    if let Some(constraint) = first_violation(draft) {
        return Err(SubmitError::Guard(constraint.prompt));
    }
    let project = draft
        .project
        .trim()
        .parse::<u64>()
        .map_err(|_| SubmitError::Guard("Please select a project"))?;

    Ok(TaskCreateRequest {
        title: draft.title.clone(),
        description: draft.description.clone(),
        project,
        assigned_to,
        status: draft.status,
        due_date: if draft.due_date.is_empty() { None } else { Some(draft.due_date.clone()) },
    })
}

/// Validate and send `draft`. Guard failures never reach the network.
pub async fn submit_task<A: TaskApi>(
    api: &A,
    draft: &TaskDraft,
    assigned_to: u64,
) -> Result<CreatedTask, SubmitError> {
    let request = build_request(draft, assigned_to).inspect_err(|e| debug!(prompt = %e, "submit blocked"))?;
    send_request(api, &request).await
}

/// Post an already validated request and interpret the outcome.
pub async fn send_request<A: TaskApi>(api: &A, request: &TaskCreateRequest) -> Result<CreatedTask, SubmitError> {
    match api.create_task(request).await {
        Ok(task) => {
            info!(task_id = task.id, assigned_to = request.assigned_to, project = request.project, "task assigned");
            Ok(task)
        }
        Err(e) => {
            warn!(error = %e, body = ?e.body(), "task assignment failed");
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{DraftField, TaskStatus};
    use crate::testing::FakeApi;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn draft(title: &str, project: &str) -> TaskDraft {
        let mut draft = TaskDraft::new();
        draft.update(DraftField::Title, title);
        draft.update(DraftField::Project, project);
        draft
    }

    #[tokio::test]
    async fn test_missing_project_makes_no_request() {
        let api = FakeApi::happy();
        let err = submit_task(&api, &draft("Fix bug", ""), 42).await.unwrap_err();

        assert_eq!(err, SubmitError::Guard("Please select a project"));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_title_makes_no_request() {
        let api = FakeApi::happy();
        let err = submit_task(&api, &draft("  ", "1"), 42).await.unwrap_err();
        assert_eq!(err.to_string(), "Please enter a task title");
        assert!(api.calls().is_empty());
    }

    #[test]
    fn test_due_date_included_only_when_set() {
        let mut d = draft("Fix bug", "2");
        let request = build_request(&d, 42).unwrap();
        assert_eq!(request.due_date, None);
        assert!(serde_json::to_value(&request).unwrap().get("due_date").is_none());

        d.update(DraftField::DueDate, "2025-03-01T09:30");
        let value = serde_json::to_value(build_request(&d, 42).unwrap()).unwrap();
        assert_eq!(value["due_date"], "2025-03-01T09:30");
    }

    #[test]
    fn test_request_coerces_ids() {
        let mut d = draft("Ship it", " 2 ");
        d.update(DraftField::Status, "done");
        let request = build_request(&d, 42).unwrap();
        assert_eq!(request.project, 2);
        assert_eq!(request.assigned_to, 42);
        assert_eq!(request.status, TaskStatus::Done);
        assert_eq!(request.description, "");

        assert_eq!(build_request(&draft("x", "Beta"), 42), Err(SubmitError::Guard("Please select a project")));
    }

    #[tokio::test]
    async fn test_detail_is_shown_verbatim() {
        let mut api = FakeApi::happy();
        api.created = Err((403, json!({"detail": "X"})));
        let err = submit_task(&api, &draft("Fix bug", "2"), 42).await.unwrap_err();
        assert_eq!(err.to_string(), "X");
    }

    #[tokio::test]
    async fn test_field_errors_are_listed_per_line() {
        let mut api = FakeApi::happy();
        api.created = Err((400, json!({"title": ["required"], "project": ["invalid"]})));
        let err = submit_task(&api, &draft("Fix bug", "2"), 42).await.unwrap_err();

        let message = err.to_string();
        let lines: Vec<&str> = message.lines().collect();
        assert_eq!(lines[0], "Failed to assign task:");
        assert!(lines.contains(&"title: required"));
        assert!(lines.contains(&"project: invalid"));
    }

    #[test]
    fn test_multiple_messages_are_joined() {
        let err = interpret_error_body(&json!({"due_date": ["bad format", "in the past"]}));
        assert_eq!(err.to_string(), "Failed to assign task:\ndue_date: bad format, in the past");
    }

    #[test]
    fn test_unrecognised_bodies_are_generic() {
        for body in [json!("<html>500</html>"), json!({}), json!(null), json!([1, 2])] {
            assert_eq!(interpret_error_body(&body), SubmitError::Generic);
        }
        assert_eq!(SubmitError::from(ApiError::InvalidToken), SubmitError::Generic);
        assert_eq!(SubmitError::Generic.to_string(), "Failed to assign task. Please try again.");
    }

    #[tokio::test]
    async fn test_fix_bug_scenario() {
        let api = FakeApi::happy();
        let task = submit_task(&api, &draft("Fix bug", "2"), 42).await.unwrap();
        assert_eq!(task.id, 100);

        let requests = api.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            serde_json::to_value(&requests[0]).unwrap(),
            json!({"title": "Fix bug", "description": "", "project": 2, "assigned_to": 42, "status": "todo"})
        );
        assert_matches!(api.calls().as_slice(), [call] if call == "POST /projects/tasks/");
    }
}
