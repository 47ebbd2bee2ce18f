//! State of the assign-task page.
//!
//! `AssignTaskPage` owns everything the page shows: the route parameter,
//! the load status, the loaded data and the task draft. Network work happens
//! elsewhere; the page hands out tickets describing what to run and accepts
//! the results back. Each load carries a generation number so a result that
//! arrives after the route changed is dropped instead of overwriting newer
//! state.

use tracing::debug;

use crate::fields::DraftField;
use crate::loader::{LoadError, LoadedPage};
use crate::project::Project;
use crate::submit::{build_request, SubmitError, SUCCESS_MESSAGE};
use crate::task::{CreatedTask, TaskCreateRequest, TaskDraft};
use crate::user::UserRecord;

/// Where the page can send the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// The manager's team overview.
    Team,
    Login,
}

/// A load the caller must run and report back with [`AssignTaskPage::finish_load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub user_id: String,
}

/// A message the user must acknowledge, optionally followed by navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub message: String,
    pub then: Option<Route>,
}

impl Alert {
    fn blocking(message: impl Into<String>) -> Self {
        Self { message: message.into(), then: None }
    }
}

pub struct AssignTaskPage {
    user_id: String,
    generation: u64,
    loading: bool,
    error: Option<String>,
    target_user: Option<UserRecord>,
    projects: Vec<Project>,
    draft: TaskDraft,
    submitting: bool,
}

impl AssignTaskPage {
    /// Enter the page for `user_id`. The page starts out loading.
    pub fn new(user_id: impl Into<String>) -> (Self, LoadTicket) {
        let mut page = Self {
            user_id: user_id.into(),
            generation: 0,
            loading: true,
            error: None,
            target_user: None,
            projects: Vec::new(),
            draft: TaskDraft::new(),
            submitting: false,
        };
        let ticket = page.begin_load();
        (page, ticket)
    }

    /// Start a fresh load for the current route parameter.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.loading = true;
        self.error = None;
        LoadTicket { generation: self.generation, user_id: self.user_id.clone() }
    }

    /// Change the route parameter. A different id re-runs the full load.
    pub fn set_route(&mut self, user_id: impl Into<String>) -> Option<LoadTicket> {
        let user_id = user_id.into();
        if user_id == self.user_id {
            return None;
        }
        self.user_id = user_id;
        Some(self.begin_load())
    }

    /// Apply a load result. Returns `false` if the result was stale and ignored.
    pub fn finish_load(&mut self, generation: u64, result: Result<LoadedPage, LoadError>) -> bool {
        if generation != self.generation {
            debug!(generation, current = self.generation, "discarding stale load");
            return false;
        }
        match result {
            Ok(page) => {
                self.target_user = Some(page.target_user);
                self.projects = page.projects;
                self.error = None;
            }
            Err(e) => {
                self.target_user = None;
                self.projects.clear();
                self.error = Some(e.to_string());
            }
        }
        self.loading = false;
        true
    }

    /// Replace one draft field.
    pub fn update_field(&mut self, field: DraftField, value: impl Into<String>) -> bool {
        let value = value.into();
        let accepted = self.draft.update(field, value.as_str());
        if !accepted {
            debug!(field = field.name(), %value, "rejected draft value");
        }
        accepted
    }

    /// Run the client-side guard and produce the request to send.
    ///
    /// `Ok(None)` means a submit is already in flight. A guard failure is
    /// returned as a blocking alert and nothing is sent.
    pub fn prepare_submit(&mut self) -> Result<Option<TaskCreateRequest>, Alert> {
        if self.submitting {
            return Ok(None);
        }
        let Some(target) = &self.target_user else {
            return Err(Alert::blocking(SubmitError::Generic.to_string()));
        };
        let request = build_request(&self.draft, target.id).map_err(|e| Alert::blocking(e.to_string()))?;
        self.submitting = true;
        Ok(Some(request))
    }

    /// Apply the outcome of a submit. Success clears the draft and routes to
    /// the team overview once acknowledged; failure keeps the draft.
    pub fn finish_submit(&mut self, result: Result<CreatedTask, SubmitError>) -> Alert {
        self.submitting = false;
        match result {
            Ok(_) => {
                self.draft = TaskDraft::new();
                Alert { message: SUCCESS_MESSAGE.to_string(), then: Some(Route::Team) }
            }
            Err(e) => Alert::blocking(e.to_string()),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn target_user(&self) -> Option<&UserRecord> {
        self.target_user.as_ref()
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn draft(&self) -> &TaskDraft {
        &self.draft
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::TaskStatus;
    use crate::loader::load_page;
    use crate::submit::send_request;
    use crate::testing::{project, user, FakeApi};

    fn loaded(id: u64, name: &str) -> Result<LoadedPage, LoadError> {
        Ok(LoadedPage { target_user: user(id, name), projects: vec![project(1, "Alpha")] })
    }

    #[test]
    fn test_starts_loading() {
        let (page, ticket) = AssignTaskPage::new("42");
        assert!(page.is_loading());
        assert_eq!(ticket, LoadTicket { generation: 1, user_id: "42".to_string() });
    }

    #[test]
    fn test_failure_clears_projects() {
        let (mut page, ticket) = AssignTaskPage::new("42");
        assert!(page.finish_load(ticket.generation, loaded(42, "dev")));
        assert_eq!(page.projects().len(), 1);

        let ticket = page.begin_load();
        assert!(page.finish_load(ticket.generation, Err(LoadError::NotInTeam)));
        assert!(!page.is_loading());
        assert!(page.projects().is_empty());
        assert_eq!(page.error(), Some("This user is not in your team"));
    }

    #[test]
    fn test_route_change_reloads_and_drops_stale_results() {
        let (mut page, first) = AssignTaskPage::new("42");
        let second = page.set_route("43").expect("new id triggers a load");
        assert_eq!(second.user_id, "43");
        assert!(second.generation > first.generation);

        assert!(!page.finish_load(first.generation, loaded(42, "dev")));
        assert!(page.is_loading());
        assert!(page.target_user().is_none());

        assert!(page.finish_load(second.generation, loaded(43, "qa")));
        assert_eq!(page.target_user().map(|u| u.username.as_str()), Some("qa"));
    }

    #[test]
    fn test_same_route_does_not_reload() {
        let (mut page, _) = AssignTaskPage::new("42");
        assert_eq!(page.set_route("42"), None);
    }

    #[test]
    fn test_update_field_keeps_draft_on_bad_status() {
        let (mut page, _) = AssignTaskPage::new("42");
        assert!(page.update_field(DraftField::Title, "Fix bug"));
        assert!(!page.update_field(DraftField::Status, "blocked"));
        assert_eq!(page.draft().title, "Fix bug");
        assert_eq!(page.draft().status, TaskStatus::Todo);
    }

    #[test]
    fn test_guard_blocks_submit() {
        let (mut page, ticket) = AssignTaskPage::new("42");
        page.finish_load(ticket.generation, loaded(42, "dev"));
        page.update_field(DraftField::Title, "Fix bug");

        let alert = page.prepare_submit().unwrap_err();
        assert_eq!(alert, Alert { message: "Please select a project".to_string(), then: None });
        assert!(!page.is_submitting());
    }

    #[test]
    fn test_only_one_submit_in_flight() {
        let (mut page, ticket) = AssignTaskPage::new("42");
        page.finish_load(ticket.generation, loaded(42, "dev"));
        page.update_field(DraftField::Title, "Fix bug");
        page.update_field(DraftField::Project, "1");

        assert!(page.prepare_submit().unwrap().is_some());
        assert_eq!(page.prepare_submit(), Ok(None));

        let alert = page.finish_submit(Err(SubmitError::Detail("nope".to_string())));
        assert_eq!(alert.message, "nope");
        assert_eq!(page.draft().title, "Fix bug");
        assert!(!page.is_submitting());
    }

    #[tokio::test]
    async fn test_assign_end_to_end() {
        let api = FakeApi::happy();
        let (mut page, ticket) = AssignTaskPage::new("42");
        let result = load_page(&api, &ticket.user_id).await;
        assert!(page.finish_load(ticket.generation, result));
        assert_eq!(page.projects().iter().map(|p| p.name.as_str()).collect::<Vec<_>>(), ["Alpha", "Beta"]);

        page.update_field(DraftField::Title, "Fix bug");
        page.update_field(DraftField::Project, "2");
        let request = page.prepare_submit().unwrap().unwrap();
        let result = send_request(&api, &request).await;
        let alert = page.finish_submit(result);

        assert_eq!(alert, Alert { message: "Task assigned successfully!".to_string(), then: Some(Route::Team) });
        assert_eq!(
            serde_json::to_value(&api.requests()[0]).unwrap(),
            serde_json::json!({"title": "Fix bug", "description": "", "project": 2, "assigned_to": 42, "status": "todo"})
        );
        assert_eq!(page.draft(), &TaskDraft::new());
    }
}
