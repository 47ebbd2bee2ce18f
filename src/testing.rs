//! In-memory [`TaskApi`] used by unit tests.

use std::sync::Mutex;

use serde_json::Value;

use crate::api::{ApiError, TaskApi};
use crate::fields::TaskStatus;
use crate::project::Project;
use crate::task::{CreatedTask, TaskCreateRequest};
use crate::user::{TeamMember, UserRecord};

/// A canned backend reply: a value, or a status code with a JSON body.
pub type Reply<T> = Result<T, (u16, Value)>;

/// Fake backend that records every call it receives.
pub struct FakeApi {
    pub user: Reply<Option<UserRecord>>,
    pub team: Reply<Vec<TeamMember>>,
    pub projects: Reply<Option<Vec<Project>>>,
    pub created: Reply<CreatedTask>,
    pub calls: Mutex<Vec<String>>,
    pub requests: Mutex<Vec<TaskCreateRequest>>,
}

pub fn user(id: u64, username: &str) -> UserRecord {
    UserRecord {
        id,
        username: username.to_string(),
        email: format!("{}@example.com", username),
        role: "developer".to_string(),
        team_name: Some("Core".to_string()),
    }
}

pub fn member(id: u64) -> TeamMember {
    TeamMember { id, username: None, email: None, role: None }
}

pub fn project(id: u64, name: &str) -> Project {
    Project { id, name: name.to_string(), description: None, owner_username: None }
}

impl FakeApi {
    /// User 42 ("dev") on a team with user 7, projects Alpha (1) and Beta (2).
    pub fn happy() -> Self {
        Self {
            user: Ok(Some(user(42, "dev"))),
            team: Ok(vec![member(7), member(42)]),
            projects: Ok(Some(vec![project(1, "Alpha"), project(2, "Beta")])),
            created: Ok(CreatedTask {
                id: 100,
                title: "Fix bug".to_string(),
                description: Some(String::new()),
                project: Some(2),
                assigned_to: Some(42),
                assigned_to_username: Some("dev".to_string()),
                status: Some(TaskStatus::Todo),
                due_date: None,
                created_at: None,
            }),
            calls: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<TaskCreateRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn reply<T: Clone>(reply: &Reply<T>) -> Result<T, ApiError> {
        reply
            .clone()
            .map_err(|(status, body)| ApiError::Status { status, body })
    }
}

impl TaskApi for FakeApi {
    async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>, ApiError> {
        self.record(format!("GET /accounts/users/{}/", user_id));
        Self::reply(&self.user)
    }

    async fn get_team(&self) -> Result<Vec<TeamMember>, ApiError> {
        self.record("GET /accounts/manager/team/".to_string());
        Self::reply(&self.team)
    }

    async fn get_projects(&self) -> Result<Option<Vec<Project>>, ApiError> {
        self.record("GET /projects/projects/".to_string());
        Self::reply(&self.projects)
    }

    async fn create_task(&self, request: &TaskCreateRequest) -> Result<CreatedTask, ApiError> {
        self.record("POST /projects/tasks/".to_string());
        self.requests.lock().unwrap().push(request.clone());
        Self::reply(&self.created)
    }

    async fn current_user(&self) -> Result<Option<UserRecord>, ApiError> {
        self.record("GET /accounts/me/".to_string());
        Ok(Some(user(1, "boss")))
    }
}
