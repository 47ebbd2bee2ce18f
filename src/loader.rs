//! Data loading for the assign-task page.
//!
//! Loading is an ordered pipeline of fallible steps: fetch the target user,
//! confirm they are on the caller's team, then fetch the project list. The
//! first failing step ends the pipeline; later steps are never requested.

use tracing::{info, warn};

use crate::api::{ApiError, TaskApi};
use crate::project::Project;
use crate::user::{is_team_member, parse_user_id, UserRecord};

/// Why the page could not be loaded. `Display` is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("User not found")]
    NotFound,

    #[error("You do not have permission to perform this action")]
    PermissionDenied,

    #[error("This user is not in your team")]
    NotInTeam,

    #[error("No projects found")]
    NoProjects,

    /// Any other failure that carries its own message.
    #[error("{0}")]
    Failed(String),

    #[error("Failed to load data. Please try again.")]
    Generic,
}

impl From<ApiError> for LoadError {
    fn from(e: ApiError) -> Self {
        match e.status() {
            Some(403) => LoadError::PermissionDenied,
            Some(404) => LoadError::NotFound,
            _ => {
                let message = e.to_string();
                if message.trim().is_empty() {
                    LoadError::Generic
                } else {
                    LoadError::Failed(message)
                }
            }
        }
    }
}

/// Everything the form needs once loading succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedPage {
    pub target_user: UserRecord,
    pub projects: Vec<Project>,
}

/// Run the full load sequence for the textual route parameter `user_id`.
pub async fn load_page<A: TaskApi>(api: &A, user_id: &str) -> Result<LoadedPage, LoadError> {
    let result = run_pipeline(api, user_id).await;
    match &result {
        Ok(page) => info!(
            user_id,
            username = %page.target_user.username,
            projects = page.projects.len(),
            "assign page loaded"
        ),
        Err(e) => warn!(user_id, error = %e, "assign page failed to load"),
    }
    result
}

async fn run_pipeline<A: TaskApi>(api: &A, user_id: &str) -> Result<LoadedPage, LoadError> {
    let target_user = fetch_target_user(api, user_id).await?;
    ensure_team_member(api, user_id).await?;
    let projects = fetch_projects(api).await?;
    Ok(LoadedPage { target_user, projects })
}

async fn fetch_target_user<A: TaskApi>(api: &A, user_id: &str) -> Result<UserRecord, LoadError> {
    api.get_user(user_id).await?.ok_or(LoadError::NotFound)
}

/// The route parameter is compared numerically; one that is not a number
/// matches no member.
async fn ensure_team_member<A: TaskApi>(api: &A, user_id: &str) -> Result<(), LoadError> {
    let roster = api.get_team().await?;
    match parse_user_id(user_id) {
        Some(id) if is_team_member(&roster, id) => Ok(()),
        _ => Err(LoadError::NotInTeam),
    }
}

async fn fetch_projects<A: TaskApi>(api: &A) -> Result<Vec<Project>, LoadError> {
    api.get_projects().await?.ok_or(LoadError::NoProjects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{member, FakeApi};
    use assert_matches::assert_matches;
    use serde_json::json;

    #[tokio::test]
    async fn test_loads_user_and_projects() {
        let api = FakeApi::happy();
        let page = load_page(&api, "42").await.unwrap();

        assert_eq!(page.target_user.username, "dev");
        assert_eq!(page.projects.len(), 2);
        assert_eq!(
            api.calls(),
            vec!["GET /accounts/users/42/", "GET /accounts/manager/team/", "GET /projects/projects/"]
        );
    }

    #[tokio::test]
    async fn test_missing_user_stops_before_team_fetch() {
        let mut api = FakeApi::happy();
        api.user = Ok(None);
        assert_eq!(load_page(&api, "42").await, Err(LoadError::NotFound));
        assert_eq!(api.calls(), vec!["GET /accounts/users/42/"]);

        let mut api = FakeApi::happy();
        api.user = Err((404, json!({"detail": "User not found."})));
        let err = load_page(&api, "42").await.unwrap_err();
        assert_eq!(err.to_string(), "User not found");
        assert_eq!(api.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_non_member_is_rejected_before_projects() {
        for team in [vec![member(7)], vec![], vec![member(4), member(420)]] {
            let mut api = FakeApi::happy();
            api.team = Ok(team);
            let err = load_page(&api, "42").await.unwrap_err();
            assert_eq!(err, LoadError::NotInTeam);
            assert_eq!(err.to_string(), "This user is not in your team");
            assert!(!api.calls().iter().any(|c| c.contains("/projects/")));
        }
    }

    #[tokio::test]
    async fn test_non_numeric_parameter_matches_nobody() {
        let api = FakeApi::happy();
        assert_eq!(load_page(&api, "dev").await, Err(LoadError::NotInTeam));
    }

    #[tokio::test]
    async fn test_absent_projects_differs_from_empty() {
        let mut api = FakeApi::happy();
        api.projects = Ok(None);
        assert_eq!(load_page(&api, "42").await, Err(LoadError::NoProjects));

        let mut api = FakeApi::happy();
        api.projects = Ok(Some(Vec::new()));
        assert_eq!(load_page(&api, "42").await.unwrap().projects, Vec::new());
    }

    #[tokio::test]
    async fn test_status_codes_are_classified() {
        let mut api = FakeApi::happy();
        api.team = Err((403, json!({"detail": "Only managers can access team information."})));
        assert_eq!(
            load_page(&api, "42").await.unwrap_err().to_string(),
            "You do not have permission to perform this action"
        );

        let mut api = FakeApi::happy();
        api.projects = Err((500, json!("<html>oops</html>")));
        assert_matches!(
            load_page(&api, "42").await,
            Err(LoadError::Failed(message)) if message == "Request failed with status code 500"
        );
    }

    #[test]
    fn test_other_errors_keep_their_message() {
        assert_eq!(
            LoadError::from(ApiError::InvalidToken),
            LoadError::Failed("API token contains characters not allowed in a header".to_string())
        );
        assert_eq!(LoadError::Generic.to_string(), "Failed to load data. Please try again.");
    }
}
