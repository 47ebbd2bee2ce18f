//! REST client for the project-management backend.
//!
//! [`TaskApi`] is the seam the loader and submitter are written against;
//! [`HttpApi`] implements it over [`reqwest`]. Every endpoint lives under the
//! configured API base URL and uses DRF-style trailing slashes.

use std::future::Future;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::Config;
use crate::project::Project;
use crate::task::{CreatedTask, TaskCreateRequest};
use crate::user::{TeamMember, UserRecord};

/// Errors from the REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("Network error: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status code.
    #[error("Request failed with status code {status}")]
    Status {
        status: u16,
        /// Parsed JSON body, or the raw text as a JSON string when it is not JSON.
        body: serde_json::Value,
    },

    /// A 2xx body did not have the expected shape.
    #[error("Unexpected response from server: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("API token contains characters not allowed in a header")]
    InvalidToken,
}

impl ApiError {
    /// HTTP status code for backend-reported failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Response body for backend-reported failures.
    pub fn body(&self) -> Option<&serde_json::Value> {
        match self {
            ApiError::Status { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Backend operations used by the assign-task page.
///
/// Methods returning `Option` yield `None` when the backend answers
/// successfully with an absent (`null` or empty) body.
pub trait TaskApi: Send + Sync {
    /// `GET /accounts/users/{user_id}/`
    fn get_user(&self, user_id: &str) -> impl Future<Output = Result<Option<UserRecord>, ApiError>> + Send;

    /// `GET /accounts/manager/team/`
    fn get_team(&self) -> impl Future<Output = Result<Vec<TeamMember>, ApiError>> + Send;

    /// `GET /projects/projects/`
    fn get_projects(&self) -> impl Future<Output = Result<Option<Vec<Project>>, ApiError>> + Send;

    /// `POST /projects/tasks/`
    fn create_task(
        &self,
        request: &TaskCreateRequest,
    ) -> impl Future<Output = Result<CreatedTask, ApiError>> + Send;

    /// `GET /accounts/me/`
    fn current_user(&self) -> impl Future<Output = Result<Option<UserRecord>, ApiError>> + Send;
}

/// HTTP implementation of [`TaskApi`].
#[derive(Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base: Url,
}

impl HttpApi {
    /// Build a client from configuration, attaching the bearer token to
    /// every request when one is configured.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let base = Url::parse(&config.api_url).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(config.api_url.clone()));
        }

        let mut headers = HeaderMap::new();
        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ApiError::InvalidToken)?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self { client, base })
    }

    /// Resolve path segments against the base URL, percent-encoding each
    /// segment and appending the trailing slash the backend expects.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments)
            .push("");
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<Option<T>, ApiError> {
        let url = self.endpoint(segments)?;
        debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        Self::parse_optional(response).await
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code, capturing the body of
    /// failures so callers can inspect `detail` and field messages.
    async fn ensure_success(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text));
        debug!(status = status.as_u16(), %body, "request failed");
        Err(ApiError::Status { status: status.as_u16(), body })
    }

    async fn parse_optional<T: DeserializeOwned>(response: Response) -> Result<Option<T>, ApiError> {
        let bytes = Self::ensure_success(response).await?.bytes().await?;
        decode_optional(&bytes)
    }
}

/// Decode a successful body where an empty body or `null` means absent.
/// An empty JSON array is a value, not an absence.
fn decode_optional<T: DeserializeOwned>(bytes: &[u8]) -> Result<Option<T>, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let value: serde_json::Value = serde_json::from_slice(bytes)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_value(value)?))
}

impl TaskApi for HttpApi {
    async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>, ApiError> {
        self.get_json(&["accounts", "users", user_id]).await
    }

    async fn get_team(&self) -> Result<Vec<TeamMember>, ApiError> {
        Ok(self.get_json(&["accounts", "manager", "team"]).await?.unwrap_or_default())
    }

    async fn get_projects(&self) -> Result<Option<Vec<Project>>, ApiError> {
        self.get_json(&["projects", "projects"]).await
    }

    async fn create_task(&self, request: &TaskCreateRequest) -> Result<CreatedTask, ApiError> {
        let url = self.endpoint(&["projects", "tasks"])?;
        debug!(%url, ?request, "POST");
        let response = self.client.post(url).json(request).send().await?;
        let bytes = Self::ensure_success(response).await?.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn current_user(&self) -> Result<Option<UserRecord>, ApiError> {
        self.get_json(&["accounts", "me"]).await
    }
}
