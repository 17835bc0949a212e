//! forge::gitlab
//!
//! GitLab forge implementation using the REST API (v4).
//!
//! # Design
//!
//! This module implements the `Forge` trait against GitLab's project API:
//! - `GET  /projects/:id` for default-branch discovery
//! - `GET  /projects/:id/repository/files/:path` for existence checks
//! - `POST /projects/:id/repository/files/:path` for file creation
//! - `POST /projects/:id/repository/branches` for branch creation
//! - `POST /projects/:id/merge_requests` for review creation
//!
//! Branch-plus-review creation is three sequential calls. A failure after
//! branch creation leaves the branch behind on the forge; the next publish
//! attempt picks a fresh branch name, so leftovers are inert.
//!
//! # Authentication
//!
//! A personal or project access token is sent in the `PRIVATE-TOKEN`
//! header on every request. The token is supplied once at construction and
//! never logged; the `Debug` impl redacts it.
//!
//! # Rate Limiting
//!
//! GitLab has rate limits. This implementation returns
//! `ForgeError::RateLimited` when limits are hit and does not retry
//! (caller's responsibility).
//!
//! # Example
//!
//! ```ignore
//! use commentarium::forge::gitlab::GitLabForge;
//! use commentarium::forge::Forge;
//!
//! let forge = GitLabForge::new("glpat-xxx", 278964, "https://gitlab.com", "main");
//! let default_branch = forge.get_default_branch().await?;
//! ```

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::{CreateReviewRequest, Forge, ForgeError, PushFileRequest};

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = "commentarium";

/// GitLab forge implementation.
///
/// Talks to one project, identified by its numeric id, on one GitLab
/// instance. Connection details are immutable after construction; the
/// `reqwest` client is reused across requests.
pub struct GitLabForge {
    /// HTTP client for making requests
    client: Client,
    /// Personal or project access token
    token: String,
    /// Numeric project identifier
    project_id: u64,
    /// API base URL including the `/api/v4` suffix
    api_base: String,
    /// Branch that review requests target
    target_branch: String,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for GitLabForge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitLabForge")
            .field("token", &"[REDACTED]")
            .field("project_id", &self.project_id)
            .field("api_base", &self.api_base)
            .field("target_branch", &self.target_branch)
            .finish()
    }
}

impl GitLabForge {
    /// Create a new GitLab forge.
    ///
    /// # Arguments
    ///
    /// * `token` - Personal or project access token
    /// * `project_id` - Numeric project identifier
    /// * `base_url` - Instance URL (e.g., `https://gitlab.com`); the
    ///   `/api/v4` suffix is appended here
    /// * `target_branch` - Branch that review requests target
    pub fn new(
        token: impl Into<String>,
        project_id: u64,
        base_url: impl Into<String>,
        target_branch: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            client: Client::new(),
            token: token.into(),
            project_id,
            api_base: format!("{}/api/v4", base_url.trim_end_matches('/')),
            target_branch: target_branch.into(),
        }
    }

    /// Get the numeric project identifier.
    pub fn project_id(&self) -> u64 {
        self.project_id
    }

    /// Build common headers for API requests.
    fn headers(&self) -> Result<HeaderMap, ForgeError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "PRIVATE-TOKEN",
            HeaderValue::from_str(&self.token)
                .map_err(|_| ForgeError::AuthFailed("token contains invalid characters".into()))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        Ok(headers)
    }

    /// Build URL for a project endpoint.
    fn project_url(&self, path: &str) -> String {
        if path.is_empty() {
            format!("{}/projects/{}", self.api_base, self.project_id)
        } else {
            format!("{}/projects/{}/{}", self.api_base, self.project_id, path)
        }
    }

    /// Build URL for a repository file endpoint.
    ///
    /// The file path is a single URL segment on this endpoint, so slashes
    /// are percent-encoded.
    fn file_url(&self, path: &str) -> String {
        self.project_url(&format!("repository/files/{}", urlencoding::encode(path)))
    }

    /// Handle API response, mapping errors appropriately.
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: Response,
    ) -> Result<T, ForgeError> {
        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(|e| ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("failed to parse response: {}", e),
            })
        } else {
            Self::handle_error_response(response, status).await
        }
    }

    /// Handle API response where the body is not needed.
    async fn handle_empty_response(&self, response: Response) -> Result<(), ForgeError> {
        let status = response.status();

        if status.is_success() {
            Ok(())
        } else {
            Self::handle_error_response(response, status).await
        }
    }

    /// Handle an error response from the API.
    async fn handle_error_response<T>(
        response: Response,
        status: StatusCode,
    ) -> Result<T, ForgeError> {
        let message = Self::error_body_message(response).await;

        Err(match status {
            StatusCode::UNAUTHORIZED => ForgeError::AuthFailed("invalid or expired token".into()),
            StatusCode::FORBIDDEN => {
                ForgeError::AuthFailed(format!("permission denied: {}", message))
            }
            StatusCode::NOT_FOUND => ForgeError::NotFound(message),
            StatusCode::TOO_MANY_REQUESTS => ForgeError::RateLimited,
            _ if status.is_server_error() => ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("GitLab server error: {}", message),
            },
            _ => ForgeError::ApiError {
                status: status.as_u16(),
                message,
            },
        })
    }

    /// Extract a human-readable message from an error response body.
    ///
    /// GitLab reports errors as `{"message": ...}` where the value is
    /// usually a string but can be an array or object on validation
    /// failures, or as `{"error": "..."}` on auth endpoints.
    async fn error_body_message(response: Response) -> String {
        match response.json::<GitLabErrorResponse>().await {
            Ok(body) => body.into_message(),
            Err(_) => "unknown error".to_string(),
        }
    }

    /// Create a branch from a reference.
    ///
    /// Maps GitLab's "Branch already exists" answer to
    /// `ForgeError::BranchExists` so the review workflow can retry with a
    /// fresh name.
    async fn create_branch(&self, branch: &str, reference: &str) -> Result<(), ForgeError> {
        debug!(branch, reference, "creating branch");
        let url = self.project_url("repository/branches");
        let body = CreateBranchBody {
            branch,
            r#ref: reference,
        };

        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        // GitLab answers 400 (older versions 409) when the name is taken.
        if status == StatusCode::BAD_REQUEST || status == StatusCode::CONFLICT {
            let message = Self::error_body_message(response).await;
            if message.to_ascii_lowercase().contains("already exists") {
                return Err(ForgeError::BranchExists(branch.to_string()));
            }
            return Err(ForgeError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        Self::handle_error_response(response, status).await
    }

    /// Commit a new file onto a branch.
    async fn create_file(
        &self,
        branch: &str,
        path: &str,
        content: &str,
        commit_message: &str,
    ) -> Result<(), ForgeError> {
        debug!(path, branch, "creating file");
        let url = self.file_url(path);
        let body = CreateFileBody {
            branch,
            content,
            commit_message,
        };

        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;

        self.handle_empty_response(response).await
    }

    /// Open a merge request proposing `source_branch` into `target_branch`.
    async fn create_merge_request(
        &self,
        source_branch: &str,
        target_branch: &str,
        title: &str,
    ) -> Result<(), ForgeError> {
        debug!(source_branch, target_branch, "opening merge request");
        let url = self.project_url("merge_requests");
        let body = CreateMergeRequestBody {
            source_branch,
            target_branch,
            title,
        };

        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;

        self.handle_empty_response(response).await
    }
}

#[async_trait]
impl Forge for GitLabForge {
    fn name(&self) -> &'static str {
        "gitlab"
    }

    async fn get_default_branch(&self) -> Result<String, ForgeError> {
        let url = self.project_url("");

        let response = self
            .client
            .get(&url)
            .headers(self.headers()?)
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;

        let project: GitLabProject = self.handle_response(response).await?;
        project
            .default_branch
            .ok_or_else(|| ForgeError::NotFound("project has no default branch".to_string()))
    }

    fn get_target_branch(&self) -> &str {
        &self.target_branch
    }

    async fn check_file_exists(&self, branch: &str, path: &str) -> Result<bool, ForgeError> {
        let url = self.file_url(path);

        let response = self
            .client
            .get(&url)
            .headers(self.headers()?)
            .query(&[("ref", branch)])
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(true);
        }
        if status == StatusCode::NOT_FOUND {
            return Ok(false);
        }

        Self::handle_error_response(response, status).await
    }

    async fn push_file_to_branch(&self, request: PushFileRequest) -> Result<(), ForgeError> {
        self.create_file(
            &request.branch,
            &request.path,
            &request.content,
            &request.commit_message,
        )
        .await
    }

    async fn create_branch_and_open_review(
        &self,
        request: CreateReviewRequest,
    ) -> Result<(), ForgeError> {
        self.create_branch(&request.branch, &request.target_branch)
            .await?;
        self.create_file(
            &request.branch,
            &request.path,
            &request.content,
            &request.commit_message,
        )
        .await?;
        self.create_merge_request(&request.branch, &request.target_branch, &request.title)
            .await
    }
}

// --------------------------------------------------------------------------
// API Request/Response Types
// --------------------------------------------------------------------------

/// Request body for creating a file.
#[derive(Serialize)]
struct CreateFileBody<'a> {
    branch: &'a str,
    content: &'a str,
    commit_message: &'a str,
}

/// Request body for creating a branch.
#[derive(Serialize)]
struct CreateBranchBody<'a> {
    branch: &'a str,
    r#ref: &'a str,
}

/// Request body for creating a merge request.
#[derive(Serialize)]
struct CreateMergeRequestBody<'a> {
    source_branch: &'a str,
    target_branch: &'a str,
    title: &'a str,
}

/// GitLab project response format (subset).
#[derive(Deserialize)]
struct GitLabProject {
    /// `null` for projects without any commits
    default_branch: Option<String>,
}

/// GitLab error response format.
#[derive(Deserialize)]
struct GitLabErrorResponse {
    #[serde(default)]
    message: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

impl GitLabErrorResponse {
    fn into_message(self) -> String {
        match (self.message, self.error) {
            (Some(serde_json::Value::String(s)), _) => s,
            (Some(other), _) => other.to_string(),
            (None, Some(error)) => error,
            (None, None) => "unknown error".to_string(),
        }
    }
}
