//! forge::traits
//!
//! Forge trait definition for publishing comment documents to remote
//! hosting services.
//!
//! # Design
//!
//! Backends implement five primitives: default-branch discovery, target
//! branch lookup, a file existence check, a direct file push, and an
//! atomic branch-plus-review creation. The two publishing workflows are
//! provided methods of the trait itself, written purely in terms of those
//! primitives, so every backend shares one orchestration implementation.
//!
//! The `Forge` trait is async because forge operations involve network
//! I/O. All methods return `Result` to handle API errors gracefully.
//!
//! # Example
//!
//! ```ignore
//! use commentarium::core::render::RenderedDocument;
//! use commentarium::forge::{Forge, PublishError};
//!
//! async fn publish(forge: &dyn Forge, doc: &RenderedDocument) -> Result<(), PublishError> {
//!     forge.publish_to_default_branch(doc, "Jane Doe").await
//! }
//! ```

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use thiserror::Error;

use crate::core::naming::{safe_name, InvalidNameError};
use crate::core::render::{RenderError, RenderedDocument};

/// Errors from forge operations.
///
/// These error types map to common failure modes when interacting with
/// remote hosting services like GitLab.
#[derive(Debug, Clone, Error)]
pub enum ForgeError {
    /// Authentication failed (invalid token, expired, insufficient permissions).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A branch with the requested name already exists.
    ///
    /// Consumed by [`Forge::publish_via_review`] to drive its retry loop;
    /// callers outside the workflow never observe it.
    #[error("branch already exists: {0}")]
    BranchExists(String),

    /// Rate limit exceeded.
    #[error("rate limited")]
    RateLimited,

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    NetworkError(String),
}

/// Errors from the publishing workflows.
///
/// This is the boundary the HTTP layer maps to response codes: a
/// duplicate is a conflict, everything else is a generic failure.
#[derive(Debug, Error)]
pub enum PublishError {
    /// A document already exists at the computed path on the relevant branch.
    #[error("comment already exists at '{0}'")]
    DuplicateDocument(String),

    /// The author name sanitized to nothing.
    #[error(transparent)]
    InvalidName(#[from] InvalidNameError),

    /// The comment could not be rendered into a document.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Any other backend failure during push, branch, or review creation.
    #[error("failed to create comment: {0}")]
    Forge(#[from] ForgeError),
}

/// Request to push a file directly onto an existing branch.
#[derive(Debug, Clone)]
pub struct PushFileRequest {
    /// Branch to commit onto
    pub branch: String,
    /// Repository path of the new file
    pub path: String,
    /// File content
    pub content: String,
    /// Commit message
    pub commit_message: String,
}

/// Request to create a branch, commit a file onto it, and open a review.
#[derive(Debug, Clone)]
pub struct CreateReviewRequest {
    /// Name of the branch to create
    pub branch: String,
    /// Branch the new branch forks from and the review merges into
    pub target_branch: String,
    /// Repository path of the new file
    pub path: String,
    /// File content
    pub content: String,
    /// Commit message
    pub commit_message: String,
    /// Review request title
    pub title: String,
}

/// Standardized review request title.
pub fn review_title(name: &str) -> String {
    format!("\u{1f4ac} Add comment from {name}")
}

/// Standardized commit message. Identical to the review title.
pub fn commit_message(name: &str) -> String {
    review_title(name)
}

/// Generate a candidate branch name: the sanitized name, an optional
/// numeric disambiguation suffix, and the date.
///
/// # Errors
///
/// Fails if the name sanitizes to nothing.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use commentarium::forge::branch_name;
///
/// let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
/// assert_eq!(branch_name("Jane Doe", None, date).unwrap(), "Jane-Doe-2024-01-02");
/// assert_eq!(branch_name("Jane Doe", Some(3), date).unwrap(), "Jane-Doe-3-2024-01-02");
/// ```
pub fn branch_name(
    name: &str,
    suffix: Option<u32>,
    date: NaiveDate,
) -> Result<String, InvalidNameError> {
    let base = match suffix {
        Some(n) => safe_name(&format!("{name}-{n}"), "-")?,
        None => safe_name(name, "-")?,
    };
    Ok(format!("{base}-{}", date.format("%Y-%m-%d")))
}

/// The Forge trait for publishing comment documents to remote hosting
/// services.
///
/// Backends implement the five primitives; the two publishing workflows
/// ([`Forge::publish_to_default_branch`] and [`Forge::publish_via_review`])
/// are provided and shared across backends.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// Primitives return `Result<T, ForgeError>`. Backends translate their
/// API's failure modes into three conditions the workflows recognize:
/// "not found" (benign, drives the existence check), "already exists"
/// (`BranchExists` for branch creation), and everything else (surfaced
/// through [`PublishError`]).
#[async_trait]
pub trait Forge: Send + Sync {
    /// Get the forge name (e.g., "gitlab").
    fn name(&self) -> &'static str;

    /// Resolve the repository's default branch name.
    ///
    /// # Errors
    ///
    /// - `AuthFailed` if the token is invalid or lacks permissions
    /// - `NotFound` if the project doesn't exist
    async fn get_default_branch(&self) -> Result<String, ForgeError>;

    /// The statically configured branch that reviews target.
    fn get_target_branch(&self) -> &str;

    /// Check whether a file exists at `path` on `branch`.
    ///
    /// A missing file is not an error; it returns `Ok(false)`.
    async fn check_file_exists(&self, branch: &str, path: &str) -> Result<bool, ForgeError>;

    /// Commit a new file directly onto an existing branch.
    ///
    /// # Errors
    ///
    /// - `ApiError` if the file cannot be created (e.g., it already exists)
    async fn push_file_to_branch(&self, request: PushFileRequest) -> Result<(), ForgeError>;

    /// Create a branch from the target branch, commit the file onto it,
    /// and open a review request proposing it into the target branch.
    ///
    /// # Errors
    ///
    /// - `BranchExists` if a branch with the requested name already exists
    /// - `ApiError` for any other creation failure
    async fn create_branch_and_open_review(
        &self,
        request: CreateReviewRequest,
    ) -> Result<(), ForgeError>;

    /// Workflow A: push the document straight to the default branch.
    ///
    /// Resolves the default branch, fails with
    /// [`PublishError::DuplicateDocument`] if the document path already
    /// exists there, then commits it with the standardized message.
    async fn publish_to_default_branch(
        &self,
        document: &RenderedDocument,
        author: &str,
    ) -> Result<(), PublishError> {
        let default_branch = self.get_default_branch().await?;

        if self
            .check_file_exists(&default_branch, &document.path)
            .await?
        {
            return Err(PublishError::DuplicateDocument(document.path.clone()));
        }

        self.push_file_to_branch(PushFileRequest {
            branch: default_branch,
            path: document.path.clone(),
            content: document.content.clone(),
            commit_message: commit_message(author),
        })
        .await?;

        Ok(())
    }

    /// Workflow B: publish the document through a branch and review.
    ///
    /// Checks the target branch for a pre-existing document, then
    /// repeatedly attempts branch-plus-review creation. Each
    /// [`ForgeError::BranchExists`] answer increments the branch name's
    /// numeric suffix (1, 2, 3, ...); the loop has no upper bound. Any
    /// other failure stops the loop.
    async fn publish_via_review(
        &self,
        document: &RenderedDocument,
        author: &str,
    ) -> Result<(), PublishError> {
        let target_branch = self.get_target_branch().to_string();

        if self
            .check_file_exists(&target_branch, &document.path)
            .await?
        {
            return Err(PublishError::DuplicateDocument(document.path.clone()));
        }

        let message = commit_message(author);
        let title = review_title(author);
        let mut suffix: Option<u32> = None;

        loop {
            let branch = branch_name(author, suffix, Utc::now().date_naive())?;
            let request = CreateReviewRequest {
                branch,
                target_branch: target_branch.clone(),
                path: document.path.clone(),
                content: document.content.clone(),
                commit_message: message.clone(),
                title: title.clone(),
            };

            match self.create_branch_and_open_review(request).await {
                Ok(()) => return Ok(()),
                Err(ForgeError::BranchExists(taken)) => {
                    suffix = Some(suffix.map_or(1, |n| n + 1));
                    tracing::debug!(branch = %taken, "branch name taken, retrying with suffix");
                }
                Err(other) => return Err(PublishError::Forge(other)),
            }
        }
    }
}
