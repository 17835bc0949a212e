//! forge::mock
//!
//! Mock forge implementation for deterministic testing.
//!
//! # Design
//!
//! The mock forge keeps branches, files, and opened reviews in memory and
//! allows configuring failure scenarios. Branch-name collisions come out
//! of the seeded branch set, so retry behavior can be tested without any
//! failure injection.
//!
//! # Example
//!
//! ```
//! use commentarium::forge::mock::MockForge;
//! use commentarium::forge::{Forge, PushFileRequest};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let forge = MockForge::new().with_default_branch("trunk");
//!
//! forge.push_file_to_branch(PushFileRequest {
//!     branch: "trunk".to_string(),
//!     path: "content/a.md".to_string(),
//!     content: "hello".to_string(),
//!     commit_message: "Add a.md".to_string(),
//! }).await.unwrap();
//!
//! assert!(forge.has_file("trunk", "content/a.md"));
//! # });
//! ```

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::traits::{CreateReviewRequest, Forge, ForgeError, PushFileRequest};

/// Mock forge for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone)]
pub struct MockForge {
    /// Branch that review requests target.
    target_branch: String,
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockForgeInner>>,
}

/// Internal mutable state.
#[derive(Debug)]
struct MockForgeInner {
    /// The repository's default branch.
    default_branch: String,
    /// Existing branch names.
    branches: Vec<String>,
    /// Committed files.
    files: Vec<MockFile>,
    /// Opened reviews.
    reviews: Vec<MockReview>,
    /// Operation to fail (for testing error paths).
    fail_on: Option<FailOn>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

/// A file committed to the mock forge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockFile {
    pub branch: String,
    pub path: String,
    pub content: String,
    pub commit_message: String,
}

/// A review opened on the mock forge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockReview {
    pub branch: String,
    pub target_branch: String,
    pub title: String,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail get_default_branch with the given error.
    GetDefaultBranch(ForgeError),
    /// Fail check_file_exists with the given error.
    CheckFileExists(ForgeError),
    /// Fail push_file_to_branch with the given error.
    PushFile(ForgeError),
    /// Fail create_branch_and_open_review with the given error.
    CreateReview(ForgeError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone)]
pub enum MockOperation {
    GetDefaultBranch,
    CheckFileExists {
        branch: String,
        path: String,
    },
    PushFile {
        branch: String,
        path: String,
        commit_message: String,
    },
    CreateReview {
        branch: String,
        target_branch: String,
        title: String,
    },
}

impl MockForge {
    /// Create a new mock forge with `main` as both default and target branch.
    pub fn new() -> Self {
        Self {
            target_branch: "main".to_string(),
            inner: Arc::new(Mutex::new(MockForgeInner {
                default_branch: "main".to_string(),
                branches: vec!["main".to_string()],
                files: Vec::new(),
                reviews: Vec::new(),
                fail_on: None,
                operations: Vec::new(),
            })),
        }
    }

    /// Set the default branch (and make sure it exists).
    pub fn with_default_branch(self, name: impl Into<String>) -> Self {
        {
            let name = name.into();
            let mut inner = self.inner.lock().unwrap();
            inner.default_branch = name.clone();
            if !inner.branches.contains(&name) {
                inner.branches.push(name);
            }
        }
        self
    }

    /// Set the target branch (and make sure it exists).
    pub fn with_target_branch(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        {
            let mut inner = self.inner.lock().unwrap();
            if !inner.branches.contains(&name) {
                inner.branches.push(name.clone());
            }
        }
        self.target_branch = name;
        self
    }

    /// Seed an existing branch, e.g. to provoke a name collision.
    pub fn with_existing_branch(self, name: impl Into<String>) -> Self {
        {
            let name = name.into();
            let mut inner = self.inner.lock().unwrap();
            if !inner.branches.contains(&name) {
                inner.branches.push(name);
            }
        }
        self
    }

    /// Seed an existing file on a branch.
    pub fn with_existing_file(self, branch: impl Into<String>, path: impl Into<String>) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.files.push(MockFile {
                branch: branch.into(),
                path: path.into(),
                content: String::new(),
                commit_message: String::new(),
            });
        }
        self
    }

    /// Configure the mock to fail on a specific operation.
    ///
    /// # Example
    ///
    /// ```
    /// use commentarium::forge::mock::{MockForge, FailOn};
    /// use commentarium::forge::ForgeError;
    ///
    /// let forge = MockForge::new()
    ///     .fail_on(FailOn::PushFile(ForgeError::RateLimited));
    /// ```
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.fail_on = Some(fail_on);
        }
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_on = None;
    }

    /// Get all recorded operations.
    ///
    /// Useful for verifying the mock was called correctly.
    pub fn operations(&self) -> Vec<MockOperation> {
        let inner = self.inner.lock().unwrap();
        inner.operations.clone()
    }

    /// Clear recorded operations.
    pub fn clear_operations(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.clear();
    }

    /// Check whether a file exists (for test verification).
    pub fn has_file(&self, branch: &str, path: &str) -> bool {
        let inner = self.inner.lock().unwrap();
        inner
            .files
            .iter()
            .any(|f| f.branch == branch && f.path == path)
    }

    /// Get all committed files (for test verification).
    pub fn files(&self) -> Vec<MockFile> {
        let inner = self.inner.lock().unwrap();
        inner.files.clone()
    }

    /// Get all existing branch names (for test verification).
    pub fn branches(&self) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        inner.branches.clone()
    }

    /// Get all opened reviews (for test verification).
    pub fn reviews(&self) -> Vec<MockReview> {
        let inner = self.inner.lock().unwrap();
        inner.reviews.clone()
    }

    /// Record an operation.
    fn record(&self, op: MockOperation) {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(op);
    }

    /// Check if we should fail and return the error if so.
    fn check_fail<T>(&self, expected: &str) -> Option<Result<T, ForgeError>> {
        let inner = self.inner.lock().unwrap();
        match &inner.fail_on {
            Some(FailOn::GetDefaultBranch(e)) if expected == "get_default_branch" => {
                Some(Err(e.clone()))
            }
            Some(FailOn::CheckFileExists(e)) if expected == "check_file_exists" => {
                Some(Err(e.clone()))
            }
            Some(FailOn::PushFile(e)) if expected == "push_file_to_branch" => Some(Err(e.clone())),
            Some(FailOn::CreateReview(e)) if expected == "create_branch_and_open_review" => {
                Some(Err(e.clone()))
            }
            _ => None,
        }
    }
}

impl Default for MockForge {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Forge for MockForge {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn get_default_branch(&self) -> Result<String, ForgeError> {
        self.record(MockOperation::GetDefaultBranch);

        if let Some(result) = self.check_fail("get_default_branch") {
            return result;
        }

        let inner = self.inner.lock().unwrap();
        Ok(inner.default_branch.clone())
    }

    fn get_target_branch(&self) -> &str {
        &self.target_branch
    }

    async fn check_file_exists(&self, branch: &str, path: &str) -> Result<bool, ForgeError> {
        self.record(MockOperation::CheckFileExists {
            branch: branch.to_string(),
            path: path.to_string(),
        });

        if let Some(result) = self.check_fail("check_file_exists") {
            return result;
        }

        let inner = self.inner.lock().unwrap();
        Ok(inner
            .files
            .iter()
            .any(|f| f.branch == branch && f.path == path))
    }

    async fn push_file_to_branch(&self, request: PushFileRequest) -> Result<(), ForgeError> {
        self.record(MockOperation::PushFile {
            branch: request.branch.clone(),
            path: request.path.clone(),
            commit_message: request.commit_message.clone(),
        });

        if let Some(result) = self.check_fail::<()>("push_file_to_branch") {
            return result;
        }

        let mut inner = self.inner.lock().unwrap();
        if inner
            .files
            .iter()
            .any(|f| f.branch == request.branch && f.path == request.path)
        {
            return Err(ForgeError::ApiError {
                status: 400,
                message: "A file with this name already exists".into(),
            });
        }

        inner.files.push(MockFile {
            branch: request.branch,
            path: request.path,
            content: request.content,
            commit_message: request.commit_message,
        });
        Ok(())
    }

    async fn create_branch_and_open_review(
        &self,
        request: CreateReviewRequest,
    ) -> Result<(), ForgeError> {
        self.record(MockOperation::CreateReview {
            branch: request.branch.clone(),
            target_branch: request.target_branch.clone(),
            title: request.title.clone(),
        });

        if let Some(result) = self.check_fail::<()>("create_branch_and_open_review") {
            return result;
        }

        let mut inner = self.inner.lock().unwrap();
        if inner.branches.contains(&request.branch) {
            return Err(ForgeError::BranchExists(request.branch));
        }

        inner.branches.push(request.branch.clone());
        inner.files.push(MockFile {
            branch: request.branch.clone(),
            path: request.path,
            content: request.content,
            commit_message: request.commit_message,
        });
        inner.reviews.push(MockReview {
            branch: request.branch,
            target_branch: request.target_branch,
            title: request.title,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_request(branch: &str, path: &str) -> PushFileRequest {
        PushFileRequest {
            branch: branch.to_string(),
            path: path.to_string(),
            content: "content".to_string(),
            commit_message: "Add file".to_string(),
        }
    }

    fn review_request(branch: &str) -> CreateReviewRequest {
        CreateReviewRequest {
            branch: branch.to_string(),
            target_branch: "main".to_string(),
            path: "content/a.md".to_string(),
            content: "content".to_string(),
            commit_message: "Add file".to_string(),
            title: "Review".to_string(),
        }
    }

    #[tokio::test]
    async fn default_branch_is_configurable() {
        let forge = MockForge::new().with_default_branch("trunk");
        assert_eq!(forge.get_default_branch().await.unwrap(), "trunk");
    }

    #[tokio::test]
    async fn check_file_exists_sees_seeded_files() {
        let forge = MockForge::new().with_existing_file("main", "content/a.md");

        assert!(forge.check_file_exists("main", "content/a.md").await.unwrap());
        assert!(!forge.check_file_exists("main", "content/b.md").await.unwrap());
        // Same path on another branch is a different file.
        assert!(!forge.check_file_exists("dev", "content/a.md").await.unwrap());
    }

    #[tokio::test]
    async fn push_file_stores_content_and_message() {
        let forge = MockForge::new();

        forge
            .push_file_to_branch(push_request("main", "content/a.md"))
            .await
            .unwrap();

        let files = forge.files();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].content, "content");
        assert_eq!(files[0].commit_message, "Add file");
    }

    #[tokio::test]
    async fn push_duplicate_file_fails() {
        let forge = MockForge::new().with_existing_file("main", "content/a.md");

        let result = forge.push_file_to_branch(push_request("main", "content/a.md")).await;
        assert!(matches!(result, Err(ForgeError::ApiError { status: 400, .. })));
    }

    #[tokio::test]
    async fn create_review_creates_branch_file_and_review() {
        let forge = MockForge::new();

        forge
            .create_branch_and_open_review(review_request("jane-2024-01-02"))
            .await
            .unwrap();

        assert!(forge.branches().contains(&"jane-2024-01-02".to_string()));
        assert!(forge.has_file("jane-2024-01-02", "content/a.md"));
        let reviews = forge.reviews();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].target_branch, "main");
    }

    #[tokio::test]
    async fn existing_branch_signals_branch_exists() {
        let forge = MockForge::new().with_existing_branch("jane-2024-01-02");

        let result = forge
            .create_branch_and_open_review(review_request("jane-2024-01-02"))
            .await;

        assert!(matches!(result, Err(ForgeError::BranchExists(_))));
        // Nothing committed, no review opened.
        assert!(forge.files().is_empty());
        assert!(forge.reviews().is_empty());
    }

    #[tokio::test]
    async fn fail_on_check_file_exists() {
        let forge = MockForge::new().fail_on(FailOn::CheckFileExists(ForgeError::NetworkError(
            "connection refused".into(),
        )));

        let result = forge.check_file_exists("main", "content/a.md").await;
        assert!(matches!(result, Err(ForgeError::NetworkError(_))));

        forge.clear_fail_on();
        assert!(!forge.check_file_exists("main", "content/a.md").await.unwrap());
    }

    #[tokio::test]
    async fn operations_recorded_in_order() {
        let forge = MockForge::new();

        forge.get_default_branch().await.unwrap();
        forge.check_file_exists("main", "content/a.md").await.unwrap();
        forge
            .push_file_to_branch(push_request("main", "content/a.md"))
            .await
            .unwrap();

        let ops = forge.operations();
        assert_eq!(ops.len(), 3);
        assert!(matches!(ops[0], MockOperation::GetDefaultBranch));
        assert!(matches!(ops[1], MockOperation::CheckFileExists { .. }));
        assert!(matches!(ops[2], MockOperation::PushFile { .. }));
    }

    #[test]
    fn forge_name() {
        let forge = MockForge::new();
        assert_eq!(forge.name(), "mock");
        assert_eq!(forge.get_target_branch(), "main");
    }
}
