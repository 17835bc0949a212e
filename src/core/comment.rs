//! core::comment
//!
//! Validated comment input model.
//!
//! # Validation
//!
//! A [`Comment`] can only be constructed through [`Comment::new`], which
//! trims each field and enforces length and character-set constraints.
//! Deserialization routes through the same checks via `try_from`, so a
//! `Comment` arriving from the HTTP layer is always well formed.

use serde::Deserialize;
use thiserror::Error;

/// Archetype used when the payload does not carry one.
pub const DEFAULT_ARCHETYPE: &str = "default";

/// Errors from comment validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommentError {
    #[error("author must be between 1 and 64 characters")]
    AuthorLength,

    #[error("message must be between 1 and 1024 characters")]
    MessageLength,

    #[error("archetype must be between 1 and 32 characters")]
    ArchetypeLength,

    #[error("archetype must contain only alphabetic characters")]
    ArchetypeNotAlphabetic,

    #[error("page id must be between 1 and 1024 characters")]
    PageIdLength,

    #[error("page id must contain only ASCII characters")]
    PageIdNotAscii,
}

/// A validated, immutable user comment.
///
/// Field constraints:
/// - `author`: 1-64 characters after trimming
/// - `message`: 1-1024 characters after trimming
/// - `archetype`: 1-32 alphabetic characters, defaults to `"default"`
/// - `page_id`: 1-1024 ASCII characters
///
/// # Example
///
/// ```
/// use commentarium::core::comment::Comment;
///
/// let comment = Comment::new("Jane Doe", "Nice post!", "reader", "hello-world").unwrap();
/// assert_eq!(comment.author(), "Jane Doe");
///
/// assert!(Comment::new("", "Nice post!", "reader", "hello-world").is_err());
/// assert!(Comment::new("Jane", "hi", "not-alpha!", "hello-world").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "CommentPayload")]
pub struct Comment {
    author: String,
    message: String,
    archetype: String,
    page_id: String,
}

/// Wire shape of a comment before validation.
///
/// `archetype` is optional on the wire; a missing value falls back to
/// [`DEFAULT_ARCHETYPE`].
#[derive(Debug, Clone, Deserialize)]
pub struct CommentPayload {
    pub author: String,
    pub message: String,
    #[serde(default)]
    pub archetype: Option<String>,
    pub page_id: String,
}

impl Comment {
    /// Create a validated comment.
    ///
    /// All fields are trimmed before validation and stored trimmed.
    ///
    /// # Errors
    ///
    /// Returns the first failing [`CommentError`] constraint.
    pub fn new(
        author: impl Into<String>,
        message: impl Into<String>,
        archetype: impl Into<String>,
        page_id: impl Into<String>,
    ) -> Result<Self, CommentError> {
        let author = author.into().trim().to_string();
        let message = message.into().trim().to_string();
        let archetype = archetype.into().trim().to_string();
        let page_id = page_id.into().trim().to_string();

        if !char_count_in(&author, 1, 64) {
            return Err(CommentError::AuthorLength);
        }
        if !char_count_in(&message, 1, 1024) {
            return Err(CommentError::MessageLength);
        }
        if !char_count_in(&archetype, 1, 32) {
            return Err(CommentError::ArchetypeLength);
        }
        if !archetype.chars().all(char::is_alphabetic) {
            return Err(CommentError::ArchetypeNotAlphabetic);
        }
        if !char_count_in(&page_id, 1, 1024) {
            return Err(CommentError::PageIdLength);
        }
        if !page_id.is_ascii() {
            return Err(CommentError::PageIdNotAscii);
        }

        Ok(Self {
            author,
            message,
            archetype,
            page_id,
        })
    }

    /// Name of the commenter.
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Comment message body.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Content category the commented page belongs to.
    pub fn archetype(&self) -> &str {
        &self.archetype
    }

    /// Identifier of the commented page.
    pub fn page_id(&self) -> &str {
        &self.page_id
    }
}

impl TryFrom<CommentPayload> for Comment {
    type Error = CommentError;

    fn try_from(payload: CommentPayload) -> Result<Self, Self::Error> {
        let archetype = payload
            .archetype
            .unwrap_or_else(|| DEFAULT_ARCHETYPE.to_string());
        Comment::new(payload.author, payload.message, archetype, payload.page_id)
    }
}

/// Check that a string's character count lies in `min..=max`.
fn char_count_in(s: &str, min: usize, max: usize) -> bool {
    let count = s.chars().count();
    count >= min && count <= max
}
