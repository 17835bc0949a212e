//! core::render
//!
//! Renders a validated comment into a Markdown document with YAML
//! frontmatter.
//!
//! # Design
//!
//! Rendering is deterministic for a fixed comment and clock value: the
//! caller supplies the timestamp, and the same instant keys both the file
//! name and the frontmatter date. Two comments by the same sanitized author
//! in the same second therefore collide on path; the publish workflows
//! treat that as a duplicate rather than overwriting.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::core::comment::Comment;
use crate::core::naming::{safe_name, InvalidNameError};

/// Errors from rendering a comment document.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    InvalidName(#[from] InvalidNameError),

    #[error("failed to create comment directory '{}'", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize frontmatter")]
    Frontmatter(#[from] serde_yaml::Error),
}

/// A comment rendered to its repository path and file content.
///
/// `path` is the file location inside the content repository, joined with
/// forward slashes so it can be sent to a forge API as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub path: String,
    pub content: String,
}

/// YAML frontmatter block of a rendered comment.
///
/// Field order matters: `author` is emitted before `date`.
#[derive(Serialize)]
struct Frontmatter<'a> {
    author: &'a str,
    date: String,
}

/// Render a comment into a Markdown document under
/// `content_dir/archetype/page_id/comments_dir/`.
///
/// The target directory is created locally if absent; the call is
/// idempotent. The file name is `<YYYYMMDDHHMMSS>_<sanitized author>.md`
/// and the content is a YAML frontmatter block (`author`, UTC `date` with a
/// `Z` suffix) followed by a blank line and the message.
///
/// # Errors
///
/// Fails if the author sanitizes to nothing, or if the local directory
/// cannot be created.
pub fn render_comment(
    comment: &Comment,
    content_dir: &str,
    comments_dir: &str,
    timestamp: DateTime<Utc>,
) -> Result<RenderedDocument, RenderError> {
    let directory = join_segments(&[
        content_dir,
        comment.archetype(),
        comment.page_id(),
        comments_dir,
    ]);
    fs::create_dir_all(&directory).map_err(|source| RenderError::CreateDir {
        path: PathBuf::from(&directory),
        source,
    })?;

    let name = safe_name(comment.author(), "_")?;
    let path = format!("{directory}/{}_{name}.md", timestamp.format("%Y%m%d%H%M%S"));

    let frontmatter = serde_yaml::to_string(&Frontmatter {
        author: comment.author(),
        date: timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
    })?;
    let content = format!("---\n{frontmatter}---\n\n{}\n", comment.message());

    Ok(RenderedDocument { path, content })
}

/// Join path segments with single forward slashes.
fn join_segments(segments: &[&str]) -> String {
    segments
        .iter()
        .map(|s| s.trim_end_matches('/'))
        .collect::<Vec<_>>()
        .join("/")
}
