//! publish
//!
//! Publishing workflow entry point.
//!
//! Renders a validated comment into a Markdown document and dispatches it
//! to the configured workflow: a direct push onto the repository's default
//! branch, or a branch plus review request.

use chrono::Utc;

use crate::core::comment::Comment;
use crate::core::config::Settings;
use crate::core::render::render_comment;
use crate::forge::{Forge, PublishError};

/// Render a comment and publish it through the configured workflow.
///
/// With `git_push` enabled the document is committed straight onto the
/// repository's default branch; otherwise it goes through a branch and
/// review request targeting the configured target branch.
///
/// # Errors
///
/// - [`PublishError::DuplicateDocument`] if a document already exists at
///   the computed path
/// - [`PublishError::Render`] if the comment cannot be rendered
/// - [`PublishError::Forge`] for any other backend failure
pub async fn publish_comment(
    settings: &Settings,
    forge: &dyn Forge,
    comment: &Comment,
) -> Result<(), PublishError> {
    let document = render_comment(
        comment,
        &settings.content_dir,
        &settings.comments_dir,
        Utc::now(),
    )?;

    tracing::debug!(path = %document.path, "rendered comment document");

    if settings.git_push {
        forge
            .publish_to_default_branch(&document, comment.author())
            .await?;
    } else {
        forge.publish_via_review(&document, comment.author()).await?;
    }

    tracing::info!(
        forge = forge.name(),
        path = %document.path,
        workflow = if settings.git_push { "direct-push" } else { "review" },
        "comment published"
    );

    Ok(())
}
