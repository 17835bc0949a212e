//! Commentarium - a service that publishes reader comments into a
//! Git-hosted site as Markdown documents.
//!
//! A comment arrives over HTTP, is validated and rendered into a Markdown
//! file with YAML frontmatter, and is published into the site's content
//! repository on a remote forge: either committed straight onto the
//! default branch, or proposed through a branch plus review request.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`core`] - Domain types: comment validation, name sanitization,
//!   document rendering, and configuration
//! - [`forge`] - Abstraction for remote forges (GitLab today), including
//!   the two publishing workflows
//! - [`publish`] - Entry point tying rendering to the configured workflow
//! - [`server`] - HTTP endpoint layer
//!
//! # Correctness Invariants
//!
//! 1. A `Comment` cannot exist with invalid fields; validation happens at
//!    construction
//! 2. A document is never pushed onto a path that already exists on the
//!    target branch
//! 3. Branch-name collisions never overwrite; they retry under a new name

pub mod core;
pub mod forge;
pub mod publish;
pub mod server;
