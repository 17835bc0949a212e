//! forge
//!
//! Abstraction for remote forges (GitLab today, others behind the same
//! trait).
//!
//! # Architecture
//!
//! The [`Forge`] trait defines five primitives a backend must provide.
//! The publishing workflows (`publish_to_default_branch` and
//! `publish_via_review`) are provided methods built only on those
//! primitives, so every backend gets the duplicate check and the
//! branch-name retry loop for free. The server builds its forge through
//! the [`create_forge`] factory rather than importing an implementation
//! directly.
//!
//! # Modules
//!
//! - `traits`: Core `Forge` trait, request types, and publish workflows
//! - [`gitlab`]: GitLab implementation using the REST API v4
//! - [`mock`]: Mock implementation for deterministic testing
//! - `factory`: Forge selection and creation
//!
//! # Example
//!
//! ```ignore
//! use commentarium::forge::create_forge;
//!
//! let forge = create_forge(&settings)?;
//!
//! // Publish a rendered comment as a review request.
//! forge.publish_via_review(&document, comment.author()).await?;
//! ```

mod factory;
pub mod gitlab;
pub mod mock;
mod traits;

pub use factory::{create_forge, valid_forge_names, ForgeProvider};
pub use traits::*;
