//! core
//!
//! Core domain types and operations for Commentarium.
//!
//! # Modules
//!
//! - [`comment`] - Validated comment input model
//! - [`naming`] - Sanitization of names into safe tokens
//! - [`render`] - Markdown document rendering with YAML frontmatter
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Validation happens at construction time; downstream code never sees
//!   an invalid value
//! - Rendering is deterministic for a fixed comment and clock value

pub mod comment;
pub mod config;
pub mod naming;
pub mod render;
