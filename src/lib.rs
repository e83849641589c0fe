//! # gitlab-mr
//!
//! GitLab merge requests from the current git checkout.
//!
//! ## Features
//!
//! - Creates merge requests, including across forks
//! - Opens branch, compare and merge request list pages
//! - Resolves the GitLab project behind any remote URL shape
//!
//! ## Quick Start
//!
//! ```rust
//! use gitlab_mr::gitlab::ProjectPath;
//!
//! let path = ProjectPath::parse("git@gitlab.com:group/project.git").unwrap();
//! assert_eq!(path.as_str(), "group/project");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod cli;
pub mod error;
pub mod git;
pub mod gitlab;
pub mod utils;
pub mod workflow;

#[cfg(test)]
pub(crate) mod test_utils;

pub use crate::cli::Cli;
pub use crate::error::{ApiFailure, MrError};

/// The current version of gitlab-mr.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
