//! Command workflows built on the resolution chain.

pub mod context;
pub mod merge_request;
pub mod navigate;

pub use context::{ResolutionContext, ResolvedSide};
pub use merge_request::{MergeRequestOptions, MergeRequestOrchestrator, Stage};
pub use navigate::{browse_url, compare_url, merge_requests_url, MergeRequestState};
