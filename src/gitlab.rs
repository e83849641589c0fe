//! GitLab API integration.

use std::future::Future;
use std::pin::Pin;

use anyhow::Result;
use serde::Deserialize;

pub mod client;
pub mod merge_request;
pub mod project;

pub use client::GitLabClient;
pub use merge_request::{CreatedMergeRequest, MergeRequestDraft};
pub use project::{ProjectIdentity, ProjectIdentityResolver, ProjectPath};

/// Boxed future returned by [`HostingApi`] methods.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// A GitLab user returned by the user search.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    /// Numeric user id.
    pub id: u64,
    /// Login name.
    pub username: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

/// Operations used from the hosting service.
pub trait HostingApi {
    /// Returns the web base URL of the instance, without a trailing slash.
    fn base_url(&self) -> &str;

    /// Searches projects the caller is a member of.
    fn search_projects<'a>(&'a self, path: &'a str) -> ApiFuture<'a, Vec<ProjectIdentity>>;

    /// Searches users by name, username or email.
    fn search_users<'a>(&'a self, query: &'a str) -> ApiFuture<'a, Vec<User>>;

    /// Creates a merge request.
    fn create_merge_request<'a>(
        &'a self,
        draft: &'a MergeRequestDraft,
    ) -> ApiFuture<'a, CreatedMergeRequest>;
}

/// Returns the id of the first user matching `query`.
pub async fn resolve_assignee(api: &dyn HostingApi, query: &str) -> Result<User> {
    let users = api.search_users(query).await?;
    let user = users
        .into_iter()
        .next()
        .ok_or_else(|| crate::error::MrError::UserNotFound(query.to_string()))?;
    tracing::debug!(query, user_id = user.id, username = %user.username, "Resolved assignee");
    Ok(user)
}
