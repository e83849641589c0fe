//! Browse, compare and list pages.

use anyhow::Result;
use clap::ValueEnum;
use tracing::debug;
use url::Url;

use super::context::resolve_branch_side;
use crate::git::{resolve_remote_url, BranchRef, TrackingResolver, VersionControl};
use crate::gitlab::{resolve_assignee, HostingApi, ProjectIdentityResolver, ProjectPath};

/// Merge request list filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MergeRequestState {
    /// Still open.
    Opened,
    /// Closed without merging.
    Closed,
    /// Merged.
    Merged,
    /// Any state.
    All,
}

impl MergeRequestState {
    /// Returns the value GitLab expects in the `state` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Opened => "opened",
            Self::Closed => "closed",
            Self::Merged => "merged",
            Self::All => "all",
        }
    }
}

/// Returns the tree page of the checked-out branch, or `page` of its project.
///
/// Only the remote URL is inspected; the hosting API is not called.
pub fn browse_url(vcs: &dyn VersionControl, host: &str, page: Option<&str>) -> Result<String> {
    let tracking = TrackingResolver::new(vcs);
    let branch = tracking.resolve_branch_name(None)?;
    let remote = tracking.resolve_remote(&branch)?;
    let path = ProjectPath::parse(&resolve_remote_url(vcs, &remote)?)?;

    let host = host.trim_end_matches('/');
    let url = match page {
        Some(page) => format!("{host}/{path}/{}", page.trim_start_matches('/')),
        None => format!("{host}/{path}/tree/{branch}"),
    };
    debug!(url = %url, "Browse URL");
    Ok(url)
}

/// Returns the compare page of `base` (or the checkout) against `target`.
///
/// `target` defaults to the default branch of the base branch's project.
pub async fn compare_url(
    vcs: &dyn VersionControl,
    api: &dyn HostingApi,
    base: Option<&str>,
    target: Option<&str>,
) -> Result<String> {
    let tracking = TrackingResolver::new(vcs);
    let mut projects = ProjectIdentityResolver::new(api);
    let source = resolve_branch_side(vcs, &tracking, &mut projects, base).await?;

    let target = match target {
        Some(token) => BranchRef::parse(token, tracking.registry())?.branch,
        None => source.project.default_branch.clone(),
    };

    let url = format!(
        "{}/{}/compare/{target}...{}",
        api.base_url().trim_end_matches('/'),
        source.project.path,
        source.branch
    );
    debug!(url = %url, "Compare URL");
    Ok(url)
}

/// Returns the merge request list page of a project.
///
/// An explicit `remote` is used as-is and no branch is inspected; otherwise
/// the remote tracked by the checkout is used.
pub async fn merge_requests_url(
    vcs: &dyn VersionControl,
    api: &dyn HostingApi,
    remote: Option<&str>,
    assignee: Option<&str>,
    state: Option<MergeRequestState>,
) -> Result<String> {
    let remote = match remote {
        Some(remote) => remote.to_string(),
        None => {
            let tracking = TrackingResolver::new(vcs);
            let branch = tracking.resolve_branch_name(None)?;
            tracking.resolve_remote(&branch)?
        }
    };
    let path = ProjectPath::parse(&resolve_remote_url(vcs, &remote)?)?;

    let assignee = match assignee {
        Some(query) => Some(resolve_assignee(api, query).await?),
        None => None,
    };

    let mut url = Url::parse(&format!(
        "{}/{path}/merge_requests",
        api.base_url().trim_end_matches('/')
    ))?;
    if state.is_some() || assignee.is_some() {
        let mut query = url.query_pairs_mut();
        if let Some(state) = state {
            query.append_pair("state", state.as_str());
        }
        if let Some(user) = &assignee {
            query.append_pair("assignee_id", &user.id.to_string());
        }
    }

    debug!(url = %url, "Merge request list URL");
    Ok(url.into())
}
