//! Per-command accumulator of resolution results.

use anyhow::Result;
use tracing::debug;

use crate::git::{resolve_remote_url, TrackingResolver, VersionControl};
use crate::gitlab::{ProjectIdentity, ProjectIdentityResolver, ProjectPath, User};

/// One fully resolved side (source or target) of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSide {
    /// Branch name without remote prefix.
    pub branch: String,
    /// Remote the branch lives on.
    pub remote: String,
    /// Fetch URL of that remote.
    pub remote_url: String,
    /// Hosted project behind the remote.
    pub project: ProjectIdentity,
}

/// Results gathered while one command runs; dropped when it finishes.
#[derive(Debug, Default)]
pub struct ResolutionContext {
    /// Source side, once resolved.
    pub source: Option<ResolvedSide>,
    /// Target side, once resolved.
    pub target: Option<ResolvedSide>,
    /// Assignee, when one was requested.
    pub assignee: Option<User>,
}

/// Resolves remote URL and project for a branch already tied to `remote`.
pub(crate) async fn resolve_side(
    vcs: &dyn VersionControl,
    projects: &mut ProjectIdentityResolver<'_>,
    branch: String,
    remote: String,
) -> Result<ResolvedSide> {
    let remote_url = resolve_remote_url(vcs, &remote)?;
    let path = ProjectPath::parse(&remote_url)?;
    let project = projects.fetch(&path).await?;
    debug!(branch = %branch, remote = %remote, project = %project.path, "Resolved side");

    Ok(ResolvedSide {
        branch,
        remote,
        remote_url,
        project,
    })
}

/// Resolves a branch token (or the checkout) down to its hosted project.
pub(crate) async fn resolve_branch_side(
    vcs: &dyn VersionControl,
    tracking: &TrackingResolver<'_>,
    projects: &mut ProjectIdentityResolver<'_>,
    explicit: Option<&str>,
) -> Result<ResolvedSide> {
    let branch = tracking.resolve_branch_name(explicit)?;
    let remote = tracking.resolve_remote(explicit.unwrap_or(&branch))?;
    resolve_side(vcs, projects, branch, remote).await
}
