//! Branch name and tracking remote resolution.

use anyhow::Result;
use tracing::debug;

use crate::error::MrError;
use crate::git::{BranchRef, RemoteRegistry, VersionControl};

/// Resolves branch tokens to branch names and their remotes.
pub struct TrackingResolver<'a> {
    vcs: &'a dyn VersionControl,
    registry: RemoteRegistry<'a>,
}

impl<'a> TrackingResolver<'a> {
    /// Creates a resolver with a fresh remote registry.
    pub fn new(vcs: &'a dyn VersionControl) -> Self {
        Self {
            vcs,
            registry: RemoteRegistry::new(vcs),
        }
    }

    /// Returns the remote registry used for token parsing.
    pub fn registry(&self) -> &RemoteRegistry<'a> {
        &self.registry
    }

    /// Returns the branch name for `explicit`, or the checked-out branch.
    pub fn resolve_branch_name(&self, explicit: Option<&str>) -> Result<String> {
        let branch = match explicit {
            Some(token) => BranchRef::parse(token, &self.registry)?.branch,
            None => self.vcs.current_branch()?,
        };
        debug!(branch = %branch, explicit = explicit.is_some(), "Resolved branch name");
        Ok(branch)
    }

    /// Returns the remote a branch token refers to.
    ///
    /// A `remote/branch` token names its remote directly and the upstream
    /// config is never consulted; otherwise `branch.<name>.remote` decides.
    pub fn resolve_remote(&self, branch_token: &str) -> Result<String> {
        let branch_ref = BranchRef::parse(branch_token, &self.registry)?;
        if let Some(remote) = branch_ref.remote {
            debug!(remote = %remote, "Remote given explicitly in branch token");
            return Ok(remote);
        }

        let key = format!("branch.{}.remote", branch_ref.branch);
        match self.vcs.config_get(&key)? {
            Some(remote) => {
                debug!(branch = %branch_ref.branch, remote = %remote, "Resolved tracking remote");
                Ok(remote)
            }
            None => Err(MrError::NoTrackingRemote {
                branch: branch_ref.branch,
            }
            .into()),
        }
    }
}
