//! Git remote operations

use std::cell::OnceCell;

use anyhow::Result;
use tracing::debug;

use crate::error::MrError;
use crate::git::VersionControl;

/// Remote names of one repository, read once and then cached.
pub struct RemoteRegistry<'a> {
    vcs: &'a dyn VersionControl,
    names: OnceCell<Vec<String>>,
}

impl<'a> RemoteRegistry<'a> {
    /// Creates an empty registry over `vcs`.
    pub fn new(vcs: &'a dyn VersionControl) -> Self {
        Self {
            vcs,
            names: OnceCell::new(),
        }
    }

    /// Returns the configured remote names.
    ///
    /// The first successful call is memoized; a failed call is not.
    pub fn list(&self) -> Result<&[String]> {
        if let Some(names) = self.names.get() {
            return Ok(names.as_slice());
        }
        let names = self.vcs.remote_names()?;
        Ok(self.names.get_or_init(|| names).as_slice())
    }

    /// Returns whether `name` is a configured remote.
    pub fn contains(&self, name: &str) -> Result<bool> {
        Ok(self.list()?.iter().any(|remote| remote == name))
    }
}

/// A branch token split into a branch name and an optional remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRef {
    /// Branch name without any remote prefix.
    pub branch: String,
    /// Remote named by a `remote/branch` token.
    pub remote: Option<String>,
}

impl BranchRef {
    /// Parses `token` against the registry's remotes.
    pub fn parse(token: &str, registry: &RemoteRegistry<'_>) -> Result<Self> {
        if !token.contains('/') {
            return Ok(Self::plain(token));
        }
        Ok(Self::from_token(token, registry.list()?))
    }

    /// Parses `token` against a known list of remote names.
    ///
    /// Only the first `/` is considered. When the prefix names a known
    /// remote the token is remote-qualified, even if a local branch with
    /// the full name also exists; otherwise the slash belongs to the branch
    /// name (`feature/x`).
    pub fn from_token(token: &str, remotes: &[String]) -> Self {
        match token.split_once('/') {
            Some((prefix, suffix)) if remotes.iter().any(|r| r == prefix) => Self {
                branch: suffix.to_string(),
                remote: Some(prefix.to_string()),
            },
            _ => Self::plain(token),
        }
    }

    fn plain(token: &str) -> Self {
        Self {
            branch: token.to_string(),
            remote: None,
        }
    }
}

/// Returns the configured fetch URL of `remote`.
pub fn resolve_remote_url(vcs: &dyn VersionControl, remote: &str) -> Result<String> {
    let url = vcs
        .config_get(&format!("remote.{remote}.url"))?
        .ok_or_else(|| MrError::ExternalTool(format!("remote '{remote}' has no URL configured")))?;
    debug!(remote, url = %url, "Resolved remote URL");
    Ok(url)
}
