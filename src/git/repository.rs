//! Git repository operations

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use git2::{ErrorCode, Repository};
use tracing::debug;

use crate::error::MrError;
use crate::git::VersionControl;

/// Git repository wrapper
pub struct GitRepository {
    repo: Repository,
}

impl GitRepository {
    /// Open repository at current directory
    pub fn open() -> Result<Self> {
        let repo = Repository::open_from_env().context("Not in a git repository")?;

        Ok(Self { repo })
    }

    /// Open repository at specified path
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::open(path).context("Failed to open git repository")?;

        Ok(Self { repo })
    }
}

impl VersionControl for GitRepository {
    fn remote_names(&self) -> Result<Vec<String>> {
        let remotes = self
            .repo
            .remotes()
            .map_err(|e| MrError::ExternalTool(format!("failed to list remotes: {e}")))?;

        let names: Vec<String> = remotes.iter().flatten().map(str::to_string).collect();
        debug!(?names, "Listed remotes");
        Ok(names)
    }

    fn current_branch(&self) -> Result<String> {
        let head = self
            .repo
            .head()
            .map_err(|e| MrError::ExternalTool(format!("failed to read HEAD: {e}")))?;

        if head.is_branch() {
            if let Some(name) = head.shorthand() {
                return Ok(name.to_string());
            }
        }

        Err(MrError::ExternalTool(
            "repository is in detached HEAD state; check out a branch or pass --base".to_string(),
        )
        .into())
    }

    fn config_get(&self, key: &str) -> Result<Option<String>> {
        let config = self
            .repo
            .config()
            .map_err(|e| MrError::ExternalTool(format!("failed to open git config: {e}")))?;

        match config.get_string(key) {
            Ok(value) => Ok(Some(value.trim().to_string()).filter(|v| !v.is_empty())),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(MrError::ExternalTool(format!("failed to read '{key}': {e}")).into()),
        }
    }

    fn config_set(&self, key: &str, value: &str) -> Result<()> {
        let config = self
            .repo
            .config()
            .map_err(|e| MrError::ExternalTool(format!("failed to open git config: {e}")))?;
        let mut local = config
            .open_level(git2::ConfigLevel::Local)
            .map_err(|e| MrError::ExternalTool(format!("failed to open local config: {e}")))?;

        local
            .set_str(key, value)
            .map_err(|e| MrError::ExternalTool(format!("failed to write '{key}': {e}")))?;
        debug!(key, "Persisted git config value");
        Ok(())
    }

    fn last_commit_message(&self) -> Result<String> {
        let commit = self
            .repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .map_err(|e| MrError::ExternalTool(format!("failed to read HEAD commit: {e}")))?;

        Ok(commit.summary().unwrap_or_default().to_string())
    }

    fn git_dir(&self) -> PathBuf {
        self.repo.path().to_path_buf()
    }
}
