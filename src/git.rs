//! Git repository access and branch/remote resolution.

use std::path::PathBuf;

use anyhow::Result;

pub mod remote;
pub mod repository;
pub mod tracking;

pub use remote::{resolve_remote_url, BranchRef, RemoteRegistry};
pub use repository::GitRepository;
pub use tracking::TrackingResolver;

/// Operations the resolution chain needs from the local repository.
///
/// [`GitRepository`] is the production implementation; every resolver only
/// sees this trait.
pub trait VersionControl {
    /// Lists the configured remote names.
    fn remote_names(&self) -> Result<Vec<String>>;

    /// Returns the name of the checked-out branch.
    fn current_branch(&self) -> Result<String>;

    /// Reads a config value, `None` when the key is unset.
    fn config_get(&self, key: &str) -> Result<Option<String>>;

    /// Writes a value into the repository-local config.
    fn config_set(&self, key: &str, value: &str) -> Result<()>;

    /// Returns the summary line of the HEAD commit.
    fn last_commit_message(&self) -> Result<String>;

    /// Returns the repository metadata directory (usually `.git`).
    fn git_dir(&self) -> PathBuf;
}
