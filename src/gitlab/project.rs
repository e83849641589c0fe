//! Hosted project identity: remote URL parsing and project lookup.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::MrError;
use crate::gitlab::HostingApi;

/// `scheme://[user@]host[:port]/path[.git]`, e.g. `https://gitlab.com/group/proj.git`.
static SCHEME_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i:[a-z][a-z0-9+.-]*)://(?:[^@/]+@)?(?P<host>[^/:]+)(?::\d+)?/(?P<path>.+?)(?:\.git)?/?$").unwrap()
});

/// `[user@]host:[/]path[.git]`, e.g. `git@example.com:group/proj.git`.
static SCP_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[^@/]+@)?(?P<host>[^/:]+):/?(?P<path>[^/].*?)(?:\.git)?/?$").unwrap()
});

/// `<namespace>/<project>` path of a hosted project.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectPath {
    host: String,
    path: String,
}

impl ProjectPath {
    /// Extracts the project path from a remote URL.
    pub fn parse(remote_url: &str) -> Result<Self> {
        let url = remote_url.trim();
        [&*SCHEME_URL_PATTERN, &*SCP_URL_PATTERN]
            .iter()
            .find_map(|pattern| pattern.captures(url))
            .and_then(|caps| {
                let path = caps.name("path")?.as_str().trim_matches('/');
                let segments = path.split('/').count();
                if segments < 2 || path.split('/').any(str::is_empty) {
                    return None;
                }
                Some(Self {
                    host: caps.name("host")?.as_str().to_string(),
                    path: path.to_string(),
                })
            })
            .ok_or_else(|| MrError::UnrecognizedRemoteFormat(remote_url.to_string()).into())
    }

    /// Returns the `<namespace>/<project>` path.
    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// Returns the host of the remote URL.
    pub fn host(&self) -> &str {
        &self.host
    }
}

impl fmt::Display for ProjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// Canonical project record from the hosting service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectIdentity {
    /// Project id.
    pub id: u64,
    /// `<namespace>/<project>` path.
    pub path: String,
    /// Default branch.
    pub default_branch: String,
    /// Project web URL, when the API returned one.
    pub web_url: Option<String>,
}

/// Looks up project identities, once per path.
pub struct ProjectIdentityResolver<'a> {
    api: &'a dyn HostingApi,
    fetched: HashMap<String, ProjectIdentity>,
}

impl<'a> ProjectIdentityResolver<'a> {
    /// Creates a resolver with an empty per-invocation cache.
    pub fn new(api: &'a dyn HostingApi) -> Self {
        Self {
            api,
            fetched: HashMap::new(),
        }
    }

    /// Fetches the project at `path`.
    ///
    /// An exact `path_with_namespace` match wins; otherwise the first
    /// search result is used.
    pub async fn fetch(&mut self, path: &ProjectPath) -> Result<ProjectIdentity> {
        if let Some(project) = self.fetched.get(path.as_str()) {
            return Ok(project.clone());
        }

        let results = self.api.search_projects(path.as_str()).await?;
        debug!(path = %path, results = results.len(), "Project search returned");

        let wanted = path.as_str();
        let project = match results.iter().position(|p| p.path.eq_ignore_ascii_case(wanted)) {
            Some(index) => results.into_iter().nth(index),
            None => results.into_iter().next(),
        }
        .ok_or_else(|| MrError::ProjectNotFound(wanted.to_string()))?;

        debug!(id = project.id, default_branch = %project.default_branch, "Resolved project");
        self.fetched.insert(wanted.to_string(), project.clone());
        Ok(project)
    }
}
