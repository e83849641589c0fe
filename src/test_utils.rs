//! Shared test doubles for the git and GitLab seams.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Result;

use crate::error::{ApiFailure, MrError};
use crate::git::VersionControl;
use crate::gitlab::{
    ApiFuture, CreatedMergeRequest, HostingApi, MergeRequestDraft, ProjectIdentity, User,
};

/// Scripted repository that records which operations were called.
///
/// Calls are recorded as `"remote_names"`, `"current_branch"` and
/// `"config_get:<key>"` so tests can assert that a lookup never happened.
pub(crate) struct FakeVcs {
    remotes: Vec<String>,
    current_branch: Option<String>,
    config: Mutex<HashMap<String, String>>,
    last_commit: String,
    git_dir: PathBuf,
    calls: Mutex<Vec<String>>,
}

impl FakeVcs {
    pub(crate) fn new() -> Self {
        Self {
            remotes: Vec::new(),
            current_branch: None,
            config: Mutex::new(HashMap::new()),
            last_commit: "Initial commit".to_string(),
            git_dir: PathBuf::from(".git"),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_remotes(mut self, names: &[&str]) -> Self {
        self.remotes.extend(names.iter().map(|n| (*n).to_string()));
        self
    }

    /// Adds a remote together with its URL.
    pub(crate) fn with_remote(mut self, name: &str, url: &str) -> Self {
        self.remotes.push(name.to_string());
        self.set(&format!("remote.{name}.url"), url);
        self
    }

    /// Configures `branch.<branch>.remote`.
    pub(crate) fn with_upstream(self, branch: &str, remote: &str) -> Self {
        self.set(&format!("branch.{branch}.remote"), remote);
        self
    }

    pub(crate) fn with_current_branch(mut self, branch: &str) -> Self {
        self.current_branch = Some(branch.to_string());
        self
    }

    pub(crate) fn with_config(self, key: &str, value: &str) -> Self {
        self.set(key, value);
        self
    }

    pub(crate) fn with_last_commit(mut self, message: &str) -> Self {
        self.last_commit = message.to_string();
        self
    }

    pub(crate) fn with_git_dir(mut self, dir: PathBuf) -> Self {
        self.git_dir = dir;
        self
    }

    /// Returns the stored config value for `key`.
    pub(crate) fn config_value(&self, key: &str) -> Option<String> {
        self.config.lock().unwrap().get(key).cloned()
    }

    pub(crate) fn call_count(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
    }

    fn set(&self, key: &str, value: &str) {
        self.config
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl VersionControl for FakeVcs {
    fn remote_names(&self) -> Result<Vec<String>> {
        self.record("remote_names".to_string());
        Ok(self.remotes.clone())
    }

    fn current_branch(&self) -> Result<String> {
        self.record("current_branch".to_string());
        self.current_branch
            .clone()
            .ok_or_else(|| MrError::ExternalTool("detached HEAD".to_string()).into())
    }

    fn config_get(&self, key: &str) -> Result<Option<String>> {
        self.record(format!("config_get:{key}"));
        Ok(self.config_value(key))
    }

    fn config_set(&self, key: &str, value: &str) -> Result<()> {
        self.set(key, value);
        Ok(())
    }

    fn last_commit_message(&self) -> Result<String> {
        Ok(self.last_commit.clone())
    }

    fn git_dir(&self) -> PathBuf {
        self.git_dir.clone()
    }
}

/// Builds a project record for fakes.
pub(crate) fn project(id: u64, path: &str, default_branch: &str) -> ProjectIdentity {
    ProjectIdentity {
        id,
        path: path.to_string(),
        default_branch: default_branch.to_string(),
        web_url: None,
    }
}

/// Hosting API double with canned responses.
///
/// Every call is recorded as `"<method>:<argument>"`; created drafts are
/// kept for inspection.
pub(crate) struct FakeApi {
    base_url: String,
    projects: HashMap<String, Vec<ProjectIdentity>>,
    users: Vec<User>,
    creation: Mutex<Option<std::result::Result<CreatedMergeRequest, ApiFailure>>>,
    calls: Mutex<Vec<String>>,
    drafts: Mutex<Vec<MergeRequestDraft>>,
}

impl FakeApi {
    pub(crate) fn new() -> Self {
        Self {
            base_url: "https://gitlab.example.com".to_string(),
            projects: HashMap::new(),
            users: Vec::new(),
            creation: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            drafts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_search_results(mut self, path: &str, results: Vec<ProjectIdentity>) -> Self {
        self.projects.insert(path.to_string(), results);
        self
    }

    /// Registers a project whose search by its own path returns it.
    pub(crate) fn with_project(self, id: u64, path: &str, default_branch: &str) -> Self {
        self.with_search_results(path, vec![project(id, path, default_branch)])
    }

    pub(crate) fn with_user(mut self, id: u64, username: &str) -> Self {
        self.users.push(User {
            id,
            username: username.to_string(),
            name: username.to_string(),
        });
        self
    }

    pub(crate) fn with_creation(
        self,
        response: std::result::Result<CreatedMergeRequest, ApiFailure>,
    ) -> Self {
        *self.creation.lock().unwrap() = Some(response);
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn drafts(&self) -> Vec<MergeRequestDraft> {
        self.drafts.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl HostingApi for FakeApi {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn search_projects<'a>(&'a self, path: &'a str) -> ApiFuture<'a, Vec<ProjectIdentity>> {
        Box::pin(async move {
            self.record(format!("search_projects:{path}"));
            Ok(self.projects.get(path).cloned().unwrap_or_default())
        })
    }

    fn search_users<'a>(&'a self, query: &'a str) -> ApiFuture<'a, Vec<User>> {
        Box::pin(async move {
            self.record(format!("search_users:{query}"));
            Ok(self
                .users
                .iter()
                .filter(|u| u.username.contains(query))
                .cloned()
                .collect())
        })
    }

    fn create_merge_request<'a>(
        &'a self,
        draft: &'a MergeRequestDraft,
    ) -> ApiFuture<'a, CreatedMergeRequest> {
        Box::pin(async move {
            self.record(format!("create_merge_request:{}", draft.source_branch));
            self.drafts.lock().unwrap().push(draft.clone());
            let response = self.creation.lock().unwrap().clone().unwrap_or(Ok(
                CreatedMergeRequest {
                    iid: 1,
                    web_url: None,
                },
            ));
            response.map_err(|failure| MrError::HostingApi(failure).into())
        })
    }
}
