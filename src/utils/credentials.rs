//! GitLab URL and token lookup.

use anyhow::Result;
use tracing::debug;

use crate::git::VersionControl;
use crate::utils::input::InputProvider;
use crate::utils::settings::get_env_var;

/// GitLab instance and the token used against it.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Instance web URL without trailing slash.
    pub url: String,
    /// Personal access token.
    pub token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Resolves credentials from git config, then the environment, then `input`.
    pub fn resolve(vcs: &dyn VersionControl, input: &dyn InputProvider) -> Result<Self> {
        let url = match lookup(vcs, "gitlab.url", "GITLAB_URL")? {
            Some(url) => url,
            None => input.gitlab_url(vcs)?,
        };
        let url = url.trim_end_matches('/').to_string();

        let token = match lookup(vcs, "gitlab.token", "GITLAB_TOKEN")? {
            Some(token) => token,
            None => input.gitlab_token(vcs, &url)?,
        };

        debug!(url = %url, "Resolved GitLab credentials");
        Ok(Self { url, token })
    }
}

fn lookup(vcs: &dyn VersionControl, key: &str, env_var: &str) -> Result<Option<String>> {
    if let Some(value) = vcs.config_get(key)? {
        debug!(key, "Credential found in git config");
        return Ok(Some(value));
    }
    Ok(get_env_var(env_var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty()))
}
