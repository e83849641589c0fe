//! GitLab REST API client.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use super::merge_request::interpret_creation_response;
use super::{ApiFuture, CreatedMergeRequest, HostingApi, MergeRequestDraft, ProjectIdentity, User};
use crate::error::{ApiFailure, MrError};

/// Branch assumed for projects whose default branch is unset (empty repositories).
const FALLBACK_DEFAULT_BRANCH: &str = "master";

/// Project record as returned by `GET /projects`.
#[derive(Deserialize)]
struct ApiProject {
    id: u64,
    path_with_namespace: String,
    default_branch: Option<String>,
    web_url: Option<String>,
}

impl From<ApiProject> for ProjectIdentity {
    fn from(project: ApiProject) -> Self {
        Self {
            id: project.id,
            path: project.path_with_namespace,
            default_branch: project
                .default_branch
                .unwrap_or_else(|| FALLBACK_DEFAULT_BRANCH.to_string()),
            web_url: project.web_url,
        }
    }
}

/// GitLab v4 API client.
pub struct GitLabClient {
    /// HTTP client for API requests.
    client: Client,
    /// Instance web URL without trailing slash.
    base_url: String,
    /// Personal access token.
    token: String,
}

impl GitLabClient {
    /// Creates a client for the instance at `base_url`.
    pub fn new(base_url: &str, token: String) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("gitlab-mr/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Builds an API URL from path segments and query pairs.
    fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/api/v4/", self.base_url))
            .with_context(|| format!("Invalid GitLab URL: {}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|()| anyhow::anyhow!("GitLab URL cannot be a base: {}", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Performs a GET and decodes a JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        info!(url = %url, "Sending GitLab API request");
        let response = self
            .client
            .get(url)
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await
            .map_err(|e| MrError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| MrError::Network(e.to_string()))?;
        debug!(status = status.as_u16(), body_len = body.len(), "GitLab API response");

        if !status.is_success() {
            let failure = serde_json::from_str::<serde_json::Value>(&body).map_or_else(
                |_| ApiFailure::Unexpected {
                    status: status.as_u16(),
                    body: body.clone(),
                },
                |value| super::merge_request::classify_failure(status.as_u16(), &value),
            );
            return Err(MrError::HostingApi(failure).into());
        }

        serde_json::from_str(&body).context("Failed to decode GitLab API response")
    }
}

impl HostingApi for GitLabClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn search_projects<'a>(&'a self, path: &'a str) -> ApiFuture<'a, Vec<ProjectIdentity>> {
        Box::pin(async move {
            let url = self.endpoint(
                &["projects"],
                &[
                    ("search", path),
                    ("search_namespaces", "true"),
                    ("membership", "true"),
                    ("simple", "true"),
                ],
            )?;
            let projects: Vec<ApiProject> = self.get_json(url).await?;
            Ok(projects.into_iter().map(ProjectIdentity::from).collect())
        })
    }

    fn search_users<'a>(&'a self, query: &'a str) -> ApiFuture<'a, Vec<User>> {
        Box::pin(async move {
            let url = self.endpoint(&["users"], &[("search", query)])?;
            self.get_json(url).await
        })
    }

    fn create_merge_request<'a>(
        &'a self,
        draft: &'a MergeRequestDraft,
    ) -> ApiFuture<'a, CreatedMergeRequest> {
        Box::pin(async move {
            let project_id = draft.source_project_id.to_string();
            let url = self.endpoint(&["projects", &project_id, "merge_requests"], &[])?;

            info!(
                url = %url,
                source_branch = %draft.source_branch,
                target_branch = %draft.target_branch,
                target_project_id = draft.target_project_id,
                "Creating merge request"
            );

            let response = self
                .client
                .post(url)
                .header("PRIVATE-TOKEN", &self.token)
                .json(draft)
                .send()
                .await
                .map_err(|e| MrError::Network(e.to_string()))?;

            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| MrError::Network(e.to_string()))?;
            debug!(status, body = %body, "Merge request creation response");

            interpret_creation_response(status, &body).map_err(|f| MrError::HostingApi(f).into())
        })
    }
}
