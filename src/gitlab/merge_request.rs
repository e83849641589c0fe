//! Merge request payloads and response handling.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiFailure, MrError};

/// Everything needed to create a merge request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeRequestDraft {
    /// Project the source branch lives in.
    #[serde(skip)]
    pub source_project_id: u64,
    /// Branch with the changes.
    pub source_branch: String,
    /// Project to merge into (may be a fork parent).
    pub target_project_id: u64,
    /// Branch to merge into.
    pub target_branch: String,
    /// Merge request title.
    pub title: String,
    /// Optional multi-line description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Labels, serialized as a comma-separated list.
    #[serde(serialize_with = "serialize_labels")]
    pub labels: Vec<String>,
    /// User to assign, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<u64>,
    /// Delete the source branch after merge.
    pub remove_source_branch: bool,
    /// Squash commits on merge.
    pub squash: bool,
}

fn serialize_labels<S: serde::Serializer>(labels: &[String], s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&labels.join(","))
}

impl MergeRequestDraft {
    /// Rejects drafts whose source and target are the same branch of the same project.
    pub fn validate(&self) -> Result<(), MrError> {
        ensure_distinct(
            self.source_project_id,
            &self.source_branch,
            self.target_project_id,
            &self.target_branch,
        )
    }
}

/// Fails with [`MrError::SelfMerge`] when both endpoints are identical.
pub fn ensure_distinct(
    source_project_id: u64,
    source_branch: &str,
    target_project_id: u64,
    target_branch: &str,
) -> Result<(), MrError> {
    if source_project_id == target_project_id && source_branch == target_branch {
        return Err(MrError::SelfMerge {
            project_id: source_project_id,
            branch: source_branch.to_string(),
        });
    }
    Ok(())
}

/// Splits a `--labels` argument into trimmed, non-empty, unique labels.
pub fn parse_labels(raw: Option<&str>) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for label in raw.unwrap_or_default().split(',').map(str::trim) {
        if !label.is_empty() && !labels.iter().any(|l| l == label) {
            labels.push(label.to_string());
        }
    }
    labels
}

/// A merge request as returned after creation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedMergeRequest {
    /// Project-scoped merge request number.
    pub iid: u64,
    /// Web page of the merge request.
    #[serde(default)]
    pub web_url: Option<String>,
}

/// Interprets a creation response body.
///
/// A body carrying a numeric `iid` is a created merge request, whatever
/// the HTTP status; anything else is a rejection.
pub fn interpret_creation_response(
    status: u16,
    body: &str,
) -> Result<CreatedMergeRequest, ApiFailure> {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return Err(ApiFailure::Unexpected {
            status,
            body: body.to_string(),
        });
    };

    if value.get("iid").is_some_and(Value::is_u64) {
        if let Ok(created) = serde_json::from_value::<CreatedMergeRequest>(value.clone()) {
            return Ok(created);
        }
    }

    Err(classify_failure(status, &value))
}

/// Classifies a rejected response.
pub fn classify_failure(status: u16, value: &Value) -> ApiFailure {
    match value {
        Value::Object(map) => match map.get("message").or_else(|| map.get("error")) {
            Some(message) => ApiFailure::Message(flatten_message(message)),
            None => unexpected(status, value),
        },
        Value::Array(items) => ApiFailure::FieldErrors(items.iter().map(flatten_message).collect()),
        _ => unexpected(status, value),
    }
}

fn unexpected(status: u16, value: &Value) -> ApiFailure {
    ApiFailure::Unexpected {
        status,
        body: value.to_string(),
    }
}

/// Renders a GitLab `message` value: string, list, or field -> messages map.
fn flatten_message(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(flatten_message)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(map) => map
            .iter()
            .map(|(field, messages)| format!("{field} {}", flatten_message(messages)))
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

/// Returns the page to show for a created merge request.
pub fn merge_request_url(
    host: &str,
    target_project_path: &str,
    created: &CreatedMergeRequest,
    edit: bool,
) -> String {
    let mut url = created.web_url.clone().unwrap_or_else(|| {
        format!(
            "{}/{target_project_path}/merge_requests/{}",
            host.trim_end_matches('/'),
            created.iid
        )
    });
    if edit {
        url.push_str("/edit");
    }
    url
}
