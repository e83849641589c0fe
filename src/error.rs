//! Error taxonomy for branch resolution and GitLab operations.

use std::fmt;

use thiserror::Error;

/// Errors that terminate the current command.
///
/// Plumbing code returns `anyhow::Result`; these variants stay reachable
/// through `anyhow::Error::downcast_ref`.
#[derive(Error, Debug)]
pub enum MrError {
    /// A git operation failed or returned unusable output.
    #[error("git operation failed: {0}")]
    ExternalTool(String),

    /// The branch has no upstream remote and none was given explicitly.
    #[error(
        "Branch '{branch}' has no remote tracking branch configured.\n\
         Set one with: git branch --set-upstream-to=origin/{branch} {branch}"
    )]
    NoTrackingRemote {
        /// Branch that was looked up.
        branch: String,
    },

    /// The remote URL is not shaped like a hosted project URL.
    #[error(
        "Remote URL '{0}' does not look like a GitLab project URL.\n\
         If it is a valid GitLab project, please report it to the gitlab-mr maintainers."
    )]
    UnrecognizedRemoteFormat(String),

    /// The project search returned nothing.
    #[error("Project '{0}' not found on GitLab (are you a member of it?)")]
    ProjectNotFound(String),

    /// The assignee query matched no user.
    #[error("No GitLab user found matching '{0}'")]
    UserNotFound(String),

    /// Source and target resolve to the same project and branch.
    #[error("Cannot create a merge request from '{branch}' into itself (project {project_id})")]
    SelfMerge {
        /// Project shared by source and target.
        project_id: u64,
        /// Branch shared by source and target.
        branch: String,
    },

    /// GitLab rejected a request.
    #[error("GitLab rejected the request: {0}")]
    HostingApi(ApiFailure),

    /// The HTTP request never produced a response.
    #[error("Network error talking to GitLab: {0}")]
    Network(String),

    /// A credential could not be found and prompting is disabled.
    #[error(
        "GitLab {what} is not configured.\n\
         Set it with: git config {key} {example}\n\
         or export {env_var}"
    )]
    MissingCredentials {
        /// Human-readable name of the missing value.
        what: &'static str,
        /// Git config key that would hold it.
        key: &'static str,
        /// Environment variable that would hold it.
        env_var: &'static str,
        /// Example value for the remediation hint.
        example: &'static str,
    },
}

/// Shape of a rejected GitLab response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiFailure {
    /// A business error carried in a `message` field.
    Message(String),
    /// A list of field errors.
    FieldErrors(Vec<String>),
    /// Anything else: HTTP status plus raw body.
    Unexpected {
        /// HTTP status code.
        status: u16,
        /// Response body as received.
        body: String,
    },
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message(message) => write!(f, "{message}"),
            Self::FieldErrors(errors) => write!(f, "{}", errors.join(", ")),
            Self::Unexpected { status, body } => {
                if body.trim().is_empty() {
                    write!(f, "unexpected response (HTTP {status})")
                } else {
                    write!(f, "unexpected response (HTTP {status}): {}", body.trim())
                }
            }
        }
    }
}
