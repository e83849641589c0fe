//! CLI interface for gitlab-mr.

use std::io::IsTerminal;

use anyhow::{bail, Result};
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use tracing::debug;

use crate::git::GitRepository;
use crate::gitlab::GitLabClient;
use crate::utils::{Credentials, InputProvider, InteractiveInput, NonInteractiveInput};

pub mod browse;
pub mod compare;
pub mod merge_request;
pub mod merge_requests;

pub use browse::BrowseCommand;
pub use compare::CompareCommand;
pub use merge_request::MergeRequestCommand;
pub use merge_requests::MergeRequestsCommand;

/// gitlab-mr: GitLab merge requests from the command line.
#[derive(Parser)]
#[command(name = "gitlab-mr")]
#[command(about = "Create, browse and list GitLab merge requests", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Never prompt; fail when credentials are not configured.
    #[arg(long, global = true)]
    pub no_input: bool,

    /// The command to execute.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Opens the project page of the current branch.
    #[command(visible_alias = "open")]
    Browse(BrowseCommand),
    /// Opens the compare page between two branches.
    Compare(CompareCommand),
    /// Creates a merge request.
    #[command(visible_alias = "mr", alias = "create-merge-request")]
    MergeRequest(MergeRequestCommand),
    /// Opens the merge request list of a project.
    #[command(visible_alias = "mrs", alias = "open-merge-requests")]
    MergeRequests(MergeRequestsCommand),
}

impl Cli {
    /// Executes the CLI command.
    pub async fn execute(self) -> Result<()> {
        let Some(command) = self.command else {
            bail!("No command given");
        };

        let session = Session::open(self.no_input)?;
        match command {
            Commands::Browse(cmd) => cmd.execute(&session),
            Commands::Compare(cmd) => cmd.execute(&session).await,
            Commands::MergeRequest(cmd) => cmd.execute(&session).await,
            Commands::MergeRequests(cmd) => cmd.execute(&session).await,
        }
    }
}

/// Repository, input provider and API client for one invocation.
pub struct Session {
    /// The repository the command runs in.
    pub repo: GitRepository,
    /// Source of anything not configured.
    pub input: Box<dyn InputProvider>,
    /// Authenticated GitLab client.
    pub client: GitLabClient,
}

impl Session {
    /// Opens the repository and resolves credentials.
    pub fn open(no_input: bool) -> Result<Self> {
        let repo = GitRepository::open()?;
        let input = select_input(no_input, std::io::stdin().is_terminal());
        let credentials = Credentials::resolve(&repo, input.as_ref())?;
        debug!(?credentials, "Session ready");
        let client = GitLabClient::new(&credentials.url, credentials.token)?;

        Ok(Self {
            repo,
            input,
            client,
        })
    }
}

/// Exit status for a failed parse: 0 for help and version output, 1 otherwise.
pub fn parse_error_exit_code(err: &clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

/// Picks the interactive provider only on a terminal without `--no-input`.
pub(crate) fn select_input(no_input: bool, is_terminal: bool) -> Box<dyn InputProvider> {
    if is_terminal && !no_input {
        Box::new(InteractiveInput)
    } else {
        Box::new(NonInteractiveInput)
    }
}
