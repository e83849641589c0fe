//! Merge request creation command.

use anyhow::Result;
use clap::Parser;

use super::Session;
use crate::gitlab::merge_request::parse_labels;
use crate::utils::Presentation;
use crate::workflow::{MergeRequestOptions, MergeRequestOrchestrator};

/// Merge request command options.
#[derive(Parser)]
pub struct MergeRequestCommand {
    /// Source branch, optionally prefixed with a remote (defaults to the current branch).
    #[arg(short, long, value_name = "BRANCH")]
    pub base: Option<String>,

    /// Target branch, optionally prefixed with a remote (defaults to the project's default branch).
    #[arg(short, long, value_name = "BRANCH")]
    pub target: Option<String>,

    /// Title; skips the editor.
    #[arg(short, long)]
    pub message: Option<String>,

    /// Description, used verbatim.
    #[arg(short, long)]
    pub description: Option<String>,

    /// Assigns the first user matching this query.
    #[arg(short, long, value_name = "USER")]
    pub assignee: Option<String>,

    /// Comma-separated labels.
    #[arg(short, long, default_value = "")]
    pub labels: String,

    /// Deletes the source branch once merged.
    #[arg(short = 'r', long = "remove_source_branch")]
    pub remove_source_branch: bool,

    /// Squashes commits on merge.
    #[arg(short, long)]
    pub squash: bool,

    /// Points the resulting URL at the edit page.
    #[arg(short, long)]
    pub edit: bool,

    /// Opens the merge request in a browser instead of printing its URL.
    #[arg(short, long)]
    pub open: bool,
}

impl MergeRequestCommand {
    /// Turns the flags into orchestrator options.
    pub fn options(&self) -> MergeRequestOptions {
        MergeRequestOptions {
            base: self.base.clone(),
            target: self.target.clone(),
            message: self.message.clone(),
            description: self.description.clone(),
            assignee: self.assignee.clone(),
            labels: parse_labels(Some(&self.labels)),
            remove_source_branch: self.remove_source_branch,
            squash: self.squash,
            edit: self.edit,
        }
    }

    /// Executes the merge request command.
    pub async fn execute(self, session: &Session) -> Result<()> {
        let options = self.options();
        let mut orchestrator =
            MergeRequestOrchestrator::new(&session.repo, &session.client, session.input.as_ref());
        let url = orchestrator.run(&options).await?;

        Presentation::from_print_flag(!self.open).present(&url)
    }
}
