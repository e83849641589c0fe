//! Merge request list command.

use anyhow::Result;
use clap::Parser;

use super::Session;
use crate::utils::Presentation;
use crate::workflow::{merge_requests_url, MergeRequestState};

/// Merge request list options.
#[derive(Parser)]
pub struct MergeRequestsCommand {
    /// Remote whose project to list (defaults to the current branch's remote).
    #[arg(short, long)]
    pub remote: Option<String>,

    /// Only merge requests assigned to the first user matching this query.
    #[arg(short, long, value_name = "USER")]
    pub assignee: Option<String>,

    /// Only merge requests in this state.
    #[arg(short, long, value_enum)]
    pub state: Option<MergeRequestState>,

    /// Prints the URL instead of opening a browser.
    #[arg(long)]
    pub print: bool,
}

impl MergeRequestsCommand {
    /// Executes the list command.
    pub async fn execute(self, session: &Session) -> Result<()> {
        let url = merge_requests_url(
            &session.repo,
            &session.client,
            self.remote.as_deref(),
            self.assignee.as_deref(),
            self.state,
        )
        .await?;
        Presentation::from_print_flag(self.print).present(&url)
    }
}
