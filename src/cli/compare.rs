//! Compare command.

use anyhow::Result;
use clap::Parser;

use super::Session;
use crate::utils::Presentation;
use crate::workflow::compare_url;

/// Compare command options.
#[derive(Parser)]
pub struct CompareCommand {
    /// Branch with the changes (defaults to the current branch).
    #[arg(short, long, value_name = "BRANCH")]
    pub base: Option<String>,

    /// Branch to compare against (defaults to the project's default branch).
    #[arg(short, long, value_name = "BRANCH")]
    pub target: Option<String>,

    /// Prints the URL instead of opening a browser.
    #[arg(long)]
    pub print: bool,
}

impl CompareCommand {
    /// Executes the compare command.
    pub async fn execute(self, session: &Session) -> Result<()> {
        let url = compare_url(
            &session.repo,
            &session.client,
            self.base.as_deref(),
            self.target.as_deref(),
        )
        .await?;
        Presentation::from_print_flag(self.print).present(&url)
    }
}
