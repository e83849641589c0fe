//! Browse command.

use anyhow::Result;
use clap::Parser;

use super::Session;
use crate::gitlab::HostingApi;
use crate::utils::Presentation;
use crate::workflow::browse_url;

/// Browse command options.
#[derive(Parser)]
pub struct BrowseCommand {
    /// Project page to open instead of the branch tree (e.g. `issues`).
    #[arg(short, long, value_name = "NAME")]
    pub page: Option<String>,

    /// Prints the URL instead of opening a browser.
    #[arg(long)]
    pub print: bool,
}

impl BrowseCommand {
    /// Executes the browse command.
    pub fn execute(self, session: &Session) -> Result<()> {
        let url = browse_url(&session.repo, session.client.base_url(), self.page.as_deref())?;
        Presentation::from_print_flag(self.print).present(&url)
    }
}
