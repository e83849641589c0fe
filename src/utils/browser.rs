//! Opening pages in the default browser.

use std::process::Command;

use anyhow::{bail, Context, Result};
use tracing::debug;

/// How a resulting URL is handed to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    /// Launch the default browser.
    Open,
    /// Print the URL on stdout.
    Print,
}

impl Presentation {
    /// Returns `Print` when `print` is set, `Open` otherwise.
    pub fn from_print_flag(print: bool) -> Self {
        if print {
            Self::Print
        } else {
            Self::Open
        }
    }

    /// Opens or prints `url`.
    pub fn present(self, url: &str) -> Result<()> {
        match self {
            Self::Open => {
                println!("Opening {url}");
                open_url(url)
            }
            Self::Print => {
                println!("{url}");
                Ok(())
            }
        }
    }
}

/// Opens `url` with the platform launcher (`open`, `xdg-open`, `start`).
pub fn open_url(url: &str) -> Result<()> {
    let mut command = launcher_command(url);
    debug!(?command, "Launching browser");

    let status = command
        .status()
        .with_context(|| format!("Failed to launch a browser for {url}"))?;
    if !status.success() {
        bail!("Browser launcher exited with {status} for {url}");
    }
    Ok(())
}

#[cfg(target_os = "macos")]
fn launcher_command(url: &str) -> Command {
    let mut command = Command::new("open");
    command.arg(url);
    command
}

#[cfg(target_os = "windows")]
fn launcher_command(url: &str) -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", "", url]);
    command
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn launcher_command(url: &str) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(url);
    command
}
