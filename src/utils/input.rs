//! Where missing credentials and merge request text come from.
//!
//! The entry point picks [`InteractiveInput`] when a terminal is attached
//! and [`NonInteractiveInput`] otherwise; resolvers only see
//! [`InputProvider`].

use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::process::Command;

use anyhow::{bail, Context, Result};
use tracing::debug;

use crate::error::MrError;
use crate::git::VersionControl;
use crate::gitlab::ProjectPath;

/// Scratch file inside the git directory holding the message being edited.
pub const SCRATCH_FILE: &str = "MERGE_REQUEST_EDITMSG";

/// Instance suggested when the origin remote gives no better hint.
pub const DEFAULT_GITLAB_URL: &str = "https://gitlab.com";

/// Supplies values the user has not configured.
pub trait InputProvider {
    /// Returns the GitLab URL when neither config nor environment has one.
    fn gitlab_url(&self, vcs: &dyn VersionControl) -> Result<String>;

    /// Returns the access token when neither config nor environment has one.
    fn gitlab_token(&self, vcs: &dyn VersionControl, url: &str) -> Result<String>;

    /// Lets the user turn `initial` into the merge request message.
    fn edit_message(&self, vcs: &dyn VersionControl, initial: &str) -> Result<String>;
}

/// Fails fast on anything missing and never edits.
pub struct NonInteractiveInput;

impl InputProvider for NonInteractiveInput {
    fn gitlab_url(&self, _vcs: &dyn VersionControl) -> Result<String> {
        Err(MrError::MissingCredentials {
            what: "URL",
            key: "gitlab.url",
            env_var: "GITLAB_URL",
            example: "https://gitlab.yourcompany.com",
        }
        .into())
    }

    fn gitlab_token(&self, _vcs: &dyn VersionControl, _url: &str) -> Result<String> {
        Err(MrError::MissingCredentials {
            what: "access token",
            key: "gitlab.token",
            env_var: "GITLAB_TOKEN",
            example: "<personal access token>",
        }
        .into())
    }

    fn edit_message(&self, _vcs: &dyn VersionControl, initial: &str) -> Result<String> {
        Ok(initial.to_string())
    }
}

/// Prompts on the terminal, persists answers, and opens an editor.
pub struct InteractiveInput;

impl InputProvider for InteractiveInput {
    fn gitlab_url(&self, vcs: &dyn VersionControl) -> Result<String> {
        let origin = vcs.config_get("remote.origin.url")?;
        let suggested = suggest_gitlab_url(origin.as_deref());

        let url = prompt_until_answered(
            &mut io::stdin().lock(),
            &mut io::stderr(),
            &format!("Enter GitLab URL ({suggested}): "),
            "Invalid URL (try again): ",
            Some(&suggested),
        )?;
        let url = url.trim_end_matches('/').to_string();
        vcs.config_set("gitlab.url", &url)?;
        Ok(url)
    }

    fn gitlab_token(&self, vcs: &dyn VersionControl, url: &str) -> Result<String> {
        eprintln!("A personal access token is needed to use the GitLab API");
        eprintln!("{url}/profile/personal_access_tokens");

        let token = prompt_until_answered(
            &mut io::stdin().lock(),
            &mut io::stderr(),
            "Enter personal access token: ",
            "Invalid token (try again): ",
            None,
        )?;
        vcs.config_set("gitlab.token", &token)?;
        Ok(token)
    }

    fn edit_message(&self, vcs: &dyn VersionControl, initial: &str) -> Result<String> {
        let scratch = vcs.git_dir().join(SCRATCH_FILE);
        fs::write(&scratch, format!("{initial}\n"))
            .with_context(|| format!("Failed to write {}", scratch.display()))?;

        let editor = resolve_editor(vcs)?;
        debug!(editor = %editor, file = %scratch.display(), "Launching editor");

        let (editor_cmd, args) = parse_editor_command(&editor);
        let status = Command::new(editor_cmd)
            .args(args)
            .arg(&scratch)
            .status()
            .with_context(|| format!("Failed to execute editor '{editor}'"))?;
        if !status.success() {
            bail!("Editor '{editor}' exited with status {status}; aborting merge request");
        }

        fs::read_to_string(&scratch)
            .with_context(|| format!("Failed to read {}", scratch.display()))
    }
}

/// Asks `question` until a non-empty answer (or the default) is given.
pub(crate) fn prompt_until_answered<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    question: &str,
    retry: &str,
    default: Option<&str>,
) -> Result<String> {
    let mut prompt = question;
    loop {
        write!(writer, "{prompt}")?;
        writer.flush().context("Failed to flush prompt")?;

        let mut input = String::new();
        if reader
            .read_line(&mut input)
            .context("Failed to read user input")?
            == 0
        {
            bail!("No input available; configure GitLab credentials with git config");
        }

        let answer = input.trim();
        if !answer.is_empty() {
            return Ok(answer.to_string());
        }
        if let Some(default) = default {
            return Ok(default.to_string());
        }
        prompt = retry;
    }
}

/// Guesses the GitLab instance from the origin remote.
pub fn suggest_gitlab_url(origin_url: Option<&str>) -> String {
    let Some(origin) = origin_url else {
        return DEFAULT_GITLAB_URL.to_string();
    };
    if origin.contains("github") || origin.contains("bitbucket") {
        return DEFAULT_GITLAB_URL.to_string();
    }
    ProjectPath::parse(origin).map_or_else(
        |_| DEFAULT_GITLAB_URL.to_string(),
        |path| format!("https://{}", path.host()),
    )
}

/// Picks the editor the way git does: `core.editor`, `$VISUAL`, `$EDITOR`, `vi`.
fn resolve_editor(vcs: &dyn VersionControl) -> Result<String> {
    if let Some(editor) = vcs.config_get("core.editor")? {
        return Ok(editor);
    }
    Ok(env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .ok()
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| "vi".to_string()))
}

/// Splits an editor command string into the executable and its arguments.
///
/// Handles editors specified with arguments, e.g. `"code --wait"` becomes
/// `("code", vec!["--wait"])`.
pub(crate) fn parse_editor_command(editor: &str) -> (&str, Vec<&str>) {
    let mut parts = editor.split_whitespace();
    let cmd = parts.next().unwrap_or(editor);
    let args: Vec<&str> = parts.collect();
    (cmd, args)
}

/// Splits an edited message into title and description.
///
/// Line one is the title, line two is a separator and is dropped, and the
/// remaining lines form the description.
pub fn split_message(text: &str) -> (String, Option<String>) {
    let mut lines = text.lines();
    let title = lines.next().unwrap_or_default().trim().to_string();
    let description = lines.skip(1).collect::<Vec<_>>().join("\n");
    let description = description.trim_end();
    let description = (!description.trim().is_empty()).then(|| description.to_string());
    (title, description)
}
