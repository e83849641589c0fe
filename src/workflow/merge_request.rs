//! Merge request creation.

use anyhow::{bail, Result};
use tracing::{debug, info, warn};

use super::context::{resolve_branch_side, resolve_side, ResolutionContext, ResolvedSide};
use crate::error::MrError;
use crate::git::{BranchRef, TrackingResolver, VersionControl};
use crate::gitlab::merge_request::{ensure_distinct, merge_request_url};
use crate::gitlab::{resolve_assignee, HostingApi, MergeRequestDraft, ProjectIdentityResolver};
use crate::utils::input::{split_message, InputProvider};

/// Steps of a merge request run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Source branch, remote and project.
    ResolvingSource,
    /// Target branch name.
    ResolvingTargetBranch,
    /// Target remote.
    ResolvingTargetRemote,
    /// Target project.
    ResolvingTargetProject,
    /// Self-merge check.
    Validating,
    /// Assignee lookup.
    ResolvingAssignee,
    /// Title and description.
    ComposingTitle,
    /// Creation call.
    Submitting,
    /// Merge request created.
    Done,
    /// A step failed; nothing was created.
    Aborted,
}

/// User choices for one merge request.
#[derive(Debug, Clone, Default)]
pub struct MergeRequestOptions {
    /// Source branch token; the checkout when absent.
    pub base: Option<String>,
    /// Target branch token; the source project's default branch when absent.
    pub target: Option<String>,
    /// Title; skips the editor when given.
    pub message: Option<String>,
    /// Description used verbatim.
    pub description: Option<String>,
    /// User search query for the assignee.
    pub assignee: Option<String>,
    /// Labels to apply.
    pub labels: Vec<String>,
    /// Delete the source branch once merged.
    pub remove_source_branch: bool,
    /// Squash commits on merge.
    pub squash: bool,
    /// Point the resulting URL at the edit page.
    pub edit: bool,
}

/// Drives one merge request from branch resolution to creation.
pub struct MergeRequestOrchestrator<'a> {
    vcs: &'a dyn VersionControl,
    api: &'a dyn HostingApi,
    input: &'a dyn InputProvider,
    tracking: TrackingResolver<'a>,
    projects: ProjectIdentityResolver<'a>,
    context: ResolutionContext,
    stage: Stage,
}

impl<'a> MergeRequestOrchestrator<'a> {
    /// Creates an orchestrator for a single run.
    pub fn new(
        vcs: &'a dyn VersionControl,
        api: &'a dyn HostingApi,
        input: &'a dyn InputProvider,
    ) -> Self {
        Self {
            vcs,
            api,
            input,
            tracking: TrackingResolver::new(vcs),
            projects: ProjectIdentityResolver::new(api),
            context: ResolutionContext::default(),
            stage: Stage::ResolvingSource,
        }
    }

    /// Returns the step the run is at.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Returns what has been resolved so far.
    pub fn context(&self) -> &ResolutionContext {
        &self.context
    }

    /// Creates the merge request and returns the page URL to show.
    pub async fn run(&mut self, options: &MergeRequestOptions) -> Result<String> {
        match self.drive(options).await {
            Ok(url) => {
                self.enter(Stage::Done);
                if let (Some(source), Some(target)) = (&self.context.source, &self.context.target) {
                    info!(
                        source = %format!("{}:{}", source.project.path, source.branch),
                        target = %format!("{}:{}", target.project.path, target.branch),
                        url = %url,
                        "Merge request created"
                    );
                }
                Ok(url)
            }
            Err(e) => {
                warn!(stage = ?self.stage, error = %e, "Merge request aborted");
                self.enter(Stage::Aborted);
                Err(e)
            }
        }
    }

    fn enter(&mut self, stage: Stage) {
        debug!(from = ?self.stage, to = ?stage, "Merge request stage");
        self.stage = stage;
    }

    async fn drive(&mut self, options: &MergeRequestOptions) -> Result<String> {
        self.enter(Stage::ResolvingSource);
        let source = resolve_branch_side(
            self.vcs,
            &self.tracking,
            &mut self.projects,
            options.base.as_deref(),
        )
        .await?;
        self.context.source = Some(source.clone());

        let target = self.resolve_target(&source, options.target.as_deref()).await?;
        self.context.target = Some(target.clone());

        self.enter(Stage::Validating);
        ensure_distinct(
            source.project.id,
            &source.branch,
            target.project.id,
            &target.branch,
        )?;

        self.enter(Stage::ResolvingAssignee);
        if let Some(query) = options.assignee.as_deref() {
            self.context.assignee = Some(resolve_assignee(self.api, query).await?);
        }

        self.enter(Stage::ComposingTitle);
        let (title, description) = self.compose(options)?;

        self.enter(Stage::Submitting);
        let draft = MergeRequestDraft {
            source_project_id: source.project.id,
            source_branch: source.branch,
            target_project_id: target.project.id,
            target_branch: target.branch,
            title,
            description,
            labels: options.labels.clone(),
            assignee_id: self.context.assignee.as_ref().map(|u| u.id),
            remove_source_branch: options.remove_source_branch,
            squash: options.squash,
        };
        draft.validate()?;
        let created = self.api.create_merge_request(&draft).await?;
        debug!(iid = created.iid, "Merge request created");

        Ok(merge_request_url(
            self.api.base_url(),
            &target.project.path,
            &created,
            options.edit,
        ))
    }

    async fn resolve_target(
        &mut self,
        source: &ResolvedSide,
        explicit: Option<&str>,
    ) -> Result<ResolvedSide> {
        self.enter(Stage::ResolvingTargetBranch);
        let Some(token) = explicit else {
            debug!(branch = %source.project.default_branch, "Target defaults to project default branch");
            self.enter(Stage::ResolvingTargetRemote);
            self.enter(Stage::ResolvingTargetProject);
            return Ok(ResolvedSide {
                branch: source.project.default_branch.clone(),
                ..source.clone()
            });
        };
        let branch = BranchRef::parse(token, self.tracking.registry())?.branch;

        self.enter(Stage::ResolvingTargetRemote);
        let remote = match self.tracking.resolve_remote(token) {
            Ok(remote) => remote,
            Err(e) if matches!(e.downcast_ref::<MrError>(), Some(MrError::NoTrackingRemote { .. })) => {
                debug!(branch = %branch, remote = %source.remote, "Target has no upstream; using source remote");
                source.remote.clone()
            }
            Err(e) => return Err(e),
        };

        self.enter(Stage::ResolvingTargetProject);
        resolve_side(self.vcs, &mut self.projects, branch, remote).await
    }

    fn compose(&self, options: &MergeRequestOptions) -> Result<(String, Option<String>)> {
        if let Some(message) = options.message.as_deref() {
            return Ok((message.trim().to_string(), options.description.clone()));
        }

        let initial = self.vcs.last_commit_message()?;
        let edited = self.input.edit_message(self.vcs, &initial)?;
        let (title, description) = split_message(&edited);
        if title.is_empty() {
            bail!("Aborting merge request due to empty title");
        }
        Ok((title, options.description.clone().or(description)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiFailure;
    use crate::gitlab::CreatedMergeRequest;
    use crate::test_utils::{FakeApi, FakeVcs};
    use crate::utils::input::NonInteractiveInput;

    /// Returns a fixed text from the editor step.
    struct EditedText(&'static str);

    impl InputProvider for EditedText {
        fn gitlab_url(&self, _vcs: &dyn VersionControl) -> Result<String> {
            Ok("https://gitlab.example.com".to_string())
        }

        fn gitlab_token(&self, _vcs: &dyn VersionControl, _url: &str) -> Result<String> {
            Ok("token".to_string())
        }

        fn edit_message(&self, _vcs: &dyn VersionControl, _initial: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    fn repo() -> FakeVcs {
        FakeVcs::new()
            .with_remote("origin", "git@gitlab.example.com:group/proj.git")
            .with_current_branch("topic")
            .with_upstream("topic", "origin")
            .with_last_commit("Add topic support")
    }

    fn api() -> FakeApi {
        FakeApi::new().with_project(10, "group/proj", "main")
    }

    fn options() -> MergeRequestOptions {
        MergeRequestOptions {
            message: Some("Add topic".to_string()),
            ..MergeRequestOptions::default()
        }
    }

    #[tokio::test]
    async fn creates_against_default_branch() {
        let vcs = repo();
        let api = api().with_creation(Ok(CreatedMergeRequest {
            iid: 42,
            web_url: None,
        }));
        let mut orchestrator = MergeRequestOrchestrator::new(&vcs, &api, &NonInteractiveInput);

        let url = orchestrator.run(&options()).await.unwrap();

        assert_eq!(url, "https://gitlab.example.com/group/proj/merge_requests/42");
        assert_eq!(orchestrator.stage(), Stage::Done);
        let drafts = api.drafts();
        assert_eq!(drafts[0].source_branch, "topic");
        assert_eq!(drafts[0].target_branch, "main");
        assert_eq!(drafts[0].title, "Add topic");
    }

    #[tokio::test]
    async fn edit_flag_appends_edit_suffix() {
        let vcs = repo();
        let api = api().with_creation(Ok(CreatedMergeRequest {
            iid: 42,
            web_url: None,
        }));
        let mut orchestrator = MergeRequestOrchestrator::new(&vcs, &api, &NonInteractiveInput);

        let url = orchestrator
            .run(&MergeRequestOptions {
                edit: true,
                ..options()
            })
            .await
            .unwrap();

        assert_eq!(
            url,
            "https://gitlab.example.com/group/proj/merge_requests/42/edit"
        );
    }

    #[tokio::test]
    async fn self_merge_never_reaches_creation() {
        let vcs = repo();
        let api = api();
        let mut orchestrator = MergeRequestOrchestrator::new(&vcs, &api, &NonInteractiveInput);

        let err = orchestrator
            .run(&MergeRequestOptions {
                target: Some("origin/topic".to_string()),
                ..options()
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<MrError>(),
            Some(MrError::SelfMerge { project_id: 10, .. })
        ));
        assert_eq!(orchestrator.stage(), Stage::Aborted);
        assert!(api.drafts().is_empty());
    }

    #[tokio::test]
    async fn fork_target_resolves_its_own_project() {
        let vcs = repo()
            .with_remote("upstream", "https://gitlab.example.com/team/proj.git")
            .with_upstream("main", "upstream");
        let api = api().with_project(20, "team/proj", "develop");
        let mut orchestrator = MergeRequestOrchestrator::new(&vcs, &api, &NonInteractiveInput);

        let url = orchestrator
            .run(&MergeRequestOptions {
                target: Some("main".to_string()),
                ..options()
            })
            .await
            .unwrap();

        let draft = &api.drafts()[0];
        assert_eq!(draft.source_project_id, 10);
        assert_eq!(draft.target_project_id, 20);
        assert_eq!(draft.target_branch, "main");
        assert_eq!(url, "https://gitlab.example.com/team/proj/merge_requests/1");

        let context = orchestrator.context();
        assert_eq!(context.source.as_ref().unwrap().remote, "origin");
        let target = context.target.as_ref().unwrap();
        assert_eq!(target.remote, "upstream");
        assert_eq!(target.remote_url, "https://gitlab.example.com/team/proj.git");
        assert_eq!(target.project.default_branch, "develop");
    }

    #[tokio::test]
    async fn target_without_upstream_uses_source_remote() {
        let vcs = repo();
        let api = api();
        let mut orchestrator = MergeRequestOrchestrator::new(&vcs, &api, &NonInteractiveInput);

        orchestrator
            .run(&MergeRequestOptions {
                target: Some("release".to_string()),
                ..options()
            })
            .await
            .unwrap();

        let draft = &api.drafts()[0];
        assert_eq!(draft.target_project_id, 10);
        assert_eq!(draft.target_branch, "release");
    }

    #[tokio::test]
    async fn assignee_is_looked_up() {
        let vcs = repo();
        let api = api().with_user(7, "alice");
        let mut orchestrator = MergeRequestOrchestrator::new(&vcs, &api, &NonInteractiveInput);

        orchestrator
            .run(&MergeRequestOptions {
                assignee: Some("ali".to_string()),
                ..options()
            })
            .await
            .unwrap();

        assert_eq!(api.drafts()[0].assignee_id, Some(7));
    }

    #[tokio::test]
    async fn unknown_assignee_aborts() {
        let vcs = repo();
        let api = api();
        let mut orchestrator = MergeRequestOrchestrator::new(&vcs, &api, &NonInteractiveInput);

        let err = orchestrator
            .run(&MergeRequestOptions {
                assignee: Some("nobody".to_string()),
                ..options()
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<MrError>(),
            Some(MrError::UserNotFound(q)) if q == "nobody"
        ));
        assert!(api.drafts().is_empty());
    }

    #[tokio::test]
    async fn rejection_message_is_reported() {
        let vcs = repo();
        let api = api().with_creation(Err(ApiFailure::Message(
            "branch already has an open merge request".to_string(),
        )));
        let mut orchestrator = MergeRequestOrchestrator::new(&vcs, &api, &NonInteractiveInput);

        let err = orchestrator.run(&options()).await.unwrap_err();

        assert!(err
            .to_string()
            .contains("branch already has an open merge request"));
        assert_eq!(orchestrator.stage(), Stage::Aborted);
    }

    #[tokio::test]
    async fn title_defaults_to_last_commit() {
        let vcs = repo();
        let api = api();
        let mut orchestrator = MergeRequestOrchestrator::new(&vcs, &api, &NonInteractiveInput);

        orchestrator
            .run(&MergeRequestOptions::default())
            .await
            .unwrap();

        let draft = &api.drafts()[0];
        assert_eq!(draft.title, "Add topic support");
        assert_eq!(draft.description, None);
    }

    #[tokio::test]
    async fn missing_upstream_aborts_before_any_api_call() {
        let vcs = FakeVcs::new()
            .with_remote("origin", "git@gitlab.example.com:group/proj.git")
            .with_current_branch("topic");
        let api = api();
        let mut orchestrator = MergeRequestOrchestrator::new(&vcs, &api, &NonInteractiveInput);

        let err = orchestrator.run(&options()).await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<MrError>(),
            Some(MrError::NoTrackingRemote { .. })
        ));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn empty_edited_title_aborts() {
        let vcs = repo();
        let api = api();
        let input = EditedText("\n\nOnly a body\n");
        let mut orchestrator = MergeRequestOrchestrator::new(&vcs, &api, &input);

        let err = orchestrator
            .run(&MergeRequestOptions::default())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Aborting merge request due to empty title");
        assert_eq!(orchestrator.stage(), Stage::Aborted);
        assert!(api.drafts().is_empty());
    }

    #[tokio::test]
    async fn edited_text_supplies_title_and_description() {
        let vcs = repo();
        let api = api();
        let input = EditedText("New title\n\nFirst line\nSecond line\n");
        let mut orchestrator = MergeRequestOrchestrator::new(&vcs, &api, &input);

        orchestrator
            .run(&MergeRequestOptions::default())
            .await
            .unwrap();

        let draft = &api.drafts()[0];
        assert_eq!(draft.title, "New title");
        assert_eq!(draft.description.as_deref(), Some("First line\nSecond line"));
    }

    #[tokio::test]
    async fn description_flag_overrides_edited_body() {
        let vcs = repo();
        let api = api();
        let input = EditedText("New title\n\nEdited body\n");
        let mut orchestrator = MergeRequestOrchestrator::new(&vcs, &api, &input);

        orchestrator
            .run(&MergeRequestOptions {
                description: Some("From the flag".to_string()),
                ..MergeRequestOptions::default()
            })
            .await
            .unwrap();

        assert_eq!(
            api.drafts()[0].description.as_deref(),
            Some("From the flag")
        );
    }

    #[tokio::test]
    async fn message_flag_keeps_description_verbatim() {
        let vcs = repo();
        let api = api();
        let mut orchestrator = MergeRequestOrchestrator::new(&vcs, &api, &NonInteractiveInput);

        orchestrator
            .run(&MergeRequestOptions {
                description: Some("Line one\n\nLine three".to_string()),
                ..options()
            })
            .await
            .unwrap();

        let draft = &api.drafts()[0];
        assert_eq!(draft.title, "Add topic");
        assert_eq!(draft.description.as_deref(), Some("Line one\n\nLine three"));
    }
}
