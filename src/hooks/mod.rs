//! Commit lifecycle hook orchestration.
//!
//! Three stages fire at fixed lifecycle points: pre-stage analysis,
//! message validation, and post-commit recording. The whole pipeline is
//! advisory: every stage's failure path is converted into a logged no-op,
//! and shims installed by [`install`] exit 0 unconditionally, so nothing in
//! here is capable of blocking the underlying commit.

pub mod hint;
pub mod install;
pub mod validate;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use git2::Repository;
use tracing::{debug, info, warn};

use crate::analytics::AnalyticsStore;
use crate::classify::{CommitTypeHint, classify};
use crate::context::AppContext;
use crate::error::HookError;
use crate::git::collect_staged_diff;
use crate::git::commit::read_head_commit;
use crate::pipeline::MessagePipeline;
use crate::provider::GenerationRequest;

pub use install::{HookStatus, hook_status, install_hooks, uninstall_hooks};

/// The three lifecycle points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStage {
    PreStage,
    MessageValidation,
    PostCommit,
}

impl HookStage {
    /// The git hook this stage is wired to.
    pub fn hook_name(&self) -> &'static str {
        match self {
            HookStage::PreStage => "pre-commit",
            HookStage::MessageValidation => "commit-msg",
            HookStage::PostCommit => "post-commit",
        }
    }

    pub fn all() -> &'static [HookStage] {
        &[
            HookStage::PreStage,
            HookStage::MessageValidation,
            HookStage::PostCommit,
        ]
    }
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hook_name())
    }
}

impl std::str::FromStr for HookStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pre-commit" => Ok(Self::PreStage),
            "commit-msg" => Ok(Self::MessageValidation),
            "post-commit" => Ok(Self::PostCommit),
            _ => Err(format!(
                "Unknown hook stage '{}'. Available: pre-commit, commit-msg, post-commit",
                s
            )),
        }
    }
}

/// What a stage produced, when it produced anything.
#[derive(Debug, Clone, PartialEq)]
pub enum HookArtifact {
    TypeHint(CommitTypeHint),
    ImprovedMessage(String),
}

/// Outcome of one stage run, used only to drive logging.
///
/// `succeeded` records whether the stage's work actually ran; it is false
/// when an internal failure was logged and swallowed. The external result
/// is a success either way: [`HookOutcome::exit_code`] is always 0.
#[derive(Debug, Clone, PartialEq)]
pub struct HookOutcome {
    pub stage: HookStage,
    pub succeeded: bool,
    pub artifact: Option<HookArtifact>,
}

impl HookOutcome {
    /// Process exit code for the surrounding shim. Always 0: the hook
    /// pipeline must never fail the version-control operation.
    pub fn exit_code(&self) -> i32 {
        0
    }
}

/// Drives the three lifecycle stages against one repository.
pub struct HookOrchestrator<'a> {
    ctx: &'a AppContext,
    repo_dir: PathBuf,
}

impl<'a> HookOrchestrator<'a> {
    /// Orchestrator for the repository containing the current directory
    /// (git runs hooks from the work tree root).
    pub fn new(ctx: &'a AppContext) -> Self {
        Self::with_repo_dir(ctx, ".")
    }

    /// Orchestrator for an explicit repository directory.
    pub fn with_repo_dir(ctx: &'a AppContext, repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            ctx,
            repo_dir: repo_dir.into(),
        }
    }

    /// Dispatch a stage by lifecycle point. `message_file` is required by
    /// the message-validation stage and ignored by the others.
    pub async fn run(&self, stage: HookStage, message_file: Option<&Path>) -> HookOutcome {
        match stage {
            HookStage::PreStage => self.run_pre_stage().await,
            HookStage::MessageValidation => match message_file {
                Some(path) => self.run_message_validation(path).await,
                None => {
                    warn!("commit-msg stage invoked without a message file");
                    HookOutcome {
                        stage,
                        succeeded: false,
                        artifact: None,
                    }
                }
            },
            HookStage::PostCommit => self.run_post_commit().await,
        }
    }

    pub async fn run_pre_stage(&self) -> HookOutcome {
        Self::complete(HookStage::PreStage, self.pre_stage().await)
    }

    pub async fn run_message_validation(&self, message_file: &Path) -> HookOutcome {
        Self::complete(
            HookStage::MessageValidation,
            self.message_validation(message_file).await,
        )
    }

    pub async fn run_post_commit(&self) -> HookOutcome {
        Self::complete(HookStage::PostCommit, self.post_commit().await)
    }

    /// Stage runner: an internal error becomes a logged no-op so the
    /// surrounding commit is unaffected.
    fn complete(
        stage: HookStage,
        result: Result<Option<HookArtifact>, HookError>,
    ) -> HookOutcome {
        match result {
            Ok(artifact) => {
                debug!("{stage} stage completed");
                HookOutcome {
                    stage,
                    succeeded: true,
                    artifact,
                }
            }
            Err(e) => {
                warn!("{stage} stage failed (ignored): {e}");
                HookOutcome {
                    stage,
                    succeeded: false,
                    artifact: None,
                }
            }
        }
    }

    fn open_repo(&self) -> Result<Repository, HookError> {
        Repository::discover(&self.repo_dir).map_err(|_| HookError::NotARepository)
    }

    /// Pre-stage: classify the staged diff and persist the type hint for
    /// the validation stage. No staged changes means a clean no-op.
    async fn pre_stage(&self) -> Result<Option<HookArtifact>, HookError> {
        if !self.ctx.config.hooks_enabled {
            return Ok(None);
        }

        let repo = self.open_repo()?;
        let payload = collect_staged_diff(&repo)?;
        if payload.is_empty() {
            debug!("No staged changes, skipping pre-stage analysis");
            return Ok(None);
        }

        let hint = classify(&payload.diff_text);
        info!("Suggested commit type '{}' (score {})", hint.label, hint.score);

        hint::save_hint(self.ctx.state_dir(), &hint).map_err(HookError::HintSlot)?;
        Ok(Some(HookArtifact::TypeHint(hint)))
    }

    /// Message-validation: check the candidate message's shape and, when
    /// improvement is enabled, fix it up. The heuristic path never touches
    /// the AI pipeline; regeneration is the separate `auto_improve_ai`
    /// opt-in.
    async fn message_validation(
        &self,
        message_file: &Path,
    ) -> Result<Option<HookArtifact>, HookError> {
        if !self.ctx.config.hooks_enabled {
            return Ok(None);
        }

        let original =
            fs::read_to_string(message_file).map_err(|source| HookError::MessageFileRead {
                path: message_file.display().to_string(),
                source,
            })?;
        let message = original.trim();

        if message.is_empty() || message.starts_with("Merge") || message.starts_with("Revert") {
            return Ok(None);
        }

        let checks = validate::validate_message(message);
        if checks.is_valid() {
            debug!("Commit message is well-formed");
            return Ok(None);
        }

        if self.ctx.config.auto_improve_ai {
            let improved = self.regenerate_message().await?;
            self.write_message(message_file, &improved)?;
            info!("Commit message regenerated via AI");
            return Ok(Some(HookArtifact::ImprovedMessage(improved)));
        }

        if self.ctx.config.auto_improve {
            // Prefer the diff-based hint from the pre-stage over classifying
            // the (usually much shorter) message text.
            let diff_hint = hint::load_hint(self.ctx.state_dir());
            if let Some(improved) = validate::improve_message(message, diff_hint.as_ref()) {
                self.write_message(message_file, &improved)?;
                info!("Commit message improved heuristically");
                return Ok(Some(HookArtifact::ImprovedMessage(improved)));
            }
        }

        debug!("Commit message not well-formed, left unchanged");
        Ok(None)
    }

    /// The opt-in AI variant: regenerate the whole message from the staged
    /// diff through the normal pipeline.
    async fn regenerate_message(&self) -> Result<String, HookError> {
        let repo = self.open_repo()?;
        let payload = collect_staged_diff(&repo)?;

        let config = &self.ctx.config;
        let request = GenerationRequest::new(
            config.provider,
            config.model.clone(),
            config.temperature,
            config.max_tokens,
        );

        let message = MessagePipeline::new(self.ctx)
            .generate(&payload, &request)
            .await?;
        Ok(message)
    }

    fn write_message(&self, message_file: &Path, message: &str) -> Result<(), HookError> {
        fs::write(message_file, message).map_err(|source| HookError::MessageFileWrite {
            path: message_file.display().to_string(),
            source,
        })
    }

    /// Post-commit: hand the just-made commit to the analytics store and
    /// clear the transient hint slot.
    async fn post_commit(&self) -> Result<Option<HookArtifact>, HookError> {
        if !self.ctx.config.hooks_enabled {
            return Ok(None);
        }

        let repo = self.open_repo()?;
        let record = read_head_commit(&repo)?;

        let store = AnalyticsStore::open(&self.ctx.analytics_db_path())
            .await
            .map_err(HookError::Analytics)?;
        store
            .record_commit(&record)
            .await
            .map_err(HookError::Analytics)?;

        info!("Recorded commit {}", record.summary());

        hint::clear_hint(self.ctx.state_dir()).map_err(HookError::HintSlot)?;
        Ok(None)
    }
}
