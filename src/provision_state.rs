//! Provisioning State Machine
//!
//! Tracks progress through the fixed provisioning pipeline and persists it to
//! a checkpoint file so an interrupted run can be resumed with `--resume`.
//!
//! # Step Flow
//!
//! ```text
//! CheckDestination
//!     ↓
//! Scaffold ─ EnterProject ─ InstallShellRuntime ─ InstallWebVitals
//!     ↓
//! EnsureAppEntry ─ PatchBootstrap ─ InstallDevHelpers
//!     ↓
//! CreateShellDir ─ WriteShellEntry
//!     ↓
//! ReadManifest ─ UpdateManifest ─ WriteManifest
//!     ↓
//! Summary
//! ```
//!
//! Steps only move forward. A failure pins the context at the failing step.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use strum::{Display, EnumIter, IntoEnumIterator};
use thiserror::Error;

use crate::error::EletractError;
use crate::types::Template;

/// File name of the checkpoint written into the project root
pub const CHECKPOINT_FILE: &str = ".eletract-checkpoint.json";

/// Pipeline steps in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Display, EnumIter, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ProvisionStep {
    #[strum(to_string = "Checking destination")]
    CheckDestination = 0,
    #[strum(to_string = "Running create-react-app")]
    Scaffold = 1,
    #[strum(to_string = "Entering project directory")]
    EnterProject = 2,
    #[strum(to_string = "Installing Electron")]
    InstallShellRuntime = 3,
    #[strum(to_string = "Installing web-vitals")]
    InstallWebVitals = 4,
    #[strum(to_string = "Ensuring App entry file")]
    EnsureAppEntry = 5,
    #[strum(to_string = "Patching index.tsx")]
    PatchBootstrap = 6,
    #[strum(to_string = "Installing concurrently and wait-on")]
    InstallDevHelpers = 7,
    #[strum(to_string = "Creating electron directory")]
    CreateShellDir = 8,
    #[strum(to_string = "Writing electron/electron.js")]
    WriteShellEntry = 9,
    #[strum(to_string = "Reading package.json")]
    ReadManifest = 10,
    #[strum(to_string = "Updating package.json")]
    UpdateManifest = 11,
    #[strum(to_string = "Writing package.json")]
    WriteManifest = 12,
    #[strum(to_string = "Printing summary")]
    Summary = 13,
}

impl ProvisionStep {
    #[inline]
    pub const fn order(self) -> u8 {
        self as u8
    }

    /// Returns the next step, or None after `Summary`
    pub fn next(self) -> Option<Self> {
        Self::iter().find(|s| s.order() == self.order() + 1)
    }

    /// Steps that spawn an external process
    pub const fn runs_external_command(self) -> bool {
        matches!(
            self,
            Self::Scaffold | Self::InstallShellRuntime | Self::InstallWebVitals | Self::InstallDevHelpers
        )
    }

    /// Steps that run even when a checkpoint marks them done
    pub const fn always_runs(self) -> bool {
        matches!(
            self,
            Self::CheckDestination | Self::EnterProject | Self::Summary
        )
    }
}

/// Errors that can occur during step transitions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StepTransitionError {
    #[error("Cannot skip from {from} to {to}")]
    SkippedStep { from: ProvisionStep, to: ProvisionStep },

    #[error("Cannot go backwards from {from} to {to}")]
    BackwardTransition { from: ProvisionStep, to: ProvisionStep },

    #[error("Provisioning already finished")]
    Finished,

    #[error("Provisioning already failed at {at}")]
    AlreadyFailed { at: ProvisionStep },
}

/// In-memory progress of one provisioning run.
#[derive(Debug, Clone)]
pub struct ProvisionContext {
    current: ProvisionStep,
    completed: Vec<ProvisionStep>,
    failed_at: Option<ProvisionStep>,
    finished: bool,
}

impl Default for ProvisionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ProvisionContext {
    pub fn new() -> Self {
        Self {
            current: ProvisionStep::CheckDestination,
            completed: Vec::new(),
            failed_at: None,
            finished: false,
        }
    }

    /// Start from a checkpoint: previously completed steps are pre-recorded.
    pub fn resumed_from(checkpoint: &Checkpoint) -> Self {
        let mut ctx = Self::new();
        ctx.completed = checkpoint.completed.clone();
        ctx.completed.sort();
        ctx.completed.dedup();
        ctx
    }

    #[inline]
    pub fn current_step(&self) -> ProvisionStep {
        self.current
    }

    #[inline]
    pub fn failed_at(&self) -> Option<ProvisionStep> {
        self.failed_at
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn completed(&self) -> &[ProvisionStep] {
        &self.completed
    }

    pub fn is_completed(&self, step: ProvisionStep) -> bool {
        self.completed.contains(&step)
    }

    /// Whether `step` can be skipped because a previous run finished it.
    ///
    /// The manifest steps share one in-memory value, so read and update only
    /// skip once the write finished.
    pub fn can_skip(&self, step: ProvisionStep) -> bool {
        match step {
            ProvisionStep::ReadManifest | ProvisionStep::UpdateManifest => {
                self.is_completed(ProvisionStep::WriteManifest)
            }
            _ => !step.always_runs() && self.is_completed(step),
        }
    }

    /// Move to `target`, which must be the step right after the current one.
    pub fn enter(&mut self, target: ProvisionStep) -> Result<(), StepTransitionError> {
        self.ensure_active()?;
        if target == self.current {
            return Ok(());
        }
        if target < self.current {
            return Err(StepTransitionError::BackwardTransition {
                from: self.current,
                to: target,
            });
        }
        if self.current.next() != Some(target) {
            return Err(StepTransitionError::SkippedStep {
                from: self.current,
                to: target,
            });
        }
        self.current = target;
        Ok(())
    }

    /// Record the current step as done. `Summary` finishes the run.
    pub fn complete_current(&mut self) -> Result<(), StepTransitionError> {
        self.ensure_active()?;
        if !self.completed.contains(&self.current) {
            self.completed.push(self.current);
        }
        if self.current == ProvisionStep::Summary {
            self.finished = true;
        }
        Ok(())
    }

    /// Pin the context at the current step.
    pub fn fail(&mut self) -> Result<(), StepTransitionError> {
        self.ensure_active()?;
        self.failed_at = Some(self.current);
        Ok(())
    }

    fn ensure_active(&self) -> Result<(), StepTransitionError> {
        if let Some(at) = self.failed_at {
            return Err(StepTransitionError::AlreadyFailed { at });
        }
        if self.finished {
            return Err(StepTransitionError::Finished);
        }
        Ok(())
    }
}

/// Persisted progress of a partially provisioned project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub template: Template,
    pub completed: Vec<ProvisionStep>,
}

impl Checkpoint {
    pub fn new(template: Template) -> Self {
        Self {
            template,
            completed: Vec::new(),
        }
    }

    pub fn path_in(project_root: &Path) -> PathBuf {
        project_root.join(CHECKPOINT_FILE)
    }

    pub fn exists_in(project_root: &Path) -> bool {
        Self::path_in(project_root).is_file()
    }

    /// Load the checkpoint from a project root
    pub fn load(project_root: &Path) -> Result<Self, EletractError> {
        let path = Self::path_in(project_root);
        let content = fs::read_to_string(&path).map_err(|e| {
            EletractError::checkpoint(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            EletractError::checkpoint(format!("cannot parse {}: {}", path.display(), e))
        })
    }

    /// Write the checkpoint into a project root
    pub fn save(&self, project_root: &Path) -> Result<(), EletractError> {
        let path = Self::path_in(project_root);
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| EletractError::checkpoint(format!("cannot serialize checkpoint: {}", e)))?;
        fs::write(&path, json).map_err(|e| {
            EletractError::checkpoint(format!("cannot write {}: {}", path.display(), e))
        })
    }

    /// Remove the checkpoint after a successful run. Missing file is fine.
    pub fn remove(project_root: &Path) -> Result<(), EletractError> {
        let path = Self::path_in(project_root);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(EletractError::checkpoint(format!(
                "cannot remove {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Snapshot the completed steps of a context
    pub fn record(&mut self, ctx: &ProvisionContext) {
        self.completed = ctx.completed().to_vec();
    }
}

impl From<StepTransitionError> for EletractError {
    fn from(err: StepTransitionError) -> Self {
        EletractError::checkpoint(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_order_is_sequential() {
        for (i, step) in ProvisionStep::iter().enumerate() {
            assert_eq!(step.order() as usize, i);
        }
    }

    #[test]
    fn test_step_next_forms_chain() {
        let mut step = ProvisionStep::CheckDestination;
        let mut count = 1;
        while let Some(next) = step.next() {
            assert!(next > step);
            step = next;
            count += 1;
        }
        assert_eq!(step, ProvisionStep::Summary);
        assert_eq!(count, ProvisionStep::iter().count());
    }

    #[test]
    fn test_cannot_skip_steps() {
        let mut ctx = ProvisionContext::new();
        let err = ctx.enter(ProvisionStep::InstallShellRuntime).unwrap_err();
        assert!(matches!(err, StepTransitionError::SkippedStep { .. }));

        ctx.enter(ProvisionStep::Scaffold).expect("next step");
        assert_eq!(ctx.current_step(), ProvisionStep::Scaffold);
    }

    #[test]
    fn test_cannot_go_backwards() {
        let mut ctx = ProvisionContext::new();
        ctx.enter(ProvisionStep::Scaffold).unwrap();
        ctx.enter(ProvisionStep::EnterProject).unwrap();
        let err = ctx.enter(ProvisionStep::Scaffold).unwrap_err();
        assert!(matches!(err, StepTransitionError::BackwardTransition { .. }));
    }

    #[test]
    fn test_fail_pins_context() {
        let mut ctx = ProvisionContext::new();
        ctx.enter(ProvisionStep::Scaffold).unwrap();
        ctx.fail().unwrap();
        assert_eq!(ctx.failed_at(), Some(ProvisionStep::Scaffold));
        assert!(matches!(
            ctx.enter(ProvisionStep::EnterProject),
            Err(StepTransitionError::AlreadyFailed { .. })
        ));
    }

    #[test]
    fn test_summary_finishes_run() {
        let mut ctx = ProvisionContext::new();
        let mut step = ProvisionStep::CheckDestination;
        loop {
            ctx.enter(step).unwrap();
            ctx.complete_current().unwrap();
            match step.next() {
                Some(next) => step = next,
                None => break,
            }
        }
        assert!(ctx.is_finished());
        assert_eq!(ctx.completed().len(), ProvisionStep::iter().count());
        assert_eq!(ctx.complete_current(), Err(StepTransitionError::Finished));
    }

    #[test]
    fn test_resume_skips_only_recorded_steps() {
        let checkpoint = Checkpoint {
            template: Template::Default,
            completed: vec![
                ProvisionStep::InstallShellRuntime,
                ProvisionStep::Scaffold,
                ProvisionStep::EnterProject,
            ],
        };
        let ctx = ProvisionContext::resumed_from(&checkpoint);
        assert!(ctx.can_skip(ProvisionStep::Scaffold));
        assert!(ctx.can_skip(ProvisionStep::InstallShellRuntime));
        assert!(!ctx.can_skip(ProvisionStep::EnterProject));
        assert!(!ctx.can_skip(ProvisionStep::InstallWebVitals));
    }

    #[test]
    fn test_manifest_steps_skip_only_after_write() {
        let partial = Checkpoint {
            template: Template::Default,
            completed: vec![ProvisionStep::ReadManifest, ProvisionStep::UpdateManifest],
        };
        let ctx = ProvisionContext::resumed_from(&partial);
        assert!(!ctx.can_skip(ProvisionStep::ReadManifest));
        assert!(!ctx.can_skip(ProvisionStep::UpdateManifest));

        let written = Checkpoint {
            template: Template::Default,
            completed: vec![
                ProvisionStep::ReadManifest,
                ProvisionStep::UpdateManifest,
                ProvisionStep::WriteManifest,
            ],
        };
        let ctx = ProvisionContext::resumed_from(&written);
        assert!(ctx.can_skip(ProvisionStep::ReadManifest));
        assert!(ctx.can_skip(ProvisionStep::WriteManifest));
    }

    #[test]
    fn test_checkpoint_save_load_remove() {
        let dir = tempfile::tempdir().unwrap();
        let mut checkpoint = Checkpoint::new(Template::TypeScript);
        checkpoint.completed.push(ProvisionStep::Scaffold);
        checkpoint.save(dir.path()).unwrap();
        assert!(Checkpoint::exists_in(dir.path()));

        let loaded = Checkpoint::load(dir.path()).unwrap();
        assert_eq!(loaded, checkpoint);

        Checkpoint::remove(dir.path()).unwrap();
        assert!(!Checkpoint::exists_in(dir.path()));
        Checkpoint::remove(dir.path()).expect("removing twice is fine");
    }

    #[test]
    fn test_corrupt_checkpoint_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(Checkpoint::path_in(dir.path()), "{ not json").unwrap();
        let err = Checkpoint::load(dir.path()).unwrap_err();
        assert!(matches!(err, EletractError::Checkpoint(_)));
    }
}
