//! Project Provisioner
//!
//! Runs the fixed provisioning pipeline against a base directory:
//!
//! 1. `npx create-react-app <target> [--template <name>]`
//! 2. resolve the project root (threaded explicitly, no `chdir`)
//! 3. `npm install electron --save-dev`
//! 4. `npm install web-vitals` (JavaScript flavor only)
//! 5. ensure `src/App.tsx` or `src/App.js` exists
//! 6. patch `src/index.tsx` (TypeScript flavor only)
//! 7. `npm install concurrently wait-on --save-dev`
//! 8. create `electron/`
//! 9. write `electron/electron.js`
//! 10. read `package.json`
//! 11. set `main` and the `electron` / `dev` scripts
//! 12. write `package.json`
//! 13. print next steps
//!
//! The first failing step aborts the run. Nothing is rolled back: the
//! checkpoint left in the project root lets `--resume` continue from the
//! failed step instead.

use std::fs;
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;
use tracing::{debug, info, warn};

use crate::command_runner::{CommandRunner, Invocation};
use crate::command_traits::ToolArgs;
use crate::commands::npm::NpmInstallArgs;
use crate::commands::scaffold::CreateReactAppArgs;
use crate::config::ToolConfig;
use crate::error::{EletractError, Result};
use crate::manifest::{ProjectManifest, MANIFEST_FILE};
use crate::patcher::{BootstrapPatcher, TextPatternPatcher};
use crate::provision_state::{Checkpoint, ProvisionContext, ProvisionStep};
use crate::templates;
use crate::types::{ScriptFlavor, Template};

const SHELL_RUNTIME_PACKAGES: &[&str] = &["electron"];
const WEB_VITALS_PACKAGES: &[&str] = &["web-vitals"];
const DEV_HELPER_PACKAGES: &[&str] = &["concurrently", "wait-on"];

/// What to provision: a directory name and a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionRequest {
    target: String,
    template: Template,
}

impl ProvisionRequest {
    /// Validate the directory name. It must be a single, plain path segment.
    pub fn new(target: impl Into<String>, template: Template) -> Result<Self> {
        let target = target.into();
        let reason = if target.trim().is_empty() {
            Some("must not be empty")
        } else if target == "." || target == ".." {
            Some("must name a new directory")
        } else if target.contains(['/', '\\']) {
            Some("must be a single directory name, not a path")
        } else if target.contains('\0') {
            Some("must not contain NUL characters")
        } else if target.chars().any(char::is_whitespace) {
            Some("must not contain whitespace")
        } else if target.starts_with('-') {
            Some("must not start with '-'")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(EletractError::invalid_target(target, reason)),
            None => Ok(Self { target, template }),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn template(&self) -> &Template {
        &self.template
    }
}

/// How the App entry step ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEntryOutcome {
    /// An existing file was found and left untouched
    Existing(PathBuf),
    /// A placeholder was written
    Created(PathBuf),
}

/// Result of a successful run
#[derive(Debug, Clone, Default)]
pub struct ProvisionReport {
    pub project_root: PathBuf,
    /// Steps that did work in this run
    pub executed: Vec<ProvisionStep>,
    /// Steps that did not apply to the template
    pub not_applicable: Vec<ProvisionStep>,
    /// Steps skipped because a checkpoint recorded them as done
    pub resumed: Vec<ProvisionStep>,
    pub app_entry: Option<AppEntryOutcome>,
    pub next_steps: Vec<String>,
}

/// One line of a dry-run plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedStep {
    pub step: ProvisionStep,
    pub action: String,
    /// Would not run (template policy or checkpoint)
    pub skipped: bool,
}

enum StepStatus {
    Done,
    NotApplicable,
}

/// Executes the provisioning pipeline.
pub struct Provisioner<R: CommandRunner, P: BootstrapPatcher = TextPatternPatcher> {
    config: ToolConfig,
    base_dir: PathBuf,
    runner: R,
    patcher: P,
    resume: bool,
}

impl<R: CommandRunner> Provisioner<R> {
    pub fn new(config: ToolConfig, base_dir: impl Into<PathBuf>, runner: R) -> Self {
        Self {
            config,
            base_dir: base_dir.into(),
            runner,
            patcher: TextPatternPatcher,
            resume: false,
        }
    }
}

impl<R: CommandRunner, P: BootstrapPatcher> Provisioner<R, P> {
    /// Replace the bootstrap patcher
    pub fn with_patcher<Q: BootstrapPatcher>(self, patcher: Q) -> Provisioner<R, Q> {
        Provisioner {
            config: self.config,
            base_dir: self.base_dir,
            runner: self.runner,
            patcher,
            resume: self.resume,
        }
    }

    /// Accept an existing target directory that holds a matching checkpoint
    pub fn with_resume(mut self, resume: bool) -> Self {
        self.resume = resume;
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn project_root(&self, request: &ProvisionRequest) -> PathBuf {
        self.base_dir.join(request.target())
    }

    /// Run the whole pipeline.
    pub fn provision(&mut self, request: &ProvisionRequest) -> Result<ProvisionReport> {
        let root = self.project_root(request);
        let mut ctx = self.check_destination(&root, request)?;
        ctx.complete_current()?;

        let mut checkpoint = Checkpoint::new(request.template().clone());
        let mut manifest: Option<ProjectManifest> = None;
        let mut report = ProvisionReport {
            project_root: root.clone(),
            executed: vec![ProvisionStep::CheckDestination],
            ..ProvisionReport::default()
        };

        for step in ProvisionStep::iter().skip(1) {
            ctx.enter(step)?;

            if ctx.can_skip(step) {
                info!("{}: already done, skipping", step);
                println!("⏭  {} (done in a previous run)", step);
                report.resumed.push(step);
                ctx.complete_current()?;
                continue;
            }

            debug!("Entering step {} ({})", step.order(), step);
            match self.run_step(step, request, &root, &mut manifest, &mut report) {
                Ok(StepStatus::Done) => report.executed.push(step),
                Ok(StepStatus::NotApplicable) => report.not_applicable.push(step),
                Err(e) => {
                    ctx.fail()?;
                    warn!("Provisioning stopped at step {}: {}", step.order(), e);
                    return Err(e);
                }
            }
            ctx.complete_current()?;

            // The root exists from here on; a checkpoint failure is not fatal
            if step >= ProvisionStep::EnterProject && step < ProvisionStep::Summary {
                checkpoint.record(&ctx);
                if let Err(e) = checkpoint.save(&root) {
                    warn!("{}", e);
                }
            }
        }

        Checkpoint::remove(&root)?;
        Ok(report)
    }

    /// Describe what `provision` would do, without running or writing anything.
    pub fn plan(&self, request: &ProvisionRequest) -> Result<Vec<PlannedStep>> {
        let root = self.project_root(request);
        let ctx = self.check_destination(&root, request)?;
        let flavor = request.template().flavor();

        let plan = ProvisionStep::iter()
            .map(|step| {
                let (action, not_applicable) = self.describe_step(step, request, &root, flavor);
                let resumed = step != ProvisionStep::CheckDestination && ctx.can_skip(step);
                let action = if resumed {
                    format!("{} (done in a previous run)", action)
                } else {
                    action
                };
                PlannedStep {
                    step,
                    action,
                    skipped: not_applicable || resumed,
                }
            })
            .collect();
        Ok(plan)
    }

    /// Guard: the target must not exist, unless resuming from a checkpoint
    /// recorded for the same template.
    fn check_destination(&self, root: &Path, request: &ProvisionRequest) -> Result<ProvisionContext> {
        if !root.exists() {
            return Ok(ProvisionContext::new());
        }

        if !self.resume || !root.is_dir() {
            return Err(EletractError::DestinationExists(root.to_path_buf()));
        }

        if !Checkpoint::exists_in(root) {
            return Err(EletractError::checkpoint(format!(
                "{} exists but has no checkpoint; nothing to resume",
                root.display()
            )));
        }

        let checkpoint = Checkpoint::load(root)?;
        if checkpoint.template != *request.template() {
            return Err(EletractError::checkpoint(format!(
                "{} was started with template '{}', not '{}'",
                root.display(),
                checkpoint.template,
                request.template()
            )));
        }

        info!(
            "Resuming {} with {} completed step(s)",
            root.display(),
            checkpoint.completed.len()
        );
        Ok(ProvisionContext::resumed_from(&checkpoint))
    }

    fn run_step(
        &mut self,
        step: ProvisionStep,
        request: &ProvisionRequest,
        root: &Path,
        manifest: &mut Option<ProjectManifest>,
        report: &mut ProvisionReport,
    ) -> Result<StepStatus> {
        let flavor = request.template().flavor();

        match step {
            ProvisionStep::CheckDestination => Ok(StepStatus::Done),

            ProvisionStep::Scaffold => {
                println!("Creating project in {}...", root.display());
                let args =
                    CreateReactAppArgs::new(&self.config, request.target(), request.template().clone());
                self.run_tool(step, &args)
            }

            ProvisionStep::EnterProject => {
                if !root.is_dir() {
                    return Err(EletractError::io(
                        step,
                        root,
                        std::io::Error::new(
                            std::io::ErrorKind::NotFound,
                            "scaffolder finished but the project directory is missing",
                        ),
                    ));
                }
                debug!("Project root: {}", root.display());
                Ok(StepStatus::Done)
            }

            ProvisionStep::InstallShellRuntime => {
                println!("Installing Electron...");
                let args = NpmInstallArgs::dev_dependencies(SHELL_RUNTIME_PACKAGES.iter().copied(), root);
                self.run_tool(step, &args)
            }

            ProvisionStep::InstallWebVitals => {
                if !flavor.needs_web_vitals() {
                    info!("Skipping web-vitals for the {} template", request.template());
                    return Ok(StepStatus::NotApplicable);
                }
                println!("Installing web-vitals...");
                let args = NpmInstallArgs::dependencies(WEB_VITALS_PACKAGES.iter().copied(), root);
                self.run_tool(step, &args)
            }

            ProvisionStep::EnsureAppEntry => {
                let outcome = ensure_app_entry(root, flavor)?;
                report.app_entry = Some(outcome);
                Ok(StepStatus::Done)
            }

            ProvisionStep::PatchBootstrap => {
                if !flavor.patches_bootstrap() {
                    return Ok(StepStatus::NotApplicable);
                }
                self.patch_bootstrap(root, flavor)
            }

            ProvisionStep::InstallDevHelpers => {
                println!("Installing concurrently and wait-on...");
                let args = NpmInstallArgs::dev_dependencies(DEV_HELPER_PACKAGES.iter().copied(), root);
                self.run_tool(step, &args)
            }

            ProvisionStep::CreateShellDir => {
                let dir = root.join(&self.config.shell_dir);
                if dir.is_dir() {
                    debug!("{} already exists", dir.display());
                } else {
                    fs::create_dir_all(&dir).map_err(|e| EletractError::io(step, &dir, e))?;
                }
                Ok(StepStatus::Done)
            }

            ProvisionStep::WriteShellEntry => {
                let path = root.join(&self.config.shell_dir).join(&self.config.shell_entry);
                fs::write(&path, templates::shell_entry(&self.config))
                    .map_err(|e| EletractError::io(step, &path, e))?;
                info!("Wrote {}", path.display());
                Ok(StepStatus::Done)
            }

            ProvisionStep::ReadManifest => {
                *manifest = Some(ProjectManifest::load(root)?);
                Ok(StepStatus::Done)
            }

            ProvisionStep::UpdateManifest => {
                loaded(manifest, root)?.apply_shell_scripts(&self.config);
                Ok(StepStatus::Done)
            }

            ProvisionStep::WriteManifest => {
                let manifest = loaded(manifest, root)?;
                manifest.save()?;
                info!("Updated {}", manifest.path().display());
                Ok(StepStatus::Done)
            }

            ProvisionStep::Summary => {
                report.next_steps = next_steps(request.target());
                println!("✓ Project setup complete!");
                println!("Next steps:");
                for (i, line) in report.next_steps.iter().enumerate() {
                    println!("  {}. {}", i + 1, line);
                }
                Ok(StepStatus::Done)
            }
        }
    }

    fn run_tool<T: ToolArgs>(&mut self, step: ProvisionStep, args: &T) -> Result<StepStatus> {
        let invocation = Invocation::from_args(args, &self.config, &self.base_dir);
        let command = invocation.command_line();

        match self.runner.run(&invocation) {
            Err(source) => Err(EletractError::CommandSpawn { step, command, source }),
            Ok(outcome) if !outcome.success => Err(EletractError::CommandFailed {
                step,
                command,
                code: outcome.exit_code,
            }),
            Ok(_) => Ok(StepStatus::Done),
        }
    }

    fn patch_bootstrap(&self, root: &Path, flavor: ScriptFlavor) -> Result<StepStatus> {
        let step = ProvisionStep::PatchBootstrap;
        let path = root.join(flavor.bootstrap_path());
        if !path.is_file() {
            warn!("{} not found, nothing to patch", path.display());
            return Ok(StepStatus::Done);
        }

        let source = fs::read_to_string(&path).map_err(|e| EletractError::io(step, &path, e))?;
        let outcome = self.patcher.patch(&source);
        if outcome.changed() {
            fs::write(&path, &outcome.content).map_err(|e| EletractError::io(step, &path, e))?;
            info!(
                "Patched {}: removed {} line(s), rewrote {} line(s)",
                path.display(),
                outcome.removed_lines,
                outcome.rewritten_lines
            );
        } else {
            debug!("{} already patched", path.display());
        }
        Ok(StepStatus::Done)
    }

    fn command_action(&self, args: &dyn ToolArgs) -> String {
        let line = Invocation::from_args(args, &self.config, &self.base_dir).command_line();
        format!("run `{}`", line)
    }

    fn describe_step(
        &self,
        step: ProvisionStep,
        request: &ProvisionRequest,
        root: &Path,
        flavor: ScriptFlavor,
    ) -> (String, bool) {
        let shell_entry = format!("{}/{}", self.config.shell_dir, self.config.shell_entry);

        match step {
            ProvisionStep::CheckDestination => {
                (format!("check that {} does not exist", root.display()), false)
            }
            ProvisionStep::Scaffold => (
                self.command_action(&CreateReactAppArgs::new(
                    &self.config,
                    request.target(),
                    request.template().clone(),
                )),
                false,
            ),
            ProvisionStep::EnterProject => (format!("use {} as project root", root.display()), false),
            ProvisionStep::InstallShellRuntime => (
                self.command_action(&NpmInstallArgs::dev_dependencies(SHELL_RUNTIME_PACKAGES.iter().copied(), root)),
                false,
            ),
            ProvisionStep::InstallWebVitals => {
                let action =
                    self.command_action(&NpmInstallArgs::dependencies(WEB_VITALS_PACKAGES.iter().copied(), root));
                (action, !flavor.needs_web_vitals())
            }
            ProvisionStep::EnsureAppEntry => (
                format!(
                    "create {} unless {} or {} exists",
                    flavor.app_entry_path(),
                    ScriptFlavor::Typed.app_entry_path(),
                    ScriptFlavor::Dynamic.app_entry_path()
                ),
                false,
            ),
            ProvisionStep::PatchBootstrap => (
                format!(
                    "remove reportWebVitals from {} and import ./App.tsx",
                    ScriptFlavor::Typed.bootstrap_path()
                ),
                !flavor.patches_bootstrap(),
            ),
            ProvisionStep::InstallDevHelpers => (
                self.command_action(&NpmInstallArgs::dev_dependencies(DEV_HELPER_PACKAGES.iter().copied(), root)),
                false,
            ),
            ProvisionStep::CreateShellDir => (format!("create {}/", self.config.shell_dir), false),
            ProvisionStep::WriteShellEntry => (format!("write {}", shell_entry), false),
            ProvisionStep::ReadManifest => (format!("read {}", MANIFEST_FILE), false),
            ProvisionStep::UpdateManifest => (
                format!(
                    "set main to {} and add scripts \"electron\" and \"dev\"",
                    self.config.shell_entry_main()
                ),
                false,
            ),
            ProvisionStep::WriteManifest => (format!("write {}", MANIFEST_FILE), false),
            ProvisionStep::Summary => ("print next steps".to_string(), false),
        }
    }
}

fn loaded<'a>(manifest: &'a mut Option<ProjectManifest>, root: &Path) -> Result<&'a mut ProjectManifest> {
    manifest
        .as_mut()
        .ok_or_else(|| EletractError::manifest(root.join(MANIFEST_FILE), "manifest was not loaded"))
}

/// Leave an existing App component alone; otherwise write the placeholder
/// for the requested flavor.
fn ensure_app_entry(root: &Path, flavor: ScriptFlavor) -> Result<AppEntryOutcome> {
    let step = ProvisionStep::EnsureAppEntry;

    for candidate in [ScriptFlavor::Typed, ScriptFlavor::Dynamic] {
        let path = root.join(candidate.app_entry_path());
        if path.is_file() {
            info!("{} already exists, leaving it untouched", path.display());
            return Ok(AppEntryOutcome::Existing(path));
        }
    }

    let path = root.join(flavor.app_entry_path());
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| EletractError::io(step, parent, e))?;
    }
    fs::write(&path, templates::app_entry(flavor)).map_err(|e| EletractError::io(step, &path, e))?;
    info!("Created placeholder {}", path.display());
    Ok(AppEntryOutcome::Created(path))
}

fn next_steps(target: &str) -> Vec<String> {
    vec![
        format!("cd {}", target),
        "npm run dev (starts React and Electron together)".to_string(),
        "or run `npm start` and `npm run electron` in two terminals".to_string(),
    ]
}
