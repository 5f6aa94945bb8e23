//! External Command Execution
//!
//! All external tools (npx, npm) are launched through a `CommandRunner`.
//! The provisioner only sees this trait, so tests substitute a recording
//! runner and never touch the network.
//!
//! `SystemRunner` is the production implementation:
//!
//! - Blocks until the child exits (the pipeline has no internal parallelism)
//! - Inherits stdin/stdout/stderr so npm progress and prompts reach the user
//! - Registers the child PID with `ChildRegistry::global()` for signal cleanup

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info};

use crate::command_traits::ToolArgs;
use crate::config::ToolConfig;
use crate::process_guard::ChildRegistry;

/// A fully resolved command: program, arguments and working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl Invocation {
    /// Resolve typed arguments against the configuration and base directory
    pub fn from_args<T: ToolArgs + ?Sized>(args: &T, config: &ToolConfig, base_dir: &Path) -> Self {
        Self {
            program: args.program(config),
            args: args.to_cli_args(),
            cwd: args
                .working_dir()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| base_dir.to_path_buf()),
        }
    }

    /// Shell-like rendering for logs and diagnostics
    pub fn command_line(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(self.program.as_str());
        parts.extend(self.args.iter().map(String::as_str));
        parts.join(" ")
    }
}

/// Exit status of a finished command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Exit code (None if terminated by signal).
    pub exit_code: Option<i32>,
    pub success: bool,
}

impl CommandOutcome {
    pub fn succeeded() -> Self {
        Self {
            exit_code: Some(0),
            success: true,
        }
    }

    pub fn failed(exit_code: Option<i32>) -> Self {
        Self {
            exit_code,
            success: false,
        }
    }
}

/// Runs external commands on behalf of the provisioner.
///
/// `Err` means the command could not be started; a command that ran and
/// exited non-zero is `Ok` with `success == false`.
pub trait CommandRunner {
    fn run(&mut self, invocation: &Invocation) -> std::io::Result<CommandOutcome>;
}

/// Spawns real processes with inherited stdio and waits for them.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&mut self, invocation: &Invocation) -> std::io::Result<CommandOutcome> {
        info!(
            "run: {} (cwd={})",
            invocation.command_line(),
            invocation.cwd.display()
        );

        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()?;
        let pid = child.id();

        if let Ok(mut registry) = ChildRegistry::global().lock() {
            registry.register(pid);
        }

        let status = child.wait();

        if let Ok(mut registry) = ChildRegistry::global().lock() {
            registry.unregister(pid);
        }

        let status = status?;
        debug!("{} exited with {:?}", invocation.program, status.code());

        if status.success() {
            Ok(CommandOutcome::succeeded())
        } else {
            Ok(CommandOutcome::failed(status.code()))
        }
    }
}
