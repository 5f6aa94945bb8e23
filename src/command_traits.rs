//! Type-safe external command contracts.
//!
//! Every external tool invocation is described by a struct implementing
//! `ToolArgs`. The struct definition is the contract: the pipeline never
//! assembles argv vectors by hand.

use std::path::Path;

use crate::config::ToolConfig;

/// Trait for typed external command arguments.
///
/// # Contract
///
/// - `program()`: The binary to run, resolved from configuration.
/// - `to_cli_args()`: Arguments exactly as the tool expects them.
/// - `working_dir()`: Where the command runs. `None` means the caller's base
///   directory.
///
/// # Example
///
/// ```
/// use eletract::command_traits::ToolArgs;
/// use eletract::commands::npm::NpmInstallArgs;
/// use eletract::config::ToolConfig;
///
/// let config = ToolConfig::default();
/// let args = NpmInstallArgs::dev_dependencies(["electron"], "my-app");
/// assert_eq!(args.program(&config), "npm");
/// assert_eq!(args.to_cli_args(), ["install", "electron", "--save-dev"]);
/// ```
pub trait ToolArgs {
    /// Binary name or path to execute
    fn program(&self, config: &ToolConfig) -> String;

    /// Command-line arguments, excluding the program itself
    fn to_cli_args(&self) -> Vec<String>;

    /// Directory the command runs in, if not the base directory
    fn working_dir(&self) -> Option<&Path>;
}
