//! eletract library
//!
//! Provisions a React project wrapped in an Electron shell: scaffolds with
//! create-react-app, installs Electron and helpers, writes the Electron entry
//! and wires `package.json` scripts.

pub mod cli;
pub mod command_runner;
pub mod command_traits;
pub mod commands;
pub mod config;
pub mod error;
pub mod manifest;
pub mod patcher;
pub mod process_guard;
pub mod provision_state;
pub mod provisioner;
pub mod sanity;
pub mod templates;
pub mod types;

pub use command_runner::{CommandOutcome, CommandRunner, Invocation, SystemRunner};
pub use command_traits::ToolArgs;
pub use config::ToolConfig;
pub use error::{EletractError, Result};
pub use manifest::ProjectManifest;
pub use patcher::{BootstrapPatcher, PatchOutcome, TextPatternPatcher};
pub use provision_state::{Checkpoint, ProvisionContext, ProvisionStep};
pub use provisioner::{AppEntryOutcome, PlannedStep, ProvisionReport, ProvisionRequest, Provisioner};
pub use types::{ScriptFlavor, Template};
