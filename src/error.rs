//! Error handling module for eletract
//!
//! Every failure in the provisioning pipeline is one of these variants. Each
//! variant carries enough context to name the step that failed, so `main`
//! can print a single diagnostic and exit.

use std::path::PathBuf;
use thiserror::Error;

use crate::provision_state::ProvisionStep;

/// Main error type for eletract
#[derive(Error, Debug)]
pub enum EletractError {
    /// The requested project name cannot be used as a directory name
    #[error("Invalid project directory name {name:?}: {reason}")]
    InvalidTarget { name: String, reason: String },

    /// The target directory exists and no resumable checkpoint was accepted
    #[error("Destination already exists: {}", .0.display())]
    DestinationExists(PathBuf),

    /// An external tool could not be started at all
    #[error("{step}: failed to run `{command}`: {source}")]
    CommandSpawn {
        step: ProvisionStep,
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// An external tool exited unsuccessfully
    #[error("{step}: `{command}` exited with {}", exit_code_label(.code))]
    CommandFailed {
        step: ProvisionStep,
        command: String,
        code: Option<i32>,
    },

    /// package.json missing, unreadable, or not a JSON object
    #[error("Error reading {}: {message}", .path.display())]
    Manifest { path: PathBuf, message: String },

    /// Filesystem operation failed during a step
    #[error("{step}: I/O error on {}: {source}", .path.display())]
    Io {
        step: ProvisionStep,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Checkpoint is missing, unreadable, or does not match the request
    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    /// Configuration errors (loading, parsing, validation)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Required binaries are not on PATH
    #[error("Missing required binaries: {}", .0.join(", "))]
    Preflight(Vec<String>),
}

fn exit_code_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// Result type alias for eletract operations
pub type Result<T> = std::result::Result<T, EletractError>;

impl EletractError {
    /// Create an invalid target error
    pub fn invalid_target(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTarget {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a manifest error
    pub fn manifest(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Manifest {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error attributed to a step
    pub fn io(step: ProvisionStep, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            step,
            path: path.into(),
            source,
        }
    }

    /// Create a checkpoint error
    pub fn checkpoint(msg: impl Into<String>) -> Self {
        Self::Checkpoint(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// The step this error is attributed to, if any
    pub fn step(&self) -> Option<ProvisionStep> {
        match self {
            Self::CommandSpawn { step, .. }
            | Self::CommandFailed { step, .. }
            | Self::Io { step, .. } => Some(*step),
            Self::Manifest { .. } => Some(ProvisionStep::ReadManifest),
            Self::DestinationExists(_) | Self::InvalidTarget { .. } => {
                Some(ProvisionStep::CheckDestination)
            }
            Self::Checkpoint(_) | Self::Config(_) | Self::Preflight(_) => None,
        }
    }
}
