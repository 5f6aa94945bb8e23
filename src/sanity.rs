//! Pre-flight checks for the runtime environment
//!
//! Verifies that Node.js tooling is on `PATH` before any step runs, so a
//! missing `npx` is reported up front rather than after the guard passed.

use std::path::Path;
use tracing::{debug, info};

use crate::config::ToolConfig;
use crate::error::{EletractError, Result};

/// Result of environment verification
#[derive(Debug)]
pub struct SanityCheckResult {
    pub missing_binaries: Vec<String>,
}

impl SanityCheckResult {
    pub fn is_ok(&self) -> bool {
        self.missing_binaries.is_empty()
    }
}

/// Binaries that must be present: node plus the configured npm/npx
fn required_binaries(config: &ToolConfig) -> Vec<String> {
    let mut binaries = vec!["node".to_string(), config.npm.clone(), config.npx.clone()];
    binaries.dedup();
    binaries
}

/// Check if a binary is runnable: an explicit path must exist, a bare name
/// must be found in one of the `PATH` entries.
fn binary_exists(name: &str, path_var: Option<&std::ffi::OsStr>) -> bool {
    let candidate = Path::new(name);
    if candidate.components().count() > 1 {
        return candidate.is_file();
    }

    path_var
        .map(|paths| std::env::split_paths(paths).any(|dir| is_executable(&dir.join(name))))
        .unwrap_or(false)
}

fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Perform all checks and return the result
pub fn verify_environment(config: &ToolConfig) -> SanityCheckResult {
    let path_var = std::env::var_os("PATH");
    let missing = required_binaries(config)
        .into_iter()
        .filter(|binary| {
            let found = binary_exists(binary, path_var.as_deref());
            debug!("binary {}: {}", binary, if found { "found" } else { "missing" });
            !found
        })
        .collect();

    SanityCheckResult {
        missing_binaries: missing,
    }
}

/// Print a human-readable report of missing binaries to stderr
pub fn print_report(result: &SanityCheckResult) {
    eprintln!();
    eprintln!("✗ Pre-flight check failed");
    eprintln!();
    for binary in &result.missing_binaries {
        eprintln!("   • {} not found on PATH", binary);
    }
    eprintln!();
    eprintln!("   eletract needs Node.js and npm. Install them from https://nodejs.org");
    eprintln!("   or point {} / {} at your binaries.", crate::config::NPM_ENV, crate::config::NPX_ENV);
    eprintln!();
}

/// Run the checks; report and fail if anything is missing
pub fn run_preflight_checks(config: &ToolConfig) -> Result<()> {
    debug!("Running pre-flight checks...");
    let result = verify_environment(config);
    if !result.is_ok() {
        print_report(&result);
        return Err(EletractError::Preflight(result.missing_binaries));
    }
    info!("Pre-flight checks passed");
    Ok(())
}
