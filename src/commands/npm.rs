//! Type-safe arguments for `npm install`.

use std::path::{Path, PathBuf};

use crate::command_traits::ToolArgs;
use crate::config::ToolConfig;

/// Dependency section an install writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    /// `dependencies`
    Runtime,
    /// `devDependencies` (`--save-dev`)
    Development,
}

/// Arguments for `npm install <packages...> [--save-dev]`, run in the project root.
#[derive(Debug, Clone)]
pub struct NpmInstallArgs {
    pub packages: Vec<String>,
    pub kind: DependencyKind,
    pub project_root: PathBuf,
}

impl NpmInstallArgs {
    pub fn dependencies<I, S>(packages: I, project_root: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            packages: packages.into_iter().map(Into::into).collect(),
            kind: DependencyKind::Runtime,
            project_root: project_root.into(),
        }
    }

    pub fn dev_dependencies<I, S>(packages: I, project_root: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: DependencyKind::Development,
            ..Self::dependencies(packages, project_root)
        }
    }
}

impl ToolArgs for NpmInstallArgs {
    fn program(&self, config: &ToolConfig) -> String {
        config.npm.clone()
    }

    fn to_cli_args(&self) -> Vec<String> {
        let mut args = vec!["install".to_string()];
        args.extend(self.packages.iter().cloned());
        if self.kind == DependencyKind::Development {
            args.push("--save-dev".to_string());
        }
        args
    }

    fn working_dir(&self) -> Option<&Path> {
        Some(&self.project_root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_install() {
        let args = NpmInstallArgs::dependencies(["web-vitals"], "/tmp/app");
        assert_eq!(args.to_cli_args(), ["install", "web-vitals"]);
        assert_eq!(args.working_dir(), Some(Path::new("/tmp/app")));
    }

    #[test]
    fn test_dev_install_keeps_package_order() {
        let args = NpmInstallArgs::dev_dependencies(["concurrently", "wait-on"], "/tmp/app");
        assert_eq!(
            args.to_cli_args(),
            ["install", "concurrently", "wait-on", "--save-dev"]
        );
    }

    #[test]
    fn test_program_follows_config() {
        let config = ToolConfig {
            npm: "pnpm".into(),
            ..ToolConfig::default()
        };
        let args = NpmInstallArgs::dev_dependencies(["electron"], "/tmp/app");
        assert_eq!(args.program(&config), "pnpm");
        assert_eq!(args.program(&ToolConfig::default()), "npm");
    }
}
