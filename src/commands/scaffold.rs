//! Type-safe arguments for `npx create-react-app`.

use std::path::Path;

use crate::command_traits::ToolArgs;
use crate::config::ToolConfig;
use crate::types::Template;

/// Arguments for `npx <scaffolder> <directory> [--template <name>]`.
#[derive(Debug, Clone)]
pub struct CreateReactAppArgs {
    /// Scaffolder package name (e.g. `create-react-app`).
    pub scaffolder: String,
    /// Target directory name, relative to the base directory.
    pub directory: String,
    pub template: Template,
}

impl CreateReactAppArgs {
    pub fn new(config: &ToolConfig, directory: impl Into<String>, template: Template) -> Self {
        Self {
            scaffolder: config.scaffolder.clone(),
            directory: directory.into(),
            template,
        }
    }
}

impl ToolArgs for CreateReactAppArgs {
    fn program(&self, config: &ToolConfig) -> String {
        config.npx.clone()
    }

    fn to_cli_args(&self) -> Vec<String> {
        let mut args = vec![self.scaffolder.clone(), self.directory.clone()];
        if let Some(name) = self.template.scaffolder_name() {
            args.push("--template".to_string());
            args.push(name.to_string());
        }
        args
    }

    fn working_dir(&self) -> Option<&Path> {
        None
    }
}
