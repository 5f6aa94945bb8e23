use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::types::Template;

/// eletract - create a React app wrapped in an Electron desktop shell
#[derive(Parser, Debug)]
#[command(name = "eletract")]
#[command(about = "Create a React app wrapped in an Electron desktop shell")]
#[command(version)]
pub struct Cli {
    /// Directory to create the project in (must not exist yet)
    #[arg(value_name = "PROJECT_DIRECTORY")]
    pub project_directory: String,

    /// create-react-app template to use (e.g. `typescript`)
    #[arg(long, value_name = "TEMPLATE_NAME")]
    pub template: Option<String>,

    /// Show what would be executed without running anything or writing files
    #[arg(long)]
    pub dry_run: bool,

    /// Continue a run that failed part-way, using the checkpoint it left in
    /// the project directory
    #[arg(long)]
    pub resume: bool,

    /// Do not check for node, npm and npx before starting
    #[arg(long)]
    pub skip_preflight: bool,

    /// JSON file overriding tool commands and generated defaults
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }

    pub fn template(&self) -> Template {
        Template::from_option(self.template.as_deref())
    }

    /// Default `tracing` filter for the requested verbosity
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_requires_project_directory() {
        let result = Cli::try_parse_from(["eletract"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_positional_only() {
        let cli = Cli::try_parse_from(["eletract", "my-app"]).unwrap();
        assert_eq!(cli.project_directory, "my-app");
        assert_eq!(cli.template(), Template::Default);
        assert!(!cli.dry_run);
        assert!(!cli.resume);
        assert_eq!(cli.log_level(), "warn");
    }

    #[test]
    fn test_cli_template_flag() {
        let cli = Cli::try_parse_from(["eletract", "my-app", "--template", "typescript"]).unwrap();
        assert_eq!(cli.template(), Template::TypeScript);

        let cli = Cli::try_parse_from(["eletract", "--template", "cra-template-pwa", "my-app"]).unwrap();
        assert_eq!(cli.template(), Template::Custom("cra-template-pwa".into()));
    }

    #[test]
    fn test_cli_extra_flags() {
        let cli = Cli::try_parse_from([
            "eletract",
            "my-app",
            "--dry-run",
            "--resume",
            "--skip-preflight",
            "--config",
            "/tmp/eletract.json",
            "-vv",
        ])
        .unwrap();
        assert!(cli.dry_run);
        assert!(cli.resume);
        assert!(cli.skip_preflight);
        assert_eq!(cli.config.unwrap().to_str().unwrap(), "/tmp/eletract.json");
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_verbosity_levels() {
        let cli = Cli::try_parse_from(["eletract", "my-app", "-v"]).unwrap();
        assert_eq!(cli.log_level(), "info");
        let cli = Cli::try_parse_from(["eletract", "my-app", "-vvv"]).unwrap();
        assert_eq!(cli.log_level(), "debug");
    }
}
