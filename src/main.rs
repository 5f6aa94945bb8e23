//! eletract - main entry point

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use eletract::cli::Cli;
use eletract::{process_guard, sanity};
use eletract::{Checkpoint, ProvisionRequest, Provisioner, SystemRunner, ToolConfig};

/// Initialize logging to stderr. RUST_LOG overrides the verbosity flags.
fn init_logger(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse_args();
    init_logger(cli.log_level());
    info!("eletract {} starting", env!("CARGO_PKG_VERSION"));

    match process_guard::init_signal_handlers() {
        Ok(()) => debug!("Signal handlers initialized"),
        Err(e) => warn!("Failed to initialize signal handlers: {}", e),
    }

    if let Err(e) = run(&cli) {
        error!("{:#}", e);
        eprintln!("✗ {:#}", e);
        std::process::exit(1);
    }
}

fn load_config(cli: &Cli) -> Result<ToolConfig> {
    let config = match &cli.config {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            ToolConfig::load_from_file(path)?
        }
        None => ToolConfig::default(),
    }
    .with_env_overrides();

    config.validate()?;
    Ok(config)
}

fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let request = ProvisionRequest::new(cli.project_directory.clone(), cli.template())?;
    let base_dir = std::env::current_dir().context("Failed to determine the current directory")?;

    let mut provisioner =
        Provisioner::new(config.clone(), base_dir, SystemRunner::new()).with_resume(cli.resume);

    if cli.dry_run {
        println!("Dry run: nothing will be executed or written.");
        for planned in provisioner.plan(&request)? {
            let marker = if planned.skipped { "skip" } else { "    " };
            println!(
                "[{}] {:>2}. {}: {}",
                marker,
                planned.step.order(),
                planned.step,
                planned.action
            );
        }
        return Ok(());
    }

    if !cli.skip_preflight {
        sanity::run_preflight_checks(&config)?;
    }

    let root = provisioner.project_root(&request);
    match provisioner.provision(&request) {
        Ok(report) => {
            info!(
                "Provisioned {}: {} step(s) run, {} resumed",
                report.project_root.display(),
                report.executed.len(),
                report.resumed.len()
            );
            Ok(())
        }
        Err(e) => {
            if Checkpoint::exists_in(&root) {
                eprintln!(
                    "Progress was saved. Fix the problem and rerun with --resume, or delete {} to start over.",
                    root.display()
                );
            }
            Err(e.into())
        }
    }
}
