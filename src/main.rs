//! depgroup - grouped dependency update CLI tool
//!
//! Reads the groups configured in `depgroup.toml`, compiles one change per
//! group and writes the updated manifests.

use anyhow::Context;
use clap::Parser;
use depgroup::cli::CliArgs;
use depgroup::config::{RunConfig, Settings};
use depgroup::orchestrator::Orchestrator;
use depgroup::output::{create_formatter, OutputConfig};
use std::io::{self, Write};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_tracing(&args);

    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Install the stderr subscriber; `RUST_LOG` wins over the CLI verbosity
fn init_tracing(args: &CliArgs) {
    let default_directive = if args.quiet {
        "warn"
    } else if args.verbose {
        "depgroup=debug"
    } else {
        "depgroup=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let config_path = args.config_path();
    let config = RunConfig::load(&config_path)
        .with_context(|| format!("loading configuration from {}", config_path.display()))?;
    let settings = Settings::resolve(&args, config)?;

    tracing::debug!(
        root = %settings.root.display(),
        package_manager = %settings.package_manager,
        groups = settings.groups.len(),
        dry_run = settings.dry_run,
        "starting run"
    );

    let orchestrator = Orchestrator::new(settings)?;
    let result = orchestrator.run(!args.quiet && !args.json).await?;

    let output_config = OutputConfig::from_cli(args.json, args.verbose, args.quiet, args.dry_run);
    let formatter = create_formatter(output_config);

    let mut stdout = io::stdout().lock();
    formatter.format(&result, &mut stdout)?;
    stdout.flush()?;

    if result.has_errors() {
        // Partial success - some dependencies failed
        Ok(ExitCode::from(2))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
