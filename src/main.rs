//! bom-strip - strip byte-order marks and encoding signatures from files
//!
//! Reads the first four bytes of a file, and if they start with a known
//! encoding signature writes the rest of the file to `<name>_nobom.<ext>`.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bom_strip::cli::{self, Cli, Reporter};
use bom_strip::config::generate_sample_config;

fn init_logging(level: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .compact()
                .with_writer(std::io::stderr),
        )
        .with(EnvFilter::from_default_env().add_directive(format!("bom_strip={level}").parse()?))
        .try_init()?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", generate_sample_config());
        return ExitCode::SUCCESS;
    }

    let mut reporter = Reporter::new(cli.output, cli.quiet);

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            reporter.error(&e);
            return ExitCode::from(e.exit_code());
        }
    };

    if let Err(e) = init_logging(cli.log_level(&config)) {
        eprintln!("Failed to initialize logging: {e:#}");
    }
    if !cli.color(&config) {
        colored::control::set_override(false);
    }

    match cli::run(&cli, &config, &mut reporter) {
        Ok(outcome) => {
            reporter.outcome(&outcome);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::debug!(kind = e.kind(), "Strip failed");
            reporter.error(&e);
            ExitCode::from(e.exit_code())
        }
    }
}
