//! CLI module - Command line interface definitions and handlers

pub mod report;

use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};

use crate::config::Config;
use crate::error::{BomError, Result};
use crate::strip::{strip_file_with_progress, Outcome, StripOptions};

pub use report::Reporter;

/// bom-strip - remove a byte-order mark or encoding signature from a file
///
/// Writes the content after the signature to a new file next to the
/// original (`notes.txt` -> `notes_nobom.txt`). The original is never
/// modified.
#[derive(Parser, Debug)]
#[command(name = "bom-strip")]
#[command(version)]
#[command(about = "Strip byte-order marks and encoding signatures from files", long_about = None)]
pub struct Cli {
    /// File to scan
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Only report the detected signature, don't write anything
    #[arg(long, short = 'n')]
    pub dry_run: bool,

    /// Re-read the new file and check its blake3 hash
    #[arg(long)]
    pub verify: bool,

    /// Marker inserted before the extension of the new file
    #[arg(long, value_name = "SUFFIX", value_parser = parse_suffix)]
    pub suffix: Option<String>,

    /// Load settings from a TOML file
    #[arg(long, short, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print a sample config file and exit
    #[arg(long)]
    pub print_config: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "human")]
    pub output: OutputFormat,

    /// Verbose logging
    #[arg(long, short)]
    pub verbose: bool,

    /// Only print errors and the final result
    #[arg(long, short, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human readable progress and summary
    Human,
    /// A single JSON object
    Json,
}

fn parse_suffix(s: &str) -> std::result::Result<String, String> {
    if s.is_empty() {
        return Err("suffix must not be empty".to_string());
    }
    if s.contains(['/', '\\']) {
        return Err("suffix must not contain path separators".to_string());
    }
    Ok(s.to_string())
}

impl Cli {
    /// The one file to operate on
    pub fn single_file(&self) -> Result<&Path> {
        match self.files.as_slice() {
            [file] => Ok(file),
            _ => Err(BomError::Usage),
        }
    }

    /// Config from `--config`, or defaults when none was given
    pub fn load_config(&self) -> Result<Config> {
        match &self.config {
            Some(path) => Ok(Config::load_from(path)?),
            None => Ok(Config::default()),
        }
    }

    /// Config values overridden by command line flags
    pub fn strip_options(&self, config: &Config) -> StripOptions {
        let mut options = config.strip_options();
        if let Some(suffix) = &self.suffix {
            options.suffix = suffix.clone();
        }
        options.verify |= self.verify;
        options.dry_run = self.dry_run;
        options
    }

    pub fn log_level<'a>(&self, config: &'a Config) -> &'a str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            &config.general.log_level
        }
    }

    pub fn color(&self, config: &Config) -> bool {
        !self.no_color && config.general.color
    }
}

/// Validate the invocation and strip the single file it names
pub fn run(cli: &Cli, config: &Config, reporter: &mut Reporter) -> Result<Outcome> {
    let path = cli.single_file()?;
    let options = cli.strip_options(config);
    strip_file_with_progress(path, &options, |event| reporter.event(&event))
}
