//! Terminal output for strip runs, human or JSON.

use std::io::{self, Write};

use colored::Colorize;
use serde_json::json;

use super::OutputFormat;
use crate::error::BomError;
use crate::rewrite::Progress;
use crate::strip::{Outcome, StripEvent};

/// Prints progress events and the final result
pub struct Reporter {
    format: OutputFormat,
    quiet: bool,
    /// A progress line was started without a newline
    open_line: bool,
}

impl Reporter {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self {
            format,
            quiet,
            open_line: false,
        }
    }

    fn show_progress(&self) -> bool {
        self.format == OutputFormat::Human && !self.quiet
    }

    pub fn event(&mut self, event: &StripEvent) {
        if !self.show_progress() {
            return;
        }

        match event {
            StripEvent::PrefixRead(prefix) => {
                println!("Read possible BOM bytes: {}", hex::encode(prefix));
            }
            StripEvent::Detected(signature) => {
                println!("{} Replacing...", "BOM detected!".yellow().bold());
                println!("Encoding: {} ({} bytes)", signature.name, signature.len);
            }
            StripEvent::Rewrite(Progress::Allocating { bytes }) => {
                print!("Allocating {bytes} bytes..");
                self.flush_open_line();
            }
            StripEvent::Rewrite(Progress::Writing { path }) => {
                print!("Writing {}..", path.display());
                self.flush_open_line();
            }
            StripEvent::Rewrite(Progress::Allocated | Progress::Written { .. }) => {
                println!("done");
                self.open_line = false;
            }
        }
    }

    fn flush_open_line(&mut self) {
        let _ = io::stdout().flush();
        self.open_line = true;
    }

    pub fn outcome(&mut self, outcome: &Outcome) {
        if self.format == OutputFormat::Json {
            match serde_json::to_string_pretty(outcome) {
                Ok(json) => println!("{json}"),
                Err(e) => tracing::error!("Failed to serialize outcome: {e}"),
            }
            return;
        }

        match outcome {
            Outcome::NoSignature { .. } => {
                println!("BOM not detected..nothing to do. Bye!");
            }
            Outcome::Detected {
                signature, output, ..
            } => {
                println!(
                    "{} {} signature found, would write {}",
                    "ℹ".bright_cyan(),
                    signature.name,
                    output.display()
                );
            }
            Outcome::Stripped { report, .. } => {
                let verified = if report.verified {
                    format!(", {}", "blake3 verified".green())
                } else {
                    String::new()
                };
                println!(
                    "{} Done! Wrote {} ({}{})",
                    "✓".green(),
                    report.output.display().to_string().bold(),
                    humansize::format_size(report.payload_size, humansize::BINARY),
                    verified
                );
            }
        }
    }

    pub fn error(&mut self, err: &BomError) {
        if self.open_line {
            println!();
            self.open_line = false;
        }

        if self.format == OutputFormat::Json {
            let value = json!({
                "status": "error",
                "kind": err.kind(),
                "message": err.to_string(),
            });
            println!("{value}");
            return;
        }

        match err {
            BomError::Usage => {
                println!("{err}");
                println!("Usage: bom-strip [OPTIONS] <FILE>");
            }
            _ => eprintln!("{} {}", "✗".red(), err),
        }
    }
}
