//! Configuration Module - optional TOML settings file
//!
//! Only read when `--config <PATH>` is passed; there is no implicit search
//! path. Supports:
//! - Output suffix and verification defaults
//! - Log level
//! - Colored output toggle

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::naming::NOBOM_SUFFIX;
use crate::strip::StripOptions;

/// bom-strip configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,
    /// Strip settings
    pub strip: StripConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error
    pub log_level: String,
    /// Colorize human output
    pub color: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            color: true,
        }
    }
}

/// Strip settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StripConfig {
    /// Marker inserted before the output file's extension
    pub suffix: String,
    /// Verify the written file's blake3 against the payload
    pub verify: bool,
}

impl Default for StripConfig {
    fn default() -> Self {
        Self {
            suffix: NOBOM_SUFFIX.to_string(),
            verify: false,
        }
    }
}

impl Config {
    /// Load config from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject unknown log levels and suffixes that can't form a file name
    pub fn validate(&self) -> Result<()> {
        self.general
            .log_level
            .parse::<tracing::Level>()
            .with_context(|| format!("Invalid general.log_level: {}", self.general.log_level))?;
        if self.strip.suffix.is_empty() {
            anyhow::bail!("strip.suffix must not be empty");
        }
        if self.strip.suffix.contains(['/', '\\']) {
            anyhow::bail!("strip.suffix must not contain path separators");
        }
        Ok(())
    }

    /// Strip options with this config's defaults
    pub fn strip_options(&self) -> StripOptions {
        StripOptions {
            suffix: self.strip.suffix.clone(),
            dry_run: false,
            verify: self.strip.verify,
        }
    }
}

/// Generate a sample config file with comments
pub fn generate_sample_config() -> String {
    r#"# bom-strip configuration
# Pass with: bom-strip --config bom-strip.toml <FILE>

[general]
# Log level: trace, debug, info, warn, error
log_level = "warn"

# Colorize human-readable output
color = true

[strip]
# Inserted before the last extension: notes.txt -> notes_nobom.txt
suffix = "_nobom"

# Re-read the new file and compare its blake3 hash with the stripped payload
verify = false
"#
    .to_string()
}
