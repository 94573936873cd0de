//! Configuration validation

use std::fmt::Write;

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{ConfigError, Result};

use super::defaults::KNOWN_FORMATS;
use super::types::Config;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    validate_changelog(config)?;
    validate_render(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn validate_changelog(config: &Config) -> Result<()> {
    let format = config.changelog.format.trim().to_ascii_lowercase();
    if !KNOWN_FORMATS.contains(&format.as_str()) {
        return Err(ConfigError::InvalidValue {
            field: "changelog.format".to_string(),
            message: format!("must be one of: {}", KNOWN_FORMATS.join(", ")),
        }
        .into());
    }

    if config.changelog.file.as_os_str().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "changelog.file".to_string(),
            message: "file cannot be empty".to_string(),
        }
        .into());
    }

    for name in config.changelog.substitutions.keys() {
        if name.trim().is_empty() || name.contains('|') {
            return Err(ConfigError::InvalidValue {
                field: format!("changelog.substitutions.{}", name),
                message: "substitution names must be non-empty and cannot contain '|'".to_string(),
            }
            .into());
        }
    }

    for (label, url) in &config.changelog.links {
        if url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: format!("changelog.links.{}", label),
                message: "link target cannot be empty".to_string(),
            }
            .into());
        }
    }

    Ok(())
}

fn validate_render(config: &Config) -> Result<()> {
    // Patterns that need a time or zone fail when formatting a plain date
    let mut sample = String::new();
    let formats = NaiveDate::from_ymd_opt(2024, 1, 31)
        .map(|date| write!(sample, "{}", date.format(&config.render.date_format)).is_ok())
        .unwrap_or(false);
    if !formats || config.render.date_format.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "render.date_format".to_string(),
            message: format!("invalid date format '{}'", config.render.date_format),
        }
        .into());
    }

    Ok(())
}
