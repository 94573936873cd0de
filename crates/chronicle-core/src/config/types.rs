//! Configuration types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Main configuration for Chronicle
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Version of the config schema
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Changelog source configuration
    pub changelog: ChangelogConfig,

    /// Rendering configuration
    pub render: RenderConfig,
}

/// Changelog source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangelogConfig {
    /// Changelog file path, relative to the config directory
    pub file: PathBuf,

    /// Default output format (text, markdown, html, rst, json)
    pub format: String,

    /// Replacement text for `|name|` substitutions not defined in the document
    #[serde(default)]
    pub substitutions: BTreeMap<String, String>,

    /// Link targets used when the document lacks a definition for a label
    #[serde(default)]
    pub links: BTreeMap<String, String>,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("docs/changelog.rst"),
            format: "text".to_string(),
            substitutions: BTreeMap::new(),
            links: BTreeMap::new(),
        }
    }
}

/// Rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// strftime pattern for release dates
    pub date_format: String,

    /// Wrap HTML output in a complete document
    pub standalone: bool,

    /// Title override for rendered output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            date_format: "%Y-%m-%d".to_string(),
            standalone: false,
            title: None,
        }
    }
}
