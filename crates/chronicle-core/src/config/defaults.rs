//! Default configuration values

use super::types::Config;

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "chronicle.toml";

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "chronicle.yaml";

/// Alternative configuration file name
pub const ALT_CONFIG_FILE: &str = ".chronicle.toml";

/// Output formats understood by the renderer registry: every renderer's
/// name, extension and aliases. The registry tests keep the two in step.
pub const KNOWN_FORMATS: &[&str] = &[
    "text",
    "txt",
    "plain",
    "markdown",
    "md",
    "html",
    "htm",
    "rst",
    "restructuredtext",
    "rest",
    "json",
];

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_TOML,
        DEFAULT_CONFIG_YAML,
        ALT_CONFIG_FILE,
        ".chronicle.yaml",
    ]
}

/// Changelog locations checked when creating a configuration
pub const CHANGELOG_CANDIDATES: &[&str] = &[
    "docs/changelog.rst",
    "CHANGELOG.rst",
    "CHANGES.rst",
    "docs/changes.rst",
    "NEWS.rst",
];

/// Serialize a configuration as TOML under the template header
pub fn config_toml(config: &Config) -> Result<String, toml::ser::Error> {
    Ok(format!(
        "# Chronicle Configuration\n\n{}",
        toml::to_string_pretty(config)?
    ))
}

/// Default configuration template
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Chronicle Configuration

[changelog]
file = "docs/changelog.rst"
format = "text"

[changelog.substitutions]

[changelog.links]

[render]
date_format = "%Y-%m-%d"
standalone = false
"#;
