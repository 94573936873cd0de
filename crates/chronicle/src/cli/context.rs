//! Changelog loading shared by commands

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info};

use chronicle_changelog::Store;
use chronicle_core::config::{config_base_dir, load_config_or_default};
use chronicle_core::{ChangelogError, ChronicleError, Config};

use crate::cli::Cli;

/// Configuration and the changelog it points at
#[derive(Debug)]
pub struct ChangelogContext {
    pub config: Config,
    pub changelog_path: PathBuf,
}

impl ChangelogContext {
    /// Discover configuration from the working directory
    pub fn discover(cli: &Cli) -> anyhow::Result<Self> {
        let cwd = std::env::current_dir()?;
        Ok(Self::discover_in(&cwd, cli.file.as_deref())?)
    }

    /// Discover configuration from `cwd`; only a missing config falls back to defaults
    pub fn discover_in(cwd: &Path, file: Option<&Path>) -> Result<Self, ChronicleError> {
        let (config, config_path) = load_config_or_default(cwd)?;
        let changelog_path = changelog_path(file, cwd, &config, config_path.as_deref());
        debug!(
            changelog = %changelog_path.display(),
            config = ?config_path,
            "changelog context resolved"
        );
        Ok(Self {
            config,
            changelog_path,
        })
    }

    /// Load the changelog, merging configured substitutions and links
    pub fn load_store(&self) -> Result<Store, ChangelogError> {
        let store = Store::from_path(&self.changelog_path)?
            .with_substitutions(self.config.changelog.substitutions.clone())
            .with_links(self.config.changelog.links.clone());
        info!(
            path = %self.changelog_path.display(),
            entries = store.len(),
            "changelog ready"
        );
        Ok(store)
    }

    /// Discover configuration and load the changelog in one step
    pub fn load(cli: &Cli) -> anyhow::Result<(Self, Store)> {
        let context = Self::discover(cli)?;
        let store = context
            .load_store()
            .with_context(|| format!("Failed to load {}", context.changelog_path.display()))?;
        Ok((context, store))
    }
}

/// Changelog path: the `--file` flag, else the configured file relative to
/// the configuration's directory, else relative to the working directory
pub fn changelog_path(
    file: Option<&Path>,
    cwd: &Path,
    config: &Config,
    config_path: Option<&Path>,
) -> PathBuf {
    if let Some(file) = file {
        return cwd.join(file);
    }
    let base = config_path
        .map(config_base_dir)
        .unwrap_or_else(|| cwd.to_path_buf());
    base.join(&config.changelog.file)
}
