//! Init command

use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use dialoguer::Confirm;
use tracing::info;

use chronicle_core::config::defaults::{
    config_toml, CHANGELOG_CANDIDATES, DEFAULT_CONFIG_TEMPLATE, DEFAULT_CONFIG_TOML,
    DEFAULT_CONFIG_YAML,
};
use chronicle_core::Config;

use crate::cli::Cli;

/// Create a Chronicle configuration file
#[derive(Debug, Args)]
pub struct InitCommand {
    /// Force overwrite existing configuration
    #[arg(long)]
    pub force: bool,

    /// Use defaults without prompting
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Write YAML instead of TOML
    #[arg(long)]
    pub yaml: bool,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl InitCommand {
    /// Execute the init command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(force = self.force, yes = self.yes, yaml = self.yaml, "executing init command");
        let cwd = std::env::current_dir()?;
        let default_name = if self.yaml {
            DEFAULT_CONFIG_YAML
        } else {
            DEFAULT_CONFIG_TOML
        };
        let config_path = self
            .output
            .clone()
            .unwrap_or_else(|| cwd.join(default_name));

        // Check if config already exists
        if config_path.exists() && !self.force {
            if self.yes {
                anyhow::bail!(
                    "Configuration file already exists at {}. Use --force to overwrite.",
                    config_path.display()
                );
            }

            let overwrite = Confirm::new()
                .with_prompt(format!(
                    "Configuration file already exists at {}. Overwrite?",
                    config_path.display()
                ))
                .default(false)
                .interact()?;

            if !overwrite {
                println!("{}", style("Aborted.").yellow());
                return Ok(());
            }
        }

        let detected = detect_changelog(&cwd);
        let content = config_content(detected.as_deref(), self.yaml)?;
        std::fs::write(&config_path, &content)?;

        if !cli.quiet {
            println!(
                "{} Created configuration at {}",
                style("✓").green().bold(),
                style(config_path.display()).cyan()
            );
            if let Some(file) = &detected {
                println!("  Using changelog {}", style(file.display()).cyan());
            }
            println!();
            println!("Next steps:");
            println!("  1. Edit {} to set substitutions and links", config_path.display());
            println!("  2. Run {} to verify your changelog", style("chronicle check").cyan());
            println!("  3. Run {} to publish it", style("chronicle render --to html").cyan());
        }

        Ok(())
    }
}

/// First conventional changelog location that exists under `dir`
fn detect_changelog(dir: &Path) -> Option<PathBuf> {
    CHANGELOG_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|candidate| dir.join(candidate).is_file())
}

/// Configuration file content, pointing at `changelog` when one was found
fn config_content(changelog: Option<&Path>, yaml: bool) -> anyhow::Result<String> {
    let mut config = Config::default();
    if let Some(file) = changelog {
        config.changelog.file = file.to_path_buf();
    }

    Ok(match (yaml, changelog) {
        (true, _) => serde_yaml::to_string(&config)?,
        (false, None) => DEFAULT_CONFIG_TEMPLATE.to_string(),
        (false, Some(_)) => config_toml(&config)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_detect_changelog() {
        let temp = TempDir::new().unwrap();
        assert_eq!(detect_changelog(temp.path()), None);

        std::fs::write(temp.path().join("CHANGES.rst"), "").unwrap();
        assert_eq!(detect_changelog(temp.path()), Some(PathBuf::from("CHANGES.rst")));
    }

    #[test]
    fn test_default_content_is_template() {
        assert_eq!(config_content(None, false).unwrap(), DEFAULT_CONFIG_TEMPLATE);
    }

    #[test]
    fn test_content_points_at_detected_changelog() {
        let content = config_content(Some(Path::new("CHANGES.rst")), false).unwrap();
        assert!(content.contains("file = \"CHANGES.rst\""));

        let content = config_content(Some(Path::new("CHANGES.rst")), true).unwrap();
        assert!(content.contains("file: CHANGES.rst"));
    }
}
