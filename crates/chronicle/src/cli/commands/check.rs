//! Check command

use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use serde::Serialize;
use tracing::{info, warn};

use chronicle_core::config::load_config_from_dir;
use chronicle_core::{ChangelogError, ChronicleError, Config, ConfigError};

use crate::cli::context::{changelog_path, ChangelogContext};
use crate::cli::{output, Cli, OutputFormat};
use crate::exit_codes;

/// Check the changelog for markup and reference problems
#[derive(Debug, Args)]
pub struct CheckCommand {
    /// Strict mode - treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

/// Outcome of checking configuration and changelog
#[derive(Debug, Default, Serialize)]
pub struct CheckReport {
    valid: bool,
    config_path: Option<PathBuf>,
    changelog_path: PathBuf,
    entries: usize,
    links: usize,
    substitutions: usize,
    errors: Vec<String>,
    warnings: Vec<String>,
    #[serde(skip)]
    exit_code: Option<i32>,
}

impl CheckReport {
    fn fail(&mut self, code: i32, message: String) {
        self.errors.push(message);
        self.exit_code.get_or_insert(code);
    }
}

impl CheckCommand {
    /// Execute the check command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(strict = self.strict, "executing check command");
        let cwd = std::env::current_dir()?;
        let report = run_checks(&cwd, cli.file.as_deref(), self.strict);

        match cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            OutputFormat::Text => {
                if !cli.quiet {
                    print_report(&report);
                }
            }
        }

        if let Some(code) = report.exit_code {
            std::process::exit(code);
        }

        Ok(())
    }
}

/// Check configuration and changelog found from `cwd`
pub fn run_checks(cwd: &Path, file: Option<&Path>, strict: bool) -> CheckReport {
    let mut report = CheckReport::default();

    let config = match load_config_from_dir(cwd) {
        Ok((config, path)) => {
            report.config_path = Some(path);
            config
        }
        Err(ChronicleError::Config(ConfigError::NotFound(_))) => {
            report
                .warnings
                .push("No configuration file found, using defaults".to_string());
            Config::default()
        }
        Err(e) => {
            report.fail(exit_codes::CONFIG_ERROR, format!("Configuration: {}", e));
            Config::default()
        }
    };

    let context = ChangelogContext {
        changelog_path: changelog_path(file, cwd, &config, report.config_path.as_deref()),
        config,
    };
    report.changelog_path = context.changelog_path.clone();

    match context.load_store() {
        Ok(store) => {
            report.entries = store.len();
            report.links = store.links().count();
            report.substitutions = store.substitutions().len();
            for label in store.unresolved_references() {
                let err = ChangelogError::UnresolvedReference(label);
                report.fail(exit_codes::VALIDATION_ERROR, err.to_string());
            }
            for name in store.unresolved_substitutions() {
                let err = ChangelogError::UnresolvedSubstitution(name);
                report.fail(exit_codes::VALIDATION_ERROR, err.to_string());
            }
            if store.is_empty() {
                report.warnings.push("No release entries found".to_string());
            }
        }
        Err(e) => {
            warn!(error = %e, "changelog failed to load");
            let code = match &e {
                ChangelogError::MalformedDocument { .. } => exit_codes::PARSE_ERROR,
                _ => exit_codes::ERROR,
            };
            report.fail(code, e.to_string());
        }
    }

    // If strict, promote warnings to errors
    if strict && !report.warnings.is_empty() {
        let warnings = std::mem::take(&mut report.warnings);
        for warning in warnings {
            report.fail(exit_codes::VALIDATION_ERROR, warning);
        }
    }

    report.valid = report.errors.is_empty();
    report
}

fn print_report(report: &CheckReport) {
    println!("{}", output::heading("Check Results"));
    println!();

    if let Some(path) = &report.config_path {
        println!("{}", output::field("Config", output::path(path)));
    }
    println!(
        "{}",
        output::field("Changelog", output::path(&report.changelog_path))
    );
    println!("{}", output::field("Entries", report.entries));
    println!("{}", output::field("Links", report.links));
    println!("{}", output::field("Substitutions", report.substitutions));
    println!();

    if !report.errors.is_empty() {
        println!("{}", style("Errors:").red().bold());
        for error in &report.errors {
            println!("  {} {}", style("✗").red(), error);
        }
        println!();
    }

    if !report.warnings.is_empty() {
        println!("{}", style("Warnings:").yellow().bold());
        for warning in &report.warnings {
            println!("  {} {}", style("!").yellow(), warning);
        }
        println!();
    }

    if report.valid {
        if report.warnings.is_empty() {
            println!("{}", style("✓ All checks passed").green().bold());
        } else {
            println!(
                "{} with {} warning(s)",
                style("✓ Check passed").green().bold(),
                report.warnings.len()
            );
        }
    } else {
        println!(
            "{} with {} error(s)",
            style("✗ Check failed").red().bold(),
            report.errors.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_clean_changelog_passes() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "chronicle.toml", "[changelog]\nfile = \"CHANGES.rst\"\n");
        write(
            temp.path(),
            "CHANGES.rst",
            "1.0 (2023-Jan-01)\n-----------------\n\n* See `docs`_\n\n.. _docs: https://snapcraft.io/docs\n",
        );

        let report = run_checks(temp.path(), None, false);
        assert!(report.valid, "errors: {:?}", report.errors);
        assert_eq!(report.entries, 1);
        assert_eq!(report.links, 1);
        assert_eq!(report.substitutions, 0);
        assert_eq!(report.exit_code, None);
        assert_eq!(report.changelog_path, temp.path().join("CHANGES.rst"));
    }

    #[test]
    fn test_unresolved_reference_fails() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "docs/changelog.rst",
            "1.0 (2023-Jan-01)\n-----------------\n\n* See `Foo`_ and |team|\n",
        );

        let report = run_checks(temp.path(), None, false);
        assert!(!report.valid);
        assert_eq!(
            report.errors,
            vec![
                "Unresolved reference: Foo".to_string(),
                "Unresolved substitution: |team|".to_string(),
            ]
        );
        assert_eq!(report.exit_code, Some(exit_codes::VALIDATION_ERROR));
    }

    #[test]
    fn test_malformed_document_fails() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "CHANGES.rst", "1.0 (2023-Jan-01)\n-----\n");

        let report = run_checks(temp.path(), Some(Path::new("CHANGES.rst")), false);
        assert!(!report.valid);
        assert_eq!(report.exit_code, Some(exit_codes::PARSE_ERROR));
    }

    #[test]
    fn test_missing_config_warns_and_strict_fails() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "docs/changelog.rst",
            "1.0 (2023-Jan-01)\n-----------------\n\n* Initial release\n",
        );

        let report = run_checks(temp.path(), None, false);
        assert!(report.valid);
        assert_eq!(report.warnings.len(), 1);

        let report = run_checks(temp.path(), None, true);
        assert!(!report.valid);
        assert!(report.warnings.is_empty());
        assert_eq!(report.exit_code, Some(exit_codes::VALIDATION_ERROR));
    }

    #[test]
    fn test_invalid_config_fails() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "chronicle.toml", "[changelog]\nformat = \"pdf\"\n");

        let report = run_checks(temp.path(), None, false);
        assert!(!report.valid);
        assert_eq!(report.exit_code, Some(exit_codes::CONFIG_ERROR));
    }
}
