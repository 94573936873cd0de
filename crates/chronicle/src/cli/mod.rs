//! CLI definition and command handling

pub mod commands;
pub mod context;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::{
    CheckCommand, CompletionsCommand, InitCommand, ListCommand, RenderCommand, ResolveCommand,
    ShowCommand,
};

/// Chronicle - reStructuredText changelog tooling
#[derive(Debug, Parser)]
#[command(name = "chronicle")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Working directory
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<PathBuf>,

    /// Changelog file (overrides the configured path)
    #[arg(short, long, global = true, env = "CHRONICLE_FILE")]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a Chronicle configuration file
    Init(InitCommand),

    /// Render the changelog to another format
    Render(RenderCommand),

    /// List released versions
    List(ListCommand),

    /// Show the notes for one version
    Show(ShowCommand),

    /// Print the URL a reference label resolves to
    Resolve(ResolveCommand),

    /// Check the changelog for markup and reference problems
    Check(CheckCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> anyhow::Result<()> {
        // Change to specified directory if provided
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)?;
        }

        match self.command {
            Commands::Init(ref cmd) => cmd.execute(&self),
            Commands::Render(ref cmd) => cmd.execute(&self),
            Commands::List(ref cmd) => cmd.execute(&self),
            Commands::Show(ref cmd) => cmd.execute(&self),
            Commands::Resolve(ref cmd) => cmd.execute(&self),
            Commands::Check(ref cmd) => cmd.execute(&self),
            Commands::Completions(ref cmd) => cmd.execute(&self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_render() {
        let cli = Cli::try_parse_from([
            "chronicle",
            "-f",
            "CHANGES.rst",
            "render",
            "--to",
            "md",
            "--for-version",
            "2.0",
        ])
        .unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("CHANGES.rst")));
        let Commands::Render(cmd) = cli.command else {
            panic!("expected render command");
        };
        assert_eq!(cmd.to.as_deref(), Some("md"));
        assert_eq!(cmd.for_version.as_deref(), Some("2.0"));
    }

    #[test]
    fn test_global_format_flag() {
        let cli = Cli::try_parse_from(["chronicle", "list", "--format", "json"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Commands::List(_)));
    }
}
