//! Completions command

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};
use tracing::{debug, info};

use crate::cli::{output, Cli};

/// Binary name baked into generated scripts
const BIN_NAME: &str = "chronicle";

/// Print a completion script for `chronicle`
#[derive(Debug, Args)]
pub struct CompletionsCommand {
    /// Target shell; detected from `$SHELL` when omitted
    #[arg(value_enum)]
    pub shell: Option<Shell>,

    /// Write the script to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl CompletionsCommand {
    /// Execute the completions command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let shell = self
            .shell
            .or_else(Shell::from_env)
            .ok_or_else(|| anyhow::anyhow!("Cannot detect the shell from $SHELL; name one"))?;
        info!(%shell, output = ?self.output, "executing completions command");

        match &self.output {
            Some(path) => {
                let mut file = std::fs::File::create(path)?;
                write_script(shell, &mut file)?;
                if !cli.quiet {
                    output::success(format!(
                        "{} completions written to {}",
                        shell,
                        output::path(path)
                    ));
                }
            }
            None => write_script(shell, &mut io::stdout().lock())?,
        }
        Ok(())
    }
}

/// Generate the completion script for `shell` into `out`
fn write_script(shell: Shell, out: &mut dyn Write) -> io::Result<()> {
    let mut command = Cli::command();
    generate(shell, &mut command, BIN_NAME, out);
    debug!(%shell, "completion script generated");
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_script_mentions_subcommands() {
        for shell in [Shell::Bash, Shell::Zsh, Shell::Fish] {
            let mut buf = Vec::new();
            write_script(shell, &mut buf).unwrap();
            let script = String::from_utf8(buf).unwrap();
            for subcommand in ["render", "resolve", "check"] {
                assert!(script.contains(subcommand), "{shell} script lacks {subcommand}");
            }
        }
    }

    #[test]
    fn test_parse_shell_argument() {
        let cli = Cli::try_parse_from(["chronicle", "completions", "zsh"]).unwrap();
        let crate::cli::Commands::Completions(cmd) = cli.command else {
            panic!("expected completions command");
        };
        assert_eq!(cmd.shell, Some(Shell::Zsh));
    }

    #[test]
    fn test_completions_written_to_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("chronicle.bash");
        let cli = Cli::try_parse_from(["chronicle", "-q", "completions", "bash"]).unwrap();
        let cmd = CompletionsCommand {
            shell: Some(Shell::Bash),
            output: Some(path.clone()),
        };
        cmd.execute(&cli).unwrap();

        let script = std::fs::read_to_string(&path).unwrap();
        assert!(script.contains(BIN_NAME));
    }
}
