//! Resolve command

use clap::Args;
use tracing::info;

use crate::cli::context::ChangelogContext;
use crate::cli::{output, Cli, OutputFormat};

/// Print the URL a reference label resolves to
#[derive(Debug, Args)]
pub struct ResolveCommand {
    /// Reference label, as used in `` `label`_ ``
    pub label: String,
}

impl ResolveCommand {
    /// Execute the resolve command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(label = %self.label, "executing resolve command");
        let (_, store) = ChangelogContext::load(cli)?;
        let url = store.resolve_link(&self.label)?;

        match cli.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "label": self.label,
                    "url": url,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                println!("{}", output::link(url));
            }
        }

        Ok(())
    }
}
