//! Show command

use clap::Args;
use tracing::info;

use chronicle_changelog::{render_with, EntryFilter, RenderOptions, Store};

use crate::cli::context::ChangelogContext;
use crate::cli::{Cli, OutputFormat};

/// Show the notes for one version
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Version to show; the newest entry when omitted
    #[arg(id = "show_version", value_name = "VERSION")]
    pub version: Option<String>,

    /// Render with this format instead of text
    #[arg(short, long, value_name = "FORMAT")]
    pub to: Option<String>,
}

impl ShowCommand {
    /// Execute the show command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(version = ?self.version, "executing show command");
        let (context, store) = ChangelogContext::load(cli)?;

        let format = match (&self.to, cli.format) {
            (Some(to), _) => to.as_str(),
            (None, OutputFormat::Json) => "json",
            (None, OutputFormat::Text) => "text",
        };
        let options = RenderOptions {
            title: None,
            ..RenderOptions::from(&context.config.render)
        };

        let rendered = show(&store, self.version.as_deref(), format, &options)?;
        print!("{}", rendered);
        Ok(())
    }
}

/// Render a single entry, the newest when no version is given
fn show(
    store: &Store,
    version: Option<&str>,
    format: &str,
    options: &RenderOptions,
) -> anyhow::Result<String> {
    let filter = match version {
        Some(version) => EntryFilter::version(version),
        None => EntryFilter::latest(1),
    };
    let selected = store.select(&filter)?;
    if selected.is_empty() {
        anyhow::bail!("The changelog has no release entries");
    }
    Ok(render_with(&selected.entries_only(), format, options)?)
}
