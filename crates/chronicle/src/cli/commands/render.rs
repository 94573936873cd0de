//! Render command

use std::path::{Path, PathBuf};

use clap::Args;
use tracing::info;

use chronicle_changelog::{render_with, EntryFilter, RenderOptions, RendererRegistry};

use crate::cli::context::ChangelogContext;
use crate::cli::{output, Cli};

/// Render the changelog to another format
#[derive(Debug, Args)]
pub struct RenderCommand {
    /// Output format (text, markdown, html, rst, json); defaults to the
    /// output file's extension, then the configured format
    #[arg(short, long, value_name = "FORMAT")]
    pub to: Option<String>,

    /// Render only this version
    #[arg(long = "for-version", value_name = "VERSION")]
    pub for_version: Option<String>,

    /// Render at most this many of the newest entries
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Wrap HTML output in a complete document
    #[arg(long)]
    pub standalone: bool,

    /// Title to use instead of the document title
    #[arg(long)]
    pub title: Option<String>,

    /// Output file (default: print to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl RenderCommand {
    /// Execute the render command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(
            to = ?self.to,
            version = ?self.for_version,
            limit = ?self.limit,
            "executing render command"
        );
        let (context, store) = ChangelogContext::load(cli)?;

        let format = self.format(&context.config.changelog.format);
        let mut options = RenderOptions::from(&context.config.render);
        options.standalone |= self.standalone;
        if let Some(title) = &self.title {
            options.title = Some(title.clone());
        }

        let filter = EntryFilter {
            version: self.for_version.clone(),
            limit: self.limit,
        };
        let selected = store.select(&filter)?;
        let rendered = render_with(&selected, &format, &options)?;

        match &self.output {
            Some(path) => {
                std::fs::write(path, &rendered)?;
                if !cli.quiet {
                    output::success(format!(
                        "Rendered {} entries as {} to {}",
                        selected.len(),
                        format,
                        output::path(path)
                    ));
                }
            }
            None => {
                print!("{}", rendered);
                if !rendered.ends_with('\n') {
                    println!();
                }
            }
        }

        Ok(())
    }

    /// Format to render: `--to`, else the output file extension when a
    /// renderer knows it, else the configured default
    fn format(&self, configured: &str) -> String {
        if let Some(to) = &self.to {
            return to.clone();
        }
        self.output
            .as_deref()
            .and_then(format_for_path)
            .unwrap_or_else(|| configured.to_string())
    }
}

fn format_for_path(path: &Path) -> Option<String> {
    let extension = path.extension()?.to_str()?;
    RendererRegistry::new()
        .get(extension)
        .map(|renderer| renderer.name().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(to: Option<&str>, output: Option<&str>) -> RenderCommand {
        RenderCommand {
            to: to.map(str::to_string),
            for_version: None,
            limit: None,
            standalone: false,
            title: None,
            output: output.map(PathBuf::from),
        }
    }

    #[test]
    fn test_explicit_format_wins() {
        assert_eq!(command(Some("html"), Some("notes.md")).format("text"), "html");
    }

    #[test]
    fn test_format_from_output_extension() {
        assert_eq!(command(None, Some("notes.md")).format("text"), "markdown");
        assert_eq!(command(None, Some("notes.htm")).format("text"), "html");
    }

    #[test]
    fn test_configured_format_fallback() {
        assert_eq!(command(None, None).format("rst"), "rst");
        assert_eq!(command(None, Some("notes.pdf")).format("json"), "json");
    }
}
