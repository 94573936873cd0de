//! List command

use clap::Args;
use serde::Serialize;
use tracing::info;

use chronicle_changelog::{EntryFilter, ReleaseEntry, Store};

use crate::cli::context::ChangelogContext;
use crate::cli::{output, Cli, OutputFormat};

/// List released versions
#[derive(Debug, Args)]
pub struct ListCommand {
    /// List at most this many of the newest entries
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct EntrySummary {
    version: String,
    date: String,
    line: usize,
    sections: Vec<String>,
}

impl From<&ReleaseEntry> for EntrySummary {
    fn from(entry: &ReleaseEntry) -> Self {
        Self {
            version: entry.version.clone(),
            date: entry.date.format("%Y-%m-%d").to_string(),
            line: entry.line,
            sections: entry.sections.iter().map(|s| s.title.clone()).collect(),
        }
    }
}

impl ListCommand {
    /// Execute the list command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(limit = ?self.limit, "executing list command");
        let (context, store) = ChangelogContext::load(cli)?;
        let store = match self.limit {
            Some(limit) => store.select(&EntryFilter::latest(limit))?,
            None => store,
        };
        let summaries = summarize(&store);

        match cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            }
            OutputFormat::Text => {
                if summaries.is_empty() {
                    if !cli.quiet {
                        output::warning(format!(
                            "No release entries in {}",
                            output::path(&context.changelog_path)
                        ));
                    }
                    return Ok(());
                }

                if !cli.quiet {
                    println!(
                        "{}",
                        output::heading(store.title().unwrap_or("Releases"))
                    );
                    println!();
                }
                let width = summaries.iter().map(|s| s.version.len()).max().unwrap_or(0);
                for summary in &summaries {
                    println!(
                        "  {}  {}",
                        output::version(&summary.version, width),
                        summary.date
                    );
                    if cli.verbose {
                        for section in &summary.sections {
                            println!("  {:width$}    - {}", "", section);
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

fn summarize(store: &Store) -> Vec<EntrySummary> {
    store.entries().map(EntrySummary::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summaries_in_document_order() {
        let store = Store::load(
            "\
2.0 (2024-Jan-01)
-----------------

Core
====

* Fixed X

1.0 (2023-Mar-05)
-----------------

* Initial release
",
        )
        .unwrap();

        let summaries = summarize(&store);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].version, "2.0");
        assert_eq!(summaries[0].sections, vec!["Core".to_string()]);
        assert_eq!(summaries[1].date, "2023-03-05");
        assert_eq!(summaries[1].line, 9);
    }
}
