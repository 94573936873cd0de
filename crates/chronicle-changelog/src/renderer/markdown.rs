//! Markdown changelog renderer

use chronicle_core::ChangelogError;
use tracing::{debug, instrument};

use super::{resolve_inlines, ChangelogRenderer, RenderOptions, Span};
use crate::store::Store;
use crate::types::{Block, Inline, Section};

/// Markdown changelog renderer
pub struct MarkdownRenderer {
    /// Heading level of release headers; the title sits one level above
    pub heading_level: usize,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self { heading_level: 2 }
    }

    /// Set the heading level used for release headers
    pub fn with_heading_level(mut self, level: usize) -> Self {
        self.heading_level = level.clamp(1, 6);
        self
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangelogRenderer for MarkdownRenderer {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn extension(&self) -> &'static str {
        "md"
    }

    #[instrument(skip(self, store, options), fields(entries = store.len()))]
    fn render(&self, store: &Store, options: &RenderOptions) -> Result<String, ChangelogError> {
        let mut output = String::new();

        if let Some(title) = options.title(store) {
            output.push_str(&format!(
                "{} {}\n\n",
                "#".repeat(self.heading_level.saturating_sub(1).max(1)),
                escape_markdown(title)
            ));
        }
        blocks(&mut output, store, store.preamble(), 0)?;

        for entry in store.entries() {
            output.push_str(&format!(
                "{} {}\n\n",
                "#".repeat(self.heading_level),
                escape_markdown(&options.entry_header(entry)?)
            ));
            blocks(&mut output, store, &entry.blocks, 0)?;
            for section in &entry.sections {
                self.section(&mut output, store, section)?;
            }
        }

        debug!(output_len = output.len(), "markdown changelog rendered");
        Ok(output)
    }
}

impl MarkdownRenderer {
    fn section(
        &self,
        output: &mut String,
        store: &Store,
        section: &Section,
    ) -> Result<(), ChangelogError> {
        let level = (self.heading_level + section.level).min(6);
        output.push_str(&format!(
            "{} {}\n\n",
            "#".repeat(level),
            inline_markdown(store, &section.heading)?
        ));
        blocks(output, store, &section.blocks, 0)?;
        for child in &section.sections {
            self.section(output, store, child)?;
        }
        Ok(())
    }
}

fn blocks(
    output: &mut String,
    store: &Store,
    blocks_in: &[Block],
    indent: usize,
) -> Result<(), ChangelogError> {
    let pad = " ".repeat(indent);
    for block in blocks_in {
        match block {
            Block::Paragraph(inlines) => {
                output.push_str(&format!("{}{}\n\n", pad, inline_markdown(store, inlines)?));
            }
            Block::BulletList(items) => {
                for item in items {
                    output.push_str(&format!(
                        "{}- {}\n",
                        pad,
                        inline_markdown(store, &item.content)?
                    ));
                    if !item.children.is_empty() {
                        let mut nested = String::new();
                        blocks(&mut nested, store, &item.children, indent + 2)?;
                        output.push_str(nested.trim_end_matches('\n'));
                        output.push('\n');
                    }
                }
                output.push('\n');
            }
            Block::Literal(text) => {
                let fence = fence_for(text);
                output.push_str(&format!("{}{}\n", pad, fence));
                for line in text.lines() {
                    output.push_str(&format!("{}{}\n", pad, line));
                }
                output.push_str(&format!("{}{}\n\n", pad, fence));
            }
        }
    }
    Ok(())
}

/// Inline content as markdown
fn inline_markdown(store: &Store, inlines: &[Inline]) -> Result<String, ChangelogError> {
    let spans = resolve_inlines(store, inlines)?;
    Ok(spans
        .iter()
        .map(|span| match span {
            Span::Text(s) => escape_markdown(s),
            Span::Literal(s) => code_span(s),
            Span::Emphasis(s) => format!("*{}*", escape_markdown(s)),
            Span::Strong(s) => format!("**{}**", escape_markdown(s)),
            Span::Link { text, url } if text == url => format!("<{}>", url),
            Span::Link { text, url } => format!("[{}]({})", escape_markdown(text), url),
        })
        .collect())
}

/// Escape characters with meaning in markdown inline text
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len() + text.len() / 10);
    for c in text.chars() {
        if matches!(c, '\\' | '*' | '_' | '[' | ']' | '`' | '<' | '>' | '|') {
            result.push('\\');
        }
        result.push(c);
    }
    result
}

/// Inline code with enough backticks to contain the text
fn code_span(text: &str) -> String {
    let ticks = longest_run(text, '`') + 1;
    let fence = "`".repeat(ticks);
    if text.starts_with('`') || text.ends_with('`') {
        format!("{} {} {}", fence, text, fence)
    } else {
        format!("{}{}{}", fence, text, fence)
    }
}

/// Code fence longer than any backtick run in the text
fn fence_for(text: &str) -> String {
    "`".repeat(longest_run(text, '`').max(2) + 1)
}

fn longest_run(text: &str, ch: char) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in text.chars() {
        if c == ch {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}
