//! reStructuredText changelog renderer
//!
//! Writes a document that loads back into an equivalent store: the same
//! versions in the same order with the same sections. Every reference used
//! in the body gets a link target at the end of the document, pointing at
//! its resolved URL.

use std::collections::{BTreeMap, HashSet};

use chronicle_core::ChangelogError;
use tracing::{debug, instrument};

use super::{ChangelogRenderer, RenderOptions};
use crate::store::Store;
use crate::types::{normalize_label, Block, Inline, Section};

/// Adornment for the document title (overlined)
const TITLE_ADORNMENT: char = '*';

/// Adornment for release headings
const RELEASE_ADORNMENT: char = '=';

/// Adornments for section depths 1, 2, 3...
const SECTION_ADORNMENTS: &[char] = &['-', '^', '"', '~', '+'];

/// reStructuredText changelog renderer
pub struct RstRenderer;

impl RstRenderer {
    /// Create a new reStructuredText renderer
    pub fn new() -> Self {
        Self
    }
}

impl Default for RstRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangelogRenderer for RstRenderer {
    fn name(&self) -> &'static str {
        "rst"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["restructuredtext", "rest"]
    }

    fn extension(&self) -> &'static str {
        "rst"
    }

    #[instrument(skip(self, store, options), fields(entries = store.len()))]
    fn render(&self, store: &Store, options: &RenderOptions) -> Result<String, ChangelogError> {
        let mut writer = Writer {
            store,
            output: String::new(),
            links: Vec::new(),
            seen_links: HashSet::new(),
            substitutions: BTreeMap::new(),
        };

        if let Some(title) = options.title(store) {
            let rule: String = std::iter::repeat(TITLE_ADORNMENT)
                .take(title.chars().count())
                .collect();
            writer
                .output
                .push_str(&format!("{rule}\n{title}\n{rule}\n\n"));
        }
        writer.blocks(store.preamble(), 0)?;

        for entry in store.entries() {
            writer.heading(&entry.title, RELEASE_ADORNMENT);
            writer.blocks(&entry.blocks, 0)?;
            for section in &entry.sections {
                writer.section(section)?;
            }
        }

        writer.definitions();
        let Writer { output, links, .. } = writer;
        debug!(
            output_len = output.len(),
            links = links.len(),
            "rst changelog rendered"
        );
        Ok(output)
    }
}

struct Writer<'a> {
    store: &'a Store,
    output: String,
    /// Labels used in the body with their resolved URLs, in order of use
    links: Vec<(String, String)>,
    seen_links: HashSet<String>,
    substitutions: BTreeMap<String, String>,
}

impl Writer<'_> {
    fn heading(&mut self, title: &str, ch: char) {
        let rule: String = std::iter::repeat(ch).take(title.chars().count()).collect();
        self.output.push_str(&format!("{title}\n{rule}\n\n"));
    }

    fn section(&mut self, section: &Section) -> Result<(), ChangelogError> {
        let ch = SECTION_ADORNMENTS
            .get(section.level - 1)
            .or(SECTION_ADORNMENTS.last())
            .copied()
            .unwrap_or('-');
        let title = self.inlines(&section.heading)?;
        self.heading(&title, ch);
        self.blocks(&section.blocks, 0)?;
        for child in &section.sections {
            self.section(child)?;
        }
        Ok(())
    }

    fn blocks(&mut self, blocks: &[Block], indent: usize) -> Result<(), ChangelogError> {
        let pad = " ".repeat(indent);
        for (i, block) in blocks.iter().enumerate() {
            match block {
                Block::Paragraph(inlines) => {
                    let mut text = escape_block_start(&self.inlines(inlines)?);
                    let literal_follows = matches!(blocks.get(i + 1), Some(Block::Literal(_)));
                    if literal_follows && text.ends_with(':') && !text.ends_with("::") {
                        text.push(':');
                    } else if let Some(stem) = text.strip_suffix("::") {
                        text = format!("{stem}:\\:");
                    }
                    self.output.push_str(&format!("{pad}{text}\n\n"));
                }
                Block::BulletList(items) => {
                    for item in items {
                        let content = escape_block_start(&self.inlines(&item.content)?);
                        let line = format!("{pad}* {content}");
                        self.output.push_str(line.trim_end());
                        self.output.push('\n');
                        if !item.children.is_empty() {
                            self.output.push('\n');
                            self.blocks(&item.children, indent + 2)?;
                        }
                    }
                    if !self.output.ends_with("\n\n") {
                        self.output.push('\n');
                    }
                }
                Block::Literal(text) => {
                    let merged = i > 0
                        && matches!(&blocks[i - 1], Block::Paragraph(_))
                        && self.output.trim_end().ends_with("::");
                    if !merged {
                        self.output.push_str(&format!("{pad}::\n\n"));
                    }
                    for line in text.lines() {
                        let rendered = format!("{pad}    {line}");
                        self.output.push_str(rendered.trim_end());
                        self.output.push('\n');
                    }
                    self.output.push('\n');
                }
            }
        }
        Ok(())
    }

    /// Serialise inline content, recording the links and substitutions used
    fn inlines(&mut self, inlines: &[Inline]) -> Result<String, ChangelogError> {
        let mut out = String::new();
        let mut prev_markup = false;

        for inline in inlines {
            let (piece, markup) = match inline {
                Inline::Text(s) => (escape_text(s), false),
                Inline::Literal(s) => (format!("``{s}``"), true),
                Inline::Emphasis(s) => (format!("*{s}*"), true),
                Inline::Strong(s) => (format!("**{s}**"), true),
                Inline::Reference { text, label } => {
                    let url = self.store.resolve_link(label)?.to_string();
                    if normalize_label(text) == normalize_label(label) {
                        if self.seen_links.insert(normalize_label(label)) {
                            self.links.push((text.clone(), url));
                        }
                        (format!("`{text}`_"), true)
                    } else {
                        (format!("`{text} <{url}>`_"), true)
                    }
                }
                Inline::EmbeddedLink { text, url } => (format!("`{text} <{url}>`_"), true),
                Inline::Substitution(name) => {
                    let text = self.store.resolve_substitution(name)?.to_string();
                    self.substitutions.entry(name.clone()).or_insert(text);
                    (format!("|{name}|"), true)
                }
                Inline::Role { role, text } => (format!(":{role}:`{text}`"), true),
            };

            if needs_separator(&out, prev_markup, &piece, markup) {
                out.push_str("\\ ");
            }
            out.push_str(&piece);
            prev_markup = markup;
        }

        Ok(out)
    }

    /// Link targets and substitution definitions for everything used
    fn definitions(&mut self) {
        if self.links.is_empty() && self.substitutions.is_empty() {
            return;
        }
        for (name, text) in &self.substitutions {
            self.output
                .push_str(&format!(".. |{name}| replace:: {text}\n"));
        }
        for (label, url) in &self.links {
            let label = if label.contains(':') || label.starts_with('_') {
                format!("`{label}`")
            } else {
                label.clone()
            };
            self.output.push_str(&format!(".. _{label}: {url}\n"));
        }
    }
}

/// Whether `\ ` must separate two pieces so markup is still recognised
fn needs_separator(out: &str, prev_markup: bool, piece: &str, markup: bool) -> bool {
    let Some(last) = out.chars().last() else {
        return false;
    };
    match (prev_markup, markup) {
        (true, true) => true,
        (false, true) => !(last.is_whitespace() || "'\"([{<-/:".contains(last)),
        (true, false) => piece
            .chars()
            .next()
            .is_some_and(|c| !(c.is_whitespace() || "'\")]}>-/:.,;!?\\".contains(c))),
        _ => false,
    }
}

/// Escape characters that would start inline markup
fn escape_text(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    for (i, &c) in chars.iter().enumerate() {
        let escape = match c {
            '\\' | '*' | '`' | '|' => true,
            '_' => chars.get(i + 1).is_none_or(|n| !n.is_alphanumeric()),
            _ => false,
        };
        if escape {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Keep a paragraph from being read as a list item or explicit markup
fn escape_block_start(text: &str) -> String {
    let starts_block = ["- ", "+ ", "• ", ".. "]
        .iter()
        .any(|marker| text.starts_with(marker))
        || text == "-"
        || text == "+"
        || text == "..";
    if starts_block {
        format!("\\{text}")
    } else {
        text.to_string()
    }
}
