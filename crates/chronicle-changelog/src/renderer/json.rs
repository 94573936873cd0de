//! JSON changelog renderer

use chronicle_core::ChangelogError;
use serde::Serialize;
use tracing::{debug, instrument};

use super::{resolve_inlines, ChangelogRenderer, RenderOptions, Span};
use crate::store::Store;
use crate::types::{Block, Inline, ReleaseEntry, Section};

/// JSON changelog renderer
///
/// Emits a resolved view of the store: text has substitutions applied and
/// every link carries its final URL.
pub struct JsonRenderer {
    /// Pretty-print the output
    pub pretty: bool,
}

impl JsonRenderer {
    /// Create a new JSON renderer
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Emit compact JSON on one line
    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Default for JsonRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Serialize)]
struct DocumentView {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    preamble: Vec<BlockView>,
    entries: Vec<EntryView>,
}

#[derive(Debug, Serialize)]
struct EntryView {
    version: String,
    date: String,
    blocks: Vec<BlockView>,
    sections: Vec<SectionView>,
}

#[derive(Debug, Serialize)]
struct SectionView {
    title: String,
    level: usize,
    blocks: Vec<BlockView>,
    sections: Vec<SectionView>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum BlockView {
    Paragraph(TextView),
    List { items: Vec<ItemView> },
    Literal { text: String },
}

#[derive(Debug, Serialize)]
struct TextView {
    text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    links: Vec<LinkView>,
}

#[derive(Debug, Serialize)]
struct ItemView {
    #[serde(flatten)]
    content: TextView,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<BlockView>,
}

#[derive(Debug, Serialize)]
struct LinkView {
    text: String,
    url: String,
}

impl ChangelogRenderer for JsonRenderer {
    fn name(&self) -> &'static str {
        "json"
    }

    fn extension(&self) -> &'static str {
        "json"
    }

    #[instrument(skip(self, store, options), fields(entries = store.len()))]
    fn render(&self, store: &Store, options: &RenderOptions) -> Result<String, ChangelogError> {
        let view = DocumentView {
            title: options.title(store).map(str::to_string),
            preamble: blocks(store, store.preamble())?,
            entries: store
                .entries()
                .map(|entry| entry_view(store, options, entry))
                .collect::<Result<_, _>>()?,
        };

        let output = if self.pretty {
            serde_json::to_string_pretty(&view)
        } else {
            serde_json::to_string(&view)
        }?;

        debug!(output_len = output.len(), "json changelog rendered");
        Ok(output)
    }
}

fn entry_view(
    store: &Store,
    options: &RenderOptions,
    entry: &ReleaseEntry,
) -> Result<EntryView, ChangelogError> {
    Ok(EntryView {
        version: entry.version.clone(),
        date: options.format_date(entry.date)?,
        blocks: blocks(store, &entry.blocks)?,
        sections: entry
            .sections
            .iter()
            .map(|s| section_view(store, s))
            .collect::<Result<_, _>>()?,
    })
}

fn section_view(store: &Store, section: &Section) -> Result<SectionView, ChangelogError> {
    Ok(SectionView {
        title: text_view(store, &section.heading)?.text,
        level: section.level,
        blocks: blocks(store, &section.blocks)?,
        sections: section
            .sections
            .iter()
            .map(|s| section_view(store, s))
            .collect::<Result<_, _>>()?,
    })
}

fn blocks(store: &Store, blocks_in: &[Block]) -> Result<Vec<BlockView>, ChangelogError> {
    blocks_in
        .iter()
        .map(|block| {
            Ok(match block {
                Block::Paragraph(inlines) => BlockView::Paragraph(text_view(store, inlines)?),
                Block::BulletList(items) => BlockView::List {
                    items: items
                        .iter()
                        .map(|item| {
                            Ok(ItemView {
                                content: text_view(store, &item.content)?,
                                children: blocks(store, &item.children)?,
                            })
                        })
                        .collect::<Result<_, ChangelogError>>()?,
                },
                Block::Literal(text) => BlockView::Literal { text: text.clone() },
            })
        })
        .collect()
}

fn text_view(store: &Store, inlines: &[Inline]) -> Result<TextView, ChangelogError> {
    let spans = resolve_inlines(store, inlines)?;
    let text = spans.iter().map(Span::text).collect();
    let links = spans
        .into_iter()
        .filter_map(|span| match span {
            Span::Link { text, url } => Some(LinkView { text, url }),
            _ => None,
        })
        .collect();
    Ok(TextView { text, links })
}
