//! Plain text changelog renderer

use chronicle_core::ChangelogError;
use tracing::{debug, instrument};

use super::{resolve_inlines, ChangelogRenderer, RenderOptions, Span};
use crate::store::Store;
use crate::types::{Block, Inline, Section};

/// Underline characters for section depths 1, 2, 3...
const SECTION_UNDERLINES: &[char] = &['~', '^', '"'];

/// Plain text changelog renderer
pub struct TextRenderer {
    /// Spaces per nesting level of lists
    pub indent_width: usize,
}

impl TextRenderer {
    /// Create a new text renderer
    pub fn new() -> Self {
        Self { indent_width: 2 }
    }
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangelogRenderer for TextRenderer {
    fn name(&self) -> &'static str {
        "text"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["plain"]
    }

    fn extension(&self) -> &'static str {
        "txt"
    }

    #[instrument(skip(self, store, options), fields(entries = store.len()))]
    fn render(&self, store: &Store, options: &RenderOptions) -> Result<String, ChangelogError> {
        let mut output = String::new();

        if let Some(title) = options.title(store) {
            underline(&mut output, title, '=');
        }
        self.blocks(&mut output, store, store.preamble(), 0)?;

        for entry in store.entries() {
            underline(&mut output, &options.entry_header(entry)?, '-');
            self.blocks(&mut output, store, &entry.blocks, 0)?;
            for section in &entry.sections {
                self.section(&mut output, store, section)?;
            }
        }

        debug!(output_len = output.len(), "text changelog rendered");
        Ok(output)
    }
}

impl TextRenderer {
    fn section(
        &self,
        output: &mut String,
        store: &Store,
        section: &Section,
    ) -> Result<(), ChangelogError> {
        let ch = SECTION_UNDERLINES
            .get(section.level - 1)
            .or(SECTION_UNDERLINES.last())
            .copied()
            .unwrap_or('~');
        underline(output, &inline_text(store, &section.heading)?, ch);
        self.blocks(output, store, &section.blocks, 0)?;
        for child in &section.sections {
            self.section(output, store, child)?;
        }
        Ok(())
    }

    fn blocks(
        &self,
        output: &mut String,
        store: &Store,
        blocks: &[Block],
        indent: usize,
    ) -> Result<(), ChangelogError> {
        let pad = " ".repeat(indent);
        for block in blocks {
            match block {
                Block::Paragraph(inlines) => {
                    output.push_str(&format!("{}{}\n\n", pad, inline_text(store, inlines)?));
                }
                Block::BulletList(items) => {
                    for item in items {
                        output.push_str(&format!(
                            "{}* {}\n",
                            pad,
                            inline_text(store, &item.content)?
                        ));
                        if !item.children.is_empty() {
                            let mut nested = String::new();
                            self.blocks(&mut nested, store, &item.children, indent + self.indent_width)?;
                            output.push_str(nested.trim_end_matches('\n'));
                            output.push('\n');
                        }
                    }
                    output.push('\n');
                }
                Block::Literal(text) => {
                    for line in text.lines() {
                        let rendered = format!("{}    {}", pad, line);
                        output.push_str(rendered.trim_end());
                        output.push('\n');
                    }
                    output.push('\n');
                }
            }
        }
        Ok(())
    }
}

fn underline(output: &mut String, text: &str, ch: char) {
    output.push_str(text);
    output.push('\n');
    output.extend(std::iter::repeat(ch).take(text.chars().count()));
    output.push_str("\n\n");
}

/// Inline content as plain text, with link URLs in parentheses
fn inline_text(store: &Store, inlines: &[Inline]) -> Result<String, ChangelogError> {
    let spans = resolve_inlines(store, inlines)?;
    Ok(spans
        .iter()
        .map(|span| match span {
            Span::Link { text, url } if text == url => url.clone(),
            Span::Link { text, url } => format!("{} ({})", text, url),
            other => other.text().to_string(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(src: &str) -> String {
        let store = Store::load(src).unwrap();
        TextRenderer::new()
            .render(&store, &RenderOptions::default())
            .unwrap()
    }

    #[test]
    fn test_two_entries() {
        let output = render(
            "\
2.0 (2024-Jan-01)
-----------------

* Fixed X

1.0 (2023-Jan-01)
-----------------

* Initial release
",
        );
        assert_eq!(
            output,
            "\
2.0 (2024-01-01)
----------------

* Fixed X

1.0 (2023-01-01)
----------------

* Initial release

"
        );
    }

    #[test]
    fn test_sections_and_links() {
        let output = render(
            "\
*********
Changelog
*********

2.0 (2024-Jan-01)
-----------------

Core
====

* Fixed `#42`_ in ``snap pack``

.. _#42: https://example.com/42
",
        );
        assert!(output.starts_with("Changelog\n=========\n\n"));
        assert!(output.contains("Core\n~~~~\n\n"));
        assert!(output.contains("* Fixed #42 (https://example.com/42) in snap pack\n"));
    }

    #[test]
    fn test_nested_list_indent() {
        let output = render(
            "\
1.0 (2023-Jan-01)
-----------------

* Outer

  * Inner
",
        );
        assert!(output.contains("* Outer\n  * Inner\n"));
    }

    #[test]
    fn test_title_override() {
        let store = Store::load("1.0 (2023-Jan-01)\n-----------------\n").unwrap();
        let options = RenderOptions {
            title: Some("Release Notes".to_string()),
            ..RenderOptions::default()
        };
        let output = TextRenderer::new().render(&store, &options).unwrap();
        assert!(output.starts_with("Release Notes\n=============\n"));
    }
}
