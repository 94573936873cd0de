//! HTML changelog renderer

use chronicle_core::ChangelogError;
use tracing::{debug, instrument};

use super::{resolve_inlines, ChangelogRenderer, RenderOptions, Span};
use crate::parser::slug;
use crate::store::Store;
use crate::types::{Block, Inline, Section};

/// HTML changelog renderer
///
/// Produces a fragment by default. With [`RenderOptions::standalone`] the
/// fragment is wrapped in a complete document.
pub struct HtmlRenderer;

impl HtmlRenderer {
    /// Create a new HTML renderer
    pub fn new() -> Self {
        Self
    }
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangelogRenderer for HtmlRenderer {
    fn name(&self) -> &'static str {
        "html"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["htm"]
    }

    fn extension(&self) -> &'static str {
        "html"
    }

    #[instrument(skip(self, store, options), fields(entries = store.len()))]
    fn render(&self, store: &Store, options: &RenderOptions) -> Result<String, ChangelogError> {
        let mut body = String::new();
        let title = options.title(store);

        if let Some(title) = title {
            body.push_str(&format!("<h1>{}</h1>\n", escape_html(title)));
        }
        blocks(&mut body, store, store.preamble())?;

        for entry in store.entries() {
            body.push_str(&format!(
                "<section class=\"release\" id=\"{}\">\n",
                escape_html(&format!("v{}", slug(&entry.version)))
            ));
            body.push_str(&format!(
                "<h2>{}</h2>\n",
                escape_html(&options.entry_header(entry)?)
            ));
            blocks(&mut body, store, &entry.blocks)?;
            for section in &entry.sections {
                self.section(&mut body, store, section)?;
            }
            body.push_str("</section>\n");
        }

        let output = if options.standalone {
            standalone(title.unwrap_or("Changelog"), &body)
        } else {
            body
        };

        debug!(
            output_len = output.len(),
            standalone = options.standalone,
            "html changelog rendered"
        );
        Ok(output)
    }
}

impl HtmlRenderer {
    fn section(
        &self,
        output: &mut String,
        store: &Store,
        section: &Section,
    ) -> Result<(), ChangelogError> {
        let level = (2 + section.level).min(6);
        output.push_str(&format!(
            "<h{level}>{}</h{level}>\n",
            inline_html(store, &section.heading)?
        ));
        blocks(output, store, &section.blocks)?;
        for child in &section.sections {
            self.section(output, store, child)?;
        }
        Ok(())
    }
}

fn blocks(output: &mut String, store: &Store, blocks_in: &[Block]) -> Result<(), ChangelogError> {
    for block in blocks_in {
        match block {
            Block::Paragraph(inlines) => {
                output.push_str(&format!("<p>{}</p>\n", inline_html(store, inlines)?));
            }
            Block::BulletList(items) => {
                output.push_str("<ul>\n");
                for item in items {
                    output.push_str("<li>");
                    output.push_str(&inline_html(store, &item.content)?);
                    if !item.children.is_empty() {
                        output.push('\n');
                        blocks(output, store, &item.children)?;
                    }
                    output.push_str("</li>\n");
                }
                output.push_str("</ul>\n");
            }
            Block::Literal(text) => {
                output.push_str(&format!("<pre>{}</pre>\n", escape_html(text)));
            }
        }
    }
    Ok(())
}

fn inline_html(store: &Store, inlines: &[Inline]) -> Result<String, ChangelogError> {
    let spans = resolve_inlines(store, inlines)?;
    Ok(spans
        .iter()
        .map(|span| match span {
            Span::Text(s) => escape_html(s),
            Span::Literal(s) => format!("<code>{}</code>", escape_html(s)),
            Span::Emphasis(s) => format!("<em>{}</em>", escape_html(s)),
            Span::Strong(s) => format!("<strong>{}</strong>", escape_html(s)),
            Span::Link { text, url } => {
                format!("<a href=\"{}\">{}</a>", escape_html(url), escape_html(text))
            }
        })
        .collect())
}

fn standalone(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>{}</title>\n\
         </head>\n\
         <body>\n\
         {}\
         </body>\n\
         </html>\n",
        escape_html(title),
        body
    )
}

/// Escape text for element content and attribute values
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
*********
Changelog
*********

2.0 (2024-Jan-01)
-----------------

Core
====

* Fixed `#42`_ in ``snap pack``

  * Also handles <tags> & such

.. _#42: https://example.com/42?a=1&b=2
";

    #[test]
    fn test_fragment() {
        let store = Store::load(SAMPLE).unwrap();
        let output = HtmlRenderer::new()
            .render(&store, &RenderOptions::default())
            .unwrap();

        assert!(output.starts_with("<h1>Changelog</h1>\n"));
        assert!(!output.contains("<!DOCTYPE html>"));
        assert!(output.contains("<h2>2.0 (2024-01-01)</h2>"));
        assert!(output.contains("<h3>Core</h3>"));
        assert!(output.contains(
            "<a href=\"https://example.com/42?a=1&amp;b=2\">#42</a> in <code>snap pack</code>"
        ));
        assert!(output.contains("<li>Also handles &lt;tags&gt; &amp; such</li>"));
    }

    #[test]
    fn test_standalone() {
        let store = Store::load(SAMPLE).unwrap();
        let options = RenderOptions {
            standalone: true,
            ..RenderOptions::default()
        };
        let output = HtmlRenderer::new().render(&store, &options).unwrap();
        assert!(output.starts_with("<!DOCTYPE html>\n"));
        assert!(output.contains("<title>Changelog</title>"));
        assert!(output.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a < b"), "a &lt; b");
        assert_eq!(escape_html("\"x\" & 'y'"), "&quot;x&quot; &amp; &#39;y&#39;");
        assert_eq!(escape_html("plain"), "plain");
    }
}
