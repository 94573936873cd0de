//! Changelog renderers
//!
//! Every renderer works from a borrowed [`Store`] and resolves references
//! before writing anything, so a failed render never yields partial output.

mod html;
mod json;
mod markdown;
mod registry;
mod rst;
mod text;

pub use html::HtmlRenderer;
pub use json::JsonRenderer;
pub use markdown::MarkdownRenderer;
pub use registry::RendererRegistry;
pub use rst::RstRenderer;
pub use text::TextRenderer;

use std::fmt::Write;

use chrono::NaiveDate;
use chronicle_core::config::RenderConfig;
use chronicle_core::ChangelogError;
use tracing::{debug, instrument};

use crate::store::Store;
use crate::types::{Inline, ReleaseEntry};

/// Trait for changelog renderers
pub trait ChangelogRenderer: Send + Sync {
    /// Format name used to select this renderer
    fn name(&self) -> &'static str;

    /// Other names accepted for this renderer
    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    /// File extension for rendered output
    fn extension(&self) -> &'static str;

    /// Render the whole store
    fn render(&self, store: &Store, options: &RenderOptions) -> Result<String, ChangelogError>;
}

/// Options shared by all renderers
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// strftime pattern for release dates
    pub date_format: String,
    /// Wrap HTML output in a complete document
    pub standalone: bool,
    /// Title used instead of the document title
    pub title: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            date_format: "%Y-%m-%d".to_string(),
            standalone: false,
            title: None,
        }
    }
}

impl From<&RenderConfig> for RenderOptions {
    fn from(config: &RenderConfig) -> Self {
        Self {
            date_format: config.date_format.clone(),
            standalone: config.standalone,
            title: config.title.clone(),
        }
    }
}

impl RenderOptions {
    /// Title to print above the entries
    pub fn title<'a>(&'a self, store: &'a Store) -> Option<&'a str> {
        self.title.as_deref().or_else(|| store.title())
    }

    /// Format a release date.
    ///
    /// Patterns that need a time or zone (`%H`, `%Z`, ...) cannot format a
    /// plain date and are reported instead of panicking.
    pub fn format_date(&self, date: NaiveDate) -> Result<String, ChangelogError> {
        let mut output = String::new();
        write!(output, "{}", date.format(&self.date_format))
            .map_err(|_| ChangelogError::InvalidDateFormat(self.date_format.clone()))?;
        Ok(output)
    }

    /// Version header text, e.g. `2.0 (2024-01-01)`
    pub fn entry_header(&self, entry: &ReleaseEntry) -> Result<String, ChangelogError> {
        Ok(format!("{} ({})", entry.version, self.format_date(entry.date)?))
    }
}

/// Inline content with every reference and substitution resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    /// Plain text
    Text(String),
    /// Code-like text
    Literal(String),
    /// Emphasised text
    Emphasis(String),
    /// Strong text
    Strong(String),
    /// Hyperlink with its final URL
    Link { text: String, url: String },
}

impl Span {
    /// Text of the span without markup
    pub fn text(&self) -> &str {
        match self {
            Self::Text(s) | Self::Literal(s) | Self::Emphasis(s) | Self::Strong(s) => s,
            Self::Link { text, .. } => text,
        }
    }
}

/// Resolve inline elements against the store's link and substitution tables
pub fn resolve_inlines(store: &Store, inlines: &[Inline]) -> Result<Vec<Span>, ChangelogError> {
    inlines
        .iter()
        .map(|inline| {
            Ok(match inline {
                Inline::Text(s) => Span::Text(s.clone()),
                Inline::Literal(s) => Span::Literal(s.clone()),
                Inline::Emphasis(s) => Span::Emphasis(s.clone()),
                Inline::Strong(s) => Span::Strong(s.clone()),
                Inline::Reference { text, label } => Span::Link {
                    text: text.clone(),
                    url: store.resolve_link(label)?.to_string(),
                },
                Inline::EmbeddedLink { text, url } => Span::Link {
                    text: text.clone(),
                    url: url.clone(),
                },
                Inline::Substitution(name) => {
                    Span::Text(store.resolve_substitution(name)?.to_string())
                }
                Inline::Role { text, .. } => Span::Literal(text.clone()),
            })
        })
        .collect()
}

/// Render a store with default options.
///
/// `format` is a renderer name, alias or file extension (`text`, `md`,
/// `html`, `rst`, `json`, ...).
pub fn render(store: &Store, format: &str) -> Result<String, ChangelogError> {
    render_with(store, format, &RenderOptions::default())
}

/// Render a store with explicit options
#[instrument(skip(store, options), fields(entries = store.len()))]
pub fn render_with(
    store: &Store,
    format: &str,
    options: &RenderOptions,
) -> Result<String, ChangelogError> {
    let registry = RendererRegistry::new();
    let renderer = registry
        .get(format)
        .ok_or_else(|| ChangelogError::UnsupportedFormat(format.to_string()))?;
    let output = renderer.render(store, options)?;
    debug!(renderer = renderer.name(), output_len = output.len(), "changelog rendered");
    Ok(output)
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

* Fixed X

1.0 (2023-Jan-01)
-----------------

* Initial release
";

    #[test]
    fn test_render_text_newest_first() {
        let store = Store::load(SAMPLE).unwrap();
        let output = render(&store, "text").unwrap();

        let v2 = output.find("2.0 (2024-01-01)").unwrap();
        let v1 = output.find("1.0 (2023-01-01)").unwrap();
        let fixed = output.find("Fixed X").unwrap();
        let initial = output.find("Initial release").unwrap();
        assert!(v2 < fixed && fixed < v1 && v1 < initial);
    }

    #[test]
    fn test_unsupported_format() {
        let store = Store::load(SAMPLE).unwrap();
        let err = render(&store, "pdf").unwrap_err();
        assert!(matches!(err, ChangelogError::UnsupportedFormat(ref f) if f == "pdf"));
    }

    #[test]
    fn test_unresolved_reference_fails_every_format() {
        let src = "1.0 (2023-Jan-01)\n-----------------\n\n* See `Foo`_\n";
        let store = Store::load(src).unwrap();
        for format in ["text", "markdown", "html", "rst", "json"] {
            let err = render(&store, format).unwrap_err();
            assert!(
                matches!(err, ChangelogError::UnresolvedReference(ref l) if l == "Foo"),
                "format {format} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_unresolved_substitution_fails() {
        let src = "1.0 (2023-Jan-01)\n-----------------\n\n* Built by |team|\n";
        let store = Store::load(src).unwrap();
        let err = render(&store, "text").unwrap_err();
        assert!(matches!(err, ChangelogError::UnresolvedSubstitution(ref n) if n == "team"));

        let store = store.with_substitutions([("team", "the Snapcraft team")]);
        assert!(render(&store, "text").unwrap().contains("the Snapcraft team"));
    }

    #[test]
    fn test_resolve_inlines() {
        let src = ".. _docs: https://snapcraft.io/docs\n";
        let store = Store::load(src).unwrap();
        let spans = resolve_inlines(
            &store,
            &[
                Inline::Reference {
                    text: "the docs".to_string(),
                    label: "Docs".to_string(),
                },
                Inline::Role {
                    role: "command".to_string(),
                    text: "snapcraft".to_string(),
                },
            ],
        )
        .unwrap();
        assert_eq!(
            spans,
            vec![
                Span::Link {
                    text: "the docs".to_string(),
                    url: "https://snapcraft.io/docs".to_string(),
                },
                Span::Literal("snapcraft".to_string()),
            ]
        );
    }

    #[test]
    fn test_options_from_config() {
        let config = RenderConfig {
            date_format: "%d %b %Y".to_string(),
            standalone: true,
            title: Some("Release notes".to_string()),
        };
        let options = RenderOptions::from(&config);
        assert!(options.standalone);
        assert_eq!(
            options.format_date(NaiveDate::from_ymd_opt(2024, 6, 6).unwrap()).unwrap(),
            "06 Jun 2024"
        );
    }

    #[test]
    fn test_time_pattern_is_an_error() {
        let options = RenderOptions {
            date_format: "%H:%M".to_string(),
            ..RenderOptions::default()
        };
        let err = options
            .format_date(NaiveDate::from_ymd_opt(2024, 6, 6).unwrap())
            .unwrap_err();
        assert!(matches!(err, ChangelogError::InvalidDateFormat(ref f) if f == "%H:%M"));

        let store = Store::load(SAMPLE).unwrap();
        for format in ["text", "markdown", "html", "json"] {
            let err = render_with(&store, format, &options).unwrap_err();
            assert!(
                matches!(err, ChangelogError::InvalidDateFormat(_)),
                "format {format} gave {err:?}"
            );
        }
    }
}
