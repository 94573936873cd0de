//! Changelog types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Inline content of a paragraph, list item or heading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Inline {
    /// Plain text
    Text(String),
    /// Inline literal (double backticks)
    Literal(String),
    /// Emphasised text (`*text*`)
    Emphasis(String),
    /// Strong text (`**text**`)
    Strong(String),
    /// Named hyperlink reference resolved through the link table
    Reference {
        /// Visible text
        text: String,
        /// Label looked up in the link table
        label: String,
    },
    /// Hyperlink carrying its own URL (`` `text <url>`_ ``)
    EmbeddedLink {
        /// Visible text
        text: String,
        /// Target URL
        url: String,
    },
    /// Substitution reference (`|name|`)
    Substitution(String),
    /// Interpreted text with an explicit role (`` :role:`text` ``)
    Role {
        /// Role name
        role: String,
        /// Interpreted text
        text: String,
    },
}

impl Inline {
    /// Text of this inline with all markup removed
    pub fn plain_text(&self) -> &str {
        match self {
            Self::Text(s) | Self::Literal(s) | Self::Emphasis(s) | Self::Strong(s) => s,
            Self::Reference { text, .. } | Self::EmbeddedLink { text, .. } => text,
            Self::Substitution(name) => name,
            Self::Role { text, .. } => text,
        }
    }
}

/// Concatenate inlines into plain text
pub fn plain_text(inlines: &[Inline]) -> String {
    inlines.iter().map(Inline::plain_text).collect()
}

/// An item of a bullet list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    /// First paragraph of the item
    pub content: Vec<Inline>,
    /// Further blocks nested in the item (paragraphs, sub-lists)
    pub children: Vec<Block>,
}

/// A block of body content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Block {
    /// A paragraph of inline content
    Paragraph(Vec<Inline>),
    /// A bullet list
    BulletList(Vec<ListItem>),
    /// A literal block, kept verbatim
    Literal(String),
}

impl Block {
    /// Visit every inline in this block, including nested list items
    pub fn visit_inlines<'a>(&'a self, f: &mut impl FnMut(&'a Inline)) {
        match self {
            Self::Paragraph(inlines) => inlines.iter().for_each(&mut *f),
            Self::BulletList(items) => {
                for item in items {
                    item.content.iter().for_each(&mut *f);
                    for child in &item.children {
                        child.visit_inlines(f);
                    }
                }
            }
            Self::Literal(_) => {}
        }
    }
}

/// A titled block of release notes nested inside a release entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Heading text as written in the source
    pub title: String,
    /// Heading with inline markup parsed
    pub heading: Vec<Inline>,
    /// Nesting depth below the release heading (1 for top-level sections)
    pub level: usize,
    /// 1-based line of the heading title
    pub line: usize,
    /// Content before the first subsection
    pub blocks: Vec<Block>,
    /// Subsections
    pub sections: Vec<Section>,
}

impl Section {
    /// Create an empty section
    pub fn new(title: impl Into<String>, heading: Vec<Inline>, level: usize, line: usize) -> Self {
        Self {
            title: title.into(),
            heading,
            level,
            line,
            blocks: Vec::new(),
            sections: Vec::new(),
        }
    }

    /// Check if section has no content and no subsections
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty() && self.sections.is_empty()
    }

    fn visit_inlines<'a>(&'a self, f: &mut impl FnMut(&'a Inline)) {
        self.heading.iter().for_each(&mut *f);
        for block in &self.blocks {
            block.visit_inlines(f);
        }
        for section in &self.sections {
            section.visit_inlines(f);
        }
    }
}

/// A changelog record for one released version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseEntry {
    /// Version identifier (e.g. "8.2.11")
    pub version: String,
    /// Release date
    pub date: NaiveDate,
    /// Heading text as written in the source
    pub title: String,
    /// 1-based line of the heading title
    pub line: usize,
    /// Content before the first section
    pub blocks: Vec<Block>,
    /// Sections in this entry
    pub sections: Vec<Section>,
}

impl ReleaseEntry {
    /// Create an entry with no content
    pub fn new(
        version: impl Into<String>,
        date: NaiveDate,
        title: impl Into<String>,
        line: usize,
    ) -> Self {
        Self {
            version: version.into(),
            date,
            title: title.into(),
            line,
            blocks: Vec::new(),
            sections: Vec::new(),
        }
    }

    /// Find a top-level section by title (case-insensitive)
    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections
            .iter()
            .find(|s| s.title.eq_ignore_ascii_case(title))
    }

    /// Check if entry has any content
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty() && self.sections.is_empty()
    }

    /// Visit every inline in the entry, headings included
    pub fn visit_inlines<'a>(&'a self, f: &mut impl FnMut(&'a Inline)) {
        for block in &self.blocks {
            block.visit_inlines(f);
        }
        for section in &self.sections {
            section.visit_inlines(f);
        }
    }
}

/// A hyperlink target definition (`.. _label: url`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkTarget {
    /// Label as written in the definition
    pub label: String,
    /// Target URL, or another label followed by `_` for indirect targets
    pub target: String,
    /// 1-based line of the definition, 0 when supplied externally
    pub line: usize,
}

impl LinkTarget {
    /// Label of the target this one points at, for indirect targets
    pub fn alias(&self) -> Option<&str> {
        let label = self.target.strip_suffix('_')?;
        let label = label
            .strip_prefix('`')
            .and_then(|l| l.strip_suffix('`'))
            .unwrap_or(label);
        if label.is_empty() || label.contains(':') || label.contains('/') {
            return None;
        }
        Some(label)
    }
}

/// Normalise a reference name: case-insensitive, whitespace collapsed
pub fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 6).unwrap()
    }

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("Foo  Bar"), "foo bar");
        assert_eq!(normalize_label(" LP#123 "), "lp#123");
    }

    #[test]
    fn test_link_alias() {
        let direct = LinkTarget {
            label: "docs".to_string(),
            target: "https://example.com/docs_".to_string(),
            line: 1,
        };
        assert_eq!(direct.alias(), None);

        let indirect = LinkTarget {
            label: "manual".to_string(),
            target: "docs_".to_string(),
            line: 2,
        };
        assert_eq!(indirect.alias(), Some("docs"));

        let quoted = LinkTarget {
            label: "guide".to_string(),
            target: "`user docs`_".to_string(),
            line: 3,
        };
        assert_eq!(quoted.alias(), Some("user docs"));
    }

    #[test]
    fn test_plain_text() {
        let inlines = vec![
            Inline::Text("Fixed ".to_string()),
            Inline::Literal("snap pack".to_string()),
            Inline::Text(" in ".to_string()),
            Inline::Reference {
                text: "#123".to_string(),
                label: "#123".to_string(),
            },
        ];
        assert_eq!(plain_text(&inlines), "Fixed snap pack in #123");
    }

    #[test]
    fn test_entry_visits_nested_inlines() {
        let mut entry = ReleaseEntry::new("1.0", date(), "1.0 (2024-Jun-06)", 1);
        let mut section = Section::new("Core", vec![Inline::Text("Core".to_string())], 1, 4);
        section.blocks.push(Block::BulletList(vec![ListItem {
            content: vec![Inline::Text("outer".to_string())],
            children: vec![Block::BulletList(vec![ListItem {
                content: vec![Inline::Substitution("name".to_string())],
                children: vec![],
            }])],
        }]));
        entry.sections.push(section);

        let mut seen = Vec::new();
        entry.visit_inlines(&mut |i| seen.push(i.plain_text().to_string()));
        assert_eq!(seen, vec!["Core", "outer", "name"]);
    }

    #[test]
    fn test_section_lookup() {
        let mut entry = ReleaseEntry::new("1.0", date(), "1.0 (2024-Jun-06)", 1);
        assert!(entry.is_empty());
        entry
            .sections
            .push(Section::new("Bug Fixes", vec![], 1, 4));
        assert!(entry.section("bug fixes").is_some());
        assert!(entry.section("Features").is_none());
    }
}
