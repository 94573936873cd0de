//! Changelog document parsing
//!
//! Turns reStructuredText changelog source into the entry store model:
//! release headings become [`ReleaseEntry`] records, deeper headings become
//! nested [`Section`]s, and `.. _label: url` definitions fill the link table.

mod explicit;
mod heading;
mod inline;

pub use heading::{adornment_char, parse_release};
pub use inline::parse_inlines;

use std::collections::BTreeMap;

use chronicle_core::ChangelogError;
use tracing::{debug, trace};

use crate::types::{normalize_label, Block, LinkTarget, ListItem, ReleaseEntry, Section};
use explicit::{is_explicit_start, parse_explicit, Explicit};
use heading::{looks_like_release, scan, Heading, Scan, StyleLevels};

/// A source line with its 1-based line number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub no: usize,
    pub text: String,
}

/// Everything parsed out of a changelog document
#[derive(Debug, Default)]
pub struct ParsedDocument {
    pub title: Option<String>,
    pub preamble: Vec<Block>,
    pub entries: Vec<ReleaseEntry>,
    pub links: BTreeMap<String, LinkTarget>,
    pub substitutions: BTreeMap<String, String>,
}

/// Parse changelog source text
pub fn parse_document(text: &str) -> Result<ParsedDocument, ChangelogError> {
    let lines: Vec<Line> = text
        .lines()
        .enumerate()
        .map(|(i, l)| Line {
            no: i + 1,
            text: l.replace('\t', "        "),
        })
        .collect();

    let mut parser = Parser::default();
    parser.run(&lines)?;
    Ok(parser.finish())
}

#[derive(Default)]
struct Parser {
    doc: ParsedDocument,
    levels: StyleLevels,
    /// Level of the document title heading, if any
    title_level: Option<usize>,
    /// Level shared by all release headings
    release_level: Option<usize>,
    current: Option<ReleaseEntry>,
    /// Open sections, outermost first
    open: Vec<Section>,
}

impl Parser {
    fn run(&mut self, lines: &[Line]) -> Result<(), ChangelogError> {
        let mut pending: Vec<Line> = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            // Explicit markup bodies are indented, so a heading can never start inside one
            let text = lines[i].text.as_str();
            if is_explicit_start(text) {
                let end = block_end(lines, i, 0);
                pending.extend_from_slice(&lines[i..end]);
                i = end;
                continue;
            }

            match scan(lines, i)? {
                Scan::Heading { heading, consumed } => {
                    if pending.last().is_some_and(|l| !l.text.trim().is_empty()) {
                        return Err(ChangelogError::malformed(
                            heading.line,
                            format!(
                                "section title '{}' must be preceded by a blank line",
                                heading.title
                            ),
                        ));
                    }
                    let blocks = self.parse_blocks(&pending)?;
                    self.attach(blocks);
                    pending.clear();
                    self.heading(heading)?;
                    i += consumed;
                }
                Scan::Transition => {
                    pending.push(Line {
                        no: lines[i].no,
                        text: String::new(),
                    });
                    i += 1;
                }
                Scan::Body => {
                    pending.push(lines[i].clone());
                    i += 1;
                }
            }
        }

        let blocks = self.parse_blocks(&pending)?;
        self.attach(blocks);
        self.close_entry();
        Ok(())
    }

    fn finish(self) -> ParsedDocument {
        debug!(
            entries = self.doc.entries.len(),
            links = self.doc.links.len(),
            substitutions = self.doc.substitutions.len(),
            "changelog document parsed"
        );
        self.doc
    }

    fn heading(&mut self, heading: Heading) -> Result<(), ChangelogError> {
        let level = self.levels.level(heading.style);
        trace!(title = %heading.title, level, line = heading.line, "heading");

        let Some(release_level) = self.release_level else {
            return self.heading_before_releases(heading, level);
        };

        if level < release_level {
            return Err(ChangelogError::malformed(
                heading.line,
                format!(
                    "heading '{}' is above the release level after releases began",
                    heading.title
                ),
            ));
        }

        if level == release_level {
            return self.open_entry(heading);
        }

        let depth = level - release_level;
        if depth > self.open.len() + 1 {
            return Err(ChangelogError::malformed(
                heading.line,
                format!(
                    "heading '{}' skips a level (expected at most depth {}, found {})",
                    heading.title,
                    self.open.len() + 1,
                    depth
                ),
            ));
        }

        self.close_sections(depth - 1);
        let inlines = parse_inlines(&heading.title);
        self.open
            .push(Section::new(heading.title, inlines, depth, heading.line));
        Ok(())
    }

    fn heading_before_releases(
        &mut self,
        heading: Heading,
        level: usize,
    ) -> Result<(), ChangelogError> {
        if parse_release(&heading.title).is_some() {
            if self.title_level.is_some_and(|t| level <= t) {
                return Err(ChangelogError::malformed(
                    heading.line,
                    format!(
                        "release heading '{}' must be nested below the document title",
                        heading.title
                    ),
                ));
            }
            self.release_level = Some(level);
            return self.open_entry(heading);
        }

        if looks_like_release(&heading.title) {
            return Err(ChangelogError::malformed(
                heading.line,
                format!("release heading '{}' has an invalid date", heading.title),
            ));
        }

        if self.doc.title.is_none() {
            self.title_level = Some(level);
            self.doc.title = Some(heading.title);
            return Ok(());
        }

        Err(ChangelogError::malformed(
            heading.line,
            format!(
                "section '{}' has no enclosing release entry",
                heading.title
            ),
        ))
    }

    fn open_entry(&mut self, heading: Heading) -> Result<(), ChangelogError> {
        let (version, date) = parse_release(&heading.title).ok_or_else(|| {
            ChangelogError::malformed(
                heading.line,
                format!(
                    "expected a release heading of the form 'VERSION (DATE)', found '{}'",
                    heading.title
                ),
            )
        })?;

        self.close_entry();

        if let Some(previous) = self.doc.entries.iter().find(|e| e.version == version) {
            return Err(ChangelogError::malformed(
                heading.line,
                format!(
                    "version {} already defined at line {}",
                    version, previous.line
                ),
            ));
        }

        debug!(version = %version, %date, line = heading.line, "release entry");
        self.current = Some(ReleaseEntry::new(version, date, heading.title, heading.line));
        Ok(())
    }

    /// Close open sections until `depth` remain
    fn close_sections(&mut self, depth: usize) {
        while self.open.len() > depth {
            let Some(section) = self.open.pop() else {
                break;
            };
            if let Some(parent) = self.open.last_mut() {
                parent.sections.push(section);
            } else if let Some(entry) = self.current.as_mut() {
                entry.sections.push(section);
            }
        }
    }

    fn close_entry(&mut self) {
        self.close_sections(0);
        if let Some(entry) = self.current.take() {
            self.doc.entries.push(entry);
        }
    }

    /// Attach body blocks to the innermost open container
    fn attach(&mut self, blocks: Vec<Block>) {
        if blocks.is_empty() {
            return;
        }
        if let Some(section) = self.open.last_mut() {
            section.blocks.extend(blocks);
        } else if let Some(entry) = self.current.as_mut() {
            entry.blocks.extend(blocks);
        } else {
            self.doc.preamble.extend(blocks);
        }
    }

    /// Parse body lines into blocks, collecting explicit markup on the way
    fn parse_blocks(&mut self, lines: &[Line]) -> Result<Vec<Block>, ChangelogError> {
        let mut blocks = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            let line = &lines[i];
            let body = line.text.trim_start();
            if body.is_empty() {
                i += 1;
                continue;
            }
            let indent = indent_of(&line.text);

            if is_explicit_start(body) {
                let end = block_end(lines, i, indent);
                self.explicit(&lines[i..end])?;
                i = end;
            } else if bullet_width(body).is_some() {
                let (items, end) = self.parse_list(lines, i, indent)?;
                blocks.push(Block::BulletList(items));
                i = end;
            } else {
                i = self.parse_paragraph(lines, i, indent, &mut blocks);
            }
        }

        Ok(blocks)
    }

    fn parse_paragraph(
        &mut self,
        lines: &[Line],
        start: usize,
        indent: usize,
        blocks: &mut Vec<Block>,
    ) -> usize {
        let mut end = start;
        let mut parts = Vec::new();
        while end < lines.len() {
            let text = &lines[end].text;
            let body = text.trim_start();
            if body.is_empty() {
                break;
            }
            if end > start
                && indent_of(text) <= indent
                && (bullet_width(body).is_some() || is_explicit_start(body))
            {
                break;
            }
            parts.push(body.trim_end());
            end += 1;
        }

        let mut joined = parts.join(" ");
        let literal_follows = joined.ends_with("::");
        if literal_follows {
            joined.truncate(joined.len() - 2);
            let keep = joined.trim_end().to_string();
            // `Text::` keeps one colon, a bare or spaced `::` vanishes
            joined = if keep.len() == joined.len() && !keep.is_empty() {
                format!("{}:", keep)
            } else {
                keep
            };
        }

        if !joined.is_empty() {
            blocks.push(Block::Paragraph(parse_inlines(&joined)));
        }

        if literal_follows {
            let (literal, after) = literal_block(lines, end, indent);
            if let Some(literal) = literal {
                blocks.push(Block::Literal(literal));
            }
            return after;
        }
        end
    }

    fn parse_list(
        &mut self,
        lines: &[Line],
        start: usize,
        indent: usize,
    ) -> Result<(Vec<ListItem>, usize), ChangelogError> {
        let bullet = lines[start].text.trim_start().chars().next();
        let mut items = Vec::new();
        let mut i = start;

        loop {
            let body = lines[i].text.trim_start();
            let width = bullet_width(body).unwrap_or(2);
            let content_col = indent + width;

            let mut item_lines = vec![Line {
                no: lines[i].no,
                text: body.get(width..).unwrap_or("").to_string(),
            }];
            let mut j = i + 1;
            while j < lines.len() {
                let text = &lines[j].text;
                if !text.trim().is_empty() && indent_of(text) <= indent {
                    break;
                }
                item_lines.push(Line {
                    no: lines[j].no,
                    text: dedent(text, content_col),
                });
                j += 1;
            }
            while item_lines.len() > 1 && item_lines.last().is_some_and(|l| l.text.trim().is_empty()) {
                item_lines.pop();
                j -= 1;
            }

            let mut blocks = self.parse_blocks(&item_lines)?;
            let content = match blocks.first() {
                Some(Block::Paragraph(_)) => match blocks.remove(0) {
                    Block::Paragraph(inlines) => inlines,
                    _ => Vec::new(),
                },
                _ => Vec::new(),
            };
            items.push(ListItem {
                content,
                children: blocks,
            });

            // Blank lines between items do not end the list
            let mut next = j;
            while next < lines.len() && lines[next].text.trim().is_empty() {
                next += 1;
            }
            let continues = lines.get(next).is_some_and(|l| {
                let body = l.text.trim_start();
                indent_of(&l.text) == indent
                    && bullet_width(body).is_some()
                    && body.chars().next() == bullet
            });
            if !continues {
                return Ok((items, j));
            }
            i = next;
        }
    }

    fn explicit(&mut self, lines: &[Line]) -> Result<(), ChangelogError> {
        match parse_explicit(lines) {
            Explicit::Target(target) => self.link_target(target),
            Explicit::Substitution { name, text, line } => {
                trace!(name = %name, line, "substitution definition");
                self.doc.substitutions.insert(name, text);
                Ok(())
            }
            Explicit::Ignored { line, first } => {
                trace!(line, markup = %first, "skipping explicit markup");
                Ok(())
            }
        }
    }

    fn link_target(&mut self, mut target: LinkTarget) -> Result<(), ChangelogError> {
        if target.target.is_empty() {
            // Internal target: points at the element that follows it
            target.target = format!("#{}", slug(&target.label));
        }
        let key = normalize_label(&target.label);
        if let Some(existing) = self.doc.links.get(&key) {
            if existing.target == target.target {
                return Ok(());
            }
            return Err(ChangelogError::malformed(
                target.line,
                format!(
                    "link '{}' already points at {} (line {})",
                    target.label, existing.target, existing.line
                ),
            ));
        }
        trace!(label = %target.label, target = %target.target, "link target");
        self.doc.links.insert(key, target);
        Ok(())
    }
}

fn indent_of(text: &str) -> usize {
    text.len() - text.trim_start_matches(' ').len()
}

/// Strip up to `width` leading spaces
fn dedent(text: &str, width: usize) -> String {
    let strip = indent_of(text).min(width);
    text[strip..].to_string()
}

/// Width of a bullet marker plus the spaces after it
fn bullet_width(body: &str) -> Option<usize> {
    let mut chars = body.chars();
    let marker = chars.next()?;
    if !matches!(marker, '*' | '-' | '+' | '•') {
        return None;
    }
    let rest = chars.as_str();
    if rest.is_empty() {
        return Some(marker.len_utf8());
    }
    let spaces = rest.len() - rest.trim_start_matches(' ').len();
    (spaces > 0).then(|| marker.len_utf8() + spaces)
}

/// End of an indented body that belongs to the line at `start`
fn block_end(lines: &[Line], start: usize, indent: usize) -> usize {
    let mut end = start + 1;
    let mut last_content = start + 1;
    while end < lines.len() {
        let text = &lines[end].text;
        if text.trim().is_empty() {
            end += 1;
            continue;
        }
        if indent_of(text) <= indent {
            break;
        }
        end += 1;
        last_content = end;
    }
    last_content
}

/// Collect the indented literal block following a `::` paragraph
fn literal_block(lines: &[Line], start: usize, indent: usize) -> (Option<String>, usize) {
    let mut first = start;
    while first < lines.len() && lines[first].text.trim().is_empty() {
        first += 1;
    }
    let end = if first < lines.len() && indent_of(&lines[first].text) > indent {
        block_end(lines, first, indent)
    } else {
        return (None, start);
    };

    let body = &lines[first..end];
    let strip = body
        .iter()
        .filter(|l| !l.text.trim().is_empty())
        .map(|l| indent_of(&l.text))
        .min()
        .unwrap_or(0);
    let text = body
        .iter()
        .map(|l| dedent(&l.text, strip).trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n");
    (Some(text), end)
}

/// Identifier form of a label for internal targets
pub(crate) fn slug(label: &str) -> String {
    let mut out = String::new();
    for c in label.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    out.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Inline;
    use chrono::NaiveDate;

    fn text(s: &str) -> Inline {
        Inline::Text(s.to_string())
    }

    const SAMPLE: &str = "\
*********
Changelog
*********

This document outlines the changes between releases.

2.0 (2024-Jan-01)
-----------------

Core
====

* Fixed X
* Added ``snap pack`` support, see `#42`_.

1.0 (2023-Jan-01)
-----------------

* Initial release

.. _#42: https://example.com/issues/42
";

    #[test]
    fn test_parse_sample() {
        let doc = parse_document(SAMPLE).unwrap();
        assert_eq!(doc.title.as_deref(), Some("Changelog"));
        assert_eq!(doc.preamble.len(), 1);
        assert_eq!(doc.entries.len(), 2);

        let first = &doc.entries[0];
        assert_eq!(first.version, "2.0");
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(first.line, 7);
        assert_eq!(first.sections.len(), 1);
        assert_eq!(first.sections[0].title, "Core");
        assert_eq!(first.sections[0].level, 1);

        let Block::BulletList(items) = &first.sections[0].blocks[0] else {
            panic!("expected bullet list");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].content, vec![text("Fixed X")]);

        let second = &doc.entries[1];
        assert_eq!(second.version, "1.0");
        assert!(second.sections.is_empty());
        assert_eq!(second.blocks.len(), 1);

        assert_eq!(
            doc.links["#42"].target,
            "https://example.com/issues/42"
        );
    }

    #[test]
    fn test_nested_sections() {
        let src = "\
1.0 (2023-Jan-01)
=================

Core
----

Bases
#####

* core24

Plugins
-------

* python
";
        let doc = parse_document(src).unwrap();
        let entry = &doc.entries[0];
        assert_eq!(entry.sections.len(), 2);
        assert_eq!(entry.sections[0].title, "Core");
        assert_eq!(entry.sections[0].sections[0].title, "Bases");
        assert_eq!(entry.sections[0].sections[0].level, 2);
        assert_eq!(entry.sections[1].title, "Plugins");
        assert!(entry.sections[1].sections.is_empty());
    }

    #[test]
    fn test_skipped_level_is_malformed() {
        let src = "\
1.0 (2023-Jan-01)
=================

Core
----

Bases
#####

2.0 (2024-Jan-01)
=================

Deep
####
";
        let err = parse_document(src).unwrap_err();
        assert!(matches!(err, ChangelogError::MalformedDocument { line: 13, .. }));
    }

    #[test]
    fn test_section_without_release_is_malformed() {
        let src = "\
Changelog
=========

Orphan
------

* text
";
        let err = parse_document(src).unwrap_err();
        assert!(matches!(err, ChangelogError::MalformedDocument { line: 4, .. }));
    }

    #[test]
    fn test_non_release_at_release_level_is_malformed() {
        let src = "\
1.0 (2023-Jan-01)
-----------------

Unreleased
----------
";
        assert!(parse_document(src).is_err());
    }

    #[test]
    fn test_duplicate_version_is_malformed() {
        let src = "\
1.0 (2023-Jan-01)
-----------------

1.0 (2023-Feb-01)
-----------------
";
        let err = parse_document(src).unwrap_err();
        assert!(err.to_string().contains("already defined"));
    }

    #[test]
    fn test_invalid_release_date_is_malformed() {
        let src = "1.0 (2023-Foo-01)\n-----------------\n";
        assert!(parse_document(src).is_err());
    }

    #[test]
    fn test_conflicting_link_targets() {
        let src = "\
.. _Foo: https://a.example
.. _foo: https://b.example
";
        assert!(parse_document(src).is_err());

        let same = ".. _Foo: https://a.example\n.. _foo: https://a.example\n";
        assert_eq!(parse_document(same).unwrap().links.len(), 1);
    }

    #[test]
    fn test_nested_bullets_and_continuations() {
        let src = "\
1.0 (2023-Jan-01)
-----------------

* Outer item that
  wraps onto two lines

  * inner one
  * inner two

* Second outer
";
        let doc = parse_document(src).unwrap();
        let Block::BulletList(items) = &doc.entries[0].blocks[0] else {
            panic!("expected bullet list");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[0].content,
            vec![text("Outer item that wraps onto two lines")]
        );
        let Block::BulletList(inner) = &items[0].children[0] else {
            panic!("expected nested list");
        };
        assert_eq!(inner.len(), 2);
        assert_eq!(items[1].content, vec![text("Second outer")]);
    }

    #[test]
    fn test_literal_block() {
        let src = "\
1.0 (2023-Jan-01)
-----------------

Example::

    snapcraft pack
      --debug

After.
";
        let doc = parse_document(src).unwrap();
        let blocks = &doc.entries[0].blocks;
        assert_eq!(blocks[0], Block::Paragraph(vec![text("Example:")]));
        assert_eq!(
            blocks[1],
            Block::Literal("snapcraft pack\n  --debug".to_string())
        );
        assert_eq!(blocks[2], Block::Paragraph(vec![text("After.")]));
    }

    #[test]
    fn test_bare_literal_marker() {
        let src = "\
1.0 (2023-Jan-01)
-----------------

::

    snapcraft pack
";
        let doc = parse_document(src).unwrap();
        assert_eq!(
            doc.entries[0].blocks,
            vec![Block::Literal("snapcraft pack".to_string())]
        );
    }

    #[test]
    fn test_paragraph_starting_with_ellipsis() {
        let src = "\
1.0 (2023-Jan-01)
-----------------

...
and more
";
        let doc = parse_document(src).unwrap();
        let Block::Paragraph(inlines) = &doc.entries[0].blocks[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(crate::types::plain_text(inlines), "... and more");
    }

    #[test]
    fn test_substitution_definition() {
        let src = ".. |product| replace:: Snapcraft\n\nUses |product|.\n";
        let doc = parse_document(src).unwrap();
        assert_eq!(doc.substitutions["product"], "Snapcraft");
        assert_eq!(doc.preamble.len(), 1);
    }

    #[test]
    fn test_comments_are_skipped() {
        let src = "\
1.0 (2023-Jan-01)
-----------------

.. note that this
   comment is hidden

* Visible
";
        let doc = parse_document(src).unwrap();
        assert_eq!(doc.entries[0].blocks.len(), 1);
    }

    #[test]
    fn test_title_needs_blank_line() {
        let src = "\
1.0 (2023-Jan-01)
-----------------

some text
Core
~~~~
";
        assert!(parse_document(src).is_err());
    }

    #[test]
    fn test_internal_target_slug() {
        let doc = parse_document(".. _Release Notes:\n").unwrap();
        assert_eq!(doc.links["release notes"].target, "#release-notes");
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("Release Notes 8.0"), "release-notes-8-0");
        assert_eq!(slug("--x--"), "x");
    }
}
