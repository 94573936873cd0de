//! Explicit markup blocks (`.. ` constructs)

use regex::Regex;
use std::sync::LazyLock;

use crate::types::LinkTarget;

use super::Line;

/// Hyperlink target: `.. _label: url` or ``.. _`label`: url``
static TARGET_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\.\.\s+_(?:`(?P<quoted>[^`]+)`|(?P<plain>(?:\\:|[^:])+)):(?:\s+(?P<target>.*))?$")
        .expect("Invalid regex")
});

/// Substitution definition: `.. |name| directive:: text`
static SUBSTITUTION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\.\.\s+\|(?P<name>[^|]+)\|\s+(?P<directive>[A-Za-z0-9_-]+)::\s*(?P<text>.*)$")
        .expect("Invalid regex")
});

/// A parsed explicit markup block
#[derive(Debug, PartialEq, Eq)]
pub enum Explicit {
    /// Hyperlink target definition
    Target(LinkTarget),
    /// `replace::` substitution definition
    Substitution { name: String, text: String, line: usize },
    /// Comment or unsupported directive
    Ignored { line: usize, first: String },
}

/// Check whether a line (without indentation) opens explicit markup
pub fn is_explicit_start(text: &str) -> bool {
    text == ".." || text.starts_with(".. ")
}

/// Parse an explicit markup block; `lines[0]` holds the `..` marker
pub fn parse_explicit(lines: &[Line]) -> Explicit {
    let first = &lines[0];
    let head = first.text.trim();
    let rest: Vec<&str> = lines[1..]
        .iter()
        .map(|l| l.text.trim())
        .filter(|t| !t.is_empty())
        .collect();

    if let Some(caps) = TARGET_REGEX.captures(head) {
        let label = caps
            .name("quoted")
            .or_else(|| caps.name("plain"))
            .map(|m| m.as_str().replace("\\:", ":"))
            .unwrap_or_default();
        // URIs split over several lines are joined without whitespace
        let mut target = caps
            .name("target")
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();
        for part in &rest {
            target.push_str(part);
        }
        return Explicit::Target(LinkTarget {
            label: label.trim().to_string(),
            target,
            line: first.no,
        });
    }

    if let Some(caps) = SUBSTITUTION_REGEX.captures(head) {
        if &caps["directive"] == "replace" {
            let mut words = vec![caps["text"].trim()];
            words.extend(rest.iter().copied());
            return Explicit::Substitution {
                name: caps["name"].trim().to_string(),
                text: words
                    .into_iter()
                    .filter(|w| !w.is_empty())
                    .collect::<Vec<_>>()
                    .join(" "),
                line: first.no,
            };
        }
    }

    Explicit::Ignored {
        line: first.no,
        first: head.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(text: &str) -> Vec<Line> {
        text.lines()
            .enumerate()
            .map(|(i, l)| Line {
                no: i + 10,
                text: l.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_explicit_start() {
        assert!(is_explicit_start(".. _foo: bar"));
        assert!(is_explicit_start(".."));
        assert!(!is_explicit_start("..."));
        assert!(!is_explicit_start("* item"));
    }

    #[test]
    fn test_link_target() {
        let parsed = parse_explicit(&block(".. _Foo: https://example.com/foo"));
        assert_eq!(
            parsed,
            Explicit::Target(LinkTarget {
                label: "Foo".to_string(),
                target: "https://example.com/foo".to_string(),
                line: 10,
            })
        );
    }

    #[test]
    fn test_quoted_link_target() {
        let Explicit::Target(target) =
            parse_explicit(&block(".. _`snap: pack`: https://example.com/pack"))
        else {
            panic!("expected target");
        };
        assert_eq!(target.label, "snap: pack");
        assert_eq!(target.target, "https://example.com/pack");
    }

    #[test]
    fn test_multiline_link_target() {
        let Explicit::Target(target) = parse_explicit(&block(
            ".. _long: https://example.com/\n   very/long/path",
        )) else {
            panic!("expected target");
        };
        assert_eq!(target.target, "https://example.com/very/long/path");
    }

    #[test]
    fn test_internal_target() {
        let Explicit::Target(target) = parse_explicit(&block(".. _release-notes:")) else {
            panic!("expected target");
        };
        assert_eq!(target.label, "release-notes");
        assert!(target.target.is_empty());
    }

    #[test]
    fn test_substitution() {
        let parsed = parse_explicit(&block(".. |product| replace:: Snapcraft\n   tool"));
        assert_eq!(
            parsed,
            Explicit::Substitution {
                name: "product".to_string(),
                text: "Snapcraft tool".to_string(),
                line: 10,
            }
        );
    }

    #[test]
    fn test_comment_is_ignored() {
        let parsed = parse_explicit(&block(".. this is a comment\n   spanning lines"));
        assert!(matches!(parsed, Explicit::Ignored { line: 10, .. }));
    }

    #[test]
    fn test_other_directive_is_ignored() {
        let parsed = parse_explicit(&block(".. |logo| image:: logo.png"));
        assert!(matches!(parsed, Explicit::Ignored { .. }));
    }
}
