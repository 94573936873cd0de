//! Section heading detection
//!
//! A heading is a title line with an adornment line under it, optionally
//! with a matching adornment line above it. Levels are assigned in the
//! order adornment styles first appear in the document.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

use chronicle_core::ChangelogError;

use super::Line;

/// Release heading: `VERSION (DATE)`
static RELEASE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<version>\S+)\s+\((?P<date>[^()]+)\)$").expect("Invalid regex")
});

/// Shortest adornment that counts as a transition or an unmatched overline
const MIN_ADORNMENT: usize = 4;

/// Date formats accepted in release headings
const DATE_FORMATS: &[&str] = &["%Y-%b-%d", "%Y-%m-%d", "%d %B %Y", "%B %d, %Y"];

/// Adornment style: character and whether an overline is present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adornment {
    pub ch: char,
    pub overline: bool,
}

/// A heading found in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub title: String,
    pub style: Adornment,
    /// 1-based line of the title text
    pub line: usize,
}

/// What a source line starts
#[derive(Debug, PartialEq, Eq)]
pub enum Scan {
    /// A heading spanning `consumed` lines
    Heading { heading: Heading, consumed: usize },
    /// A standalone adornment line between blank lines
    Transition,
    /// Anything else
    Body,
}

/// Assigns levels to adornment styles in order of first appearance
#[derive(Debug, Default)]
pub struct StyleLevels {
    styles: Vec<Adornment>,
}

impl StyleLevels {
    /// 1-based level of a style, registering it when new
    pub fn level(&mut self, style: Adornment) -> usize {
        if let Some(pos) = self.styles.iter().position(|s| *s == style) {
            return pos + 1;
        }
        self.styles.push(style);
        self.styles.len()
    }
}

/// Check whether a line is made of one repeated punctuation character
pub fn adornment_char(line: &str) -> Option<char> {
    let trimmed = line.trim_end();
    let mut chars = trimmed.chars();
    let first = chars.next()?;
    if !first.is_ascii_punctuation() || trimmed.chars().count() < 2 {
        return None;
    }
    // A bare `..` is an empty comment
    if trimmed == ".." {
        return None;
    }
    chars.all(|c| c == first).then_some(first)
}

fn width(s: &str) -> usize {
    s.trim().chars().count()
}

fn is_blank(line: Option<&Line>) -> bool {
    line.is_none_or(|l| l.text.trim().is_empty())
}

/// Classify the line at `i`
pub fn scan(lines: &[Line], i: usize) -> Result<Scan, ChangelogError> {
    let line = &lines[i];
    if line.text.trim().is_empty() {
        return Ok(Scan::Body);
    }

    if let Some(ch) = adornment_char(&line.text) {
        // Short punctuation runs such as `::` or `...` are ordinary text
        // unless they close a complete overlined title
        let long = width(&line.text) >= MIN_ADORNMENT;
        if is_blank(lines.get(i + 1)) {
            return Ok(if long { Scan::Transition } else { Scan::Body });
        }
        let title = &lines[i + 1];
        let under = lines.get(i + 2).map(|l| l.text.as_str()).unwrap_or("");
        if adornment_char(under) != Some(ch) {
            if !long {
                return Ok(Scan::Body);
            }
            return Err(ChangelogError::malformed(
                title.no,
                format!("overlined title '{}' has no matching underline", title.text.trim()),
            ));
        }
        if under.trim_end() != line.text.trim_end() {
            return Err(ChangelogError::malformed(
                title.no,
                format!("overline and underline differ for '{}'", title.text.trim()),
            ));
        }
        if width(&line.text) < width(&title.text) {
            return Err(ChangelogError::malformed(
                title.no,
                format!("title overline too short for '{}'", title.text.trim()),
            ));
        }
        return Ok(Scan::Heading {
            heading: Heading {
                title: title.text.trim().to_string(),
                style: Adornment { ch, overline: true },
                line: title.no,
            },
            consumed: 3,
        });
    }

    if line.text.starts_with(char::is_whitespace) {
        return Ok(Scan::Body);
    }

    let Some(under) = lines.get(i + 1) else {
        return Ok(Scan::Body);
    };
    if under.text.starts_with(char::is_whitespace) {
        return Ok(Scan::Body);
    }
    let Some(ch) = adornment_char(&under.text) else {
        return Ok(Scan::Body);
    };

    if width(&under.text) < width(&line.text) {
        if width(&under.text) < MIN_ADORNMENT {
            return Ok(Scan::Body);
        }
        return Err(ChangelogError::malformed(
            line.no,
            format!("title underline too short for '{}'", line.text.trim()),
        ));
    }

    Ok(Scan::Heading {
        heading: Heading {
            title: line.text.trim().to_string(),
            style: Adornment {
                ch,
                overline: false,
            },
            line: line.no,
        },
        consumed: 2,
    })
}

/// Split a release heading into version and date
pub fn parse_release(title: &str) -> Option<(String, NaiveDate)> {
    let caps = RELEASE_REGEX.captures(title.trim())?;
    let date = caps["date"].trim();
    let date = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date, fmt).ok())?;
    Some((caps["version"].to_string(), date))
}

/// Check whether a heading looks like a release heading, ignoring the date
pub fn looks_like_release(title: &str) -> bool {
    RELEASE_REGEX.is_match(title.trim())
}
