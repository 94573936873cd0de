//! Inline markup parsing
//!
//! Recognises the inline constructs used in changelogs: literals,
//! emphasis, strong text, hyperlink references, embedded links,
//! substitutions and roles. Unterminated markup is kept as plain text.

use regex::Regex;
use std::sync::LazyLock;

use crate::types::Inline;

/// `text <target>` inside a backquoted reference
static EMBEDDED_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^(?P<text>.*?)\s*<(?P<target>[^<>]+)>$").expect("Invalid regex")
});

/// Role prefix such as `:issue:`
static ROLE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^:(?P<role>[A-Za-z0-9][A-Za-z0-9_.+:-]*):`").expect("Invalid regex")
});

/// Role suffix after interpreted text, e.g. `` `text`:role: ``
static SUFFIX_ROLE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^:(?P<role>[A-Za-z0-9][A-Za-z0-9_.+-]*):").expect("Invalid regex")
});

/// Simple reference name followed by `_`, e.g. `LP-1234_`
static SIMPLE_REF_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>[A-Za-z0-9]+(?:[-.+:#][A-Za-z0-9]+)*)_").expect("Invalid regex")
});

/// Parse a run of text into inline elements
pub fn parse_inlines(text: &str) -> Vec<Inline> {
    let chars: Vec<char> = text.chars().collect();
    let mut scanner = Scanner {
        chars: &chars,
        out: Vec::new(),
        text: String::new(),
    };
    scanner.run();
    scanner.out
}

struct Scanner<'a> {
    chars: &'a [char],
    out: Vec<Inline>,
    text: String,
}

impl Scanner<'_> {
    fn run(&mut self) {
        let mut i = 0;
        while i < self.chars.len() {
            let c = self.chars[i];

            if c == '\\' {
                if let Some(&next) = self.chars.get(i + 1) {
                    // Escaped whitespace disappears entirely
                    if !next.is_whitespace() {
                        self.text.push(next);
                    }
                    i += 2;
                } else {
                    i += 1;
                }
                continue;
            }

            if self.can_open(i) {
                if let Some(next) = self.markup_at(i) {
                    i = next;
                    continue;
                }
            }

            self.text.push(c);
            i += 1;
        }
        self.flush();
    }

    /// Try to parse markup starting at `i`, returning the index after it
    fn markup_at(&mut self, i: usize) -> Option<usize> {
        match self.chars[i] {
            '`' if self.starts_with(i, "``") => {
                let end = self.find_close(i + 2, "``")?;
                self.emit(Inline::Literal(self.slice(i + 2, end)));
                Some(end + 2)
            }
            '`' => self.backquoted(i),
            '*' if self.starts_with(i, "**") => {
                let end = self.find_close(i + 2, "**")?;
                self.emit(Inline::Strong(self.slice(i + 2, end)));
                Some(end + 2)
            }
            '*' => {
                let end = self.find_close(i + 1, "*")?;
                self.emit(Inline::Emphasis(self.slice(i + 1, end)));
                Some(end + 1)
            }
            '|' => {
                let end = self.find_close(i + 1, "|")?;
                let mut after = end + 1;
                // `|name|_` links the substitution; the link is dropped
                if self.chars.get(after) == Some(&'_') && self.closes_at(after + 1) {
                    after += 1;
                }
                self.emit(Inline::Substitution(self.slice(i + 1, end)));
                Some(after)
            }
            ':' => self.role(i),
            c if c.is_alphanumeric() => self.simple_reference(i),
            _ => None,
        }
    }

    fn backquoted(&mut self, i: usize) -> Option<usize> {
        let end = self.find_close(i + 1, "`")?;
        let inner = self.slice(i + 1, end);
        let mut after = end + 1;

        if self.starts_with(after, "__") {
            after += 2;
        } else if self.chars.get(after) == Some(&'_') {
            after += 1;
        } else if let Some(caps) = SUFFIX_ROLE_REGEX.captures(&self.slice(after, self.chars.len())) {
            // Suffix role: `text`:role:
            let role = caps["role"].to_string();
            let len = role.chars().count() + 2;
            self.emit(Inline::Role { role, text: inner });
            return Some(after + len);
        } else {
            self.emit(Inline::Emphasis(inner));
            return Some(after);
        }

        if !self.closes_at(after) {
            return None;
        }
        self.emit(reference(inner));
        Some(after)
    }

    fn role(&mut self, i: usize) -> Option<usize> {
        let rest = self.slice(i, self.chars.len());
        let caps = ROLE_REGEX.captures(&rest)?;
        let role = caps["role"].to_string();
        let open = i + role.chars().count() + 3;
        let end = self.find_close(open, "`")?;
        self.emit(Inline::Role {
            role,
            text: self.slice(open, end),
        });
        Some(end + 1)
    }

    fn simple_reference(&mut self, i: usize) -> Option<usize> {
        let rest = self.slice(i, self.chars.len());
        let caps = SIMPLE_REF_REGEX.captures(&rest)?;
        let name = caps["name"].to_string();
        let after = i + name.chars().count() + 1;
        if self.chars.get(after) == Some(&'_') || !self.closes_at(after) {
            return None;
        }
        self.emit(Inline::Reference {
            text: name.clone(),
            label: name,
        });
        Some(after)
    }

    /// Find the closing delimiter for markup opened before `from`
    fn find_close(&self, from: usize, delim: &str) -> Option<usize> {
        let first = self.chars.get(from)?;
        if first.is_whitespace() {
            return None;
        }
        let len = delim.chars().count();
        let mut j = from + 1;
        while j + len <= self.chars.len() {
            if self.starts_with(j, delim)
                && !self.chars[j - 1].is_whitespace()
                && self.chars[j - 1] != '\\'
                && self.closes_at_after_delim(j + len, delim)
            {
                return Some(j);
            }
            j += 1;
        }
        None
    }

    fn closes_at_after_delim(&self, after: usize, delim: &str) -> bool {
        match delim {
            // Reference suffixes are checked by the caller
            "`" => true,
            "|" => self.chars.get(after) == Some(&'_') || self.closes_at(after),
            _ => self.closes_at(after),
        }
    }

    /// Inline markup may start at line start, after whitespace or opening punctuation
    fn can_open(&self, i: usize) -> bool {
        match i.checked_sub(1).map(|p| self.chars[p]) {
            None => true,
            Some(prev) => prev.is_whitespace() || "'\"([{<-/:".contains(prev),
        }
    }

    /// Inline markup may end at line end, before whitespace or closing punctuation
    fn closes_at(&self, after: usize) -> bool {
        match self.chars.get(after) {
            None => true,
            Some(&next) => next.is_whitespace() || "'\")]}>-/:.,;!?\\".contains(next),
        }
    }

    fn starts_with(&self, i: usize, pat: &str) -> bool {
        pat.chars()
            .enumerate()
            .all(|(k, p)| self.chars.get(i + k) == Some(&p))
    }

    fn slice(&self, start: usize, end: usize) -> String {
        self.chars[start..end].iter().collect()
    }

    fn emit(&mut self, inline: Inline) {
        self.flush();
        self.out.push(inline);
    }

    fn flush(&mut self) {
        if !self.text.is_empty() {
            self.out.push(Inline::Text(std::mem::take(&mut self.text)));
        }
    }
}

/// Build a reference from the content of `` `...`_ ``
fn reference(inner: String) -> Inline {
    if let Some(caps) = EMBEDDED_REGEX.captures(&inner) {
        let target: String = caps["target"].split_whitespace().collect();
        let text = caps["text"].to_string();
        if let Some(label) = target.strip_suffix('_') {
            let text = if text.is_empty() { label.to_string() } else { text };
            return Inline::Reference {
                text,
                label: label.to_string(),
            };
        }
        let text = if text.is_empty() { target.clone() } else { text };
        return Inline::EmbeddedLink { text, url: target };
    }
    Inline::Reference {
        text: inner.clone(),
        label: inner,
    }
}
