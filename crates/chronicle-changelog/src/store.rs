//! Changelog entry store
//!
//! The store owns every parsed [`ReleaseEntry`], the document preamble, the
//! link table and the substitution table. It is immutable once loaded;
//! renderers only borrow it.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use chronicle_core::ChangelogError;
use tracing::{debug, info, instrument};

use crate::parser::{parse_document, ParsedDocument};
use crate::types::{normalize_label, Block, Inline, LinkTarget, ReleaseEntry};

/// Longest chain of indirect link targets followed before giving up
const MAX_ALIAS_DEPTH: usize = 16;

/// Parsed changelog document
#[derive(Debug, Clone, Default)]
pub struct Store {
    title: Option<String>,
    preamble: Vec<Block>,
    entries: Vec<ReleaseEntry>,
    links: BTreeMap<String, LinkTarget>,
    substitutions: BTreeMap<String, String>,
}

/// Selects a subset of entries from a store
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    /// Keep only this version
    pub version: Option<String>,
    /// Keep at most this many entries (newest first)
    pub limit: Option<usize>,
}

impl EntryFilter {
    /// Select a single version
    pub fn version(version: impl Into<String>) -> Self {
        Self {
            version: Some(version.into()),
            limit: None,
        }
    }

    /// Select the newest `limit` entries
    pub fn latest(limit: usize) -> Self {
        Self {
            version: None,
            limit: Some(limit),
        }
    }
}

impl Store {
    /// Parse changelog source text into a store
    #[instrument(skip(text), fields(bytes = text.len()))]
    pub fn load(text: &str) -> Result<Self, ChangelogError> {
        let ParsedDocument {
            title,
            preamble,
            entries,
            links,
            substitutions,
        } = parse_document(text)?;

        info!(entries = entries.len(), links = links.len(), "changelog loaded");
        Ok(Self {
            title,
            preamble,
            entries,
            links,
            substitutions,
        })
    }

    /// Read and parse a changelog file
    #[instrument(skip(path), fields(path = %path.display()))]
    pub fn from_path(path: &Path) -> Result<Self, ChangelogError> {
        if !path.exists() {
            return Err(ChangelogError::FileNotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        Self::load(&text)
    }

    /// Document title, if the changelog has one
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Blocks between the document title and the first release
    pub fn preamble(&self) -> &[Block] {
        &self.preamble
    }

    /// Entries in document order (newest first)
    pub fn entries(&self) -> impl Iterator<Item = &ReleaseEntry> + '_ {
        self.entries.iter()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find an entry by version
    pub fn get(&self, version: &str) -> Option<&ReleaseEntry> {
        self.entries.iter().find(|e| e.version == version)
    }

    /// Newest entry
    pub fn latest(&self) -> Option<&ReleaseEntry> {
        self.entries.first()
    }

    /// Link targets keyed by normalised label
    pub fn links(&self) -> impl Iterator<Item = &LinkTarget> + '_ {
        self.links.values()
    }

    /// Substitution definitions by name
    pub fn substitutions(&self) -> &BTreeMap<String, String> {
        &self.substitutions
    }

    /// Resolve a reference label to its URL, following indirect targets
    pub fn resolve_link(&self, label: &str) -> Result<&str, ChangelogError> {
        let mut key = normalize_label(label);
        for _ in 0..MAX_ALIAS_DEPTH {
            let target = self
                .links
                .get(&key)
                .ok_or_else(|| ChangelogError::UnresolvedReference(label.to_string()))?;
            match target.alias() {
                Some(next) => key = normalize_label(next),
                None => return Ok(&target.target),
            }
        }
        debug!(label, "link alias chain too long");
        Err(ChangelogError::UnresolvedReference(label.to_string()))
    }

    /// Replacement text for a substitution
    pub fn resolve_substitution(&self, name: &str) -> Result<&str, ChangelogError> {
        self.substitutions
            .get(name)
            .or_else(|| {
                let wanted = normalize_label(name);
                self.substitutions
                    .iter()
                    .find(|(k, _)| normalize_label(k) == wanted)
                    .map(|(_, v)| v)
            })
            .map(String::as_str)
            .ok_or_else(|| ChangelogError::UnresolvedSubstitution(name.to_string()))
    }

    /// Add substitutions the document does not define itself
    pub fn with_substitutions<I, K, V>(mut self, substitutions: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, text) in substitutions {
            self.substitutions
                .entry(name.into())
                .or_insert_with(|| text.into());
        }
        self
    }

    /// Add link targets the document does not define itself
    pub fn with_links<I, K, V>(mut self, links: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (label, url) in links {
            let label = label.into();
            self.links
                .entry(normalize_label(&label))
                .or_insert_with(|| LinkTarget {
                    label,
                    target: url.into(),
                    line: 0,
                });
        }
        self
    }

    /// Labels used in body text with no target, in order of first use
    pub fn unresolved_references(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut missing = Vec::new();
        self.visit_inlines(&mut |inline| {
            if let Inline::Reference { label, .. } = inline {
                if self.resolve_link(label).is_err() && seen.insert(normalize_label(label)) {
                    missing.push(label.clone());
                }
            }
        });
        missing
    }

    /// Substitution names used in body text with no definition
    pub fn unresolved_substitutions(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut missing = Vec::new();
        self.visit_inlines(&mut |inline| {
            if let Inline::Substitution(name) = inline {
                if self.resolve_substitution(name).is_err() && seen.insert(name.clone()) {
                    missing.push(name.clone());
                }
            }
        });
        missing
    }

    /// Copy of the store restricted to the entries a filter selects.
    ///
    /// The link and substitution tables are kept whole.
    pub fn select(&self, filter: &EntryFilter) -> Result<Self, ChangelogError> {
        let mut entries: Vec<ReleaseEntry> = match &filter.version {
            Some(version) => {
                let entry = self
                    .get(version)
                    .ok_or_else(|| ChangelogError::VersionNotFound(version.clone()))?;
                vec![entry.clone()]
            }
            None => self.entries.clone(),
        };
        if let Some(limit) = filter.limit {
            entries.truncate(limit);
        }
        debug!(selected = entries.len(), total = self.entries.len(), "entries selected");

        Ok(Self {
            title: self.title.clone(),
            preamble: self.preamble.clone(),
            entries,
            links: self.links.clone(),
            substitutions: self.substitutions.clone(),
        })
    }

    /// Drop the document title and preamble, keeping the entries and tables
    pub fn entries_only(mut self) -> Self {
        self.title = None;
        self.preamble.clear();
        self
    }

    fn visit_inlines<'a>(&'a self, f: &mut impl FnMut(&'a Inline)) {
        for block in &self.preamble {
            block.visit_inlines(f);
        }
        for entry in &self.entries {
            entry.visit_inlines(f);
        }
    }
}
