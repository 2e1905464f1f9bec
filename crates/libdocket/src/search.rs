//! Flat search view of an [`Index`].
//!
//! Every entity becomes one [`SearchEntry`]. The rendered site serializes the entries to
//! `search-index.json`, and the `search` command queries them directly.

use bitflags::bitflags;
use serde::Serialize;

use crate::{
    model::{EntityKind, Index},
    render::layout::Links,
};

bitflags! {
    /// Entity fields a query is matched against.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SearchDomain: u32 {
        /// Short entity names.
        const NAMES = 1 << 0;
        /// Raw documentation text.
        const DOCS = 1 << 1;
        /// Full `::`-joined paths.
        const PATHS = 1 << 2;
        /// Rendered declaration signatures.
        const SIGNATURES = 1 << 3;
    }
}

impl Default for SearchDomain {
    fn default() -> Self {
        Self::NAMES | Self::DOCS | Self::SIGNATURES
    }
}

/// A query and the fields it applies to.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Query text; surrounding whitespace is ignored.
    pub query: String,
    /// Fields to match; an empty set means [`SearchDomain::default`].
    pub domains: SearchDomain,
    /// Compare letter case exactly.
    pub case_sensitive: bool,
}

impl SearchOptions {
    /// Options for `query` over the default fields, ignoring case.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            domains: SearchDomain::default(),
            case_sensitive: false,
        }
    }

    /// Fall back to the default fields when none are selected.
    pub fn ensure_domains(&mut self) {
        if self.domains.is_empty() {
            self.domains = SearchDomain::default();
        }
    }
}

/// One searchable entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchEntry {
    /// Kind of the entity.
    pub kind: EntityKind,
    /// `::`-joined path.
    pub path: String,
    /// Short name.
    pub name: String,
    /// First paragraph of the documentation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Declaration signature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    /// Link relative to the output root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    /// Full documentation text, matched by [`SearchDomain::DOCS`].
    #[serde(skip)]
    pub docs: Option<String>,
    /// Domains that produced a match (empty when stored in the index).
    #[serde(skip)]
    pub matched: SearchDomain,
}

/// Entities of an index prepared for search queries, in depth-first order.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(transparent)]
pub struct SearchIndex {
    entries: Vec<SearchEntry>,
}

impl SearchIndex {
    /// Flatten `index`, computing page links along the way.
    pub fn build(index: &Index) -> Self {
        Self::with_links(index, &Links::new(index))
    }

    /// Construct a search index reusing links that were already computed for `index`.
    pub fn with_links(index: &Index, links: &Links) -> Self {
        let entries = index
            .entities()
            .map(|entity| {
                let path = entity.path_string();
                SearchEntry {
                    kind: entity.kind,
                    href: links.href(&path).map(str::to_string),
                    path,
                    name: entity.name.clone(),
                    summary: entity.summary().map(str::to_string),
                    signature: entity.signature.clone(),
                    docs: entity.comment.as_ref().map(|comment| comment.raw.clone()),
                    matched: SearchDomain::empty(),
                }
            })
            .collect();
        Self { entries }
    }

    /// All entries in depth-first order.
    pub fn entries(&self) -> &[SearchEntry] {
        &self.entries
    }

    /// Number of indexed entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries matching `options`, each tagged with the fields that matched.
    pub fn search(&self, options: &SearchOptions) -> Vec<SearchEntry> {
        let mut opts = options.clone();
        opts.ensure_domains();
        let trimmed = opts.query.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }

        let normalized_query = if opts.case_sensitive {
            trimmed.to_string()
        } else {
            trimmed.to_lowercase()
        };
        let matches = |text: Option<&str>| {
            text.is_some_and(|text| contains(text, &normalized_query, opts.case_sensitive))
        };

        let mut results = Vec::new();
        for entry in &self.entries {
            let mut matched = SearchDomain::empty();
            if opts.domains.contains(SearchDomain::NAMES) && matches(Some(&entry.name)) {
                matched |= SearchDomain::NAMES;
            }
            if opts.domains.contains(SearchDomain::DOCS) && matches(entry.docs.as_deref()) {
                matched |= SearchDomain::DOCS;
            }
            if opts.domains.contains(SearchDomain::PATHS) && matches(Some(&entry.path)) {
                matched |= SearchDomain::PATHS;
            }
            if opts.domains.contains(SearchDomain::SIGNATURES)
                && matches(entry.signature.as_deref())
            {
                matched |= SearchDomain::SIGNATURES;
            }

            if !matched.is_empty() {
                let mut clone = entry.clone();
                clone.matched = matched;
                results.push(clone);
            }
        }

        results
    }
}

fn contains(haystack: &str, needle: &str, case_sensitive: bool) -> bool {
    if needle.is_empty() {
        return false;
    }
    if case_sensitive {
        haystack.contains(needle)
    } else {
        haystack.to_lowercase().contains(needle)
    }
}

/// Labels for the fields in `domains`, as printed by the `search` command.
pub fn describe_domains(domains: SearchDomain) -> Vec<&'static str> {
    let mut labels = Vec::new();
    if domains.contains(SearchDomain::NAMES) {
        labels.push("name");
    }
    if domains.contains(SearchDomain::DOCS) {
        labels.push("doc");
    }
    if domains.contains(SearchDomain::PATHS) {
        labels.push("path");
    }
    if domains.contains(SearchDomain::SIGNATURES) {
        labels.push("signature");
    }
    labels
}
