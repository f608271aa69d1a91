//! String-based placeholder scanning.
//!
//! Finds canonical `{{id}}` tokens and legacy `[Label]` tokens in serialized
//! markup and derives canonical ids from bracket labels. Every function here is
//! total: malformed or unbalanced tokens simply do not match.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use super::applied::content_runs;

// Non-greedy, single level: `{{` then one or more non-`}` chars then `}}`.
static CANONICAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^}]+)\}\}").expect("valid regex"));

static BRACKET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]").expect("valid regex"));

static NON_ID_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));

static CANONICAL_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_]+$").expect("valid regex"));

/// A legacy bracket token and the canonical id it migrates to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketEntry {
    /// The literal token as written, brackets included (e.g. `[Client Name]`).
    pub token: String,
    /// The inner label (e.g. `Client Name`).
    pub label: String,
    /// The derived canonical id (e.g. `client_name`).
    pub id: String,
}

/// Ordered mapping from bracket tokens to canonical ids.
///
/// Tokens whose label derives to an empty id are never present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BracketMapping {
    entries: Vec<BracketEntry>,
}

impl BracketMapping {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BracketEntry> {
        self.entries.iter()
    }

    /// Canonical id for a literal bracket token.
    pub fn id_for(&self, token: &str) -> Option<&str> {
        self.entries.iter().find(|e| e.token == token).map(|e| e.id.as_str())
    }

    /// The first bracket label that migrated to `id`.
    pub fn label_for(&self, id: &str) -> Option<&str> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.label.as_str())
    }
}

/// Everything the scanner finds in one pass over a document.
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// Unique canonical ids, in order of first occurrence.
    pub canonical: Vec<String>,
    /// Unique bracket tokens as written, in order of first occurrence.
    pub brackets: Vec<String>,
    /// Bracket token to canonical id migrations.
    pub mapping: BracketMapping,
}

impl ScanResult {
    /// Ids this document will expose once brackets are normalized: canonical
    /// ids first, then ids that only exist as bracket tokens so far.
    pub fn all_ids(&self) -> Vec<String> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut ids = Vec::new();
        let migrated = self.mapping.iter().map(|e| e.id.as_str());
        for id in self.canonical.iter().map(String::as_str).chain(migrated) {
            if seen.insert(id) {
                ids.push(id.to_string());
            }
        }
        ids
    }

    /// Canonical id to the bracket label it was migrated from. When two
    /// labels derive to the same id, the first one wins.
    pub fn labels(&self) -> HashMap<&str, &str> {
        let mut labels = HashMap::new();
        for entry in self.mapping.iter() {
            labels.entry(entry.id.as_str()).or_insert(entry.label.as_str());
        }
        labels
    }
}

/// Scan markup for both placeholder syntaxes.
pub fn scan(markup: &str) -> ScanResult {
    let brackets = bracket_tokens(markup);
    let mapping = bracket_mapping(&brackets);
    ScanResult { canonical: canonical_ids(markup), brackets, mapping }
}

/// Unique canonical ids (`{{ id }}` with inner whitespace trimmed).
/// Values inside applied spans are not placeholders and are skipped.
pub fn canonical_ids(markup: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();

    for cap in content_runs(markup).flat_map(|run| CANONICAL_RE.captures_iter(run)) {
        let id = cap[1].trim();
        if !id.is_empty() && seen.insert(id.to_string()) {
            ids.push(id.to_string());
        }
    }

    ids
}

/// Unique legacy bracket tokens, brackets included. Applied spans are
/// skipped, so bracketed text in a value is never migrated.
pub fn bracket_tokens(markup: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut tokens = Vec::new();

    for m in content_runs(markup).flat_map(|run| BRACKET_RE.find_iter(run)) {
        if seen.insert(m.as_str()) {
            tokens.push(m.as_str().to_string());
        }
    }

    tokens
}

/// Build the bracket to canonical mapping for a list of bracket tokens.
pub fn bracket_mapping(tokens: &[String]) -> BracketMapping {
    let entries = tokens
        .iter()
        .filter_map(|token| {
            let label = token.strip_prefix('[')?.strip_suffix(']')?;
            let id = derive_id(label);
            if id.is_empty() {
                tracing::trace!(token = %token, "bracket label has no id characters");
                return None;
            }
            Some(BracketEntry { token: token.clone(), label: label.to_string(), id })
        })
        .collect();

    BracketMapping { entries }
}

/// Derive a canonical id from a human label.
///
/// Lowercases, collapses every run of characters outside `[a-z0-9]` into a
/// single underscore and trims underscores at both ends. May return an empty
/// string.
pub fn derive_id(label: &str) -> String {
    let lowered = label.to_lowercase();
    NON_ID_RUN_RE.replace_all(&lowered, "_").trim_matches('_').to_string()
}

/// Whether `id` is a well-formed canonical identifier.
pub fn is_canonical_id(id: &str) -> bool {
    CANONICAL_ID_RE.is_match(id)
}

/// The canonical token for an id.
pub fn canonical_token(id: &str) -> String {
    format!("{{{{{id}}}}}")
}
