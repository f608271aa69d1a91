//! Highlight overlay: decorations for every `{{id}}` occurrence in the live
//! document, and routing of clicks on them.
//!
//! Decorations are recomputed from scratch for each document snapshot. The
//! computation walks text nodes directly rather than reusing the string
//! scanner, because it needs positions in the document tree, not offsets into
//! serialized markup.

pub mod decorations;

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::document::DocumentTree;
use crate::placeholders::ID_ATTR;

pub use decorations::{Classification, DecorationSet, HighlightDecoration};

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^}]+)\}\}").expect("valid regex"));

/// Lookup of registered variable ids used to classify decorations.
pub trait KnownVariables {
    fn is_known(&self, id: &str) -> bool;
}

impl KnownVariables for HashSet<String> {
    fn is_known(&self, id: &str) -> bool {
        self.contains(id)
    }
}

impl KnownVariables for [&str] {
    fn is_known(&self, id: &str) -> bool {
        self.contains(&id)
    }
}

/// Decorate every placeholder in the document.
///
/// Synchronous and total; tokens split across text nodes are not matched.
pub fn decorate<T, K>(tree: &T, known: &K) -> DecorationSet
where
    T: DocumentTree + ?Sized,
    K: KnownVariables + ?Sized,
{
    let mut found = Vec::new();

    tree.visit_text(&mut |start, text| {
        // Byte offsets from the regex, converted to char positions
        // incrementally so each node is walked once.
        let mut last_byte = 0;
        let mut last_char = 0;
        for cap in TOKEN_RE.captures_iter(text) {
            let Some(whole) = cap.get(0) else { continue };
            let id = cap[1].trim();
            if id.is_empty() {
                continue;
            }
            let from = last_char + text[last_byte..whole.start()].chars().count();
            let to = from + whole.as_str().chars().count();
            last_byte = whole.end();
            last_char = to;

            let classification = if known.is_known(id) {
                Classification::Known
            } else {
                Classification::Unknown
            };
            found.push(HighlightDecoration {
                from: start + from,
                to: start + to,
                variable_id: id.to_string(),
                classification,
            });
        }
    });

    tracing::trace!(count = found.len(), "recomputed placeholder decorations");
    DecorationSet::new(found)
}

/// The element a pointer event landed on, as seen by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointerTarget {
    attributes: HashMap<String, String>,
}

impl PointerTarget {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Target for a click on a decoration.
    pub fn for_decoration(decoration: &HighlightDecoration) -> Self {
        decoration
            .attributes()
            .into_iter()
            .fold(Self::new(), |target, (name, value)| target.with_attr(name, value))
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Variable id carried by a pointer target, if it is a decoration.
pub fn routed_id(target: &PointerTarget) -> Option<&str> {
    target.attr(ID_ATTR).filter(|id| !id.is_empty())
}

/// Hand the variable id of a decorated target to `handler`. Returns false,
/// without calling it, for any other target.
pub fn route_pointer(target: &PointerTarget, handler: impl FnOnce(&str)) -> bool {
    match routed_id(target) {
        Some(id) => {
            handler(id);
            true
        }
        None => false,
    }
}
