use std::fmt;
use std::ops::Range;

use crate::placeholders::ID_ATTR;

/// Whether a decorated placeholder refers to a registered variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    Known,
    Unknown,
}

impl Classification {
    pub fn class_name(self) -> &'static str {
        match self {
            Classification::Known => "variable-known",
            Classification::Unknown => "variable-unknown",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Known => f.write_str("known"),
            Classification::Unknown => f.write_str("unknown"),
        }
    }
}

/// A highlighted placeholder occurrence. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightDecoration {
    pub from: usize,
    pub to: usize,
    pub variable_id: String,
    pub classification: Classification,
}

impl HighlightDecoration {
    pub fn range(&self) -> Range<usize> {
        self.from..self.to
    }

    pub fn contains(&self, pos: usize) -> bool {
        self.range().contains(&pos)
    }

    pub fn is_known(&self) -> bool {
        self.classification == Classification::Known
    }

    /// Attributes the host renders on the decorated range. The id attribute
    /// is what pointer routing looks for.
    pub fn attributes(&self) -> [(&'static str, String); 2] {
        [
            ("class", self.classification.class_name().to_string()),
            (ID_ATTR, self.variable_id.clone()),
        ]
    }
}

/// All decorations for one document snapshot, ordered by position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecorationSet {
    decorations: Vec<HighlightDecoration>,
}

impl DecorationSet {
    pub fn new(mut decorations: Vec<HighlightDecoration>) -> Self {
        decorations.sort_by_key(|d| (d.from, d.to));
        Self { decorations }
    }

    pub fn len(&self) -> usize {
        self.decorations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decorations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HighlightDecoration> {
        self.decorations.iter()
    }

    /// The decoration covering `pos`, if any.
    pub fn at(&self, pos: usize) -> Option<&HighlightDecoration> {
        self.decorations.iter().find(|d| d.contains(pos))
    }

    pub fn known(&self) -> impl Iterator<Item = &HighlightDecoration> {
        self.decorations.iter().filter(|d| d.is_known())
    }

    pub fn unknown(&self) -> impl Iterator<Item = &HighlightDecoration> {
        self.decorations.iter().filter(|d| !d.is_known())
    }
}

impl<'a> IntoIterator for &'a DecorationSet {
    type Item = &'a HighlightDecoration;
    type IntoIter = std::slice::Iter<'a, HighlightDecoration>;

    fn into_iter(self) -> Self::IntoIter {
        self.decorations.iter()
    }
}
