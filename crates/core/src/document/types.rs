use thiserror::Error;

use crate::overlay::DecorationSet;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("document is read-only")]
    ReadOnly,

    #[error("no insertion point at position {0}")]
    InvalidPosition(usize),

    #[error("document rejected the new content: {0}")]
    Rejected(String),
}

/// Read access to the live node tree of a document.
pub trait DocumentTree {
    /// Call `visit` with the absolute start position and text of every
    /// text-bearing node, in document order. Text inside applied values is
    /// not visited.
    fn visit_text(&self, visit: &mut dyn FnMut(usize, &str));
}

/// The rich-text document the engine is embedded in.
///
/// Implemented by the host editor; [`MemoryDocument`](super::MemoryDocument)
/// is the in-process implementation.
pub trait DocumentHost: DocumentTree {
    /// Current serialized markup.
    fn markup(&self) -> String;

    /// Replace the whole document atomically.
    fn replace_content(&mut self, markup: &str) -> Result<(), HostError>;

    /// Insert plain text at the cursor.
    fn insert_text(&mut self, text: &str) -> Result<(), HostError>;

    /// Receive the decorations computed for the current document.
    fn set_decorations(&mut self, _decorations: &DecorationSet) {}
}
