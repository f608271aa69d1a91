//! The boundary between the engine and the document it edits.
//!
//! The engine never owns the document model. It reads markup and text nodes
//! through [`DocumentTree`] / [`DocumentHost`] and writes back whole-content
//! replacements, cursor insertions and decorations.

pub mod markdown;
pub mod markup;
pub mod memory;
pub mod types;

pub use markdown::markdown_to_markup;
pub use markup::{Element, Node};
pub use memory::MemoryDocument;
pub use types::{DocumentHost, DocumentTree, HostError};
