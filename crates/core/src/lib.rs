#![deny(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

//! Variable templating engine for the lexdraft drafting editor.
//!
//! The engine finds `{{id}}` placeholders (and legacy `[Label]` ones) in a
//! document's serialized markup, keeps a registry of known variables and their
//! values, decorates placeholder occurrences for the editor, and rewrites the
//! document when values are applied.

pub mod apply;
pub mod config;
pub mod document;
pub mod overlay;
pub mod placeholders;
pub mod session;
pub mod variables;

pub use session::{DraftingSession, NoopBridge, UiBridge};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
