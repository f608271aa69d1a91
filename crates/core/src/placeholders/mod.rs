//! Placeholder syntax: scanning, legacy bracket migration and applied spans.
//!
//! Two syntaxes are recognised:
//! - canonical tokens: `{{client_name}}`
//! - legacy bracket tokens: `[Client Name]`, always migrated to canonical form
//!
//! All functions here operate on serialized markup strings.

pub mod applied;
pub mod normalizer;
pub mod scanner;

pub use applied::{
    APPLIED_CLASS, ID_ATTR, Segment, applied_id, applied_ids, content_runs, escape_html,
    render_applied, segments,
};
pub use normalizer::{NormalizeOutcome, normalize};
pub use scanner::{
    BracketEntry, BracketMapping, ScanResult, bracket_mapping, bracket_tokens,
    canonical_ids, canonical_token, derive_id, is_canonical_id, scan,
};
