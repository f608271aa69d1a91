//! Variable definitions, values and their reconciliation with the document.
//!
//! The registry is the only writer of variable state. It is updated from two
//! directions:
//! - the document, through a debounced [`VariableRegistry::record_content_change`]
//! - the user, through value edits, editor toggles and "clear all"

pub mod debounce;
pub mod registry;
pub mod types;

pub use debounce::Debouncer;
pub use registry::{DEFAULT_PULSE, VariableRegistry};
pub use types::{
    PlaceholderStatus, Reconciliation, RegistryError, RegistrySnapshot, VariableDefinition,
    VariableKind,
};
