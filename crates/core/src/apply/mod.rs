//! Apply/replace engine: turns placeholders into literal, sanitized values
//! and puts bare placeholders back at the cursor.

pub mod engine;

pub use engine::{
    ApplyError, ApplyOutcome, ApplySummary, apply_all, apply_to_host, insert_placeholder,
};
