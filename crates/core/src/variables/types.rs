//! Variable registry data types.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unknown variable: {0}")]
    UnknownVariable(String),

    #[error("invalid variable id '{0}' (expected lowercase letters, digits and underscores)")]
    InvalidId(String),
}

/// Kind of a variable. Only changes the input affordance; values are strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    #[default]
    Text,
    Date,
    Number,
    Currency,
}

impl VariableKind {
    /// HTML input type used to edit values of this kind.
    #[must_use]
    pub fn input_hint(self) -> &'static str {
        match self {
            VariableKind::Text | VariableKind::Currency => "text",
            VariableKind::Date => "date",
            VariableKind::Number => "number",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VariableKind::Text => "text",
            VariableKind::Date => "date",
            VariableKind::Number => "number",
            VariableKind::Currency => "currency",
        }
    }
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A variable known to the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableDefinition {
    /// Canonical id, `[a-z0-9_]+`.
    pub id: String,
    /// Display name. The bracket label for migrated placeholders.
    pub label: String,
    #[serde(default)]
    pub kind: VariableKind,
}

impl VariableDefinition {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self { id: id.into(), label: label.into(), kind: VariableKind::Text }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: VariableKind) -> Self {
        self.kind = kind;
        self
    }
}

/// Whether a variable's placeholder was present at the last scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderStatus {
    Found,
    Missing,
}

impl PlaceholderStatus {
    pub fn is_found(self) -> bool {
        matches!(self, PlaceholderStatus::Found)
    }
}

impl fmt::Display for PlaceholderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaceholderStatus::Found => f.write_str("found"),
            PlaceholderStatus::Missing => f.write_str("missing"),
        }
    }
}

/// Result of reconciling the registry against one version of the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Markup with bracket placeholders rewritten, when any were migrated.
    /// The caller pushes this back into the document.
    pub normalized: Option<String>,
    /// Number of bracket tokens rewritten.
    pub migrated: usize,
    /// Ids registered by this pass, in document order.
    pub discovered: Vec<String>,
    /// The pass was skipped because the document had no text.
    pub skipped: bool,
}

/// Read-only copy of registry state handed to the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistrySnapshot {
    pub definitions: Vec<VariableDefinition>,
    pub values: HashMap<String, String>,
    pub statuses: HashMap<String, PlaceholderStatus>,
    pub editing: Option<String>,
    pub pulsing: Option<String>,
}
