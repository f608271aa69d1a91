//! Reading drafts and values files.

use color_eyre::eyre::{Result, WrapErr, bail};
use lexdraft_core::document::markdown_to_markup;
use lexdraft_core::variables::VariableKind;
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// A value for one variable, with optional metadata for ids the draft does
/// not define yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueEntry {
    pub id: String,
    pub value: String,
    pub label: Option<String>,
    pub kind: VariableKind,
}

impl ValueEntry {
    pub fn plain(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self { id: id.into(), value: value.into(), label: None, kind: VariableKind::default() }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ValueSpec {
    Detailed(DetailedValue),
    Scalar(Value),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DetailedValue {
    #[serde(default)]
    value: Option<Value>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    kind: VariableKind,
}

/// Read a draft as editor markup. Markdown files are converted first.
pub fn load_markup(path: &Path) -> Result<String> {
    let raw = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read draft {}", path.display()))?;

    let is_markdown = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("md") || e.eq_ignore_ascii_case("markdown"));

    Ok(if is_markdown { markdown_to_markup(&raw) } else { raw })
}

/// Read a YAML values file. Entries come back sorted by id.
pub fn load_values(path: &Path) -> Result<Vec<ValueEntry>> {
    let raw = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read values file {}", path.display()))?;
    parse_values(&raw).wrap_err_with(|| format!("invalid values file {}", path.display()))
}

pub fn parse_values(yaml: &str) -> Result<Vec<ValueEntry>> {
    if yaml.trim().is_empty() {
        return Ok(Vec::new());
    }
    let specs: BTreeMap<String, ValueSpec> = serde_yaml::from_str(yaml)?;

    specs
        .into_iter()
        .map(|(id, spec)| match spec {
            ValueSpec::Scalar(v) => Ok(ValueEntry::plain(&id, scalar(&id, &v)?)),
            ValueSpec::Detailed(d) => {
                let value = match d.value {
                    Some(ref v) => scalar(&id, v)?,
                    None => String::new(),
                };
                Ok(ValueEntry { value, label: d.label, kind: d.kind, id })
            }
        })
        .collect()
}

fn scalar(id: &str, value: &Value) -> Result<String> {
    Ok(match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        _ => bail!("value for '{id}' must be a string, number or boolean"),
    })
}

/// clap parser for `--set id=value`.
pub fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let Some((id, value)) = s.split_once('=') else {
        return Err(format!("expected ID=VALUE, got '{s}'"));
    };
    let id = id.trim();
    if id.is_empty() {
        return Err("variable id must not be empty".to_string());
    }
    Ok((id.to_string(), value.to_string()))
}

/// Merge values files and `--set` pairs. Later entries win.
pub fn merge_values(
    file_entries: Vec<ValueEntry>,
    overrides: &[(String, String)],
) -> Vec<ValueEntry> {
    let mut merged = file_entries;
    for (id, value) in overrides {
        match merged.iter_mut().find(|e| &e.id == id) {
            Some(entry) => entry.value = value.clone(),
            None => merged.push(ValueEntry::plain(id, value)),
        }
    }
    merged
}
