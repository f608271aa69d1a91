//! Apply All and Insert Placeholder.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::document::{DocumentHost, HostError};
use crate::placeholders::applied::{Segment, applied_id, escape_html, render_applied, segments};
use crate::placeholders::canonical_token;
use crate::variables::VariableRegistry;

static BARE_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^}]+)\}\}").expect("valid regex"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApplyError {
    #[error("variables not applied due to an error: {0}")]
    Host(#[from] HostError),
}

/// What an Apply All pass did, for user feedback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplySummary {
    /// Substitutions made across all variables.
    pub replaced: usize,
    /// Variables with a value but no placeholder (bare or applied) left in
    /// the document.
    #[serde(rename = "unmatchedIds")]
    pub unmatched_ids: Vec<String>,
}

impl ApplySummary {
    pub fn feedback(&self) -> String {
        let mut msg = match self.replaced {
            0 => "No placeholders were replaced.".to_string(),
            1 => "Applied 1 replacement.".to_string(),
            n => format!("Applied {n} replacements."),
        };
        if !self.unmatched_ids.is_empty() {
            msg.push_str(" No placeholder found for: ");
            msg.push_str(&self.unmatched_ids.join(", "));
            msg.push('.');
        }
        msg
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub markup: String,
    pub summary: ApplySummary,
}

/// Rewrite every placeholder that has a value into an applied span.
///
/// Both bare `{{id}}` tokens and spans applied by an earlier pass are
/// replaced, so running this twice with the same values yields the same
/// markup. The document is walked once: a value that itself looks like a
/// placeholder is never substituted again. Blank values are skipped and
/// their placeholders stay visible.
pub fn apply_all<'a, I>(markup: &str, assignments: I) -> ApplyOutcome
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut order: Vec<&str> = Vec::new();
    let mut rendered: HashMap<&str, String> = HashMap::new();
    for (id, value) in assignments {
        if value.trim().is_empty() {
            continue;
        }
        if rendered.insert(id, render_applied(id, value)).is_none() {
            order.push(id);
        }
    }

    if order.is_empty() {
        return ApplyOutcome { markup: markup.to_string(), summary: ApplySummary::default() };
    }

    // Applied spans carry the escaped id.
    let by_attr: HashMap<String, &str> =
        order.iter().map(|id| (escape_html(id), *id)).collect();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut out = String::with_capacity(markup.len());

    for segment in segments(markup) {
        match segment {
            Segment::Applied(span) => {
                let id = applied_id(span).and_then(|attr| by_attr.get(attr)).copied();
                match id.and_then(|id| rendered.get(id).map(|r| (id, r))) {
                    Some((id, fresh)) => {
                        out.push_str(fresh);
                        *counts.entry(id).or_default() += 1;
                    }
                    None => out.push_str(span),
                }
            }
            Segment::Content(text) => {
                let replaced = BARE_TOKEN_RE.replace_all(text, |caps: &regex::Captures<'_>| {
                    let id = caps[1].trim();
                    match rendered.get_key_value(id) {
                        Some((&id, span)) => {
                            *counts.entry(id).or_default() += 1;
                            span.clone()
                        }
                        None => caps[0].to_string(),
                    }
                });
                out.push_str(&replaced);
            }
        }
    }

    let summary = ApplySummary {
        replaced: counts.values().sum(),
        unmatched_ids: order
            .iter()
            .filter(|id| !counts.contains_key(*id))
            .map(|id| (*id).to_string())
            .collect(),
    };
    ApplyOutcome { markup: out, summary }
}

/// Apply the registry's values to the host document.
///
/// The document is only replaced when the markup actually changed. A host
/// failure leaves registry state untouched.
pub fn apply_to_host<H>(
    host: &mut H,
    registry: &VariableRegistry,
) -> Result<ApplySummary, ApplyError>
where
    H: DocumentHost + ?Sized,
{
    let markup = host.markup();
    let outcome = apply_all(&markup, registry.assignments());

    if outcome.markup != markup {
        host.replace_content(&outcome.markup)?;
    }

    info!(
        replaced = outcome.summary.replaced,
        unmatched = outcome.summary.unmatched_ids.len(),
        "applied variable values"
    );
    Ok(outcome.summary)
}

/// Insert the bare `{{id}}` token at the host cursor.
pub fn insert_placeholder<H>(host: &mut H, id: &str) -> Result<(), ApplyError>
where
    H: DocumentHost + ?Sized,
{
    host.insert_text(&canonical_token(id))?;
    Ok(())
}
