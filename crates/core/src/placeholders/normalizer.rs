//! Legacy bracket placeholder migration.

use std::borrow::Cow;

use regex::Regex;

use super::applied::{Segment, segments};
use super::scanner::{BracketMapping, canonical_token};

/// Result of normalizing a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOutcome<'a> {
    pub markup: Cow<'a, str>,
    /// Number of bracket tokens rewritten.
    pub replaced: usize,
}

impl NormalizeOutcome<'_> {
    pub fn changed(&self) -> bool {
        self.replaced > 0
    }
}

/// Rewrite every literal occurrence of each mapped bracket token into its
/// canonical `{{id}}` form.
///
/// Tokens are escaped before matching, so labels containing regex control
/// characters are substituted literally. Applied spans are copied through
/// untouched. Longer tokens win over shorter ones
/// starting at the same offset. An empty mapping borrows the input.
pub fn normalize<'a>(markup: &'a str, mapping: &BracketMapping) -> NormalizeOutcome<'a> {
    if mapping.is_empty() {
        return NormalizeOutcome { markup: Cow::Borrowed(markup), replaced: 0 };
    }

    let mut tokens: Vec<&str> = mapping.iter().map(|e| e.token.as_str()).collect();
    tokens.sort_by(|a, b| b.len().cmp(&a.len()));

    let pattern =
        tokens.iter().map(|t| regex::escape(t)).collect::<Vec<_>>().join("|");

    let re = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(e) => {
            // Only reachable when the alternation exceeds the regex size limit.
            tracing::warn!(error = %e, "bracket pattern too large, substituting tokens one by one");
            return normalize_sequential(markup, &tokens, mapping);
        }
    };

    let mut replaced = 0;
    let mut out = String::with_capacity(markup.len());
    for segment in segments(markup) {
        match segment {
            Segment::Applied(span) => out.push_str(span),
            Segment::Content(text) => {
                let rewritten = re.replace_all(text, |caps: &regex::Captures<'_>| {
                    let token = &caps[0];
                    match mapping.id_for(token) {
                        Some(id) => {
                            replaced += 1;
                            canonical_token(id)
                        }
                        None => token.to_string(),
                    }
                });
                out.push_str(&rewritten);
            }
        }
    }

    if replaced == 0 {
        return NormalizeOutcome { markup: Cow::Borrowed(markup), replaced };
    }
    NormalizeOutcome { markup: Cow::Owned(out), replaced }
}

fn normalize_sequential<'a>(
    markup: &'a str,
    tokens: &[&str],
    mapping: &BracketMapping,
) -> NormalizeOutcome<'a> {
    let mut out = String::with_capacity(markup.len());
    let mut replaced = 0;

    for segment in segments(markup) {
        let text = match segment {
            Segment::Applied(span) => {
                out.push_str(span);
                continue;
            }
            Segment::Content(text) => text,
        };
        let mut run = text.to_string();
        for token in tokens {
            let Some(id) = mapping.id_for(token) else { continue };
            let count = run.matches(token).count();
            if count > 0 {
                replaced += count;
                run = run.replace(token, &canonical_token(id));
            }
        }
        out.push_str(&run);
    }

    NormalizeOutcome { markup: Cow::Owned(out), replaced }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placeholders::scanner::scan;

    #[test]
    fn test_empty_mapping_borrows() {
        let input = "<p>{{date}}</p>";
        let out = normalize(input, &BracketMapping::default());
        assert!(matches!(out.markup, Cow::Borrowed(_)));
        assert!(!out.changed());
    }

    #[test]
    fn test_rewrites_every_occurrence() {
        let input = "[Client Name] owes [Client Name] the [Amount]";
        let out = normalize(input, &scan(input).mapping);
        assert_eq!(out.markup, "{{client_name}} owes {{client_name}} the {{amount}}");
        assert_eq!(out.replaced, 3);
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let input = "Pay [Fee (USD) + VAT*] now";
        let out = normalize(input, &scan(input).mapping);
        assert_eq!(out.markup, "Pay {{fee_usd_vat}} now");
    }

    #[test]
    fn test_unmapped_brackets_left_alone() {
        let input = "[Party] and [...]";
        let out = normalize(input, &scan(input).mapping);
        assert_eq!(out.markup, "{{party}} and [...]");
    }

    #[test]
    fn test_applied_span_text_is_kept() {
        let input = concat!(
            r#"<p>[Party] <span class="variable-applied" data-variable-id="fee">"#,
            r#"[see annex]</span> [Party]</p>"#
        );
        let mapping = scan(input).mapping;
        assert_eq!(mapping.len(), 1);
        let out = normalize(input, &mapping);
        assert_eq!(out.replaced, 2);
        assert_eq!(
            out.markup,
            concat!(
                r#"<p>{{party}} <span class="variable-applied" data-variable-id="fee">"#,
                r#"[see annex]</span> {{party}}</p>"#
            )
        );
    }

    #[test]
    fn test_sequential_fallback_matches_regex_path() {
        let input = "[A] [B c] [A]";
        let mapping = scan(input).mapping;
        let tokens: Vec<&str> = mapping.iter().map(|e| e.token.as_str()).collect();
        let seq = normalize_sequential(input, &tokens, &mapping);
        assert_eq!(seq.markup, normalize(input, &mapping).markup);
        assert_eq!(seq.replaced, 3);
    }
}
