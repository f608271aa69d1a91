//! Markup of applied spans: the inline element Apply All leaves behind in
//! place of a placeholder, and the escaping used for the value inside it.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Attribute carrying the variable id, on applied spans and on decorations.
pub const ID_ATTR: &str = "data-variable-id";

/// Class given to applied spans.
pub const APPLIED_CLASS: &str = "variable-applied";

static APPLIED_SPAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<span\b[^>]*\bdata-variable-id="([^"]*)"[^>]*>[^<]*</span>"#)
        .expect("valid regex")
});

/// Escape the five HTML metacharacters.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the applied span for a value.
pub fn render_applied(id: &str, value: &str) -> String {
    format!(
        r#"<span class="{APPLIED_CLASS}" {ID_ATTR}="{}">{}</span>"#,
        escape_html(id),
        escape_html(value)
    )
}

/// The id attribute of an applied span, as written in the markup.
///
/// Attribute order inside the tag is not significant, so spans re-serialized
/// by the host are still recognized.
pub fn applied_id(span: &str) -> Option<&str> {
    APPLIED_SPAN_RE.captures(span).and_then(|cap| cap.get(1)).map(|m| m.as_str())
}

/// A run of markup: either ordinary content or one whole applied span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Content(&'a str),
    Applied(&'a str),
}

/// Split markup into content runs and applied spans, in order.
///
/// Text inside an applied span is a literal value, so placeholder scanning
/// and migration only look at [`Segment::Content`] runs. Concatenating the
/// segments gives back the input.
pub fn segments(markup: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut last = 0;
    for m in APPLIED_SPAN_RE.find_iter(markup) {
        if m.start() > last {
            out.push(Segment::Content(&markup[last..m.start()]));
        }
        out.push(Segment::Applied(m.as_str()));
        last = m.end();
    }
    if last < markup.len() {
        out.push(Segment::Content(&markup[last..]));
    }
    out
}

/// Content runs only, skipping applied spans.
pub fn content_runs(markup: &str) -> impl Iterator<Item = &str> {
    segments(markup).into_iter().filter_map(|seg| match seg {
        Segment::Content(text) => Some(text),
        Segment::Applied(_) => None,
    })
}

/// Ids of every applied span in the markup.
pub fn applied_ids(markup: &str) -> HashSet<String> {
    APPLIED_SPAN_RE.captures_iter(markup).map(|cap| cap[1].to_string()).collect()
}
