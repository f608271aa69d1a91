use lexdraft_core::apply::{ApplySummary, apply_all, apply_to_host};
use lexdraft_core::document::{DocumentHost, MemoryDocument};
use lexdraft_core::placeholders::render_applied;
use lexdraft_core::variables::VariableRegistry;
use rstest::rstest;

#[rstest]
#[case("<p>{{fee}}</p>", 1)]
#[case("<p>{{fee}} and {{fee}}</p>", 2)]
#[case("<p>{{ fee }}</p><p>{{fee}}, {{fee }}</p>", 3)]
#[case("<ul><li>{{fee}}</li><li>{{fee}}</li><li>{{fee}}</li><li>{{fee}}</li></ul>", 4)]
fn replaces_every_bare_occurrence(#[case] markup: &str, #[case] k: usize) {
    let out = apply_all(markup, [("fee", "€ 1,200")]);

    assert!(out.summary.replaced >= k);
    assert!(!out.markup.contains("{{fee}}"));
    assert!(!out.markup.contains("{{ fee }}"));
    assert_eq!(out.markup.matches(&render_applied("fee", "€ 1,200")).count(), k);
}

#[rstest]
#[case("")]
#[case(" ")]
#[case("\t\n")]
fn blank_value_leaves_placeholder(#[case] value: &str) {
    let markup = "<p>Total {{amount}}, again {{amount}}</p>";
    let out = apply_all(markup, [("amount", value)]);
    assert_eq!(out.markup, markup);
    assert_eq!(out.summary.replaced, 0);
    assert!(out.summary.unmatched_ids.is_empty());
}

#[test]
fn second_pass_is_byte_identical() {
    let markup = "<p>{{party}} owes {{fee}} by {{date}}.</p><p>{{fee}}</p>";
    let values = [("party", "O'Brien & Sons"), ("fee", "<100>"), ("date", "")];

    let first = apply_all(markup, values);
    let second = apply_all(&first.markup, values);

    assert_eq!(first.markup, second.markup);
    assert_eq!(second.summary.replaced, first.summary.replaced);
    assert!(second.markup.contains("{{date}}"));
}

#[test]
fn applied_span_with_reordered_attributes_still_matches() {
    let markup = r#"<p><span data-variable-id="fee" class="variable-applied">10</span></p>"#;
    let out = apply_all(markup, [("fee", "20")]);
    assert_eq!(out.summary.replaced, 1);
    assert_eq!(out.markup, format!("<p>{}</p>", render_applied("fee", "20")));
}

#[test]
fn effective_date_is_applied() {
    let mut doc = MemoryDocument::new("<p>Effective {{date}}.</p>");
    let mut registry = VariableRegistry::default();
    registry.record_content_change(&doc.markup());
    registry.set_value("date", "2024-01-01").unwrap();

    let summary = apply_to_host(&mut doc, &registry).unwrap();

    assert_eq!(summary, ApplySummary { replaced: 1, unmatched_ids: vec![] });
    insta::assert_snapshot!(
        doc.markup(),
        @r#"<p>Effective <span class="variable-applied" data-variable-id="date">2024-01-01</span>.</p>"#
    );
}

#[test]
fn unset_and_absent_variables() {
    let mut doc = MemoryDocument::new("<p>Amount due: {{amount}}</p><p>{{ghost}}</p>");
    let mut registry = VariableRegistry::default();
    registry.record_content_change(&doc.markup());

    // The ghost placeholder is deleted after it was registered.
    doc.replace_content("<p>Amount due: {{amount}}</p>").unwrap();
    registry.record_content_change(&doc.markup());
    registry.set_value("amount", "").unwrap();
    registry.set_value("ghost", "123").unwrap();

    let revision = doc.revision();
    let summary = apply_to_host(&mut doc, &registry).unwrap();

    assert_eq!(summary.replaced, 0);
    assert_eq!(summary.unmatched_ids, vec!["ghost".to_string()]);
    assert_eq!(doc.markup(), "<p>Amount due: {{amount}}</p>");
    assert_eq!(doc.revision(), revision);
    assert_eq!(
        summary.feedback(),
        "No placeholders were replaced. No placeholder found for: ghost."
    );
}

#[test]
fn summary_serializes_with_camel_case_key() {
    let summary = ApplySummary { replaced: 0, unmatched_ids: vec!["ghost".into()] };
    let json = serde_json::to_string(&summary).unwrap();
    assert_eq!(json, r#"{"replaced":0,"unmatchedIds":["ghost"]}"#);
}
