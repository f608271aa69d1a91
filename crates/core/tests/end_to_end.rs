use std::time::{Duration, Instant};

use lexdraft_core::config::EngineConfig;
use lexdraft_core::document::{DocumentHost, MemoryDocument, markdown_to_markup};
use lexdraft_core::overlay::{self, PointerTarget};
use lexdraft_core::placeholders::{normalize, scan};
use lexdraft_core::variables::{PlaceholderStatus, VariableDefinition, VariableKind};
use lexdraft_core::DraftingSession;

const ORDER: &str = "<p>Hello [Client Name], your order [Order Number] is ready.</p>";

fn config() -> EngineConfig {
    EngineConfig {
        rescan_debounce: Duration::from_millis(300),
        highlight_pulse: Duration::from_millis(1500),
    }
}

#[test]
fn bracket_placeholders_are_migrated() {
    let scanned = scan(ORDER);
    assert_eq!(scanned.brackets, vec!["[Client Name]", "[Order Number]"]);
    let ids: Vec<_> = scanned.mapping.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["client_name", "order_number"]);

    let out = normalize(ORDER, &scanned.mapping);
    assert_eq!(out.replaced, 2);
    insta::assert_snapshot!(
        out.markup,
        @"<p>Hello {{client_name}}, your order {{order_number}} is ready.</p>"
    );
    assert!(scan(&out.markup).brackets.is_empty());
}

#[test]
fn session_migrates_and_labels_bracket_variables() {
    let session = DraftingSession::headless(MemoryDocument::new(ORDER), &config());
    let registry = session.registry();

    let summary: Vec<String> = registry
        .definitions()
        .iter()
        .map(|d| format!("{} | {} | {:?}", d.id, d.label, registry.status(&d.id)))
        .collect();
    insta::assert_snapshot!(summary.join("\n"), @r"
    client_name | Client Name | Some(Found)
    order_number | Order Number | Some(Found)
    ");
    assert!(scan(&session.host().markup()).brackets.is_empty());
}

#[test]
fn only_registered_ids_are_known() {
    let doc = MemoryDocument::new("<p>{{alpha}} and {{beta}}</p>");
    let known = ["alpha"];
    let set = overlay::decorate(&doc, &known[..]);

    let known: Vec<_> = set.known().map(|d| d.variable_id.as_str()).collect();
    let unknown: Vec<_> = set.unknown().map(|d| d.variable_id.as_str()).collect();
    assert_eq!(known, vec!["alpha"]);
    assert_eq!(unknown, vec!["beta"]);
}

#[test]
fn decorations_follow_registry() {
    let t0 = Instant::now();
    let mut session =
        DraftingSession::headless(MemoryDocument::new("<p>{{alpha}}</p>"), &config());

    session.host_mut().replace_content("<p>{{alpha}} and {{beta}}</p>").unwrap();
    session.on_transaction(t0);
    assert_eq!(session.decorations().known().count(), 1);
    assert_eq!(session.decorations().unknown().count(), 1);

    session.tick(t0 + Duration::from_millis(300));
    assert_eq!(session.decorations().known().count(), 2);
    assert_eq!(session.host().decorations(), session.decorations());
}

#[test]
fn names_with_spaces_stay_unknown() {
    let session =
        DraftingSession::headless(MemoryDocument::new("<p>{{Client Name}}</p>"), &config());
    assert!(session.registry().definitions().is_empty());
    assert_eq!(session.decorations().unknown().count(), 1);
}

#[test]
fn applied_only_variable_is_found() {
    let t0 = Instant::now();
    let mut session =
        DraftingSession::headless(MemoryDocument::new("<p>Fee: {{fee}}</p>"), &config());
    session.set_value("fee", "10").unwrap();
    session.apply_all().unwrap();
    assert_eq!(session.registry().status("fee"), Some(PlaceholderStatus::Found));

    session.host_mut().replace_content("<p>Fee waived</p>").unwrap();
    session.on_transaction(t0);
    session.tick(t0 + Duration::from_millis(300));
    assert_eq!(session.registry().status("fee"), Some(PlaceholderStatus::Missing));
    assert_eq!(session.registry().missing(), vec!["fee"]);
    assert_eq!(session.registry().value("fee"), "10");
}

#[test]
fn bracketed_values_survive_rescan() {
    let t0 = Instant::now();
    let mut session = DraftingSession::headless(
        MemoryDocument::new("<p>Fee: {{fee}}. Payable to [Payee].</p>"),
        &config(),
    );
    session.set_value("fee", "[see annex]").unwrap();
    session.apply_all().unwrap();

    session.on_transaction(t0);
    session.tick(t0 + Duration::from_millis(300));

    insta::assert_snapshot!(
        session.host().markup(),
        @r#"<p>Fee: <span class="variable-applied" data-variable-id="fee">[see annex]</span>. Payable to {{payee}}.</p>"#
    );
    let ids: Vec<_> = session.registry().definitions().iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["fee", "payee"]);
    let decorated: Vec<_> = session.decorations().iter().map(|d| d.variable_id.as_str()).collect();
    assert_eq!(decorated, vec!["payee"]);
}

#[test]
fn empty_document_keeps_registry() {
    let t0 = Instant::now();
    let mut session =
        DraftingSession::headless(MemoryDocument::new("<p>{{fee}}</p>"), &config());
    session.set_value("fee", "10").unwrap();

    session.host_mut().replace_content("<p></p>").unwrap();
    session.on_transaction(t0);
    session.tick(t0 + Duration::from_millis(300));

    assert_eq!(session.registry().status("fee"), Some(PlaceholderStatus::Found));
    assert_eq!(session.registry().value("fee"), "10");
}

#[test]
fn clicking_plain_text_is_ignored() {
    let mut session =
        DraftingSession::headless(MemoryDocument::new("<p>{{fee}}</p>"), &config());
    let plain = PointerTarget::new().with_attr("class", "paragraph");
    assert!(!session.click(&plain, Instant::now()));
    assert_eq!(session.view().editing, None);
}

#[test]
fn clear_all_keeps_definitions() {
    let mut session =
        DraftingSession::headless(MemoryDocument::new("<p>{{fee}} {{party}}</p>"), &config());
    session.set_value("fee", "10").unwrap();
    session.set_value("party", "Acme").unwrap();
    session.open_editor("party").unwrap();

    session.clear_all();

    let view = session.view();
    assert_eq!(view.definitions.len(), 2);
    assert!(view.values.is_empty());
    assert_eq!(view.editing, None);
}

#[test]
fn explicit_registration_validates_ids() {
    let mut session =
        DraftingSession::headless(MemoryDocument::new("<p>Due {{due_date}}</p>"), &config());

    let added = session
        .register(VariableDefinition::new("retainer", "Retainer").with_kind(VariableKind::Currency))
        .unwrap();
    assert!(added);
    assert_eq!(session.registry().status("retainer"), Some(PlaceholderStatus::Missing));
    assert!(!session.register(VariableDefinition::new("due_date", "Due")).unwrap());
    assert!(session.register(VariableDefinition::new("Due Date", "Due")).is_err());
}

#[test]
fn markdown_drafts_are_imported() {
    let markup = markdown_to_markup("# Engagement\n\nDear [Client Name],\n\nFee: **{{fee}}**\n");
    let mut session = DraftingSession::headless(MemoryDocument::new(&markup), &config());

    let ids: Vec<_> = session.registry().definitions().iter().map(|d| d.id.clone()).collect();
    assert_eq!(ids, vec!["client_name", "fee"]);

    session.set_value("client_name", "Ada").unwrap();
    session.set_value("fee", "1,000").unwrap();
    let summary = session.apply_all().unwrap();
    assert_eq!(summary.replaced, 2);
    assert!(session.host().markup().contains(r#"data-variable-id="fee">1,000</span>"#));
}
