use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::{TempDir, tempdir};

const ORDER: &str = "<p>Hello [Client Name], your order [Order Number] is ready.</p>";

fn write_file(path: &PathBuf, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Temp dir with an empty XDG config home, so no user config is picked up.
fn workspace() -> TempDir {
    let tmp = tempdir().unwrap();
    fs::create_dir_all(tmp.path().join("xdg")).unwrap();
    tmp
}

fn lexd(tmp: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("lexd"));
    cmd.env("XDG_CONFIG_HOME", tmp.join("xdg"));
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn scan_lists_migrated_variables() {
    let tmp = workspace();
    let draft = tmp.path().join("order.html");
    write_file(&draft, ORDER);

    lexd(tmp.path())
        .args(["scan", draft.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("client_name"))
        .stdout(predicate::str::contains("Client Name"))
        .stdout(predicate::str::contains("[Order Number]"))
        .stdout(predicate::str::contains("Total: 2 variables, 2 from brackets"));
}

#[test]
fn scan_json_reports_ignored_ids() {
    let tmp = workspace();
    let draft = tmp.path().join("letter.html");
    write_file(&draft, "<p>{{fee}} and {{Client Name}}</p>");

    let output = lexd(tmp.path())
        .args(["scan", "--json", draft.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["variables"][0]["id"], "fee");
    assert_eq!(json["variables"][0]["status"], "found");
    assert_eq!(json["variables"][0]["input"], "text");
    assert_eq!(json["ignored"][0], "Client Name");
    assert_eq!(json["migrated"], 0);
}

#[test]
fn normalize_writes_output_file() {
    let tmp = workspace();
    let draft = tmp.path().join("order.html");
    let out = tmp.path().join("order.out.html");
    write_file(&draft, ORDER);

    lexd(tmp.path())
        .args(["normalize", draft.to_str().unwrap(), "-o", out.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("migrated 2 placeholders"));

    assert_eq!(
        fs::read_to_string(&out).unwrap(),
        "<p>Hello {{client_name}}, your order {{order_number}} is ready.</p>"
    );
}

#[test]
fn highlight_marks_unknown_ids() {
    let tmp = workspace();
    let draft = tmp.path().join("memo.html");
    write_file(&draft, "<p>{{alpha}} and {{beta}}</p>");

    lexd(tmp.path())
        .args(["highlight", draft.to_str().unwrap(), "--known", "alpha"])
        .assert()
        .success()
        .stdout(predicate::str::contains("variable-known"))
        .stdout(predicate::str::contains("variable-unknown"))
        .stdout(predicate::str::contains("2 placeholders (1 known, 1 unknown)"));
}

#[test]
fn apply_prints_markup_and_feedback() {
    let tmp = workspace();
    let draft = tmp.path().join("notice.html");
    write_file(&draft, "<p>Effective {{date}}.</p>");

    lexd(tmp.path())
        .args(["apply", draft.to_str().unwrap(), "--set", "date=2024-01-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"<span class="variable-applied" data-variable-id="date">2024-01-01</span>"#,
        ))
        .stderr(predicate::str::contains("Applied 1 replacement."));
}

#[test]
fn apply_json_reports_unmatched() {
    let tmp = workspace();
    let draft = tmp.path().join("invoice.html");
    let values = tmp.path().join("values.yaml");
    let out = tmp.path().join("invoice.out.html");
    write_file(&draft, "<p>Amount due: {{amount}}</p>");
    write_file(&values, "amount: \"\"\nghost:\n  value: 123\n  label: Ghost\n");

    let output = lexd(tmp.path())
        .args(["apply", draft.to_str().unwrap(), "--values", values.to_str().unwrap()])
        .args(["--json", "-o", out.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["replaced"], 0);
    assert_eq!(json["unmatchedIds"], serde_json::json!(["ghost"]));
    assert_eq!(json["unset"], serde_json::json!(["amount"]));
    assert!(json.get("markup").is_none());
    assert_eq!(fs::read_to_string(&out).unwrap(), "<p>Amount due: {{amount}}</p>");
}

#[test]
fn apply_imports_markdown() {
    let tmp = workspace();
    let draft = tmp.path().join("letter.md");
    write_file(&draft, "Dear [Client Name],\n\nPlease pay {{fee}}.\n");

    lexd(tmp.path())
        .args(["apply", draft.to_str().unwrap()])
        .args(["--set", "client_name=Ada & Co", "--set", "fee=1,000"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"data-variable-id="client_name">Ada &amp; Co</span>"#))
        .stdout(predicate::str::contains(r#"data-variable-id="fee">1,000</span>"#))
        .stderr(predicate::str::contains("Applied 2 replacements."));
}

#[test]
fn apply_rejects_invalid_id() {
    let tmp = workspace();
    let draft = tmp.path().join("memo.html");
    write_file(&draft, "<p>{{fee}}</p>");

    lexd(tmp.path())
        .args(["apply", draft.to_str().unwrap(), "--set", "Client Name=Ada"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid variable id"));
}
