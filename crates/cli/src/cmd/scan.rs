use crate::ScanArgs;
use crate::cmd::input::load_markup;
use color_eyre::eyre::Result;
use lexdraft_core::DraftingSession;
use lexdraft_core::config::ResolvedConfig;
use lexdraft_core::document::MemoryDocument;
use lexdraft_core::placeholders::{self, is_canonical_id};
use lexdraft_core::variables::PlaceholderStatus;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

/// Row for the variables table.
#[derive(Debug, Tabled, Serialize)]
struct VariableRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Kind")]
    kind: String,
    /// Input type the value editor uses for this kind.
    #[tabled(skip)]
    input: &'static str,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Written as")]
    source: String,
}

#[derive(Debug, Serialize)]
struct ScanReport {
    variables: Vec<VariableRow>,
    migrated: usize,
    ignored: Vec<String>,
}

pub fn run(cfg: &ResolvedConfig, args: &ScanArgs) -> Result<()> {
    let markup = load_markup(&args.file)?;
    let scanned = placeholders::scan(&markup);

    let session = DraftingSession::headless(MemoryDocument::new(&markup), &cfg.engine);
    let registry = session.registry();

    let variables: Vec<VariableRow> = registry
        .definitions()
        .iter()
        .map(|d| {
            let source = scanned
                .mapping
                .iter()
                .find(|e| e.id == d.id)
                .map_or_else(|| placeholders::canonical_token(&d.id), |e| e.token.clone());
            VariableRow {
                id: d.id.clone(),
                label: d.label.clone(),
                kind: d.kind.to_string(),
                input: d.kind.input_hint(),
                status: registry.status(&d.id).unwrap_or(PlaceholderStatus::Missing).to_string(),
                source,
            }
        })
        .collect();

    let ignored: Vec<String> =
        scanned.canonical.iter().filter(|id| !is_canonical_id(id)).cloned().collect();

    let report = ScanReport { variables, migrated: scanned.mapping.len(), ignored };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.variables.is_empty() {
        println!("(no variables found)");
    } else {
        let table = Table::new(&report.variables).with(Style::rounded()).to_string();
        println!("{}", table);
    }

    println!("\nTotal: {} variables, {} from brackets", report.variables.len(), report.migrated);
    if !report.ignored.is_empty() {
        println!("Ignored (not a valid id): {}", report.ignored.join(", "));
    }
    Ok(())
}
