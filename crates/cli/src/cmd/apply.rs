use crate::ApplyArgs;
use crate::cmd::input::{ValueEntry, load_markup, load_values, merge_values};
use color_eyre::eyre::{Result, WrapErr};
use lexdraft_core::DraftingSession;
use lexdraft_core::config::ResolvedConfig;
use lexdraft_core::document::{DocumentHost, MemoryDocument};
use lexdraft_core::variables::VariableDefinition;
use serde::Serialize;
use std::fs;

/// JSON report for `lexd apply --json`.
#[derive(Debug, Serialize)]
struct ApplyReport {
    replaced: usize,
    #[serde(rename = "unmatchedIds")]
    unmatched_ids: Vec<String>,
    /// Defined variables left without a value.
    unset: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    markup: Option<String>,
}

pub fn run(cfg: &ResolvedConfig, args: &ApplyArgs) -> Result<()> {
    let markup = load_markup(&args.file)?;
    let file_values = match args.values {
        Some(ref path) => load_values(path)?,
        None => Vec::new(),
    };
    let entries = merge_values(file_values, &args.set);

    let mut session = DraftingSession::headless(MemoryDocument::new(&markup), &cfg.engine);
    for entry in &entries {
        assign(&mut session, entry)?;
    }

    let summary = session.apply_all()?;
    let result = session.host().markup();

    let registry = session.registry();
    let unset: Vec<String> = registry
        .assignments()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(id, _)| id.to_string())
        .collect();

    if let Some(ref out) = args.output {
        fs::write(out, result.as_bytes())
            .wrap_err_with(|| format!("failed to write {}", out.display()))?;
    }

    if args.json {
        let report = ApplyReport {
            replaced: summary.replaced,
            unmatched_ids: summary.unmatched_ids,
            unset,
            markup: args.output.is_none().then_some(result),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    match args.output {
        Some(ref out) => {
            println!("OK   {}", summary.feedback());
            println!("wrote: {}", out.display());
            if !unset.is_empty() {
                println!("unset: {}", unset.join(", "));
            }
        }
        None => {
            print!("{}", result);
            eprintln!("{}", summary.feedback());
        }
    }
    Ok(())
}

/// Set one value, registering the variable first when the draft does not
/// mention it. Such variables end up reported as unmatched.
fn assign(session: &mut DraftingSession<MemoryDocument>, entry: &ValueEntry) -> Result<()> {
    if !session.registry().contains(&entry.id) {
        let label = entry.label.clone().unwrap_or_else(|| entry.id.clone());
        let definition = VariableDefinition::new(&entry.id, label).with_kind(entry.kind);
        session
            .register(definition)
            .wrap_err_with(|| format!("cannot use value for '{}'", entry.id))?;
        tracing::debug!(id = %entry.id, "registered variable from values");
    }
    session.set_value(&entry.id, entry.value.clone())?;
    Ok(())
}
