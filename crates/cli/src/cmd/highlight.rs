use crate::HighlightArgs;
use crate::cmd::input::{load_markup, load_values};
use color_eyre::eyre::Result;
use lexdraft_core::config::ResolvedConfig;
use lexdraft_core::document::MemoryDocument;
use lexdraft_core::overlay;
use lexdraft_core::variables::VariableRegistry;
use std::collections::HashSet;
use tabled::{Table, Tabled, settings::Style};

/// Row for the decorations table.
#[derive(Tabled)]
struct DecorationRow {
    #[tabled(rename = "From")]
    from: usize,
    #[tabled(rename = "To")]
    to: usize,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Class")]
    class: String,
    #[tabled(rename = "Text")]
    text: String,
}

pub fn run(cfg: &ResolvedConfig, args: &HighlightArgs) -> Result<()> {
    let markup = load_markup(&args.file)?;
    let doc = MemoryDocument::new(&markup);

    let mut known: HashSet<String> = args.known.iter().cloned().collect();
    if let Some(ref path) = args.values {
        known.extend(load_values(path)?.into_iter().map(|e| e.id));
    }
    // Without explicit ids, everything the registry would discover is known.
    if args.known.is_empty() && args.values.is_none() {
        let mut registry = VariableRegistry::new(cfg.engine.highlight_pulse);
        registry.record_content_change(&markup);
        known = registry.known_ids();
    }

    let set = overlay::decorate(&doc, &known);
    if set.is_empty() {
        println!("(no placeholders found)");
        return Ok(());
    }

    let rows: Vec<DecorationRow> = set
        .iter()
        .map(|d| DecorationRow {
            from: d.from,
            to: d.to,
            id: d.variable_id.clone(),
            class: d.classification.class_name().to_string(),
            text: doc.text_between(d.from, d.to),
        })
        .collect();

    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{}", table);
    println!(
        "\nTotal: {} placeholders ({} known, {} unknown)",
        set.len(),
        set.known().count(),
        set.unknown().count()
    );
    Ok(())
}
