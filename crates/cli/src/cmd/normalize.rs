use crate::NormalizeArgs;
use crate::cmd::input::load_markup;
use color_eyre::eyre::{Result, WrapErr};
use lexdraft_core::placeholders::{normalize, scan};
use std::fs;

pub fn run(args: &NormalizeArgs) -> Result<()> {
    let markup = load_markup(&args.file)?;
    let mapping = scan(&markup).mapping;
    let outcome = normalize(&markup, &mapping);

    for entry in mapping.iter() {
        tracing::debug!(token = %entry.token, id = %entry.id, "bracket placeholder");
    }

    match args.output {
        Some(ref out) => {
            fs::write(out, outcome.markup.as_bytes())
                .wrap_err_with(|| format!("failed to write {}", out.display()))?;
            println!("OK   migrated {} placeholders -> {}", outcome.replaced, out.display());
        }
        None => {
            print!("{}", outcome.markup);
            eprintln!("migrated {} placeholders", outcome.replaced);
        }
    }
    Ok(())
}
