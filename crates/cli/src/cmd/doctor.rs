use lexdraft_core::config::loader::{ConfigLoader, default_config_path};
use std::path::Path;

pub fn run(config: Option<&Path>) {
    match ConfigLoader::load_or_default(config) {
        Ok(rc) => {
            if let Err(e) = crate::logging::init(&rc) {
                println!("FAIL lexd doctor");
                println!("{e:#}");
                std::process::exit(1);
            }
            tracing::debug!(source = ?rc.source, "configuration resolved");

            println!("OK   lexd doctor");
            match rc.source {
                Some(ref p) => println!("path: {}", p.display()),
                None => println!(
                    "path: (built-in defaults, {} not found)",
                    default_config_path().display()
                ),
            }
            println!("engine.rescan_debounce_ms: {}", rc.engine.rescan_debounce.as_millis());
            println!("engine.highlight_pulse_ms: {}", rc.engine.highlight_pulse.as_millis());
            println!("logging.level: {}", rc.logging.level);
            if let Some(ref level) = rc.logging.file_level {
                println!("logging.file_level: {level}");
            }
            if let Some(ref file) = rc.logging.file {
                println!("logging.file: {}", file.display());
            }
        }
        Err(e) => {
            println!("FAIL lexd doctor");
            println!("{e}");
            if config.is_none() {
                println!("looked for: {}", default_config_path().display());
            }
            std::process::exit(1);
        }
    }
}
