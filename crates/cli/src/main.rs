mod cmd;
mod logging;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use lexdraft_core::config::ConfigLoader;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "lexd", version, about = "Variable placeholders for legal drafts")]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate configuration and print resolved settings
    Doctor,

    /// List the variables a draft defines and whether they are placed
    Scan(ScanArgs),

    /// Rewrite legacy [Bracket] placeholders as {{canonical}} tokens
    Normalize(NormalizeArgs),

    /// List placeholder decorations with their document positions
    Highlight(HighlightArgs),

    /// Substitute variable values into a draft
    Apply(ApplyArgs),
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Draft to scan (HTML markup, or Markdown if it ends in .md)
    pub file: PathBuf,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct NormalizeArgs {
    pub file: PathBuf,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct HighlightArgs {
    pub file: PathBuf,

    /// Treat this id as a known variable (repeatable)
    #[arg(long = "known", value_name = "ID")]
    pub known: Vec<String>,

    /// YAML values file whose ids count as known
    #[arg(long)]
    pub values: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ApplyArgs {
    pub file: PathBuf,

    /// Set a value, as id=value (repeatable, wins over --values)
    #[arg(long = "set", value_name = "ID=VALUE", value_parser = cmd::input::parse_assignment)]
    pub set: Vec<(String, String)>,

    /// YAML file of values: `id: value` or `id: { value, label, kind }`
    #[arg(long)]
    pub values: Option<PathBuf>,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    if let Commands::Doctor = cli.command {
        cmd::doctor::run(cli.config.as_deref());
        return Ok(());
    }

    let cfg = ConfigLoader::load_or_default(cli.config.as_deref())
        .wrap_err("failed to load configuration")?;
    logging::init(&cfg)?;

    match cli.command {
        Commands::Doctor => Ok(()),
        Commands::Scan(args) => cmd::scan::run(&cfg, &args),
        Commands::Normalize(args) => cmd::normalize::run(&args),
        Commands::Highlight(args) => cmd::highlight::run(&cfg, &args),
        Commands::Apply(args) => cmd::apply::run(&cfg, &args),
    }
}
