//! # sfumato
//!
//! Command-line inspector for the Sfumato language intelligence core.
//!
//! ## Name Origin
//!
//! **Sfumato** (/sfuˈmaːto/) is the painter's technique of blending tones
//! with no hard borders. A `.vue` file is several languages blended into
//! one document; this tool shows where each one begins, the same-length
//! documents each language sees, and how template positions carry over to
//! the script the template is checked as.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Environment variable read for the log filter when `--log-level` is absent
const LOG_ENV: &str = "SFUMATO_LOG";

#[derive(Parser)]
#[command(name = "sfumato")]
#[command(about = "Inspect regions, virtual documents and template mappings of Vue SFCs", long_about = None)]
#[command(version)]
struct Cli {
    /// Log filter, e.g. `warn` or `sfumato_croquis=debug` (defaults to $SFUMATO_LOG, then `warn`)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Directory containing sfumato.config.json (defaults to the working directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the language regions of an SFC
    Regions(commands::regions::RegionsArgs),

    /// Print a whitespace-blanked virtual document
    Virtual(commands::virtual_doc::VirtualArgs),

    /// Print the language ranges of an SFC, host markup included
    Ranges(commands::ranges::RangesArgs),

    /// Print the materialized template script and its source map
    Transform(commands::transform::TransformArgs),

    /// Map an offset between the SFC and the materialized template script
    Map(commands::map::MapArgs),

    /// Print the JSON Schema of sfumato.config.json, or write it with --write
    Schema(commands::schema::SchemaArgs),
}

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    let config = config::load_config(cli.config.as_deref());

    let result = match cli.command {
        Commands::Regions(args) => commands::regions::run(args),
        Commands::Virtual(args) => commands::virtual_doc::run(args),
        Commands::Ranges(args) => commands::ranges::run(args),
        Commands::Transform(args) => commands::transform::run(args, &config.transform),
        Commands::Map(args) => commands::map::run(args, &config.transform),
        Commands::Schema(args) => commands::schema::run(args, cli.config.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
