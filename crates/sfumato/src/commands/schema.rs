//! Schema command - Print or install the JSON Schema of sfumato.config.json

use clap::Args;
use std::path::Path;

use super::CliError;
use crate::config::{write_schema, SCHEMA_PATH, SFUMATO_CONFIG_SCHEMA};

#[derive(Args)]
pub struct SchemaArgs {
    /// Write the schema under node_modules/.sfumato/ instead of printing it
    #[arg(long)]
    pub write: bool,
}

pub fn run(args: SchemaArgs, dir: Option<&Path>) -> Result<(), CliError> {
    if !args.write {
        println!("{SFUMATO_CONFIG_SCHEMA}");
        return Ok(());
    }
    let path = write_schema(dir).map_err(|source| CliError::Write {
        path: dir.unwrap_or(Path::new(".")).join(SCHEMA_PATH),
        source,
    })?;
    tracing::debug!(path = %path.display(), "wrote config schema");
    println!("{}", path.display());
    Ok(())
}
