//! Map command - Map an offset between the SFC and the materialized template script

use clap::Args;
use serde::Serialize;
use sfumato::canon::{map_backward, map_forward, TransformOptions};
use sfumato::carton::{LineIndex, LinePosition};
use std::path::PathBuf;

use super::{print_json, CliError, Format};

#[derive(Args)]
pub struct MapArgs {
    /// SFC file (or bare template markup with --template)
    pub file: PathBuf,

    /// Offset to map
    #[arg(long)]
    pub offset: u32,

    /// Map from the materialized script back to the SFC
    #[arg(long)]
    pub backward: bool,

    /// Treat the file as template markup rather than a whole SFC
    #[arg(long)]
    pub template: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
}

#[derive(Serialize)]
struct JsonOutput {
    offset: u32,
    backward: bool,
    mapped: Option<u32>,
    position: Option<LinePosition>,
}

pub fn run(args: MapArgs, options: &TransformOptions) -> Result<(), CliError> {
    let (source, result) = super::transform::load(&args.file, args.template, options)?;
    let (mapped, target) = if args.backward {
        (map_backward(&result.source_map, args.offset), source.as_str())
    } else {
        (map_forward(&result.source_map, args.offset), result.materialized_text.as_str())
    };
    // Positions are 0-based, as the editor protocol counts them
    let position = mapped.map(|offset| LineIndex::new(target).position_of(offset as usize));

    match args.format {
        Format::Json => print_json(&JsonOutput {
            offset: args.offset,
            backward: args.backward,
            mapped,
            position,
        }),
        Format::Text => {
            match mapped.zip(position) {
                Some((offset, position)) => {
                    println!("{offset} ({}:{})", position.line, position.column)
                }
                None => println!("invalid"),
            }
            Ok(())
        }
    }
}
