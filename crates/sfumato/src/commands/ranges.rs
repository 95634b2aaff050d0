//! Ranges command - Print the language ranges of an SFC

use clap::Args;
use sfumato::atelier_sfc::{LanguageRange, SfcDocument};
use sfumato::carton::SourceRange;
use std::fmt::Write;
use std::path::PathBuf;

use super::{print_json, read_source, CliError, Format};

#[derive(Args)]
pub struct RangesArgs {
    /// SFC file to inspect
    pub file: PathBuf,

    /// Start of the range to partition (defaults to 0)
    #[arg(long)]
    pub start: Option<u32>,

    /// End of the range to partition (defaults to the document length)
    #[arg(long)]
    pub end: Option<u32>,

    /// Also print the language at this offset
    #[arg(long)]
    pub at: Option<u32>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
}

pub fn run(args: RangesArgs) -> Result<(), CliError> {
    let source = read_source(&args.file)?;
    let document = SfcDocument::new(args.file.display().to_string(), 0, &source);

    let range = match (args.start, args.end) {
        (None, None) => None,
        (start, end) => {
            let len = source.len() as u32;
            let end = end.unwrap_or(len).min(len);
            Some(SourceRange::new(start.unwrap_or(0).min(end), end))
        }
    };
    let ranges = document.language_ranges(range);

    match args.format {
        Format::Json => print_json(&ranges),
        Format::Text => {
            print!("{}", render_text(&ranges));
            if let Some(offset) = args.at {
                println!("at {offset}: {}", document.language_at(offset));
            }
            Ok(())
        }
    }
}

fn render_text(ranges: &[LanguageRange]) -> String {
    let mut out = String::new();
    for range in ranges {
        let _ = writeln!(
            out,
            "{:<10} {}",
            format!("{}..{}", range.start, range.end),
            range.language_id.as_str()
        );
    }
    out
}
