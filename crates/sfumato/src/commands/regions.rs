//! Regions command - Print the language regions of an SFC

use clap::Args;
use serde::Serialize;
use sfumato::atelier_sfc::{extract_regions, languages_in_document, SfcRegions};
use sfumato::carton::CompactString;
use std::fmt::Write;
use std::path::PathBuf;

use super::{print_json, read_source, CliError, Format};

#[derive(Args)]
pub struct RegionsArgs {
    /// SFC file to inspect
    pub file: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonOutput<'a> {
    #[serde(flatten)]
    regions: &'a SfcRegions,
    languages: Vec<CompactString>,
}

pub fn run(args: RegionsArgs) -> Result<(), CliError> {
    let source = read_source(&args.file)?;
    let sfc = extract_regions(&source);
    let languages = languages_in_document(&sfc.regions);

    match args.format {
        Format::Json => print_json(&JsonOutput {
            regions: &sfc,
            languages,
        }),
        Format::Text => {
            print!("{}", render_text(&sfc, &languages));
            Ok(())
        }
    }
}

fn render_text(sfc: &SfcRegions, languages: &[CompactString]) -> String {
    let mut out = String::new();
    for region in &sfc.regions {
        let _ = writeln!(
            out,
            "{:<8} {:<12} {}..{}",
            region.kind.as_str(),
            region.language_id.as_str(),
            region.start,
            region.end
        );
    }
    for src in &sfc.imported_scripts {
        let _ = writeln!(out, "imports  {src}");
    }
    let _ = writeln!(out, "languages {}", languages.join(", "));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_text() {
        let source = "<template><p/></template>\n<script lang=\"ts\" src=\"./a.ts\">\n</script>\n";
        let sfc = extract_regions(source);
        let languages = languages_in_document(&sfc.regions);
        insta::assert_snapshot!(render_text(&sfc, &languages), @r"
        template vue-html     10..14
        script   typescript   57..58
        imports  ./a.ts
        languages vue, vue-html, typescript
        ");
    }
}
