//! Virtual command - Print a whitespace-blanked virtual document

use clap::{Args, ValueEnum};
use sfumato::atelier_sfc::{BlockKind, Selector, SfcDocument};
use std::path::PathBuf;

use super::{print_json, read_source, CliError, Format};

/// Block kind selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Template,
    Script,
    Style,
    Custom,
}

impl From<KindArg> for BlockKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Template => BlockKind::Template,
            KindArg::Script => BlockKind::Script,
            KindArg::Style => BlockKind::Style,
            KindArg::Custom => BlockKind::Custom,
        }
    }
}

#[derive(Args)]
pub struct VirtualArgs {
    /// SFC file to project
    pub file: PathBuf,

    /// Keep the regions of this block kind
    #[arg(long, value_enum, conflicts_with = "lang")]
    pub kind: Option<KindArg>,

    /// Keep the regions of this language id
    #[arg(long)]
    pub lang: Option<String>,

    /// With --kind, keep only the first region of that kind
    #[arg(long, requires = "kind")]
    pub first: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
}

pub fn run(args: VirtualArgs) -> Result<(), CliError> {
    let source = read_source(&args.file)?;
    let document = SfcDocument::new(args.file.display().to_string(), 0, &source);

    let virtual_doc = match (args.kind, args.lang) {
        (Some(kind), _) if args.first => document.single_kind_document(kind.into()),
        (Some(kind), _) => document.virtual_document(&Selector::Kind(kind.into())),
        (None, Some(lang)) => document.virtual_document(&Selector::Language(lang.into())),
        (None, None) => return Err(CliError::MissingSelector),
    };
    tracing::debug!(
        language = virtual_doc.language_id.as_str(),
        len = virtual_doc.text.len(),
        "built virtual document"
    );

    match args.format {
        Format::Json => print_json(&virtual_doc),
        Format::Text => {
            print!("{}", virtual_doc.text);
            Ok(())
        }
    }
}
