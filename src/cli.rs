use std::path::PathBuf;

use clap::builder::RangedU64ValueParser;
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "revtrack",
    version,
    about = "Drawing revision extraction and master table reconciliation"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List dated batch folders and their qualifying PDFs.
    Inventory(InventoryArgs),
    /// Extract every batch under a root folder into one master table.
    Build(BuildArgs),
    /// Extract a single batch folder into a per-drawing summary table.
    Extract(ExtractArgs),
    /// Backfill revision columns of an existing master table from a summary.
    Reconcile(ReconcileArgs),
}

#[derive(Args, Debug, Clone)]
pub struct InventoryArgs {
    #[arg(long)]
    pub root: PathBuf,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    #[arg(long)]
    pub root: PathBuf,

    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[command(flatten)]
    pub extraction: ExtractionArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    #[arg(long)]
    pub folder: PathBuf,

    #[arg(long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub extraction: ExtractionArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ExtractionArgs {
    #[arg(long, value_enum, default_value_t = ExtractionMode::Blocks)]
    pub mode: ExtractionMode,

    #[arg(long, value_enum, default_value_t = TextBackend::Pdftotext)]
    pub backend: TextBackend,

    /// Scan at most this many leading pages of each PDF.
    #[arg(long, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub max_pages_per_doc: Option<usize>,

    /// Keep filesystem enumeration order instead of sorting PDF paths.
    #[arg(long, default_value_t = false)]
    pub no_sort_files: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ReconcileArgs {
    #[arg(long)]
    pub master: PathBuf,

    #[arg(long)]
    pub summary: PathBuf,

    #[arg(long)]
    pub output: PathBuf,

    #[arg(long, default_value = "NUMBER")]
    pub key_column: String,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ExtractionMode {
    /// Pair drawings with revision codes found in the same text block.
    Blocks,
    /// Drop drawings listed under a "REFERENCE DRAWINGS" heading.
    ExcludeReferences,
}

impl ExtractionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blocks => "blocks",
            Self::ExcludeReferences => "exclude-references",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum TextBackend {
    Pdftotext,
    Lopdf,
}

impl TextBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pdftotext => "pdftotext",
            Self::Lopdf => "lopdf",
        }
    }
}
