//! Drawing revision extraction: pattern recognizers, page and document
//! scanning, and dated batch folders.

pub mod batch;
pub mod document;
pub mod page;
pub mod patterns;
pub mod pdf_text;

use crate::cli::{ExtractionArgs, ExtractionMode};

pub use batch::{find_qualifying_pdfs, list_batch_folders, process_batch_folder};
pub use patterns::Recognizers;
pub use pdf_text::{PageSource, page_source_for};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionOptions {
    pub mode: ExtractionMode,
    pub max_pages_per_doc: Option<usize>,
    pub sort_files: bool,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            mode: ExtractionMode::Blocks,
            max_pages_per_doc: None,
            sort_files: true,
        }
    }
}

impl From<&ExtractionArgs> for ExtractionOptions {
    fn from(args: &ExtractionArgs) -> Self {
        Self {
            mode: args.mode,
            max_pages_per_doc: args.max_pages_per_doc,
            sort_files: !args.no_sort_files,
        }
    }
}
