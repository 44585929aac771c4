use std::path::Path;

use indexmap::IndexMap;
use tracing::debug;

use crate::extract::page::{FilenameHints, extract_page};
use crate::extract::patterns::Recognizers;
use crate::extract::pdf_text::PageSource;
use crate::extract::ExtractionOptions;
use crate::model::{Diagnostic, DiagnosticKind, DrawingRecord};

#[derive(Debug, Default)]
pub struct DocumentOutcome {
    pub records: Vec<DrawingRecord>,
    pub page_count: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Extracts one record per drawing from a PDF. The first page naming a
/// drawing wins; a document that cannot be read yields no records and a
/// diagnostic.
pub fn process_document(
    source: &dyn PageSource,
    recognizers: &Recognizers,
    pdf_path: &Path,
    fallback_date: &str,
    options: &ExtractionOptions,
) -> DocumentOutcome {
    let filename = pdf_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let hints = FilenameHints::from_filename(recognizers, &filename);

    let pages = match source.read_pages(pdf_path, options.max_pages_per_doc) {
        Ok(pages) => pages,
        Err(error) => {
            return DocumentOutcome {
                diagnostics: vec![Diagnostic::new(
                    DiagnosticKind::UnreadableDocument,
                    pdf_path.display().to_string(),
                    format!("error processing document: {error:#}"),
                )],
                ..DocumentOutcome::default()
            };
        }
    };

    let mut record_map: IndexMap<String, DrawingRecord> = IndexMap::new();
    for page in &pages {
        let extraction = extract_page(recognizers, page, &hints, fallback_date, options.mode);
        for candidate in extraction.candidates {
            record_map
                .entry(candidate.drawing_number.clone())
                .or_insert_with(|| DrawingRecord {
                    drawing_number: candidate.drawing_number,
                    c_revision: candidate.c_revision,
                    p_revision: candidate.p_revision,
                    c_revision_date: extraction.c_date.clone(),
                    p_revision_date: extraction.p_date.clone(),
                    source_file: filename.clone(),
                    source_page: page.number,
                });
        }
    }

    debug!(
        path = %pdf_path.display(),
        backend = source.name(),
        pages = pages.len(),
        records = record_map.len(),
        "processed document"
    );

    DocumentOutcome {
        records: record_map.into_values().collect(),
        page_count: pages.len(),
        diagnostics: Vec::new(),
    }
}
