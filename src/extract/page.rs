use indexmap::IndexSet;

use crate::cli::ExtractionMode;
use crate::extract::patterns::{Recognizers, first_revision, last_revision};
use crate::extract::pdf_text::PageText;
use crate::model::ABSENT_REVISION;

/// Drawing numbers and revision codes carried by a PDF's file name. Computed
/// once per document and used as the lowest-priority fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilenameHints {
    pub drawings: Vec<String>,
    pub c_revision: String,
    pub p_revision: String,
}

impl FilenameHints {
    pub fn from_filename(recognizers: &Recognizers, filename: &str) -> Self {
        let codes = recognizers.find_revision_codes(filename);
        Self {
            drawings: recognizers.find_drawing_numbers(filename),
            c_revision: first_revision(&codes, 'C').unwrap_or_default().to_string(),
            p_revision: first_revision(&codes, 'P').unwrap_or_default().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawingCandidate {
    pub drawing_number: String,
    pub c_revision: String,
    pub p_revision: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageExtraction {
    pub candidates: Vec<DrawingCandidate>,
    pub c_date: String,
    pub p_date: String,
}

pub fn extract_page(
    recognizers: &Recognizers,
    page: &PageText,
    hints: &FilenameHints,
    fallback_date: &str,
    mode: ExtractionMode,
) -> PageExtraction {
    let candidates = match mode {
        ExtractionMode::Blocks => extract_block_candidates(recognizers, page, hints),
        ExtractionMode::ExcludeReferences => {
            extract_main_section_candidates(recognizers, page, hints)
        }
    };
    let (c_date, p_date) = resolve_page_dates(recognizers, &page.text, fallback_date);

    PageExtraction {
        candidates,
        c_date,
        p_date,
    }
}

/// Pairs every drawing in a block with the first C and first P code of that
/// same block. A block naming several drawings gives all of them the same
/// codes.
pub fn extract_block_candidates(
    recognizers: &Recognizers,
    page: &PageText,
    hints: &FilenameHints,
) -> Vec<DrawingCandidate> {
    let mut candidates = Vec::new();

    for block in page.scan_blocks() {
        let drawings = recognizers.find_drawing_numbers(block);
        if drawings.is_empty() {
            continue;
        }

        let codes = recognizers.find_revision_codes(block);
        let c_revision = resolve_revision(first_revision(&codes, 'C'), &hints.c_revision);
        let p_revision = resolve_revision(first_revision(&codes, 'P'), &hints.p_revision);

        for drawing_number in drawings {
            candidates.push(DrawingCandidate {
                drawing_number,
                c_revision: c_revision.clone(),
                p_revision: p_revision.clone(),
            });
        }
    }

    candidates
}

/// Drawings of the main section minus those listed under the page's
/// "REFERENCE DRAWINGS" heading, with page-wide revision codes.
pub fn extract_main_section_candidates(
    recognizers: &Recognizers,
    page: &PageText,
    hints: &FilenameHints,
) -> Vec<DrawingCandidate> {
    let (main_section, reference_section) = recognizers.split_reference_section(&page.text);
    let references: IndexSet<String> = recognizers
        .find_drawing_numbers(reference_section)
        .into_iter()
        .collect();

    let mut drawings: IndexSet<String> = recognizers
        .find_drawing_numbers(main_section)
        .into_iter()
        .filter(|drawing| !references.contains(drawing))
        .collect();

    if drawings.is_empty() {
        drawings = hints.drawings.iter().cloned().collect();
    }

    let codes = recognizers.find_revision_codes(&page.text);
    let c_revision = resolve_revision(first_revision(&codes, 'C'), &hints.c_revision);
    let p_revision = resolve_revision(last_revision(&codes, 'P'), &hints.p_revision);

    drawings
        .into_iter()
        .map(|drawing_number| DrawingCandidate {
            drawing_number,
            c_revision: c_revision.clone(),
            p_revision: p_revision.clone(),
        })
        .collect()
}

/// Page code, then filename code, then the absent sentinel.
pub fn resolve_revision(page_code: Option<&str>, filename_code: &str) -> String {
    match page_code {
        Some(code) => code.to_string(),
        None if !filename_code.is_empty() => filename_code.to_string(),
        None => ABSENT_REVISION.to_string(),
    }
}

/// First date on the page is the C date, last is the P date.
pub fn resolve_page_dates(
    recognizers: &Recognizers,
    text: &str,
    fallback_date: &str,
) -> (String, String) {
    let dates = recognizers.find_dates(text);
    match (dates.first(), dates.last()) {
        (Some(first), Some(last)) => (first.clone(), last.clone()),
        _ => (fallback_date.to_string(), fallback_date.to_string()),
    }
}
