use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::extract::document::process_document;
use crate::extract::patterns::{Recognizers, has_discipline_marker};
use crate::extract::pdf_text::PageSource;
use crate::extract::ExtractionOptions;
use crate::model::{Batch, Diagnostic, DiagnosticKind, DrawingRecord};

#[derive(Debug)]
pub struct BatchOutcome {
    pub folder: PathBuf,
    pub batch_date: Option<String>,
    pub records: Vec<DrawingRecord>,
    pub pdf_count: usize,
    pub page_count: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl BatchOutcome {
    fn skipped(folder: &Path, diagnostic: Diagnostic) -> Self {
        Self {
            folder: folder.to_path_buf(),
            batch_date: None,
            records: Vec::new(),
            pdf_count: 0,
            page_count: 0,
            diagnostics: vec![diagnostic],
        }
    }
}

/// Extracts one dated delivery folder. Folders without a parseable date in
/// their own name are skipped whole.
pub fn process_batch_folder(
    source: &dyn PageSource,
    recognizers: &Recognizers,
    folder: &Path,
    options: &ExtractionOptions,
) -> BatchOutcome {
    let folder_name = folder
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let Some(batch_date) = recognizers.parse_folder_date(&folder_name) else {
        return BatchOutcome::skipped(
            folder,
            Diagnostic::new(
                DiagnosticKind::InvalidBatchFolder,
                folder.display().to_string(),
                "skipping folder without a valid date in its name",
            ),
        );
    };

    let (pdfs, mut diagnostics) = find_qualifying_pdfs(folder, options.sort_files);

    let mut batch = Batch::new(batch_date.clone());
    let mut page_count = 0;
    for pdf_path in &pdfs {
        let outcome = process_document(source, recognizers, pdf_path, &batch_date, options);
        page_count += outcome.page_count;
        diagnostics.extend(outcome.diagnostics);
        batch.extend(outcome.records);
    }

    BatchOutcome {
        folder: folder.to_path_buf(),
        batch_date: Some(batch_date),
        records: batch.into_records(),
        pdf_count: pdfs.len(),
        page_count,
        diagnostics,
    }
}

/// PDFs under `folder` (recursively) whose file name carries the ARC0
/// discipline marker. Entries that cannot be read are reported, not fatal.
pub fn find_qualifying_pdfs(folder: &Path, sort: bool) -> (Vec<PathBuf>, Vec<Diagnostic>) {
    let mut pdfs = Vec::new();
    let mut diagnostics = Vec::new();

    for entry in WalkDir::new(folder) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                let path = error
                    .path()
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| folder.display().to_string());
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::UnreadableEntry,
                    path,
                    format!("failed to read directory entry: {error}"),
                ));
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let is_pdf = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        let qualifies = entry
            .file_name()
            .to_str()
            .map(has_discipline_marker)
            .unwrap_or(false);

        if is_pdf && qualifies {
            pdfs.push(path.to_path_buf());
        }
    }

    if sort {
        pdfs.sort();
    }

    (pdfs, diagnostics)
}

/// Immediate subdirectories of `root`, sorted by name.
pub fn list_batch_folders(root: &Path) -> Result<Vec<PathBuf>> {
    let mut folders = Vec::new();

    let entries =
        fs::read_dir(root).with_context(|| format!("failed to read {}", root.display()))?;

    for entry in entries {
        let entry = entry.with_context(|| format!("failed to read entry in {}", root.display()))?;
        let path = entry.path();

        if entry
            .file_type()
            .with_context(|| format!("failed to inspect file type: {}", path.display()))?
            .is_dir()
        {
            folders.push(path);
        }
    }

    folders.sort();
    Ok(folders)
}
