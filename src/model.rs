use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::{Deserialize, Serialize};

/// Revision value recorded when neither the page nor the filename carries a code.
pub const ABSENT_REVISION: &str = "X";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawingRecord {
    pub drawing_number: String,
    pub c_revision: String,
    pub p_revision: String,
    pub c_revision_date: String,
    pub p_revision_date: String,
    pub source_file: String,
    pub source_page: usize,
}

/// One dated delivery, keyed by drawing number in first-seen order.
#[derive(Debug, Clone)]
pub struct Batch {
    pub batch_date: String,
    records: IndexMap<String, DrawingRecord>,
}

impl Batch {
    pub fn new(batch_date: impl Into<String>) -> Self {
        Self {
            batch_date: batch_date.into(),
            records: IndexMap::new(),
        }
    }

    /// Stores the record unless the drawing is already present. Returns
    /// whether the record was kept.
    pub fn insert_if_absent(&mut self, record: DrawingRecord) -> bool {
        match self.records.entry(record.drawing_number.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(record);
                true
            }
        }
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = DrawingRecord>) -> usize {
        let mut kept = 0;
        for record in records {
            if self.insert_if_absent(record) {
                kept += 1;
            }
        }
        kept
    }

    pub fn records(&self) -> impl Iterator<Item = &DrawingRecord> {
        self.records.values()
    }

    pub fn into_records(self) -> Vec<DrawingRecord> {
        self.records.into_values().collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    InvalidBatchFolder,
    UnreadableEntry,
    UnreadableDocument,
    EmptyBatch,
}

impl DiagnosticKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidBatchFolder => "invalid_batch_folder",
            Self::UnreadableEntry => "unreadable_entry",
            Self::UnreadableDocument => "unreadable_document",
            Self::EmptyBatch => "empty_batch",
        }
    }
}

/// A recoverable problem reported by a pipeline stage instead of aborting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfEntry {
    pub path: String,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchInventoryEntry {
    pub folder: String,
    pub batch_date: String,
    pub pdf_count: usize,
    pub pdfs: Vec<PdfEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchInventoryManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub source_directory: String,
    pub batch_count: usize,
    pub pdf_count: usize,
    pub batches: Vec<BatchInventoryEntry>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolVersions {
    pub pdftotext: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildPaths {
    pub root: String,
    pub output_path: String,
    pub manifest_path: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildCounts {
    pub folders_seen: usize,
    pub batches_valid: usize,
    pub pdfs_processed: usize,
    pub pages_scanned: usize,
    pub records_extracted: usize,
    pub drawings_total: usize,
    pub revision_columns: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub folder: String,
    pub batch_date: String,
    pub pdf_count: usize,
    pub record_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub command: String,
    pub extraction_mode: String,
    pub text_backend: String,
    pub tool_versions: ToolVersions,
    pub paths: BuildPaths,
    pub counts: BuildCounts,
    pub batches: Vec<BatchSummary>,
    pub diagnostics: Vec<Diagnostic>,
    pub notes: Vec<String>,
}
