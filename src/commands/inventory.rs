use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::info;

use crate::cli::InventoryArgs;
use crate::extract::{Recognizers, find_qualifying_pdfs, list_batch_folders};
use crate::model::{
    BatchInventoryEntry, BatchInventoryManifest, Diagnostic, DiagnosticKind, PdfEntry,
};
use crate::util::{log_diagnostics, now_utc_string, sha256_file, write_json_pretty};

pub fn run(args: InventoryArgs) -> Result<()> {
    let recognizers = Recognizers::new()?;
    let manifest = build_inventory(&args.root, &recognizers)?;
    log_diagnostics(&manifest.diagnostics);

    for batch in &manifest.batches {
        info!(
            batch_date = %batch.batch_date,
            folder = %batch.folder,
            pdf_count = batch.pdf_count,
            "found batch folder"
        );
    }

    if args.dry_run {
        info!(
            batch_count = manifest.batch_count,
            pdf_count = manifest.pdf_count,
            source = %manifest.source_directory,
            "inventory dry-run complete"
        );
        return Ok(());
    }

    let manifest_path = args
        .manifest_path
        .unwrap_or_else(|| args.root.join("batch_inventory.json"));

    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), "wrote inventory manifest");
    info!(
        batch_count = manifest.batch_count,
        pdf_count = manifest.pdf_count,
        "inventory completed"
    );

    Ok(())
}

pub fn build_inventory(root: &Path, recognizers: &Recognizers) -> Result<BatchInventoryManifest> {
    if !root.is_dir() {
        bail!("root folder not found: {}", root.display());
    }

    let mut batches = Vec::new();
    let mut diagnostics = Vec::new();

    for folder in list_batch_folders(root)? {
        let folder_name = folder
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let Some(batch_date) = recognizers.parse_folder_date(&folder_name) else {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::InvalidBatchFolder,
                folder.display().to_string(),
                "skipping folder without a valid date in its name",
            ));
            continue;
        };

        let (pdf_paths, walk_diagnostics) = find_qualifying_pdfs(&folder, true);
        diagnostics.extend(walk_diagnostics);

        let (pdfs, hash_diagnostics) = hash_pdfs(root, &pdf_paths)?;
        diagnostics.extend(hash_diagnostics);

        batches.push(BatchInventoryEntry {
            folder: folder_name,
            batch_date,
            pdf_count: pdfs.len(),
            pdfs,
        });
    }

    Ok(BatchInventoryManifest {
        manifest_version: 1,
        generated_at: now_utc_string(),
        source_directory: root.display().to_string(),
        batch_count: batches.len(),
        pdf_count: batches.iter().map(|batch| batch.pdf_count).sum(),
        batches,
        diagnostics,
    })
}

/// Hashes each PDF, paths relative to `root`. Files that cannot be read
/// are reported and left out.
fn hash_pdfs(root: &Path, pdf_paths: &[PathBuf]) -> Result<(Vec<PdfEntry>, Vec<Diagnostic>)> {
    let mut pdfs = Vec::with_capacity(pdf_paths.len());
    let mut diagnostics = Vec::new();

    for path in pdf_paths {
        let sha256 = match sha256_file(path) {
            Ok(sha256) => sha256,
            Err(error) => {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::UnreadableEntry,
                    path.display().to_string(),
                    format!("failed to hash pdf: {error:#}"),
                ));
                continue;
            }
        };
        let relative = path
            .strip_prefix(root)
            .with_context(|| format!("{} is outside {}", path.display(), root.display()))?;
        pdfs.push(PdfEntry {
            path: relative.display().to_string(),
            sha256,
        });
    }

    Ok((pdfs, diagnostics))
}
