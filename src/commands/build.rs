use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Result, bail};
use chrono::Utc;
use tracing::info;

use crate::cli::{BuildArgs, ExtractionArgs};
use crate::extract::{
    ExtractionOptions, PageSource, Recognizers, list_batch_folders, page_source_for,
    process_batch_folder,
};
use crate::model::{
    Batch, BatchSummary, BuildCounts, BuildPaths, BuildRunManifest, Diagnostic, DiagnosticKind,
    ToolVersions,
};
use crate::table::{BatchRecords, Table, build_master_table, write_table};
use crate::util::{
    command_version_optional, log_diagnostics, now_utc_string, utc_compact_string,
    write_json_pretty,
};

pub fn run(args: BuildArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("run-{}", utc_compact_string(started_ts));

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| args.root.join("Revision_Summary.csv"));
    let manifest_path = args.manifest_path.clone().unwrap_or_else(|| {
        args.root
            .join(format!("build_run_{}.json", utc_compact_string(started_ts)))
    });

    info!(root = %args.root.display(), run_id = %run_id, "starting build");

    let recognizers = Recognizers::new()?;
    let source = page_source_for(args.extraction.backend);
    let options = ExtractionOptions::from(&args.extraction);

    let collected = collect_batches(source.as_ref(), &recognizers, &args.root, &options)?;
    log_diagnostics(&collected.diagnostics);

    if collected.batches.is_empty() {
        bail!("no valid drawing data found under {}", args.root.display());
    }

    let batch_records = into_batch_records(collected.batches);
    let table = build_master_table(&batch_records)?;
    write_table(&table, &output_path)?;
    info!(
        path = %output_path.display(),
        drawings = table.len(),
        batches = batch_records.len(),
        "saved revision summary"
    );

    let manifest = BuildRunManifest {
        manifest_version: 1,
        run_id,
        status: "completed".to_string(),
        started_at,
        updated_at: now_utc_string(),
        command: render_build_command(&args),
        extraction_mode: options.mode.as_str().to_string(),
        text_backend: source.name().to_string(),
        tool_versions: ToolVersions {
            pdftotext: command_version_optional("pdftotext", &["-v"]),
        },
        paths: BuildPaths {
            root: args.root.display().to_string(),
            output_path: output_path.display().to_string(),
            manifest_path: manifest_path.display().to_string(),
        },
        counts: build_counts(&collected.counts, &batch_records, &table),
        batches: collected.summaries,
        diagnostics: collected.diagnostics,
        notes: vec![
            "Revision codes are paired with drawing numbers sharing a text block; multi-drawing blocks share codes."
                .to_string(),
            "X marks a revision not found on the page or in the file name.".to_string(),
        ],
    };

    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), "wrote build run manifest");

    Ok(())
}

#[derive(Debug, Default)]
pub struct CollectedBatches {
    pub batches: BTreeMap<String, Batch>,
    pub summaries: Vec<BatchSummary>,
    pub diagnostics: Vec<Diagnostic>,
    pub counts: BuildCounts,
}

/// Runs every dated folder directly under `root`. Folders sharing a date
/// merge into one batch, earlier folders (by name) winning per drawing.
pub fn collect_batches(
    source: &dyn PageSource,
    recognizers: &Recognizers,
    root: &Path,
    options: &ExtractionOptions,
) -> Result<CollectedBatches> {
    if !root.is_dir() {
        bail!("root folder not found: {}", root.display());
    }

    let mut collected = CollectedBatches::default();

    for folder in list_batch_folders(root)? {
        collected.counts.folders_seen += 1;
        let outcome = process_batch_folder(source, recognizers, &folder, options);
        collected.diagnostics.extend(outcome.diagnostics);

        let Some(batch_date) = outcome.batch_date else {
            continue;
        };
        let folder = outcome.folder.display().to_string();

        collected.counts.pdfs_processed += outcome.pdf_count;
        collected.counts.pages_scanned += outcome.page_count;
        collected.counts.records_extracted += outcome.records.len();
        info!(
            batch_date = %batch_date,
            records = outcome.records.len(),
            pdfs = outcome.pdf_count,
            "processed batch"
        );

        collected.summaries.push(BatchSummary {
            folder: folder.clone(),
            batch_date: batch_date.clone(),
            pdf_count: outcome.pdf_count,
            record_count: outcome.records.len(),
        });

        if outcome.records.is_empty() {
            collected.diagnostics.push(Diagnostic::new(
                DiagnosticKind::EmptyBatch,
                folder,
                format!("no ARC0 drawings found for batch {batch_date}"),
            ));
            continue;
        }

        collected
            .batches
            .entry(batch_date.clone())
            .or_insert_with(|| Batch::new(batch_date))
            .extend(outcome.records);
    }

    collected.counts.batches_valid = collected.batches.len();
    Ok(collected)
}

pub fn into_batch_records(batches: BTreeMap<String, Batch>) -> BatchRecords {
    batches
        .into_values()
        .map(|batch| {
            let batch_date = batch.batch_date.clone();
            (batch_date, batch.into_records())
        })
        .collect()
}

fn build_counts(collected: &BuildCounts, batches: &BatchRecords, table: &Table) -> BuildCounts {
    BuildCounts {
        drawings_total: table.len(),
        revision_columns: batches.len() * 2,
        ..collected.clone()
    }
}

fn render_build_command(args: &BuildArgs) -> String {
    let mut command = vec![
        "revtrack".to_string(),
        "build".to_string(),
        "--root".to_string(),
        args.root.display().to_string(),
    ];

    if let Some(path) = &args.output {
        command.push("--output".to_string());
        command.push(path.display().to_string());
    }
    if let Some(path) = &args.manifest_path {
        command.push("--manifest-path".to_string());
        command.push(path.display().to_string());
    }
    command.extend(render_extraction_flags(&args.extraction));

    command.join(" ")
}

fn render_extraction_flags(args: &ExtractionArgs) -> Vec<String> {
    let mut flags = vec![
        "--mode".to_string(),
        args.mode.as_str().to_string(),
        "--backend".to_string(),
        args.backend.as_str().to_string(),
    ];

    if let Some(max_pages) = args.max_pages_per_doc {
        flags.push("--max-pages-per-doc".to_string());
        flags.push(max_pages.to_string());
    }
    if args.no_sort_files {
        flags.push("--no-sort-files".to_string());
    }

    flags
}
