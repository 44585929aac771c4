use anyhow::{Result, bail};
use tracing::info;

use crate::cli::ExtractArgs;
use crate::extract::{ExtractionOptions, Recognizers, page_source_for, process_batch_folder};
use crate::table::{drawing_summary_table, write_table};
use crate::util::log_diagnostics;

pub fn run(args: ExtractArgs) -> Result<()> {
    if !args.folder.is_dir() {
        bail!("batch folder not found: {}", args.folder.display());
    }

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| args.folder.join("revision_summary.csv"));

    let recognizers = Recognizers::new()?;
    let source = page_source_for(args.extraction.backend);
    let options = ExtractionOptions::from(&args.extraction);

    info!(
        folder = %args.folder.display(),
        mode = options.mode.as_str(),
        backend = source.name(),
        "starting extract"
    );

    let outcome = process_batch_folder(source.as_ref(), &recognizers, &args.folder, &options);
    log_diagnostics(&outcome.diagnostics);

    let Some(batch_date) = outcome.batch_date else {
        bail!(
            "batch folder name carries no valid date: {}",
            args.folder.display()
        );
    };
    if outcome.records.is_empty() {
        bail!(
            "no ARC0 drawings found in {} ({} PDFs scanned)",
            args.folder.display(),
            outcome.pdf_count
        );
    }

    let table = drawing_summary_table(&outcome.records);
    write_table(&table, &output_path)?;

    info!(
        batch_date = %batch_date,
        records = outcome.records.len(),
        pdfs = outcome.pdf_count,
        path = %output_path.display(),
        "extraction complete"
    );

    Ok(())
}
