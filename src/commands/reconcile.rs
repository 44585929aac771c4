use anyhow::Result;
use tracing::{info, warn};

use crate::cli::ReconcileArgs;
use crate::table::{read_table, reconcile_into, write_table};

pub fn run(args: ReconcileArgs) -> Result<()> {
    info!(
        master = %args.master.display(),
        summary = %args.summary.display(),
        key_column = %args.key_column,
        "starting reconcile"
    );

    let mut master = read_table(&args.master)?;
    let summary = read_table(&args.summary)?;
    if summary.is_empty() {
        warn!(path = %args.summary.display(), "summary table has no rows");
    }

    let report = reconcile_into(&mut master, &summary, &args.key_column)?;
    if report.revision_columns == 0 {
        warn!("no revision columns shared by master and summary tables");
    }
    if !report.ignored_keys.is_empty() {
        info!(
            count = report.ignored_keys.len(),
            first = %report.ignored_keys[0],
            "summary drawings absent from master were ignored"
        );
    }

    write_table(&master, &args.output)?;

    info!(
        matched = report.matched_keys,
        rows_updated = report.rows_updated,
        cells_written = report.cells_written,
        path = %args.output.display(),
        "updated master table saved"
    );

    Ok(())
}
