use std::collections::HashMap;

use anyhow::{Context, Result};
use indexmap::IndexSet;
use serde::Serialize;

use crate::table::Table;
use crate::table::master::{C_REVISION_COLUMN, P_REVISION_COLUMN};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub revision_columns: usize,
    pub matched_keys: usize,
    pub rows_updated: usize,
    pub cells_written: usize,
    pub ignored_keys: Vec<String>,
}

/// Overwrites the revision columns of `master` from `summary` for every key
/// both tables share. Keys only the summary knows are reported and ignored;
/// no rows are added.
pub fn reconcile_into(
    master: &mut Table,
    summary: &Table,
    key_column: &str,
) -> Result<ReconcileReport> {
    let master_key = master
        .column_index(key_column)
        .with_context(|| format!("master table has no '{key_column}' column"))?;
    let summary_key = summary
        .column_index(key_column)
        .with_context(|| format!("summary table has no '{key_column}' column"))?;

    let revision_columns: Vec<(usize, usize)> = master
        .columns
        .iter()
        .enumerate()
        .filter(|(_, name)| name.contains(C_REVISION_COLUMN) || name.contains(P_REVISION_COLUMN))
        .filter_map(|(index, name)| {
            summary
                .column_index(name)
                .map(|summary_index| (index, summary_index))
        })
        .collect();

    let mut rows_by_key: HashMap<String, Vec<usize>> = HashMap::new();
    for (row, cells) in master.rows.iter().enumerate() {
        if let Some(key) = cells.get(master_key).filter(|key| !key.is_empty()) {
            rows_by_key.entry(key.clone()).or_default().push(row);
        }
    }

    let mut report = ReconcileReport {
        revision_columns: revision_columns.len(),
        ..ReconcileReport::default()
    };
    let mut ignored = IndexSet::new();

    for cells in &summary.rows {
        let Some(key) = cells.get(summary_key).filter(|key| !key.is_empty()) else {
            continue;
        };
        let Some(rows) = rows_by_key.get(key) else {
            ignored.insert(key.clone());
            continue;
        };

        report.matched_keys += 1;
        for &row in rows {
            report.rows_updated += 1;
            for &(master_column, summary_column) in &revision_columns {
                let value = cells.get(summary_column).cloned().unwrap_or_default();
                if master.set_cell(row, master_column, value) {
                    report.cells_written += 1;
                }
            }
        }
    }

    report.ignored_keys = ignored.into_iter().collect();
    Ok(report)
}
