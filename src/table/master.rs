use std::collections::{BTreeMap, BTreeSet, HashMap};

use anyhow::{Result, bail};

use crate::extract::patterns::parse_batch_date;
use crate::model::{Batch, DrawingRecord};
use crate::table::Table;

pub const KEY_COLUMN: &str = "NUMBER";
pub const C_REVISION_COLUMN: &str = "C Revision";
pub const P_REVISION_COLUMN: &str = "P Revision";

/// Extracted records per normalized batch date (`YYYY/MM/DD`).
pub type BatchRecords = BTreeMap<String, Vec<DrawingRecord>>;

pub fn revision_column_name(batch_date: &str, revision_column: &str) -> String {
    format!("{batch_date} | {revision_column}")
}

/// Builds the wide master table: one row per drawing number ever seen
/// (sorted), one C/P column pair per batch in calendar order. Drawings
/// missing from a batch keep blank cells for it.
pub fn build_master_table(batches: &BatchRecords) -> Result<Table> {
    let mut dated = Vec::with_capacity(batches.len());
    for (batch_date, records) in batches {
        let Some(date) = parse_batch_date(batch_date) else {
            bail!("batch date is not a YYYY/MM/DD calendar date: {batch_date}");
        };
        dated.push((date, batch_date, records));
    }
    dated.sort_by_key(|(date, _, _)| *date);

    let drawings: BTreeSet<&str> = batches
        .values()
        .flatten()
        .map(|record| record.drawing_number.as_str())
        .collect();

    let mut columns = Vec::with_capacity(1 + dated.len() * 2);
    columns.push(KEY_COLUMN.to_string());
    for (_, batch_date, _) in &dated {
        columns.push(revision_column_name(batch_date, C_REVISION_COLUMN));
        columns.push(revision_column_name(batch_date, P_REVISION_COLUMN));
    }

    let mut table = Table::new(columns);
    let mut row_by_drawing = HashMap::with_capacity(drawings.len());
    for (index, drawing) in drawings.iter().enumerate() {
        row_by_drawing.insert(*drawing, index);
        table.push_row(vec![drawing.to_string()]);
    }

    for (batch_index, (_, batch_date, records)) in dated.iter().enumerate() {
        let c_column = 1 + batch_index * 2;
        let p_column = c_column + 1;

        let mut batch = Batch::new(batch_date.as_str());
        batch.extend(records.iter().cloned());

        for record in batch.records() {
            if let Some(&row) = row_by_drawing.get(record.drawing_number.as_str()) {
                table.set_cell(row, c_column, record.c_revision.as_str());
                table.set_cell(row, p_column, record.p_revision.as_str());
            }
        }
    }

    Ok(table)
}

/// Per-drawing table for a single batch, in extraction order.
pub fn drawing_summary_table(records: &[DrawingRecord]) -> Table {
    let mut table = Table::new(
        [
            "Drawing Number",
            "C Revision",
            "P Revision",
            "C Revision Date",
            "P Revision Date",
            "PDF File",
            "Page",
        ]
        .into_iter()
        .map(str::to_string)
        .collect(),
    );

    for record in records {
        table.push_row(vec![
            record.drawing_number.clone(),
            record.c_revision.clone(),
            record.p_revision.clone(),
            record.c_revision_date.clone(),
            record.p_revision_date.clone(),
            record.source_file.clone(),
            record.source_page.to_string(),
        ]);
    }

    table
}
