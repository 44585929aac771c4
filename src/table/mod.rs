//! In-memory tables, the master revision table builder and reconciliation
//! against an existing master.

pub mod master;
pub mod reconcile;
pub mod storage;
#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};

pub use master::{BatchRecords, build_master_table, drawing_summary_table};
pub use reconcile::reconcile_into;
pub use storage::{read_table, write_table};

/// Rows of string cells under named columns. Every row has exactly one cell
/// per column; blank cells are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends a row, padding short rows with blanks and dropping cells past
    /// the last column.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.columns.len(), String::new());
        self.rows.push(row);
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn set_cell(&mut self, row: usize, column: usize, value: impl Into<String>) -> bool {
        match self.rows.get_mut(row).and_then(|cells| cells.get_mut(column)) {
            Some(cell) => {
                *cell = value.into();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
