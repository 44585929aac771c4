use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result, bail};
use calamine::{Data, Reader, open_workbook_auto};

use crate::table::Table;
use crate::util::{ensure_parent_directory, write_json_pretty};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Json,
    Spreadsheet,
}

impl TableFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(Self::Spreadsheet),
            _ => bail!("unsupported table format: {}", path.display()),
        }
    }
}

pub fn read_table(path: &Path) -> Result<Table> {
    match TableFormat::from_path(path)? {
        TableFormat::Csv => read_csv_table(path),
        TableFormat::Json => read_json_table(path),
        TableFormat::Spreadsheet => read_spreadsheet_table(path),
    }
}

pub fn write_table(table: &Table, path: &Path) -> Result<()> {
    match TableFormat::from_path(path)? {
        TableFormat::Csv => write_csv_table(table, path),
        TableFormat::Json => write_json_pretty(path, table),
        TableFormat::Spreadsheet => bail!(
            "writing spreadsheet files is not supported, use a .csv or .json path instead of {}",
            path.display()
        ),
    }
}

fn read_csv_table(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open csv file: {}", path.display()))?;

    let columns = reader
        .headers()
        .with_context(|| format!("failed to read csv header: {}", path.display()))?
        .iter()
        .map(|name| name.trim_start_matches('\u{FEFF}').to_string())
        .collect();

    let mut table = Table::new(columns);
    for (index, record) in reader.records().enumerate() {
        let record = record.with_context(|| {
            format!("failed to read csv row {} in {}", index + 1, path.display())
        })?;
        table.push_row(record.iter().map(str::to_string).collect());
    }

    Ok(table)
}

fn write_csv_table(table: &Table, path: &Path) -> Result<()> {
    ensure_parent_directory(path)?;

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create csv file: {}", path.display()))?;
    writer
        .write_record(&table.columns)
        .with_context(|| format!("failed to write csv header: {}", path.display()))?;
    for row in &table.rows {
        writer
            .write_record(row)
            .with_context(|| format!("failed to write csv row: {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to finalize csv file: {}", path.display()))?;

    Ok(())
}

fn read_json_table(path: &Path) -> Result<Table> {
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut table: Table = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse {}", path.display()))?;

    let rows = std::mem::take(&mut table.rows);
    for row in rows {
        table.push_row(row);
    }

    Ok(table)
}

/// First worksheet, first row as the header.
fn read_spreadsheet_table(path: &Path) -> Result<Table> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("failed to open spreadsheet: {}", path.display()))?;
    let range = workbook
        .worksheet_range_at(0)
        .with_context(|| format!("spreadsheet has no worksheets: {}", path.display()))?
        .with_context(|| format!("failed to read first worksheet: {}", path.display()))?;

    let mut rows = range.rows();
    let columns = rows
        .next()
        .map(|header| header.iter().map(cell_to_string).collect())
        .unwrap_or_default();

    let mut table = Table::new(columns);
    for row in rows {
        table.push_row(row.iter().map(cell_to_string).collect());
    }

    Ok(table)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(value) => value.clone(),
        Data::Int(value) => value.to_string(),
        Data::Float(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
            format!("{value:.0}")
        }
        Data::Float(value) => value.to_string(),
        Data::Bool(value) => value.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_to_string_drops_trailing_zero_fraction() {
        assert_eq!(cell_to_string(&Data::Float(12.0)), "12");
        assert_eq!(cell_to_string(&Data::Float(1.5)), "1.5");
        assert_eq!(cell_to_string(&Data::Int(7)), "7");
    }

    #[test]
    fn cell_to_string_renders_text_and_blank_cells() {
        assert_eq!(cell_to_string(&Data::Empty), "");
        assert_eq!(
            cell_to_string(&Data::String("1000_SOC-A1-ARC0-00001".to_string())),
            "1000_SOC-A1-ARC0-00001"
        );
        assert_eq!(cell_to_string(&Data::Bool(true)), "true");
    }

    #[test]
    fn table_format_detects_spreadsheet_extensions() {
        assert_eq!(
            TableFormat::from_path(Path::new("Master.XLSX")).expect("format should resolve"),
            TableFormat::Spreadsheet
        );
        assert_eq!(
            TableFormat::from_path(Path::new("master.ods")).expect("format should resolve"),
            TableFormat::Spreadsheet
        );
        assert!(TableFormat::from_path(Path::new("master.txt")).is_err());
    }

    #[test]
    fn read_spreadsheet_table_reports_missing_workbook() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let result = read_table(&dir.path().join("missing.xlsx"));
        assert!(result.is_err());
    }
}
