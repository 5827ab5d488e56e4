//! Result table export
//!
//! Writes one row per spot under a fixed header row. The destination
//! extension selects the encoding:
//!
//! | Extension | Encoding |
//! |-----------|----------|
//! | `.csv`    | comma-separated rows |
//! | `.tsv`    | tab-separated rows |
//! | `.json`   | array of row objects |
//! | `.xlsx`   | one worksheet |
//!
//! Every encoding carries the same columns and rows. Export never mutates
//! the table.

use log::info;
use rust_xlsxwriter::{Format, Workbook};
use serde_json::{Map, Value};
use std::path::Path;

use crate::error::{AnalysisError, Result};
use crate::table::{ResultTable, Spot};

/// Column set written to the export file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportLayout {
    /// Spot, lane, Rf, area, saturation, relative concentration
    #[default]
    Summary,
    /// Summary columns followed by position, shape and full color features
    Full,
}

/// Physical encoding chosen from the destination extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Tsv,
    Json,
    Xlsx,
}

impl ExportFormat {
    /// Select the encoding for a destination path
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFormat` for a missing or unknown extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "tsv" => Ok(ExportFormat::Tsv),
            "json" => Ok(ExportFormat::Json),
            "xlsx" => Ok(ExportFormat::Xlsx),
            _ => Err(AnalysisError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            }),
        }
    }
}

const SUMMARY_COLUMNS: [&str; 6] = [
    "Spot",
    "Lane",
    "Rf",
    "Area",
    "Saturation",
    "Relative Concentration",
];

const FULL_EXTRA_COLUMNS: [&str; 10] = [
    "X",
    "Y",
    "Pixel Size",
    "Pixel Area",
    "Circularity",
    "Hue",
    "Value",
    "Red",
    "Green",
    "Blue",
];

/// One exported value
#[derive(Debug, Clone, Copy, PartialEq)]
enum Cell {
    Int(u64),
    /// Value and number of decimals kept
    Float(f64, i32),
    Empty,
}

impl Cell {
    fn optional_int(value: Option<usize>) -> Self {
        value.map_or(Cell::Empty, |v| Cell::Int(v as u64))
    }

    fn optional_float(value: Option<f64>, decimals: i32) -> Self {
        value.map_or(Cell::Empty, |v| Cell::Float(v, decimals))
    }

    fn rounded(value: f64, decimals: i32) -> f64 {
        let scale = 10f64.powi(decimals);
        (value * scale).round() / scale
    }

    fn to_text(self) -> String {
        match self {
            Cell::Int(v) => v.to_string(),
            Cell::Float(v, decimals) => format!("{:.*}", decimals as usize, v),
            Cell::Empty => String::new(),
        }
    }

    fn to_json(self) -> Value {
        match self {
            Cell::Int(v) => Value::from(v),
            Cell::Float(v, decimals) => serde_json::Number::from_f64(Self::rounded(v, decimals))
                .map_or(Value::Null, Value::Number),
            Cell::Empty => Value::Null,
        }
    }
}

impl ExportLayout {
    /// Header row for this layout
    pub fn columns(self) -> Vec<&'static str> {
        let mut columns = SUMMARY_COLUMNS.to_vec();
        if self == ExportLayout::Full {
            columns.extend_from_slice(&FULL_EXTRA_COLUMNS);
        }
        columns
    }

    fn row(self, spot: &Spot) -> Vec<Cell> {
        let mut row = vec![
            Cell::Int(spot.number as u64),
            Cell::optional_int(spot.lane),
            Cell::optional_float(spot.rf, 4),
            Cell::Float(spot.area, 2),
            Cell::Int(u64::from(spot.saturation())),
            Cell::optional_float(spot.rel_conc, 4),
        ];
        if self == ExportLayout::Full {
            let [red, green, blue] = spot.color.rgb;
            row.extend([
                Cell::Float(spot.x, 2),
                Cell::Float(spot.y, 2),
                Cell::Float(spot.size, 2),
                Cell::Int(spot.pixel_area as u64),
                Cell::Float(spot.circularity, 4),
                Cell::Int(u64::from(spot.hue())),
                Cell::Int(u64::from(spot.value())),
                Cell::Int(u64::from(red)),
                Cell::Int(u64::from(green)),
                Cell::Int(u64::from(blue)),
            ]);
        }
        row
    }
}

/// Export the summary columns to `path`
pub fn export(table: &ResultTable, path: &Path) -> Result<()> {
    export_with_layout(table, path, ExportLayout::Summary)
}

/// Export the table to `path` using the given column layout
///
/// An empty table produces a file holding only the header row.
pub fn export_with_layout(table: &ResultTable, path: &Path, layout: ExportLayout) -> Result<()> {
    let format = ExportFormat::from_path(path)?;
    let columns = layout.columns();
    let rows: Vec<Vec<Cell>> = table.iter().map(|spot| layout.row(spot)).collect();

    match format {
        ExportFormat::Csv => write_delimited(path, b',', &columns, &rows)?,
        ExportFormat::Tsv => write_delimited(path, b'\t', &columns, &rows)?,
        ExportFormat::Json => write_json(path, &columns, &rows)?,
        ExportFormat::Xlsx => write_xlsx(path, &columns, &rows)?,
    }

    info!(
        "Exported {} spot(s) to {} ({:?}, {:?})",
        rows.len(),
        path.display(),
        format,
        layout
    );
    Ok(())
}

fn write_delimited(path: &Path, delimiter: u8, columns: &[&str], rows: &[Vec<Cell>]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .map_err(|e| AnalysisError::export(format!("Cannot create {}", path.display()), e))?;

    writer
        .write_record(columns)
        .map_err(|e| AnalysisError::export("Failed to write header row", e))?;
    for row in rows {
        writer
            .write_record(row.iter().map(|cell| cell.to_text()))
            .map_err(|e| AnalysisError::export("Failed to write spot row", e))?;
    }
    writer.flush()?;
    Ok(())
}

fn write_json(path: &Path, columns: &[&str], rows: &[Vec<Cell>]) -> Result<()> {
    let records: Vec<Value> = rows
        .iter()
        .map(|row| {
            let object: Map<String, Value> = columns
                .iter()
                .zip(row)
                .map(|(name, cell)| (name.to_string(), cell.to_json()))
                .collect();
            Value::Object(object)
        })
        .collect();

    let json = serde_json::to_string_pretty(&records)
        .map_err(|e| AnalysisError::export("Failed to serialize rows", e))?;
    std::fs::write(path, json)?;
    Ok(())
}

fn write_xlsx(path: &Path, columns: &[&str], rows: &[Vec<Cell>]) -> Result<()> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name("Spots")
        .map_err(|e| AnalysisError::export("Failed to name worksheet", e))?;

    for (col, name) in columns.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *name, &header)
            .map_err(|e| AnalysisError::export("Failed to write header row", e))?;
    }

    for (r, row) in rows.iter().enumerate() {
        let sheet_row = r as u32 + 1;
        for (c, cell) in row.iter().enumerate() {
            let col = c as u16;
            let written = match *cell {
                Cell::Int(v) => worksheet.write_number(sheet_row, col, v as f64).map(|_| ()),
                Cell::Float(v, decimals) => worksheet
                    .write_number(sheet_row, col, Cell::rounded(v, decimals))
                    .map(|_| ()),
                Cell::Empty => Ok(()),
            };
            written.map_err(|e| AnalysisError::export("Failed to write spot row", e))?;
        }
    }

    workbook
        .save(path)
        .map_err(|e| AnalysisError::export(format!("Cannot save {}", path.display()), e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lanes::assign_lanes;
    use crate::quantify::quantify;
    use crate::table::test_support::table_with;
    use std::path::PathBuf;

    fn quantified_table() -> ResultTable {
        let mut table = table_with(300, 100, &[(250.0, 10.0), (20.0, 50.0)]);
        assign_lanes(&mut table, 300, 3).unwrap();
        quantify(&mut table, 100).unwrap();
        table
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ExportFormat::from_path(Path::new("a.CSV")).unwrap(),
            ExportFormat::Csv
        );
        assert_eq!(
            ExportFormat::from_path(Path::new("a.tsv")).unwrap(),
            ExportFormat::Tsv
        );
        assert_eq!(
            ExportFormat::from_path(Path::new("a.xlsx")).unwrap(),
            ExportFormat::Xlsx
        );
        for bad in ["a.pdf", "a", "a.xls"] {
            assert!(matches!(
                ExportFormat::from_path(Path::new(bad)),
                Err(AnalysisError::UnsupportedFormat { .. })
            ));
        }
    }

    #[test]
    fn test_unsupported_format_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path: PathBuf = dir.path().join("spots.pdf");
        assert!(export(&quantified_table(), &path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_csv_summary_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spots.csv");
        export(&quantified_table(), &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "Spot,Lane,Rf,Area,Saturation,Relative Concentration"
        );
        assert_eq!(lines[1], "1,3,0.9000,314.16,200,0.7843");
        assert_eq!(lines[2], "2,1,0.5000,314.16,200,0.7843");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_tsv_full_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spots.tsv");
        export_with_layout(&quantified_table(), &path, ExportLayout::Full).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let header: Vec<&str> = text.lines().next().unwrap().split('\t').collect();
        assert_eq!(header.len(), 16);
        assert_eq!(header[6], "X");
        assert_eq!(header[15], "Blue");
    }

    #[test]
    fn test_unquantified_fields_are_blank() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.csv");
        export(&table_with(100, 100, &[(5.0, 5.0)]), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().nth(1).unwrap(), "1,,,314.16,200,");
    }

    #[test]
    fn test_json_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spots.json");
        export(&quantified_table(), &path).unwrap();

        let value: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Spot"], 1);
        assert_eq!(rows[0]["Lane"], 3);
        assert_eq!(rows[1]["Rf"], 0.5);
    }

    #[test]
    fn test_empty_table_exports_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        export(&table_with(10, 10, &[]), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_xlsx_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spots.xlsx");
        export(&quantified_table(), &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        // xlsx files are zip containers
        assert_eq!(&bytes[..2], b"PK");
    }
}
