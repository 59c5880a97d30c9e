//! Marks sheet ingest and validation.
//!
//! This module turns a marks sheet (CSV or spreadsheet workbook) into a
//! `Roster`: the original table (kept verbatim so it can be written back with
//! a `Grade` column) plus the parsed score of each row.
//!
//! Design goals:
//! - **Strict schema**: a missing `Marks` column fails the whole load
//! - **Row-level validation**: unusable marks are reported, not fatal
//! - **Every row survives**: a row the reader cannot parse is kept ungraded
//! - **Separation of concerns**: no grading logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use tracing::{info, warn};

use crate::domain::ScoreRange;
use crate::error::AppError;

/// Required score column.
pub const MARKS_COLUMN: &str = "marks";
/// Optional identifying columns shown in roster listings.
pub const ID_COLUMNS: [&str; 3] = ["sno", "roll no", "name"];

/// On-disk layout of a marks sheet, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Csv,
    /// Anything calamine opens: `.xlsx`, `.xlsm`, `.xls`, `.ods`.
    Workbook,
}

impl SheetFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" | "xlsm" | "xls" | "ods" => Some(Self::Workbook),
            _ => None,
        }
    }

    /// Extension used when writing this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Workbook => "xlsx",
        }
    }
}

/// A row-level problem encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RosterRow {
    /// 1-based line number in the source file (header is line 1).
    pub line: usize,
    pub fields: Vec<String>,
    /// Parsed marks, `None` when the cell was rejected.
    pub marks: Option<f64>,
}

/// Ingest output: the original table plus parsed marks and row errors.
#[derive(Debug, Clone, PartialEq)]
pub struct Roster {
    pub headers: Vec<String>,
    pub rows: Vec<RosterRow>,
    pub marks_column: usize,
    pub row_errors: Vec<RowError>,
    header_map: HashMap<String, usize>,
}

impl Roster {
    /// Build a two-column roster (`SNo`, `Marks`) from bare scores.
    pub fn from_scores(scores: &[f64]) -> Self {
        let headers = vec!["SNo".to_string(), "Marks".to_string()];
        let header_map = build_header_map(headers.iter().map(String::as_str));
        let rows = scores
            .iter()
            .enumerate()
            .map(|(i, &s)| RosterRow {
                line: i + 2,
                fields: vec![(i + 1).to_string(), format!("{s:.2}")],
                marks: Some(s),
            })
            .collect();
        Self {
            headers,
            rows,
            marks_column: 1,
            row_errors: Vec::new(),
            header_map,
        }
    }

    /// Valid scores, in row order.
    pub fn scores(&self) -> Vec<f64> {
        self.rows.iter().filter_map(|r| r.marks).collect()
    }

    pub fn rows_read(&self) -> usize {
        self.rows.len()
    }

    pub fn rows_used(&self) -> usize {
        self.rows.iter().filter(|r| r.marks.is_some()).count()
    }

    /// Column index by case-insensitive name.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.header_map.get(&normalize_header_name(name)).copied()
    }

    /// Cell value of `row` in column `name`, if both exist and it is non-empty.
    pub fn field<'a>(&self, row: &'a RosterRow, name: &str) -> Option<&'a str> {
        let idx = self.column(name)?;
        row.fields.get(idx).map(String::as_str).filter(|s| !s.is_empty())
    }

    /// Identifying columns present in this roster, in display order.
    pub fn id_columns(&self) -> Vec<(usize, &str)> {
        ID_COLUMNS
            .iter()
            .filter_map(|name| self.column(name).map(|idx| (idx, self.headers[idx].as_str())))
            .collect()
    }

    /// Rows ordered by marks, high to low; rejected rows last.
    pub fn sorted_by_marks(&self) -> Vec<&RosterRow> {
        let mut rows: Vec<&RosterRow> = self.rows.iter().collect();
        rows.sort_by(|a, b| match (a.marks, b.marks) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.line.cmp(&b.line),
        });
        rows
    }
}

/// Load a roster from a CSV file or the first worksheet of a workbook.
pub fn load_roster(path: &Path, range: ScoreRange) -> Result<Roster, AppError> {
    let roster = match sheet_format(path)? {
        SheetFormat::Csv => {
            let file = File::open(path)
                .map_err(|e| AppError::file_io(format!("Failed to open CSV '{}': {e}", path.display())))?;
            read_roster(file, range)?
        }
        SheetFormat::Workbook => read_workbook(path, range)?,
    };
    info!(
        path = %path.display(),
        rows_read = roster.rows_read(),
        rows_used = roster.rows_used(),
        row_errors = roster.row_errors.len(),
        "roster loaded"
    );
    Ok(roster)
}

/// Header row of a sheet, without reading its body.
pub fn sheet_headers(path: &Path) -> Result<Vec<String>, AppError> {
    match sheet_format(path)? {
        SheetFormat::Csv => {
            let file = File::open(path)
                .map_err(|e| AppError::file_io(format!("Failed to open CSV '{}': {e}", path.display())))?;
            let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);
            let headers = reader
                .byte_headers()
                .map_err(|e| AppError::file_io(format!("Failed to read CSV headers: {e}")))?;
            Ok(headers.iter().map(decode_field).collect())
        }
        SheetFormat::Workbook => {
            let sheet = first_worksheet(path)?;
            Ok(sheet.rows().next().map(|row| row.iter().map(cell_text).collect()).unwrap_or_default())
        }
    }
}

/// Whether `headers` carry the required marks column.
pub fn has_marks_column(headers: &[String]) -> bool {
    headers.iter().any(|h| normalize_header_name(h) == MARKS_COLUMN)
}

fn sheet_format(path: &Path) -> Result<SheetFormat, AppError> {
    SheetFormat::from_path(path).ok_or_else(|| {
        AppError::file_io(format!(
            "Unsupported sheet '{}': expected .csv, .xlsx, .xlsm, .xls or .ods.",
            path.display()
        ))
    })
}

/// Read a roster from any CSV source.
///
/// Fields are read as bytes and decoded lossily, so a stray non-UTF-8 cell
/// never costs the row its place in the export.
pub fn read_roster<R: Read>(source: R, range: ScoreRange) -> Result<Roster, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers: Vec<String> = reader
        .byte_headers()
        .map_err(|e| AppError::file_io(format!("Failed to read CSV headers: {e}")))?
        .iter()
        .map(decode_field)
        .collect();

    let records = reader.byte_records().enumerate().map(|(idx, result)| {
        // +2: records start after the header, and lines are 1-based.
        let line = idx + 2;
        let fields = result
            .map(|record| record.iter().map(decode_field).collect::<Vec<_>>())
            .map_err(|e| format!("CSV parse error: {e}"));
        (line, fields)
    });
    build_roster(headers, records, range)
}

/// Read a roster from the first worksheet of a workbook.
pub fn read_workbook(path: &Path, range: ScoreRange) -> Result<Roster, AppError> {
    let sheet = first_worksheet(path)?;
    // Line numbers follow the sheet's own rows, which may not start at row 1.
    let first_line = sheet.start().map_or(1, |(row, _)| row as usize + 1);
    let mut rows = sheet.rows();
    let headers: Vec<String> = rows.next().map(|row| row.iter().map(cell_text).collect()).unwrap_or_default();
    let records = rows
        .enumerate()
        .map(|(idx, row)| (first_line + idx + 1, Ok(row.iter().map(cell_text).collect::<Vec<_>>())));
    build_roster(headers, records, range)
}

fn first_worksheet(path: &Path) -> Result<calamine::Range<Data>, AppError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| AppError::file_io(format!("Failed to open workbook '{}': {e}", path.display())))?;
    workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::file_io(format!("Workbook '{}' has no worksheets.", path.display())))?
        .map_err(|e| AppError::file_io(format!("Failed to read workbook '{}': {e}", path.display())))
}

fn build_roster(
    headers: Vec<String>,
    records: impl Iterator<Item = (usize, Result<Vec<String>, String>)>,
    range: ScoreRange,
) -> Result<Roster, AppError> {
    let header_map = build_header_map(headers.iter().map(String::as_str));
    let marks_column = *header_map
        .get(MARKS_COLUMN)
        .ok_or_else(|| AppError::missing_column("The input file must contain a 'Marks' column."))?;

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();

    for (line, result) in records {
        let (fields, marks) = match result {
            Ok(fields) => {
                let marks = parse_marks(fields.get(marks_column).map(String::as_str), range);
                (fields, marks)
            }
            Err(message) => (Vec::new(), Err(message)),
        };

        let marks = match marks {
            Ok(v) => Some(v),
            Err(message) => {
                warn!(line, %message, "row rejected");
                row_errors.push(RowError { line, message });
                None
            }
        };

        rows.push(RosterRow { line, fields, marks });
    }

    Ok(Roster {
        headers: headers.iter().map(|h| h.trim_start_matches('\u{feff}').to_string()).collect(),
        rows,
        marks_column,
        row_errors,
        header_map,
    })
}

fn decode_field(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(v) => v.to_string(),
        Data::Int(v) => v.to_string(),
        Data::Bool(v) => v.to_string(),
        other => other.to_string(),
    }
}

fn parse_marks(cell: Option<&str>, range: ScoreRange) -> Result<f64, String> {
    let raw = cell
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "Missing `Marks` value.".to_string())?;
    let v = raw
        .parse::<f64>()
        .map_err(|_| format!("Invalid `Marks` value '{raw}'."))?;
    if !v.is_finite() {
        return Err(format!("Non-finite `Marks` value '{raw}'."));
    }
    if !range.contains(v) {
        return Err(format!(
            "`Marks` value {v} outside the score range [{}, {}].",
            range.min, range.max
        ));
    }
    Ok(v)
}

fn build_header_map<'a>(headers: impl Iterator<Item = &'a str>) -> HashMap<String, usize> {
    headers
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}
