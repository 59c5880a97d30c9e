//! Export the graded roster to CSV or `.xlsx`.
//!
//! The output is the input table unchanged plus a `Grade` column, so it opens
//! cleanly in the same spreadsheet it came from. Grades are computed from the
//! boundary set passed in, never from display state.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use rust_xlsxwriter::{Workbook, XlsxError};
use tracing::info;

use crate::domain::NO_GRADE;
use crate::error::AppError;
use crate::grading::{BoundarySet, assign};
use crate::io::ingest::{Roster, RosterRow, SheetFormat};

pub const GRADE_COLUMN: &str = "Grade";
const WORKSHEET_NAME: &str = "Graded";

/// The table as it will be written: headers plus one entry per roster row.
struct GradedTable<'a> {
    headers: Vec<String>,
    rows: Vec<(&'a RosterRow, Vec<String>)>,
}

fn graded_table<'a>(roster: &'a Roster, boundaries: &BoundarySet, sort_by_marks: bool) -> GradedTable<'a> {
    // An existing grade column is overwritten in place rather than duplicated.
    let existing = roster.column(GRADE_COLUMN);
    let mut headers = roster.headers.clone();
    if existing.is_none() {
        headers.push(GRADE_COLUMN.to_string());
    }

    let ordered: Vec<&RosterRow> = if sort_by_marks {
        roster.sorted_by_marks()
    } else {
        roster.rows.iter().collect()
    };

    let rows = ordered
        .into_iter()
        .map(|row| {
            let grade = row.marks.map_or(NO_GRADE, |m| assign(m, boundaries));
            let mut fields = row.fields.clone();
            match existing {
                Some(idx) => {
                    if fields.len() <= idx {
                        fields.resize(idx + 1, String::new());
                    }
                    fields[idx] = grade.to_string();
                }
                None => {
                    // Short rows are padded so the grade lands under its header.
                    fields.resize(roster.headers.len(), String::new());
                    fields.push(grade.to_string());
                }
            }
            (row, fields)
        })
        .collect();

    GradedTable { headers, rows }
}

/// Write the graded roster to `path`, as `.xlsx` or CSV by extension.
///
/// Paths without a recognised extension are written as CSV.
pub fn write_graded_sheet(
    path: &Path,
    roster: &Roster,
    boundaries: &BoundarySet,
    sort_by_marks: bool,
) -> Result<usize, AppError> {
    match SheetFormat::from_path(path) {
        Some(SheetFormat::Workbook) => write_graded_xlsx(path, roster, boundaries, sort_by_marks),
        _ => write_graded_csv(path, roster, boundaries, sort_by_marks),
    }
}

/// Write the graded roster to `path` as CSV. Returns the number of rows written.
pub fn write_graded_csv(
    path: &Path,
    roster: &Roster,
    boundaries: &BoundarySet,
    sort_by_marks: bool,
) -> Result<usize, AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::file_io(format!("Failed to create output CSV '{}': {e}", path.display())))?;
    let written = write_graded(file, roster, boundaries, sort_by_marks)?;
    info!(path = %path.display(), rows = written, "graded roster written");
    Ok(written)
}

/// Write the graded roster as CSV to any sink.
pub fn write_graded<W: Write>(
    sink: W,
    roster: &Roster,
    boundaries: &BoundarySet,
    sort_by_marks: bool,
) -> Result<usize, AppError> {
    let table = graded_table(roster, boundaries, sort_by_marks);
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(sink);

    writer
        .write_record(&table.headers)
        .map_err(|e| AppError::file_io(format!("Failed to write output CSV header: {e}")))?;
    for (row, fields) in &table.rows {
        writer
            .write_record(fields)
            .map_err(|e| AppError::file_io(format!("Failed to write output CSV row {}: {e}", row.line)))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::file_io(format!("Failed to flush output CSV: {e}")))?;
    Ok(table.rows.len())
}

/// Write the graded roster to `path` as a single-sheet `.xlsx` workbook.
///
/// Accepted marks are written as numbers; every other cell as text.
pub fn write_graded_xlsx(
    path: &Path,
    roster: &Roster,
    boundaries: &BoundarySet,
    sort_by_marks: bool,
) -> Result<usize, AppError> {
    let table = graded_table(roster, boundaries, sort_by_marks);
    let xlsx_err = |e: XlsxError| AppError::file_io(format!("Failed to write workbook '{}': {e}", path.display()));

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(WORKSHEET_NAME).map_err(xlsx_err)?;

    for (col, header) in table.headers.iter().enumerate() {
        sheet.write_string(0, cell_col(col)?, header).map_err(xlsx_err)?;
    }
    for (idx, (row, fields)) in table.rows.iter().enumerate() {
        let line = u32::try_from(idx + 1)
            .map_err(|_| AppError::file_io("Too many rows for an .xlsx worksheet."))?;
        for (col, text) in fields.iter().enumerate() {
            let xcol = cell_col(col)?;
            match row.marks {
                Some(marks) if col == roster.marks_column => sheet.write_number(line, xcol, marks),
                _ if text.is_empty() => continue,
                _ => sheet.write_string(line, xcol, text),
            }
            .map_err(xlsx_err)?;
        }
    }

    workbook.save(path).map_err(xlsx_err)?;
    info!(path = %path.display(), rows = table.rows.len(), "graded workbook written");
    Ok(table.rows.len())
}

fn cell_col(col: usize) -> Result<u16, AppError> {
    u16::try_from(col).map_err(|_| AppError::file_io("Too many columns for an .xlsx worksheet."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ScoreRange, Variant};
    use crate::io::ingest::read_roster;

    fn export(csv: &str, variant: Variant, sort: bool) -> String {
        let roster = read_roster(csv.as_bytes(), ScoreRange::default()).unwrap();
        let set = BoundarySet::with_defaults(variant, ScoreRange::default());
        let mut out = Vec::new();
        write_graded(&mut out, &roster, &set, sort).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn appends_grade_column() {
        let txt = export("Roll No,Name,Marks\nR1,Asha,46\nR2,Ben,99\n", Variant::Nine, false);
        assert_eq!(txt, "Roll No,Name,Marks,Grade\nR1,Asha,46,C\nR2,Ben,99,A\n");
    }

    #[test]
    fn rejected_rows_keep_their_place() {
        let txt = export("Name,Marks\nA,60\nB,oops\nC,49\n", Variant::Four, false);
        assert_eq!(txt, "Name,Marks,Grade\nA,60,C\nB,oops,No Grade\nC,49,F\n");
    }

    #[test]
    fn sorted_export_lists_high_marks_first() {
        let txt = export("Name,Marks\nA,60\nB,90\n", Variant::Four, true);
        assert_eq!(txt, "Name,Marks,Grade\nB,90,A\nA,60,C\n");
    }

    #[test]
    fn rows_with_undecodable_bytes_are_still_written() {
        let roster =
            read_roster(&b"Name,Marks\nAsha,60\nM\xfcller,70\nBen,80\n"[..], ScoreRange::default()).unwrap();
        let set = BoundarySet::with_defaults(Variant::Four, ScoreRange::default());
        let mut out = Vec::new();
        let written = write_graded(&mut out, &roster, &set, false).unwrap();
        assert_eq!(written, 3);
        let txt = String::from_utf8(out).unwrap();
        assert_eq!(txt, "Name,Marks,Grade\nAsha,60,C\nM\u{fffd}ller,70,C\nBen,80,B\n");
    }

    #[test]
    fn xlsx_export_reads_back_with_grades() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graded.xlsx");
        let roster = read_roster("Roll No,Name,Marks\nR1,Asha,46\nR2,Ben,\nR3,Chen,91.5\n".as_bytes(), ScoreRange::default())
            .unwrap();
        let set = BoundarySet::with_defaults(Variant::Four, ScoreRange::default());
        assert_eq!(write_graded_sheet(&path, &roster, &set, true).unwrap(), 3);

        let back = crate::io::ingest::load_roster(&path, ScoreRange::default()).unwrap();
        assert_eq!(back.headers, ["Roll No", "Name", "Marks", "Grade"]);
        assert_eq!(back.scores(), vec![91.5, 46.0]);
        let grades: Vec<_> = back.rows.iter().map(|r| back.field(r, "Grade").unwrap_or("")).collect();
        assert_eq!(grades, ["A", "F", NO_GRADE]);
        assert_eq!(back.field(&back.rows[2], "Roll No"), Some("R2"));
    }

    #[test]
    fn unknown_extension_falls_back_to_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graded.out");
        let roster = read_roster("Name,Marks\nA,60\n".as_bytes(), ScoreRange::default()).unwrap();
        let set = BoundarySet::with_defaults(Variant::Four, ScoreRange::default());
        write_graded_sheet(&path, &roster, &set, false).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Name,Marks,Grade\nA,60,C\n");
    }

    #[test]
    fn existing_grade_column_is_replaced() {
        let txt = export("Name,Marks,Grade\nA,60,?\n", Variant::Four, false);
        assert_eq!(txt, "Name,Marks,Grade\nA,60,C\n");
    }
}
