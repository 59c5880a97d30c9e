//! Formatted terminal output: the distribution table and roster listings.
//!
//! We keep formatting code in one place so:
//! - the grading code stays clean and testable
//! - output changes are localized (the tests below pin the exact layout)

use crate::domain::NO_GRADE;
use crate::grading::{BoundarySet, DistributionSummary, assign};
use crate::io::ingest::Roster;

/// Format the per-band table with totals and average.
pub fn format_summary_table(summary: &DistributionSummary) -> String {
    let grouped = summary.variant.percentage_groups().is_some();
    let mut out = String::new();

    let header = format!(
        "{:<6} {:<13} {:>8} {:>8} {}",
        "Grade",
        "Range",
        "Students",
        "%age",
        if grouped { "  Grouped" } else { "" }
    );
    out.push_str(header.trim_end());
    out.push('\n');

    let rule = format!(
        "{:-<6} {:-<13} {:-<8} {:-<8} {}",
        "",
        "",
        "",
        "",
        if grouped { "---------" } else { "" }
    );
    out.push_str(rule.trim_end());
    out.push('\n');

    for row in &summary.rows {
        let grouped_cell = match row.grouped_percentage {
            Some(p) if grouped => format!("{:>9}", fmt_pct(p)),
            _ => String::new(),
        };
        let line = format!(
            "{:<6} {:<13} {:>8} {:>8} {}",
            row.label,
            format!("{:.2}-{:.2}", row.lower, row.upper),
            row.count,
            fmt_pct(row.percentage),
            grouped_cell,
        );
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out.push_str(&format!("Total: {}", summary.total));
    if summary.unbanded > 0 {
        out.push_str(&format!(" ({} outside range)", summary.unbanded));
    }
    match summary.average {
        Some(avg) => out.push_str(&format!(" | Average: {avg:.2}\n")),
        None => out.push_str(" | Average: -\n"),
    }

    out
}

/// One line listing every handle as `label: value`.
pub fn format_boundaries(boundaries: &BoundarySet) -> String {
    boundaries
        .variant()
        .handle_labels()
        .iter()
        .zip(boundaries.values())
        .map(|(label, value)| format!("{label}: {value:.2}"))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Format the roster sorted by marks (high to low) with grades.
///
/// Identifying columns (`SNo`, `Roll No`, `Name`) are included when present.
/// `limit` caps the number of rows listed.
pub fn format_roster(roster: &Roster, boundaries: &BoundarySet, limit: Option<usize>) -> String {
    let ids = roster.id_columns();
    let mut out = String::new();

    let mut header = String::new();
    for (_, name) in &ids {
        header.push_str(&format!("{:<16} ", truncate(name, 16)));
    }
    header.push_str(&format!("{:>8} {:<8}", "Marks", "Grade"));
    out.push_str(header.trim_end());
    out.push('\n');

    let rows = roster.sorted_by_marks();
    let shown = limit.unwrap_or(rows.len()).min(rows.len());
    for row in rows.iter().take(shown) {
        let mut line = String::new();
        for (idx, _) in &ids {
            let cell = row.fields.get(*idx).map(String::as_str).unwrap_or("");
            line.push_str(&format!("{:<16} ", truncate(cell, 16)));
        }
        let (marks, grade) = match row.marks {
            Some(m) => (format!("{m:.2}"), assign(m, boundaries)),
            None => ("-".to_string(), NO_GRADE),
        };
        line.push_str(&format!("{marks:>8} {grade:<8}"));
        out.push_str(line.trim_end());
        out.push('\n');
    }

    if shown < rows.len() {
        out.push_str(&format!("... {} more rows\n", rows.len() - shown));
    }
    out
}

/// List ingest row errors, one per line.
pub fn format_row_errors(roster: &Roster) -> String {
    let mut out = String::new();
    for err in &roster.row_errors {
        out.push_str(&format!("line {}: {}\n", err.line, err.message));
    }
    out
}

fn fmt_pct(p: f64) -> String {
    format!("{p:.2}%")
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
