//! Find gradeable marks sheets near the working directory.
//!
//! A file qualifies when its extension is a supported sheet format and its
//! header row carries a `Marks` column, so the TUI's open dialog only offers
//! sheets that will actually load.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::io::ingest::{SheetFormat, has_marks_column, sheet_headers};

/// How many directory levels below the root are searched.
pub const SEARCH_DEPTH: usize = 3;

/// Directories never worth descending into.
const SKIP_DIRS: [&str; 4] = [".git", "target", "node_modules", "logs"];

/// Gradeable sheets under the working directory.
pub fn discover_marks_sheets() -> Vec<PathBuf> {
    find_marks_sheets(Path::new("."), SEARCH_DEPTH)
}

/// Gradeable sheets under `root`, at most `max_depth` levels down, sorted by path.
pub fn find_marks_sheets(root: &Path, max_depth: usize) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut pending = vec![(root.to_path_buf(), 0usize)];

    while let Some((dir, depth)) = pending.pop() {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let Ok(kind) = entry.file_type() else {
                continue;
            };
            if kind.is_dir() {
                let hidden_or_noise = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with('.') || SKIP_DIRS.contains(&n));
                if depth < max_depth && !hidden_or_noise {
                    pending.push((path, depth + 1));
                }
            } else if kind.is_file() && is_marks_sheet(&path) {
                found.push(path);
            }
        }
    }

    found.sort();
    found
}

fn is_marks_sheet(path: &Path) -> bool {
    if SheetFormat::from_path(path).is_none() {
        return false;
    }
    match sheet_headers(path) {
        Ok(headers) => has_marks_column(&headers),
        Err(err) => {
            debug!(path = %path.display(), %err, "skipping unreadable sheet");
            false
        }
    }
}

/// `path` relative to the working directory, without the leading `./`.
pub fn display_path(path: &Path) -> String {
    path.strip_prefix(".").unwrap_or(path).display().to_string()
}
