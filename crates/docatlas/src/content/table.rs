//! Comparison table parsing.
//!
//! Reads the first GitHub-style pipe table of an overview document into a
//! [`ComparisonMatrix`]. The first column names the attribute, the other
//! header cells name the subjects.

use std::path::Path;

use tracing::debug;

use super::markdown::prose_lines;
use crate::config::ContentConfig;
use crate::error::{Error, Result};
use crate::matrix::{ComparisonMatrix, ComparisonRow};

/// Split a table line into trimmed cells.
///
/// Leading and trailing pipes are optional; `\|` is a literal pipe inside a
/// cell.
fn split_cells(line: &str) -> Vec<String> {
    let line = line.trim();
    let line = line.strip_prefix('|').unwrap_or(line);
    let line = match line.strip_suffix('|') {
        Some(inner) if !inner.ends_with('\\') => inner,
        _ => line,
    };

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'|') => {
                current.push('|');
                chars.next();
            }
            '|' => cells.push(std::mem::take(&mut current).trim().to_string()),
            _ => current.push(c),
        }
    }
    cells.push(current.trim().to_string());
    cells
}

fn is_table_line(line: &str) -> bool {
    line.contains('|')
}

/// Check for a delimiter row such as `| --- | :---: |`.
fn is_delimiter_row(line: &str) -> bool {
    if !is_table_line(line) {
        return false;
    }
    split_cells(line).iter().all(|cell| {
        let cell = cell.strip_prefix(':').unwrap_or(cell);
        let cell = cell.strip_suffix(':').unwrap_or(cell);
        !cell.is_empty() && cell.chars().all(|c| c == '-')
    })
}

/// Remove emphasis and code markers wrapping an attribute name.
fn strip_emphasis(text: &str) -> &str {
    let mut text = text.trim();
    for marker in ["**", "__", "*", "_", "`"] {
        if let Some(inner) = text
            .strip_prefix(marker)
            .and_then(|t| t.strip_suffix(marker))
        {
            text = inner.trim();
        }
    }
    text
}

/// Parse the first pipe table of `text` into a comparison matrix.
///
/// # Errors
///
/// Returns [`Error::MalformedTable`] if no table is found (reported at line
/// 0), if the header has no subject column, or if a row does not have one
/// cell per column, names no attribute, or repeats an attribute or subject.
pub fn parse_comparison_table(
    path: &Path,
    text: &str,
    content: &ContentConfig,
) -> Result<ComparisonMatrix> {
    let lines: Vec<(usize, &str)> = prose_lines(text).collect();

    let Some(start) = lines
        .windows(2)
        .position(|w| is_table_line(w[0].1) && is_delimiter_row(w[1].1))
    else {
        return Err(Error::malformed_table(path, 0, "no comparison table found"));
    };

    let (header_line, header) = lines[start];
    let header = split_cells(header);
    if header.len() < 2 {
        return Err(Error::malformed_table(
            path,
            header_line,
            "header needs an attribute column and at least one subject",
        ));
    }

    let (delimiter_line, delimiter) = lines[start + 1];
    let delimiter_len = split_cells(delimiter).len();
    if delimiter_len != header.len() {
        return Err(Error::malformed_table(
            path,
            delimiter_line,
            format!(
                "delimiter row has {delimiter_len} cells, header has {}",
                header.len()
            ),
        ));
    }

    let subjects = &header[1..];
    let mut matrix = ComparisonMatrix::new(subjects)
        .map_err(|e| Error::malformed_table(path, header_line, e.to_string()))?;

    let mut expected_line = delimiter_line + 1;
    for &(line_no, line) in &lines[start + 2..] {
        // A skipped code block or a non-table line ends the table.
        if line_no != expected_line || !is_table_line(line) {
            break;
        }
        expected_line += 1;

        let cells = split_cells(line);
        if cells.len() != header.len() {
            return Err(Error::malformed_table(
                path,
                line_no,
                format!("expected {} cells, found {}", header.len(), cells.len()),
            ));
        }

        let attribute = strip_emphasis(&cells[0]);
        if attribute.is_empty() {
            return Err(Error::malformed_table(path, line_no, "row has no attribute"));
        }

        let row = subjects
            .iter()
            .zip(&cells[1..])
            .fold(ComparisonRow::new(attribute), |row, (subject, cell)| {
                if content.is_absent_marker(cell) {
                    row.with_absent(subject.as_str())
                } else {
                    row.with_value(subject.as_str(), cell.as_str())
                }
            });
        matrix
            .push_row(row)
            .map_err(|e| Error::malformed_table(path, line_no, e.to_string()))?;
    }

    debug!(
        path = %path.display(),
        subjects = matrix.subjects().len(),
        attributes = matrix.len(),
        "parsed comparison table"
    );
    Ok(matrix)
}
