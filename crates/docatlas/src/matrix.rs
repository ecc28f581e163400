//! Comparison matrix.
//!
//! A fixed table of attribute rows across a set of subjects, as found in the
//! overview document of the project documentation. Lookups are exact after
//! trimming surrounding whitespace; there is no scoring or aggregation.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::error::{Error, Result};

/// One cell of a comparison row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cell {
    subject: String,
    value: Option<String>,
}

impl Cell {
    /// The subject (column) of this cell.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// The value, or `None` when the cell is explicitly marked absent.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Check if the cell is explicitly marked absent.
    #[must_use]
    pub fn is_absent(&self) -> bool {
        self.value.is_none()
    }
}

/// One attribute's values across all subjects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonRow {
    attribute: String,
    cells: Vec<Cell>,
}

impl ComparisonRow {
    /// Create an empty row for `attribute`.
    #[must_use]
    pub fn new(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into().trim().to_string(),
            cells: Vec::new(),
        }
    }

    /// Add a value for `subject`.
    #[must_use]
    pub fn with_value(self, subject: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_cell(subject, Some(value.into()))
    }

    /// Mark `subject` as explicitly having no value.
    #[must_use]
    pub fn with_absent(self, subject: impl Into<String>) -> Self {
        self.with_cell(subject, None)
    }

    /// Add a cell that may be absent.
    #[must_use]
    pub fn with_cell(mut self, subject: impl Into<String>, value: Option<String>) -> Self {
        self.cells.push(Cell {
            subject: subject.into().trim().to_string(),
            value,
        });
        self
    }

    /// The attribute name.
    #[must_use]
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// The cells in subject order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// The cell for `subject`, if the row has one.
    #[must_use]
    pub fn cell(&self, subject: &str) -> Option<&Cell> {
        let subject = subject.trim();
        self.cells.iter().find(|c| c.subject == subject)
    }

    /// Subject to value pairs, with absent cells as `None`.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> + '_ {
        self.cells.iter().map(|c| (c.subject(), c.value()))
    }

    /// Number of cells explicitly marked absent.
    #[must_use]
    pub fn absent_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_absent()).count()
    }
}

/// Attribute rows across a fixed, ordered set of subjects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComparisonMatrix {
    subjects: Vec<String>,
    rows: Vec<ComparisonRow>,
    #[serde(skip)]
    by_attribute: HashMap<String, usize>,
}

impl ComparisonMatrix {
    /// Create a matrix with the given subject columns and no rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateSubject`] if a subject appears twice.
    pub fn new<I, S>(subjects: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut ordered = Vec::new();
        for subject in subjects {
            let subject = subject.as_ref().trim().to_string();
            if !seen.insert(subject.clone()) {
                return Err(Error::DuplicateSubject { subject });
            }
            ordered.push(subject);
        }
        Ok(Self {
            subjects: ordered,
            ..Self::default()
        })
    }

    /// Append a row.
    ///
    /// The row must hold exactly one cell per matrix subject; its cells are
    /// stored in matrix subject order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateAttribute`] if the attribute already has a
    /// row, or [`Error::InconsistentRow`] if the row's subjects differ from
    /// the matrix subjects.
    pub fn push_row(&mut self, row: ComparisonRow) -> Result<()> {
        if self.by_attribute.contains_key(row.attribute()) {
            return Err(Error::DuplicateAttribute {
                attribute: row.attribute,
            });
        }

        if row.cells.len() != self.subjects.len() {
            return Err(Error::InconsistentRow {
                message: format!(
                    "expected {} subjects, found {}",
                    self.subjects.len(),
                    row.cells.len()
                ),
                attribute: row.attribute,
            });
        }

        let mut cells = Vec::with_capacity(self.subjects.len());
        for subject in &self.subjects {
            match row.cell(subject) {
                Some(cell) => cells.push(cell.clone()),
                None => {
                    return Err(Error::InconsistentRow {
                        message: format!("missing subject '{subject}'"),
                        attribute: row.attribute,
                    });
                }
            }
        }

        self.by_attribute
            .insert(row.attribute.clone(), self.rows.len());
        self.rows.push(ComparisonRow {
            attribute: row.attribute,
            cells,
        });
        Ok(())
    }

    /// The row for `attribute`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AttributeNotFound`] if there is no such row.
    pub fn get_row(&self, attribute: &str) -> Result<&ComparisonRow> {
        let attribute = attribute.trim();
        self.by_attribute
            .get(attribute)
            .map(|&i| &self.rows[i])
            .ok_or_else(|| Error::AttributeNotFound {
                attribute: attribute.to_string(),
            })
    }

    /// The value of `attribute` for `subject`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AttributeNotFound`] or [`Error::SubjectNotFound`] if
    /// the row or column is missing, and [`Error::ValueAbsent`] if the cell
    /// is explicitly marked absent.
    pub fn get_value(&self, attribute: &str, subject: &str) -> Result<&str> {
        let row = self.get_row(attribute)?;
        let cell = row.cell(subject).ok_or_else(|| Error::SubjectNotFound {
            subject: subject.trim().to_string(),
        })?;
        cell.value().ok_or_else(|| Error::ValueAbsent {
            attribute: row.attribute.clone(),
            subject: cell.subject.clone(),
        })
    }

    /// Subject columns in table order.
    #[must_use]
    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }

    /// Check whether `subject` is a column of the matrix.
    #[must_use]
    pub fn has_subject(&self, subject: &str) -> bool {
        let subject = subject.trim();
        self.subjects.iter().any(|s| s == subject)
    }

    /// Attribute names in table order.
    pub fn attributes(&self) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().map(ComparisonRow::attribute)
    }

    /// Rows in table order.
    #[must_use]
    pub fn rows(&self) -> &[ComparisonRow] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the matrix has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
