//! Column-addressable tabular input.
//!
//! [`Table`] is the boundary type between file ingestion and the assignment
//! pipeline: already-parsed rows addressed by column name, in arbitrary row
//! order. The survey's choice columns are discovered dynamically by header
//! text, so rows are kept as plain strings rather than deserialized into a
//! fixed struct.
//!
//! CSV ingestion skips rows whose field count disagrees with the header —
//! malformed rows are a local data-quality anomaly, never fatal.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// Column names under which the four source tables carry their data.
///
/// Defaults match the export headers of the upstream sign-up forms; override
/// individual fields when a season's exports are renamed. The five survey
/// choice columns are not listed here — they are discovered dynamically by
/// header text (ordinal word + category name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Roster: student email address.
    pub roster_email: String,
    /// Roster: student display name.
    pub roster_name: String,
    /// Roster: free-text grade level.
    pub roster_grade: String,
    /// Presenters: presenter email address.
    pub presenter_email: String,
    /// Signups: respondent email address.
    pub signup_email: String,
    /// Presentations: free-text category label.
    pub presentation_category: String,
    /// Presentations: free-text presentation title.
    pub presentation_title: String,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            roster_email: "Email".into(),
            roster_name: "Student name".into(),
            roster_grade: "Grade level".into(),
            presenter_email: "E-mail 1 - Value".into(),
            signup_email: "Email Address".into(),
            presentation_category: "Presentation Category (choose the best fit)".into(),
            presentation_title:
                "Name of your presentation: \"Creative Title: Descriptive Title\"  (15 words max)"
                    .into(),
        }
    }
}

/// An in-memory table with named columns.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Creates an empty table with the given label and column names.
    ///
    /// The label identifies the table in error messages (e.g. `"Roster"`).
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends a row. The row must have exactly one cell per column.
    ///
    /// # Panics
    /// Panics if the cell count disagrees with the column count; rows from
    /// untrusted sources go through [`Table::from_csv_reader`], which skips
    /// such rows instead.
    pub fn push_row(&mut self, row: Vec<String>) {
        assert_eq!(
            row.len(),
            self.columns.len(),
            "row width does not match column count"
        );
        self.rows.push(row);
    }

    /// Reads a table from CSV text.
    ///
    /// The first record is the header. Records with a different field count
    /// are skipped and counted; the skip total is logged at `warn` level.
    pub fn from_csv_reader<R: Read>(name: impl Into<String>, reader: R) -> Result<Self> {
        let name = name.into();
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let columns: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut rows = Vec::new();
        let mut skipped = 0usize;
        for record in csv_reader.records() {
            let record = match record {
                Ok(r) => r,
                Err(_) => {
                    skipped += 1;
                    continue;
                }
            };
            if record.len() != columns.len() {
                skipped += 1;
                continue;
            }
            rows.push(record.iter().map(|f| f.to_string()).collect());
        }

        if skipped > 0 {
            warn!(table = %name, skipped, "skipped malformed csv rows");
        }
        info!(table = %name, rows = rows.len(), columns = columns.len(), "loaded table");

        Ok(Self {
            name,
            columns,
            rows,
        })
    }

    /// Reads a table from a CSV file on disk.
    pub fn from_csv_path(name: impl Into<String>, path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(name, file)
    }

    /// The table's label, used in error messages.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column names in header order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Index of the named column, if present.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Index of the named column, or a schema error naming this table.
    pub fn require_column(&self, column: &str) -> Result<usize> {
        self.column_index(column)
            .ok_or_else(|| Error::schema(&self.name, format!("missing '{column}' column")))
    }

    /// The cell at `(row, column index)`, if the row exists.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(col)).map(String::as_str)
    }

    /// Iterates over rows as slices of cells.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample() -> Table {
        Table::from_csv_reader(
            "Roster",
            Cursor::new("Email,Student name,Grade level\na@x.org,Ann,9\nb@x.org,Bo,12\n"),
        )
        .expect("parse")
    }

    #[test]
    fn test_csv_header_and_rows() {
        let t = sample();
        assert_eq!(t.columns(), &["Email", "Student name", "Grade level"]);
        assert_eq!(t.row_count(), 2);
        assert_eq!(t.cell(0, 1), Some("Ann"));
        assert_eq!(t.cell(1, 2), Some("12"));
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let t = Table::from_csv_reader(
            "Signups",
            Cursor::new("A,B\n1,2\nonly-one-field\n3,4,extra\n5,6\n"),
        )
        .expect("parse");
        assert_eq!(t.row_count(), 2);
        assert_eq!(t.cell(1, 0), Some("5"));
    }

    #[test]
    fn test_require_column_error_names_table() {
        let t = sample();
        assert_eq!(t.require_column("Email").expect("present"), 0);
        let err = t.require_column("Missing").expect_err("absent");
        assert_eq!(err.to_string(), "[Roster] missing 'Missing' column");
    }

    #[test]
    fn test_cell_out_of_range_is_none() {
        let t = sample();
        assert_eq!(t.cell(5, 0), None);
    }

    #[test]
    #[should_panic(expected = "row width")]
    fn test_push_row_width_mismatch_panics() {
        let mut t = Table::new("T", vec!["a".into(), "b".into()]);
        t.push_row(vec!["only".into()]);
    }
}
