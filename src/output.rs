// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Writing of analysis results as whitespace-delimited text tables.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::errors::WriteTableError;

/// Tabular result of an analysis.
///
/// A table consists of a block of `#`-prefixed comment lines (metadata:
/// analysis kind, parameters), a `#`-prefixed column legend, and one
/// whitespace-delimited data row per bin or lag.
#[derive(Debug, Clone, Default)]
pub struct Table {
    comments: Vec<String>,
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl Table {
    /// Create an empty table.
    pub fn new() -> Self {
        Table::default()
    }

    /// Append a metadata comment line.
    pub fn comment(&mut self, text: &str) {
        self.comments.push(text.to_string());
    }

    /// Set the column legend of the table.
    pub fn set_columns(&mut self, names: &[&str]) {
        self.columns = names.iter().map(|n| n.to_string()).collect();
    }

    /// Append a data row.
    ///
    /// ## Panics
    /// Panics if the number of values does not match the column legend.
    pub fn push_row(&mut self, row: Vec<f64>) {
        if !self.columns.is_empty() && row.len() != self.columns.len() {
            panic!(
                "FATAL TRAJAN ERROR | Table::push_row | Row has {} values but the table has {} columns.",
                row.len(),
                self.columns.len()
            );
        }

        self.rows.push(row);
    }

    /// Get the comment lines of the table.
    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    /// Get the number of data rows.
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Get the data rows.
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Write the table to the provided output stream.
    pub fn write(&self, out: &mut dyn Write) -> io::Result<()> {
        for comment in &self.comments {
            writeln!(out, "# {}", comment)?;
        }

        if !self.columns.is_empty() {
            writeln!(out, "# {}", self.columns.join(" "))?;
        }

        for row in &self.rows {
            let formatted: Vec<String> = row.iter().map(|value| format!("{:.6}", value)).collect();
            writeln!(out, "{}", formatted.join(" "))?;
        }

        Ok(())
    }

    /// Write the table to a file.
    ///
    /// ## Returns
    /// `WriteTableError` carrying the attempted path if the file can not be
    /// created or written.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), WriteTableError> {
        let file = File::create(&path)
            .map_err(|_| WriteTableError::CouldNotCreate(Box::from(path.as_ref())))?;
        let mut writer = BufWriter::new(file);

        self.write(&mut writer)
            .and_then(|_| writer.flush())
            .map_err(|_| WriteTableError::CouldNotWrite(Box::from(path.as_ref())))
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/
