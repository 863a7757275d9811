//! Tabular decoder: splits extracted CSV text into rows of fields.
//!
//! The query tool emits plain comma-separated values for the columns the audit queries
//! select (identifiers and API names), so no quoting rules are applied.

use crate::error::QueryError;

/// One decoded row: ordered fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    fields: Vec<String>,
}

impl Row {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    /// Field at `index`, or a decode error naming the row when it is too short.
    pub fn field(&self, index: usize) -> Result<&str, QueryError> {
        self.get(index).ok_or_else(|| QueryError::Decode {
            message: format!("expected at least {} fields, found {}", index + 1, self.len()),
            output: self.fields.join(","),
        })
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Decoded table. Blank lines are dropped; header rows are kept and left to callers,
/// since each stage knows which column title marks its own header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    rows: Vec<Row>,
}

impl Table {
    pub fn decode(text: &str) -> Self {
        let rows = text
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.trim().is_empty())
            .map(|line| Row::new(line.split(',')))
            .collect();
        Self { rows }
    }

    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl IntoIterator for Table {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}
