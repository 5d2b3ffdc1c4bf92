// In-memory table: one header row plus string cells.
// Rows may be ragged; reads past the end of a row see an empty cell.

use crate::aggregate::AggregateError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Build a table from string literals. Mostly useful in tests.
    pub fn from_rows(headers: &[&str], rows: &[&[&str]]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Find a column by header name.
    ///
    /// Matching is exact after trimming surrounding whitespace on both sides.
    /// Two headers with the same trimmed name make the lookup ambiguous.
    pub fn column_index(&self, name: &str) -> Result<Option<usize>, AggregateError> {
        let needle = name.trim();
        let mut found: Option<usize> = None;
        for (i, header) in self.headers.iter().enumerate() {
            if header.trim() != needle {
                continue;
            }
            if found.is_some() {
                return Err(AggregateError::AmbiguousColumn(needle.to_string()));
            }
            found = Some(i);
        }
        Ok(found)
    }

    /// Non-empty header names, trimmed. Used for "available columns" hints.
    pub fn header_names(&self) -> Vec<String> {
        self.headers
            .iter()
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .collect()
    }
}
