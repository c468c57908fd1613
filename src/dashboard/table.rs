//! Tabular view of a collection
//!
//! Identifiers are internal to the store and are not shown.

use serde::Serialize;

use crate::store::{Record, ID_FIELD};

/// Rows per page shown by the table widget
pub const PAGE_SIZE: usize = 10;

/// Rows and the union of their columns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
    pub page_size: usize,
}

impl TableView {
    /// Build a view, dropping `_id` and collecting columns in first-seen order
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        let rows: Vec<Record> = records
            .into_iter()
            .map(|mut record| {
                record.remove(ID_FIELD);
                for key in record.keys() {
                    if !columns.iter().any(|c| c == key) {
                        columns.push(key.clone());
                    }
                }
                record
            })
            .collect();

        Self {
            columns,
            rows,
            page_size: PAGE_SIZE,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
