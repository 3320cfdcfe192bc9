use std::collections::HashMap;
use std::sync::Arc;

use crate::types::DbValue;

use super::row::{DbRow, build_index_cache};

/// One ordered sequence of rows as produced by a single statement. Drivers hand these to the
/// core; typed decoding happens afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub results: Vec<DbRow>,
    /// Shared with every row
    column_names: Option<Arc<Vec<String>>>,
    column_index_cache: Option<Arc<HashMap<String, usize>>>,
}

impl ResultSet {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> ResultSet {
        ResultSet {
            results: Vec::with_capacity(capacity),
            column_names: None,
            column_index_cache: None,
        }
    }

    /// Result set with the given columns and no rows yet.
    #[must_use]
    pub fn with_columns<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> ResultSet {
        let mut rs = ResultSet::default();
        rs.set_column_names(Arc::new(columns.into_iter().map(Into::into).collect()));
        rs
    }

    /// Replace the column names used for rows added from now on.
    pub fn set_column_names(&mut self, column_names: Arc<Vec<String>>) {
        self.column_index_cache = Some(build_index_cache(&column_names));
        self.column_names = Some(column_names);
    }

    #[must_use]
    pub fn get_column_names(&self) -> Option<&Arc<Vec<String>>> {
        self.column_names.as_ref()
    }

    /// Rows added before any column names are set get positional names (`column0`, ...).
    pub fn add_row_values(&mut self, row_values: Vec<DbValue>) {
        if self.column_names.is_none() {
            let names = (0..row_values.len()).map(|i| format!("column{i}")).collect();
            self.set_column_names(Arc::new(names));
        }
        if let (Some(column_names), Some(cache)) = (&self.column_names, &self.column_index_cache) {
            self.results.push(DbRow::with_cache(
                Arc::clone(column_names),
                row_values,
                Arc::clone(cache),
            ));
        }
    }

    /// Builder-style [`ResultSet::add_row_values`].
    #[must_use]
    pub fn row(mut self, row_values: Vec<DbValue>) -> Self {
        self.add_row_values(row_values);
        self
    }

    pub fn add_row(&mut self, row: DbRow) {
        if self.column_names.is_none() {
            self.set_column_names(Arc::clone(&row.column_names));
        }
        self.results.push(row);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Single-column result set, one row per value.
    #[must_use]
    pub fn from_column<V: Into<DbValue>>(
        column: &str,
        values: impl IntoIterator<Item = V>,
    ) -> ResultSet {
        values
            .into_iter()
            .fold(ResultSet::with_columns([column]), |rs, v| rs.row(vec![v.into()]))
    }
}
