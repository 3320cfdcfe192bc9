use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::types::DbValue;

/// One row of a result set.
///
/// Column names are shared with every other row of the same set. A `DbRow` is also what
/// untyped and dynamic result sets hand back.
#[derive(Debug, Clone, PartialEq)]
pub struct DbRow {
    pub column_names: Arc<Vec<String>>,
    pub values: Vec<DbValue>,
    #[doc(hidden)]
    pub(crate) column_index_cache: Arc<HashMap<String, usize>>,
}

/// Name to position lookup. With duplicate column names the first one wins.
pub(crate) fn build_index_cache(column_names: &[String]) -> Arc<HashMap<String, usize>> {
    let mut cache = HashMap::with_capacity(column_names.len());
    for (i, name) in column_names.iter().enumerate() {
        cache.entry(name.clone()).or_insert(i);
    }
    Arc::new(cache)
}

impl DbRow {
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, values: Vec<DbValue>) -> Self {
        let column_index_cache = build_index_cache(&column_names);
        Self {
            column_names,
            values,
            column_index_cache,
        }
    }

    pub(crate) fn with_cache(
        column_names: Arc<Vec<String>>,
        values: Vec<DbValue>,
        column_index_cache: Arc<HashMap<String, usize>>,
    ) -> Self {
        Self {
            column_names,
            values,
            column_index_cache,
        }
    }

    #[must_use]
    pub fn get_column_index(&self, column_name: &str) -> Option<usize> {
        self.column_index_cache.get(column_name).copied()
    }

    /// Value of the named column, if the row has it.
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&DbValue> {
        self.get_column_index(column_name)
            .and_then(|idx| self.values.get(idx))
    }

    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&DbValue> {
        self.values.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Column name to value map.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, DbValue> {
        self.column_names
            .iter()
            .cloned()
            .zip(self.values.iter().cloned())
            .collect()
    }

    /// JSON object keyed by column name.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        JsonValue::Object(
            self.column_names
                .iter()
                .zip(self.values.iter())
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect(),
        )
    }
}
