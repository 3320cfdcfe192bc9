//! Helper utilities for testing and development.

use std::sync::{Arc, Once};

use tracing_subscriber::EnvFilter;

use crate::results::{DbRow, ResultSet};
use crate::types::DbValue;

/// Create a test row with the given column names and values.
#[must_use]
pub fn create_test_row(column_names: Vec<String>, values: Vec<DbValue>) -> DbRow {
    DbRow::new(Arc::new(column_names), values)
}

/// Single `n` column result set of 64-bit integers.
#[must_use]
pub fn int_set(values: &[i64]) -> ResultSet {
    ResultSet::from_column("n", values.iter().copied())
}

/// Route `tracing` output to the test writer, filtered by `RUST_LOG` (crate at `trace` by
/// default). Safe to call from every test.
pub fn init_tracing() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let mut filter = EnvFilter::from_default_env();
        if let Ok(directive) = "sql_command=trace".parse() {
            filter = filter.add_directive(directive);
        }
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .finish();

        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
