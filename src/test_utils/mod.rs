//! Scripted in-memory driver and helpers for tests and benchmarks.

mod mock;
mod test_helpers;

pub use mock::{ExecutedCommand, MockDriver, MockResponse, MockStats};
pub use test_helpers::{create_test_row, init_tracing, int_set};
