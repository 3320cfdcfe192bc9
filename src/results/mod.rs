//! Rows, result sets and the typed envelopes commands return.

mod cursor;
mod envelope;
mod from_row;
mod result_set;
mod row;
mod slots;

pub use cursor::{BufferedCursor, ResultCursor};
pub use envelope::{CommandResult, DynamicSetsResult, RowListResult, RowResult, ScalarResult};
pub use from_row::{FromDbRow, FromDbValue, column, named_column};
pub use result_set::ResultSet;
pub use row::DbRow;
pub use slots::{ResultSlot, ResultSlots};
