use crate::error::SqlCommandError;
use crate::params::ParameterList;

use super::from_row::FromDbValue;
use super::row::DbRow;

/// Everything a command produced: the decoded payload plus the values the server wrote back.
///
/// `return_value` and `output_parameters` are filled the same way whatever shape `data` has.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandResult<T> {
    pub data: T,
    /// Procedure status code; `0` when none was requested or the driver reported none
    pub return_value: i32,
    /// Out and InOut parameters with their final values
    pub output_parameters: ParameterList,
    /// Rows affected, for non-query calls
    pub rows_affected: Option<u64>,
}

/// First column of the first row, if any.
pub type ScalarResult<T> = CommandResult<Option<T>>;
/// Zero or one row.
pub type RowResult<T> = CommandResult<Option<T>>;
pub type RowListResult<T> = CommandResult<Vec<T>>;
/// Every result set the command produced, as untyped rows.
pub type DynamicSetsResult = CommandResult<Vec<Vec<DbRow>>>;

impl<T> CommandResult<T> {
    /// Decoded value of an output parameter.
    ///
    /// # Errors
    /// Binding errors for an unknown name; `Conversion` if the value does not fit `V`.
    pub fn output<V: FromDbValue>(&self, name: &str) -> Result<V, SqlCommandError> {
        V::from_db_value(self.output_parameters.value(name)?)
    }

    pub fn into_data(self) -> T {
        self.data
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> CommandResult<U> {
        CommandResult {
            data: f(self.data),
            return_value: self.return_value,
            output_parameters: self.output_parameters,
            rows_affected: self.rows_affected,
        }
    }
}
