//! Convenient imports for common functionality.
//!
//! ```rust
//! use sql_command::prelude::*;
//! ```

pub use crate::blocking::BlockingConnector;
pub use crate::command::Command;
pub use crate::decoder::{ParameterStore, ResultDecoder};
pub use crate::driver::{Driver, DriverCommand, TransactionToken};
pub use crate::error::{DriverError, SqlCommandError};
pub use crate::executor::Connector;
pub use crate::lifecycle::LifecycleState;
pub use crate::options::ConnectorOptions;
pub use crate::params::{
    FieldMeta, Parameter, ParameterBinder, ParameterList, ParameterRecord, RecordField,
};
pub use crate::results::{
    BufferedCursor, CommandResult, DbRow, FromDbRow, FromDbValue, ResultCursor, ResultSet,
    ResultSlot, ResultSlots,
};
pub use crate::types::{CommandKind, DbValue, ParameterDirection, SemanticType};

pub use crate::impl_parameter_record;
