//! Execution core for SQL data access.
//!
//! A [`Connector`] wraps a [`Driver`] and runs [`Command`]s through one algorithm: bind
//! parameters, open the connection if the call needs it, run the driver primitive for the
//! requested shape, close the connection again, read back output parameters and the return
//! value, and decode the payload into the caller's types.
//!
//! ```rust
//! use sql_command::prelude::*;
//!
//! async fn run<D: Driver>(conn: &mut Connector<D>) -> Result<i32, SqlCommandError> {
//!     let mut cmd = Command::procedure("dbo.TouchUser")
//!         .param(Parameter::input("@Id", 42_i32))
//!         .param(Parameter::output("@Touched", SemanticType::DateTime));
//!     let res = conn.execute(&mut cmd).await?;
//!     Ok(res.return_value)
//! }
//! ```

pub mod blocking;
pub mod command;
pub mod decoder;
pub mod driver;
pub mod error;
pub mod executor;
pub mod lifecycle;
pub mod options;
pub mod params;
pub mod prelude;
pub mod results;
pub mod types;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use blocking::BlockingConnector;
pub use command::Command;
pub use decoder::{ParameterStore, ResultDecoder};
pub use driver::{Driver, DriverCommand, TransactionToken};
pub use error::{CommandContext, DriverError, SqlCommandError};
pub use executor::Connector;
pub use lifecycle::{ConnectionSession, LifecycleState};
pub use options::{ConnectorOptions, ConnectorOptionsBuilder};
pub use params::{
    FieldMeta, Parameter, ParameterBinder, ParameterList, ParameterRecord, RecordField,
};
pub use results::{
    BufferedCursor, CommandResult, DbRow, DynamicSetsResult, FromDbRow, FromDbValue, ResultCursor,
    ResultSet, ResultSlot, ResultSlots, RowListResult, RowResult, ScalarResult,
};
pub use types::{CommandKind, DbValue, ParameterDirection, SemanticType};
