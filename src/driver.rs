//! The seam between the core and a concrete database client.
//!
//! A driver owns one physical connection. The core decides when it is opened and closed and
//! which transaction a command runs in; the driver only performs the I/O.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::DriverError;
use crate::params::ParameterList;
use crate::results::{ResultCursor, ResultSet};
use crate::types::{CommandKind, DbValue};

/// Opaque handle for a transaction started by [`Driver::begin_transaction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionToken(pub u64);

/// What the driver is asked to run.
#[derive(Debug, Clone, Copy)]
pub struct DriverCommand<'a> {
    pub text: &'a str,
    pub kind: CommandKind,
    /// Transaction the command must enlist in, if one is active
    pub transaction: Option<TransactionToken>,
    /// Timeout the core applies around this call; drivers may also forward it to the server
    pub timeout: Option<Duration>,
}

/// Physical connection and command primitives a backend provides.
///
/// Parameters are passed as a mutable list: before returning, the driver writes the final
/// values of every Out, InOut and ReturnValue parameter back with
/// [`ParameterList::set_value`], in whatever native representation it received.
#[async_trait]
pub trait Driver: Send {
    async fn open(&mut self) -> Result<(), DriverError>;

    fn is_open(&self) -> bool;

    async fn close(&mut self) -> Result<(), DriverError>;

    /// Release everything the driver holds. Called once, when the session is disposed.
    async fn dispose(&mut self) -> Result<(), DriverError>;

    async fn begin_transaction(&mut self) -> Result<TransactionToken, DriverError>;

    async fn commit(&mut self, transaction: TransactionToken) -> Result<(), DriverError>;

    async fn rollback(&mut self, transaction: TransactionToken) -> Result<(), DriverError>;

    /// Drop the transaction object. For a transaction that was neither committed nor rolled
    /// back, what happens to its work is up to the driver.
    async fn dispose_transaction(&mut self, transaction: TransactionToken)
    -> Result<(), DriverError>;

    /// Run a statement and report the number of affected rows.
    async fn execute(
        &mut self,
        command: &DriverCommand<'_>,
        params: &mut ParameterList,
    ) -> Result<u64, DriverError>;

    /// Run a query and return its rows.
    async fn query(
        &mut self,
        command: &DriverCommand<'_>,
        params: &mut ParameterList,
    ) -> Result<ResultSet, DriverError>;

    /// Run a command producing several result sets, to be read in order.
    async fn query_multiple(
        &mut self,
        command: &DriverCommand<'_>,
        params: &mut ParameterList,
    ) -> Result<Box<dyn ResultCursor>, DriverError>;

    /// Run a query and return the first column of the first row.
    async fn execute_scalar(
        &mut self,
        command: &DriverCommand<'_>,
        params: &mut ParameterList,
    ) -> Result<DbValue, DriverError> {
        let rs = self.query(command, params).await?;
        Ok(rs
            .results
            .first()
            .and_then(|row| row.get_by_index(0))
            .cloned()
            .unwrap_or(DbValue::Null))
    }

    /// Run a query expected to yield at most one row. Drivers may stop reading after the second
    /// row; the core rejects anything longer than one.
    async fn query_single(
        &mut self,
        command: &DriverCommand<'_>,
        params: &mut ParameterList,
    ) -> Result<ResultSet, DriverError> {
        self.query(command, params).await
    }
}
