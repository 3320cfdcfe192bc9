//! The connector: runs commands of every shape through one algorithm.
//!
//! Each call binds its parameters, acquires the connection, runs the driver primitive for its
//! shape, releases the connection (even when the driver failed), reads back output parameters
//! and the return value, and only then decodes the payload into the caller's types.

mod dispatch;

use tracing::{debug, warn};

use crate::command::Command;
use crate::driver::Driver;
use crate::error::Result;
use crate::lifecycle::{ConnectionSession, LifecycleState};
use crate::options::ConnectorOptions;
use crate::params::{ParameterBinder, ParameterList};
use crate::results::{
    CommandResult, DynamicSetsResult, FromDbRow, FromDbValue, ResultSlot, ResultSlots,
    RowListResult, RowResult, ScalarResult,
};

use crate::types::DbValue;

use dispatch::{CallShape, RawPayload, collect_outputs, dispatch, prepare};

/// Executes commands against one driver.
///
/// Calls take `&mut self`, so one connector runs one command at a time. Use one connector per
/// logical unit of work.
pub struct Connector<D: Driver> {
    session: ConnectionSession<D>,
    options: ConnectorOptions,
}

impl<D: Driver> std::fmt::Debug for Connector<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connector")
            .field("session", &self.session)
            .field("options", &self.options)
            .finish()
    }
}

struct Completed {
    payload: RawPayload,
    output_parameters: ParameterList,
    return_value: i32,
}

impl Completed {
    fn envelope<T>(self, data: T) -> CommandResult<T> {
        CommandResult {
            data,
            return_value: self.return_value,
            output_parameters: self.output_parameters,
            rows_affected: self.payload.rows_affected,
        }
    }
}

impl<D: Driver> Connector<D> {
    /// Connector with default options. The connection opens on first use.
    pub fn new(driver: D) -> Self {
        Self {
            session: ConnectionSession::new(driver),
            options: ConnectorOptions::default(),
        }
    }

    /// # Errors
    /// `ConfigError` if `options` do not validate.
    pub fn with_options(driver: D, options: ConnectorOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            session: ConnectionSession::new(driver),
            options,
        })
    }

    #[must_use]
    pub fn options(&self) -> &ConnectorOptions {
        &self.options
    }

    /// Binder configured with this connector's parameter prefix.
    #[must_use]
    pub fn binder(&self) -> ParameterBinder {
        self.options.binder()
    }

    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.session.state()
    }

    #[must_use]
    pub fn in_transaction(&self) -> bool {
        self.session.in_transaction()
    }

    #[must_use]
    pub fn driver(&self) -> &D {
        self.session.driver()
    }

    /// Start a transaction; every following call shares its connection until commit or
    /// rollback. A second `begin_transaction` while one is active does nothing.
    ///
    /// # Errors
    /// `Disposed` or `Connection`.
    pub async fn begin_transaction(&mut self) -> Result<()> {
        self.session.begin_transaction().await
    }

    /// # Errors
    /// `Transaction` when no transaction is active, or `Connection`.
    pub async fn commit(&mut self) -> Result<()> {
        self.session.commit().await
    }

    /// # Errors
    /// `Transaction` when no transaction is active, or `Connection`.
    pub async fn rollback(&mut self) -> Result<()> {
        self.session.rollback().await
    }

    /// Close the connection and release the driver. Further calls fail with `Disposed`.
    ///
    /// # Errors
    /// The first error hit while tearing down.
    pub async fn dispose(&mut self) -> Result<()> {
        self.session.dispose().await
    }

    async fn run(&mut self, command: &mut Command, shape: CallShape) -> Result<Completed> {
        let mut call = prepare(command, &self.options)?;
        debug!(command = %call.context, ?shape, "executing command");

        self.session.acquire_for_call().await?;
        let transaction = self.session.active_transaction();
        let outcome = dispatch(self.session.driver_mut(), &mut call, transaction, shape).await;
        let released = self.session.release_for_call().await;

        let payload = match (outcome, released) {
            (Ok(payload), Ok(())) => payload,
            (Ok(_), Err(release_err)) => return Err(release_err),
            (Err(err), Ok(())) => return Err(err),
            (Err(err), Err(release_err)) => {
                warn!(error = %release_err, "releasing connection failed after command error");
                return Err(err);
            }
        };

        let (output_parameters, return_value) = collect_outputs(&call, command)?;
        Ok(Completed {
            payload,
            output_parameters,
            return_value,
        })
    }

    /// Run a statement and report affected rows.
    ///
    /// # Errors
    /// Binding, driver, connection, timeout or decoding errors.
    pub async fn execute(&mut self, command: &mut Command) -> Result<CommandResult<u64>> {
        let done = self.run(command, CallShape::NonQuery).await?;
        let affected = done.payload.rows_affected.unwrap_or_default();
        Ok(done.envelope(affected))
    }

    /// First column of the first row.
    ///
    /// # Errors
    /// As [`Connector::execute`], plus `Conversion` if the value does not fit `T`.
    pub async fn execute_scalar<T: FromDbValue>(
        &mut self,
        command: &mut Command,
    ) -> Result<ScalarResult<T>> {
        let mut done = self.run(command, CallShape::Scalar).await?;
        let raw = done.payload.scalar.take().unwrap_or(DbValue::Null);
        let value = Option::<T>::from_db_value(&raw)?;
        Ok(done.envelope(value))
    }

    /// Zero or one row.
    ///
    /// # Errors
    /// `MultipleRows` when the query returns more than one row, otherwise as
    /// [`Connector::execute`].
    pub async fn query_single<T: FromDbRow>(
        &mut self,
        command: &mut Command,
    ) -> Result<RowResult<T>> {
        let mut done = self.run(command, CallShape::Single).await?;
        let set = done.payload.take_first_set();
        let row = Option::<T>::decode_slot(set)?;
        Ok(done.envelope(row))
    }

    /// Every row of the first result set.
    ///
    /// # Errors
    /// As [`Connector::execute`].
    pub async fn query<T: FromDbRow>(&mut self, command: &mut Command) -> Result<RowListResult<T>> {
        let mut done = self.run(command, CallShape::List).await?;
        let set = done.payload.take_first_set();
        let rows = Vec::<T>::decode_slot(set)?;
        Ok(done.envelope(rows))
    }

    /// Read one result set per slot of `S`, in order.
    ///
    /// Result sets beyond the declared slots are left unread. Declaring more slots than the
    /// command produces fails with `ResultSetExhausted`.
    /// ```rust
    /// # use sql_command::prelude::*;
    /// # async fn demo<D: Driver>(conn: &mut Connector<D>) -> Result<(), SqlCommandError> {
    /// let mut cmd = Command::procedure("dbo.OrderDetails").param(Parameter::input("@Id", 7));
    /// let res = conn
    ///     .query_multiple::<(Option<DbRow>, Vec<DbRow>, Vec<i64>)>(&mut cmd)
    ///     .await?;
    /// let (header, lines, tags) = res.data;
    /// # let _ = (header, lines, tags);
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    /// `ResultSetExhausted`, `MultipleRows` for an `Option` slot, otherwise as
    /// [`Connector::execute`].
    pub async fn query_multiple<S: ResultSlots>(
        &mut self,
        command: &mut Command,
    ) -> Result<CommandResult<S>> {
        let mut done = self.run(command, CallShape::Multi(S::COUNT)).await?;
        let sets = std::mem::take(&mut done.payload.sets);
        let data = S::decode_slots(sets)?;
        Ok(done.envelope(data))
    }

    /// Read every result set the command produces as untyped rows.
    ///
    /// # Errors
    /// As [`Connector::execute`].
    pub async fn query_dynamic(&mut self, command: &mut Command) -> Result<DynamicSetsResult> {
        let mut done = self.run(command, CallShape::Dynamic).await?;
        let sets = std::mem::take(&mut done.payload.sets)
            .into_iter()
            .map(|set| set.results)
            .collect();
        Ok(done.envelope(sets))
    }
}

impl<D: Driver> Drop for Connector<D> {
    fn drop(&mut self) {
        if !self.session.is_disposed() && self.session.driver().is_open() {
            warn!(
                state = ?self.session.state(),
                "connector dropped without dispose; connection still open"
            );
        }
    }
}

