//! Synchronous facade over [`Connector`].
//!
//! Runs the same state machine and algorithm on a private current-thread runtime. Do not use it
//! from inside an async context; `block_on` panics there.

use tokio::runtime::{Builder, Runtime};
use tracing::warn;

use crate::command::Command;
use crate::driver::Driver;
use crate::error::{Result, SqlCommandError};
use crate::executor::Connector;
use crate::lifecycle::LifecycleState;
use crate::options::ConnectorOptions;
use crate::results::{
    CommandResult, DynamicSetsResult, FromDbRow, FromDbValue, ResultSlots, RowListResult,
    RowResult, ScalarResult,
};

/// Blocking connector. Disposes itself when dropped.
pub struct BlockingConnector<D: Driver> {
    runtime: Runtime,
    inner: Connector<D>,
}

impl<D: Driver> BlockingConnector<D> {
    /// # Errors
    /// `ConfigError` if the runtime cannot be built.
    pub fn new(driver: D) -> Result<Self> {
        Self::with_options(driver, ConnectorOptions::default())
    }

    /// # Errors
    /// `ConfigError` if the options are invalid or the runtime cannot be built.
    pub fn with_options(driver: D, options: ConnectorOptions) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| SqlCommandError::ConfigError(format!("failed to build runtime: {e}")))?;
        Ok(Self {
            runtime,
            inner: Connector::with_options(driver, options)?,
        })
    }

    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.inner.state()
    }

    #[must_use]
    pub fn driver(&self) -> &D {
        self.inner.driver()
    }

    /// # Errors
    /// See [`Connector::begin_transaction`].
    pub fn begin_transaction(&mut self) -> Result<()> {
        self.runtime.block_on(self.inner.begin_transaction())
    }

    /// # Errors
    /// See [`Connector::commit`].
    pub fn commit(&mut self) -> Result<()> {
        self.runtime.block_on(self.inner.commit())
    }

    /// # Errors
    /// See [`Connector::rollback`].
    pub fn rollback(&mut self) -> Result<()> {
        self.runtime.block_on(self.inner.rollback())
    }

    /// # Errors
    /// See [`Connector::dispose`].
    pub fn dispose(&mut self) -> Result<()> {
        self.runtime.block_on(self.inner.dispose())
    }

    /// # Errors
    /// See [`Connector::execute`].
    pub fn execute(&mut self, command: &mut Command) -> Result<CommandResult<u64>> {
        self.runtime.block_on(self.inner.execute(command))
    }

    /// # Errors
    /// See [`Connector::execute_scalar`].
    pub fn execute_scalar<T: FromDbValue>(
        &mut self,
        command: &mut Command,
    ) -> Result<ScalarResult<T>> {
        self.runtime.block_on(self.inner.execute_scalar(command))
    }

    /// # Errors
    /// See [`Connector::query_single`].
    pub fn query_single<T: FromDbRow>(&mut self, command: &mut Command) -> Result<RowResult<T>> {
        self.runtime.block_on(self.inner.query_single(command))
    }

    /// # Errors
    /// See [`Connector::query`].
    pub fn query<T: FromDbRow>(&mut self, command: &mut Command) -> Result<RowListResult<T>> {
        self.runtime.block_on(self.inner.query(command))
    }

    /// # Errors
    /// See [`Connector::query_multiple`].
    pub fn query_multiple<S: ResultSlots>(
        &mut self,
        command: &mut Command,
    ) -> Result<CommandResult<S>> {
        self.runtime.block_on(self.inner.query_multiple(command))
    }

    /// # Errors
    /// See [`Connector::query_dynamic`].
    pub fn query_dynamic(&mut self, command: &mut Command) -> Result<DynamicSetsResult> {
        self.runtime.block_on(self.inner.query_dynamic(command))
    }
}

impl<D: Driver> Drop for BlockingConnector<D> {
    fn drop(&mut self) {
        if let Err(e) = self.runtime.block_on(self.inner.dispose()) {
            warn!(error = %e, "dispose on drop failed");
        }
    }
}
