//! When the physical connection is opened and closed.
//!
//! Two flags drive everything. A query scope is opened by a call that found the connection
//! closed and is closed again when that call ends. A transaction scope keeps the connection open
//! across calls; while it is active per-call acquire/release do nothing, so every command in the
//! transaction shares one connection. Once a transaction has opened the connection it stays
//! open until the session is disposed.

use tracing::{debug, trace, warn};

use crate::driver::{Driver, TransactionToken};
use crate::error::{Result, SqlCommandError};

/// Observable state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Closed,
    OpenForQuery,
    OpenForTransaction,
    /// A transaction ended and left the connection open; calls run on it until dispose.
    OpenIdle,
    Disposed,
}

/// Owns one driver and at most one active transaction.
pub struct ConnectionSession<D: Driver> {
    driver: D,
    query_scope_open: bool,
    transaction: Option<TransactionToken>,
    // committed transaction objects are disposed with the session
    completed_transaction: Option<TransactionToken>,
    disposed: bool,
}

impl<D: Driver> std::fmt::Debug for ConnectionSession<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSession")
            .field("state", &self.state())
            .field("query_scope_open", &self.query_scope_open)
            .field("transaction", &self.transaction)
            .finish_non_exhaustive()
    }
}

impl<D: Driver> ConnectionSession<D> {
    /// Wrap a driver. Nothing is opened until the first call needs it.
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            query_scope_open: false,
            transaction: None,
            completed_transaction: None,
            disposed: false,
        }
    }

    #[must_use]
    pub fn state(&self) -> LifecycleState {
        if self.disposed {
            LifecycleState::Disposed
        } else if self.transaction.is_some() {
            LifecycleState::OpenForTransaction
        } else if self.query_scope_open {
            LifecycleState::OpenForQuery
        } else if self.driver.is_open() {
            LifecycleState::OpenIdle
        } else {
            LifecycleState::Closed
        }
    }

    #[must_use]
    pub fn in_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    /// Transaction commands must enlist in.
    #[must_use]
    pub fn active_transaction(&self) -> Option<TransactionToken> {
        self.transaction
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    #[must_use]
    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub(crate) fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    fn ensure_live(&self) -> Result<()> {
        if self.disposed {
            Err(SqlCommandError::Disposed)
        } else {
            Ok(())
        }
    }

    /// Make the connection usable for one call.
    ///
    /// # Errors
    /// `Disposed` after [`ConnectionSession::dispose`]; `Connection` if opening fails.
    pub async fn acquire_for_call(&mut self) -> Result<()> {
        self.ensure_live()?;
        if self.query_scope_open {
            trace!("query scope already open");
            return Ok(());
        }
        if self.transaction.is_some() {
            trace!("transaction holds the connection");
            return Ok(());
        }
        if self.driver.is_open() {
            // left open by a finished transaction; it stays open until dispose
            trace!("using connection held open by the session");
            return Ok(());
        }
        debug!("opening connection for call");
        self.driver
            .open()
            .await
            .map_err(|e| SqlCommandError::connection("open", e))?;
        self.query_scope_open = true;
        Ok(())
    }

    /// End the call's use of the connection. Closes it only if this call's scope opened it.
    ///
    /// # Errors
    /// `Connection` if closing fails; the scope is cleared regardless.
    pub async fn release_for_call(&mut self) -> Result<()> {
        if !self.query_scope_open {
            trace!("no query scope to release");
            return Ok(());
        }
        self.query_scope_open = false;
        debug!("closing connection after call");
        self.driver
            .close()
            .await
            .map_err(|e| SqlCommandError::connection("close", e))
    }

    /// Start a transaction. Does nothing if one is already active.
    ///
    /// # Errors
    /// `Disposed`, or `Connection` if opening or starting the transaction fails.
    pub async fn begin_transaction(&mut self) -> Result<()> {
        self.ensure_live()?;
        if self.transaction.is_some() {
            trace!("transaction already active; begin ignored");
            return Ok(());
        }
        self.dispose_completed().await;
        if !self.driver.is_open() {
            debug!("opening connection for transaction");
            self.driver
                .open()
                .await
                .map_err(|e| SqlCommandError::connection("open", e))?;
        }
        // the transaction owns the connection from here on
        self.query_scope_open = false;
        let token = self
            .driver
            .begin_transaction()
            .await
            .map_err(|e| SqlCommandError::connection("begin transaction", e))?;
        debug!(transaction = token.0, "transaction started");
        self.transaction = Some(token);
        Ok(())
    }

    /// Commit the active transaction. The connection stays open.
    ///
    /// # Errors
    /// `Transaction` when none is active; `Connection` if the driver fails, in which case the
    /// transaction stays active so it can still be rolled back.
    pub async fn commit(&mut self) -> Result<()> {
        self.ensure_live()?;
        let token = self
            .transaction
            .ok_or_else(|| SqlCommandError::Transaction("no active transaction to commit".into()))?;
        self.driver
            .commit(token)
            .await
            .map_err(|e| SqlCommandError::connection("commit", e))?;
        debug!(transaction = token.0, "transaction committed");
        self.transaction = None;
        self.completed_transaction = Some(token);
        Ok(())
    }

    /// Roll back the active transaction and dispose it. The connection stays open.
    ///
    /// # Errors
    /// `Transaction` when none is active; `Connection` if the driver fails. The transaction is
    /// disposed and the scope cleared either way.
    pub async fn rollback(&mut self) -> Result<()> {
        self.ensure_live()?;
        let token = self.transaction.take().ok_or_else(|| {
            SqlCommandError::Transaction("no active transaction to roll back".into())
        })?;
        let rolled_back = self.driver.rollback(token).await;
        if let Err(e) = self.driver.dispose_transaction(token).await {
            warn!(transaction = token.0, error = %e, "disposing rolled back transaction failed");
        }
        debug!(transaction = token.0, ok = rolled_back.is_ok(), "transaction rolled back");
        rolled_back.map_err(|e| SqlCommandError::connection("rollback", e))
    }

    async fn dispose_completed(&mut self) {
        if let Some(token) = self.completed_transaction.take()
            && let Err(e) = self.driver.dispose_transaction(token).await
        {
            warn!(transaction = token.0, error = %e, "disposing committed transaction failed");
        }
    }

    /// Close the connection and release the driver. Safe to call more than once.
    ///
    /// An uncommitted transaction is disposed without an explicit rollback.
    ///
    /// # Errors
    /// The first `Connection` error hit while tearing down; every step still runs.
    pub async fn dispose(&mut self) -> Result<()> {
        if self.disposed {
            return Ok(());
        }
        self.disposed = true;
        self.query_scope_open = false;
        let mut first_error: Option<SqlCommandError> = None;

        if let Some(token) = self.transaction.take() {
            warn!(transaction = token.0, "disposing session with an uncommitted transaction");
            if let Err(e) = self.driver.dispose_transaction(token).await {
                first_error.get_or_insert(SqlCommandError::connection("dispose transaction", e));
            }
        }
        self.dispose_completed().await;

        if self.driver.is_open() {
            debug!("closing connection on dispose");
            if let Err(e) = self.driver.close().await {
                first_error.get_or_insert(SqlCommandError::connection("close", e));
            }
        }
        if let Err(e) = self.driver.dispose().await {
            first_error.get_or_insert(SqlCommandError::connection("dispose", e));
        }

        first_error.map_or(Ok(()), Err)
    }
}
