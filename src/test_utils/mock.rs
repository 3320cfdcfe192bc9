use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::driver::{Driver, DriverCommand, TransactionToken};
use crate::error::DriverError;
use crate::params::ParameterList;
use crate::results::{BufferedCursor, ResultCursor, ResultSet};
use crate::types::{CommandKind, DbValue, ParameterDirection};

/// What the next command run on a [`MockDriver`] answers with.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Affected(u64),
    Scalar(DbValue),
    Rows(ResultSet),
    Sets(Vec<ResultSet>),
    /// Fail the command with this driver error
    Fail(String),
}

/// A command the mock received.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutedCommand {
    pub text: String,
    pub kind: CommandKind,
    pub transaction: Option<TransactionToken>,
    pub parameters: ParameterList,
}

/// Call counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MockStats {
    pub opens: usize,
    pub closes: usize,
    pub disposes: usize,
    pub begins: usize,
    pub commits: usize,
    pub rollbacks: usize,
    pub disposed_transactions: usize,
}

#[derive(Debug, Default)]
struct MockState {
    open: bool,
    stats: MockStats,
    next_transaction: u64,
    active_transaction: Option<TransactionToken>,
    committed: Vec<String>,
    pending: Vec<String>,
    executed: Vec<ExecutedCommand>,
    responses: VecDeque<MockResponse>,
    outputs: HashMap<String, DbValue>,
    return_code: Option<DbValue>,
    fail_open: Option<String>,
    fail_close: Option<String>,
    latency: Option<Duration>,
}

/// In-memory driver that answers from a script.
///
/// Clones share state, so a test keeps one handle for assertions and gives another to the
/// connector. Every statement's text is recorded as an "effect": inside a transaction it stays
/// pending until commit, rollback discards it, outside a transaction it is visible at once.
/// Output parameters and the return code are written from values set with
/// [`MockDriver::set_output`] and [`MockDriver::set_return_code`].
#[derive(Debug, Clone, Default)]
pub struct MockDriver {
    state: Arc<Mutex<MockState>>,
}

impl MockDriver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Queue the answer for the next command.
    pub fn push_response(&self, response: MockResponse) -> &Self {
        self.lock().responses.push_back(response);
        self
    }

    /// Value written to the named Out/InOut parameter after each command.
    pub fn set_output(&self, name: &str, value: impl Into<DbValue>) -> &Self {
        self.lock().outputs.insert(name.to_owned(), value.into());
        self
    }

    /// Value written to the ReturnValue parameter after each command.
    pub fn set_return_code(&self, value: impl Into<DbValue>) -> &Self {
        self.lock().return_code = Some(value.into());
        self
    }

    /// Delay every command by `latency` before it runs.
    pub fn set_latency(&self, latency: Duration) -> &Self {
        self.lock().latency = Some(latency);
        self
    }

    pub fn fail_next_open(&self, message: &str) {
        self.lock().fail_open = Some(message.to_owned());
    }

    pub fn fail_next_close(&self, message: &str) {
        self.lock().fail_close = Some(message.to_owned());
    }

    #[must_use]
    pub fn stats(&self) -> MockStats {
        self.lock().stats
    }

    /// Effects of statements that were committed or ran outside a transaction.
    #[must_use]
    pub fn visible_effects(&self) -> Vec<String> {
        self.lock().committed.clone()
    }

    #[must_use]
    pub fn executed(&self) -> Vec<ExecutedCommand> {
        self.lock().executed.clone()
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.lock().open
    }

    async fn wait(&self) {
        let latency = self.lock().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn begin_command(
        &self,
        command: &DriverCommand<'_>,
        params: &mut ParameterList,
    ) -> Result<Option<MockResponse>, DriverError> {
        let mut state = self.lock();
        if !state.open {
            return Err("connection is closed".into());
        }
        if command.transaction != state.active_transaction {
            return Err(format!(
                "command enlisted in {:?} but active transaction is {:?}",
                command.transaction, state.active_transaction
            )
            .into());
        }
        state.executed.push(ExecutedCommand {
            text: command.text.to_owned(),
            kind: command.kind,
            transaction: command.transaction,
            parameters: params.clone(),
        });

        let response = state.responses.pop_front();
        if let Some(MockResponse::Fail(message)) = &response {
            return Err(message.clone().into());
        }

        if state.active_transaction.is_some() {
            state.pending.push(command.text.to_owned());
        } else {
            state.committed.push(command.text.to_owned());
        }

        for p in params.iter_mut() {
            match p.direction {
                ParameterDirection::Out | ParameterDirection::InOut => {
                    if let Some(value) = state.outputs.get(&p.name) {
                        p.value = value.clone();
                    }
                }
                ParameterDirection::ReturnValue => {
                    if let Some(code) = &state.return_code {
                        p.value = code.clone();
                    }
                }
                ParameterDirection::In => {}
            }
        }
        Ok(response)
    }
}

#[async_trait]
impl Driver for MockDriver {
    async fn open(&mut self) -> Result<(), DriverError> {
        let mut state = self.lock();
        if let Some(message) = state.fail_open.take() {
            return Err(message.into());
        }
        if state.open {
            return Err("connection already open".into());
        }
        state.open = true;
        state.stats.opens += 1;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.lock().open
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        let mut state = self.lock();
        if !state.open {
            return Err("connection is not open".into());
        }
        state.open = false;
        state.stats.closes += 1;
        if let Some(message) = state.fail_close.take() {
            return Err(message.into());
        }
        Ok(())
    }

    async fn dispose(&mut self) -> Result<(), DriverError> {
        self.lock().stats.disposes += 1;
        Ok(())
    }

    async fn begin_transaction(&mut self) -> Result<TransactionToken, DriverError> {
        let mut state = self.lock();
        if !state.open {
            return Err("cannot begin a transaction on a closed connection".into());
        }
        if state.active_transaction.is_some() {
            return Err("nested transactions are not supported".into());
        }
        state.next_transaction += 1;
        let token = TransactionToken(state.next_transaction);
        state.active_transaction = Some(token);
        state.stats.begins += 1;
        Ok(token)
    }

    async fn commit(&mut self, transaction: TransactionToken) -> Result<(), DriverError> {
        let mut state = self.lock();
        if state.active_transaction != Some(transaction) {
            return Err("commit of an inactive transaction".into());
        }
        let pending = std::mem::take(&mut state.pending);
        state.committed.extend(pending);
        state.active_transaction = None;
        state.stats.commits += 1;
        Ok(())
    }

    async fn rollback(&mut self, transaction: TransactionToken) -> Result<(), DriverError> {
        let mut state = self.lock();
        if state.active_transaction != Some(transaction) {
            return Err("rollback of an inactive transaction".into());
        }
        state.pending.clear();
        state.active_transaction = None;
        state.stats.rollbacks += 1;
        Ok(())
    }

    async fn dispose_transaction(
        &mut self,
        transaction: TransactionToken,
    ) -> Result<(), DriverError> {
        let mut state = self.lock();
        if state.active_transaction == Some(transaction) {
            // left to the driver: this one discards the work
            state.pending.clear();
            state.active_transaction = None;
        }
        state.stats.disposed_transactions += 1;
        Ok(())
    }

    async fn execute(
        &mut self,
        command: &DriverCommand<'_>,
        params: &mut ParameterList,
    ) -> Result<u64, DriverError> {
        self.wait().await;
        match self.begin_command(command, params)? {
            Some(MockResponse::Affected(n)) => Ok(n),
            Some(MockResponse::Rows(rs)) => Ok(rs.len() as u64),
            _ => Ok(1),
        }
    }

    async fn execute_scalar(
        &mut self,
        command: &DriverCommand<'_>,
        params: &mut ParameterList,
    ) -> Result<DbValue, DriverError> {
        self.wait().await;
        match self.begin_command(command, params)? {
            Some(MockResponse::Scalar(value)) => Ok(value),
            Some(MockResponse::Rows(rs)) => Ok(rs
                .results
                .first()
                .and_then(|row| row.get_by_index(0))
                .cloned()
                .unwrap_or(DbValue::Null)),
            _ => Ok(DbValue::Null),
        }
    }

    async fn query(
        &mut self,
        command: &DriverCommand<'_>,
        params: &mut ParameterList,
    ) -> Result<ResultSet, DriverError> {
        self.wait().await;
        match self.begin_command(command, params)? {
            Some(MockResponse::Rows(rs)) => Ok(rs),
            Some(MockResponse::Sets(sets)) => Ok(sets.into_iter().next().unwrap_or_default()),
            _ => Ok(ResultSet::default()),
        }
    }

    async fn query_multiple(
        &mut self,
        command: &DriverCommand<'_>,
        params: &mut ParameterList,
    ) -> Result<Box<dyn ResultCursor>, DriverError> {
        self.wait().await;
        let sets = match self.begin_command(command, params)? {
            Some(MockResponse::Sets(sets)) => sets,
            Some(MockResponse::Rows(rs)) => vec![rs],
            _ => Vec::new(),
        };
        Ok(Box::new(BufferedCursor::new(sets)))
    }
}
