use std::collections::VecDeque;

use async_trait::async_trait;

use crate::error::DriverError;
use crate::params::ParameterList;

use super::result_set::ResultSet;

/// Sequential multi-result cursor handed out by a driver.
///
/// Result sets come back in the order the server produced them. The core reads exactly as many
/// as the call declared; anything left over is never requested.
#[async_trait]
pub trait ResultCursor: Send {
    /// Next unconsumed result set, or `None` once the command produced no more.
    async fn next_set(&mut self) -> Result<Option<ResultSet>, DriverError>;

    /// Called once after the last read. Drivers that only learn output parameter values after
    /// the result sets were drained write them into `outputs` here.
    async fn finish(&mut self, _outputs: &mut ParameterList) -> Result<(), DriverError> {
        Ok(())
    }
}

/// Cursor over result sets the driver already holds in memory.
#[derive(Debug, Clone, Default)]
pub struct BufferedCursor {
    sets: VecDeque<ResultSet>,
}

impl BufferedCursor {
    #[must_use]
    pub fn new(sets: impl IntoIterator<Item = ResultSet>) -> Self {
        Self {
            sets: sets.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        !self.sets.is_empty()
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.sets.len()
    }
}

#[async_trait]
impl ResultCursor for BufferedCursor {
    async fn next_set(&mut self) -> Result<Option<ResultSet>, DriverError> {
        Ok(self.sets.pop_front())
    }
}
