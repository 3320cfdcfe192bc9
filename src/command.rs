use std::time::Duration;

use crate::params::{Parameter, ParameterBinder, ParameterList, ParameterRecord};
use crate::types::CommandKind;

/// A SQL text or stored procedure call together with its parameters.
///
/// After execution the Out and InOut parameters in `parameters` hold the values the server
/// wrote back.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub text: String,
    pub kind: CommandKind,
    pub parameters: ParameterList,
    /// `None` falls back to the connector default for `kind`
    pub return_value_requested: Option<bool>,
    /// `None` falls back to the connector's return value parameter name
    pub return_value_name: Option<String>,
    /// `None` falls back to the connector's default timeout
    pub timeout: Option<Duration>,
}

impl Command {
    #[must_use]
    pub fn new(text: impl Into<String>, kind: CommandKind) -> Self {
        Self {
            text: text.into(),
            kind,
            parameters: ParameterList::new(),
            return_value_requested: None,
            return_value_name: None,
            timeout: None,
        }
    }

    /// Ad-hoc SQL text.
    #[must_use]
    pub fn text(sql: impl Into<String>) -> Self {
        Self::new(sql, CommandKind::Text)
    }

    /// Stored procedure call by name.
    #[must_use]
    pub fn procedure(name: impl Into<String>) -> Self {
        Self::new(name, CommandKind::StoredProcedure)
    }

    #[must_use]
    pub fn param(mut self, parameter: Parameter) -> Self {
        self.parameters.add(parameter);
        self
    }

    /// Append every parameter of `parameters`.
    #[must_use]
    pub fn params(mut self, parameters: ParameterList) -> Self {
        self.parameters.extend(parameters);
        self
    }

    /// Append the parameters bound from `record` with the default `@` prefix.
    #[must_use]
    pub fn bind<R: ParameterRecord + ?Sized>(self, record: &R) -> Self {
        self.bind_with(&ParameterBinder::default(), record)
    }

    #[must_use]
    pub fn bind_with<R: ParameterRecord + ?Sized>(
        self,
        binder: &ParameterBinder,
        record: &R,
    ) -> Self {
        let bound = binder.bind(record);
        self.params(bound)
    }

    #[must_use]
    pub fn return_value(mut self, requested: bool) -> Self {
        self.return_value_requested = Some(requested);
        self
    }

    #[must_use]
    pub fn return_value_name(mut self, name: impl Into<String>) -> Self {
        self.return_value_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
