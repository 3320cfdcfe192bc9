use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SqlCommandError;
use crate::params::ParameterBinder;
use crate::types::CommandKind;

/// Connector-wide defaults.
///
/// Options can be built in code or loaded from JSON:
/// ```rust
/// use sql_command::prelude::*;
///
/// let opts = ConnectorOptions::from_json(r#"{ "command_timeout_ms": 5000 }"#).unwrap();
/// assert_eq!(opts.return_value_parameter_name, "@RETURN_VALUE");
/// assert_eq!(opts.command_timeout().unwrap().as_secs(), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorOptions {
    /// Name of the synthetic return-code parameter
    pub return_value_parameter_name: String,
    /// Request a return value from stored procedures unless the command says otherwise
    pub procedure_return_value: bool,
    /// Request a return value from text commands unless the command says otherwise
    pub text_return_value: bool,
    /// Prefix the binder puts in front of field names
    pub parameter_prefix: String,
    /// Default timeout for driver I/O
    pub command_timeout_ms: Option<u64>,
}

impl Default for ConnectorOptions {
    fn default() -> Self {
        Self {
            return_value_parameter_name: "@RETURN_VALUE".to_owned(),
            procedure_return_value: true,
            text_return_value: false,
            parameter_prefix: "@".to_owned(),
            command_timeout_ms: None,
        }
    }
}

impl ConnectorOptions {
    #[must_use]
    pub fn builder() -> ConnectorOptionsBuilder {
        ConnectorOptionsBuilder::default()
    }

    /// Parse options from JSON; missing keys keep their defaults.
    ///
    /// # Errors
    /// `ConfigError` for malformed JSON or an empty return value name.
    pub fn from_json(json: &str) -> Result<Self, SqlCommandError> {
        let opts: ConnectorOptions = serde_json::from_str(json)?;
        opts.validate()?;
        Ok(opts)
    }

    /// # Errors
    /// `ConfigError` when the return value parameter name is empty.
    pub fn validate(&self) -> Result<(), SqlCommandError> {
        if self.return_value_parameter_name.trim().is_empty() {
            return Err(SqlCommandError::ConfigError(
                "return_value_parameter_name must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Whether a command of `kind` requests a return value by default.
    #[must_use]
    pub fn return_value_default(&self, kind: CommandKind) -> bool {
        match kind {
            CommandKind::StoredProcedure => self.procedure_return_value,
            CommandKind::Text => self.text_return_value,
        }
    }

    #[must_use]
    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout_ms.map(Duration::from_millis)
    }

    /// Binder using the configured prefix.
    #[must_use]
    pub fn binder(&self) -> ParameterBinder {
        ParameterBinder::with_prefix(self.parameter_prefix.clone())
    }
}

/// Fluent builder for connector options.
#[derive(Debug, Clone, Default)]
pub struct ConnectorOptionsBuilder {
    opts: ConnectorOptions,
}

impl ConnectorOptionsBuilder {
    #[must_use]
    pub fn return_value_parameter_name(mut self, name: impl Into<String>) -> Self {
        self.opts.return_value_parameter_name = name.into();
        self
    }

    #[must_use]
    pub fn procedure_return_value(mut self, requested: bool) -> Self {
        self.opts.procedure_return_value = requested;
        self
    }

    #[must_use]
    pub fn text_return_value(mut self, requested: bool) -> Self {
        self.opts.text_return_value = requested;
        self
    }

    #[must_use]
    pub fn parameter_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.opts.parameter_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn command_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.opts.command_timeout_ms =
            timeout.map(|t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// # Errors
    /// `ConfigError` if the options are inconsistent.
    pub fn finish(self) -> Result<ConnectorOptions, SqlCommandError> {
        self.opts.validate()?;
        Ok(self.opts)
    }
}
