use thiserror::Error;

use crate::types::{CommandKind, SemanticType};

/// Error type produced by drivers. Kept boxed so any backend error can travel through the core
/// without being reinterpreted.
pub type DriverError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SqlCommandError>;

/// Diagnostic context attached to driver failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandContext {
    pub text: String,
    pub kind: CommandKind,
    pub parameter_names: Vec<String>,
}

impl std::fmt::Display for CommandContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?} `{}` [{}]",
            self.kind,
            self.text,
            self.parameter_names.join(", ")
        )
    }
}

#[derive(Debug, Error)]
pub enum SqlCommandError {
    #[error("Parameter not found: {name}")]
    ParameterNotFound { name: String },

    #[error("Parameter name {name} matched {matches} parameters; names must be unique")]
    AmbiguousParameter { name: String, matches: usize },

    #[error("Multiple rows returned for single-row query ({rows} rows)")]
    MultipleRows { rows: usize },

    #[error("Result set {slot} was requested but the command produced only {available}")]
    ResultSetExhausted { slot: usize, available: usize },

    #[error("Semantic type {0:?} requires custom handling")]
    UnsupportedType(SemanticType),

    #[error("Unrecognized semantic type: {0}")]
    UnknownSemanticType(String),

    #[error("Value conversion error: {0}")]
    Conversion(String),

    #[error("Driver error during {context}: {source}")]
    Driver {
        context: CommandContext,
        #[source]
        source: DriverError,
    },

    #[error("Connection error during {operation}: {source}")]
    Connection {
        operation: &'static str,
        #[source]
        source: DriverError,
    },

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Command timed out after {elapsed_ms} ms: {context}")]
    Timeout { context: CommandContext, elapsed_ms: u128 },

    #[error("Connector has been disposed")]
    Disposed,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl SqlCommandError {
    pub(crate) fn connection(operation: &'static str, source: DriverError) -> Self {
        SqlCommandError::Connection { operation, source }
    }

    /// Parameter lookup failures (missing or colliding names).
    #[must_use]
    pub fn is_binding_error(&self) -> bool {
        matches!(
            self,
            Self::ParameterNotFound { .. } | Self::AmbiguousParameter { .. }
        )
    }

    /// The response did not have the shape the call declared.
    #[must_use]
    pub fn is_shape_mismatch(&self) -> bool {
        matches!(self, Self::MultipleRows { .. } | Self::ResultSetExhausted { .. })
    }

    #[must_use]
    pub fn is_unsupported_type(&self) -> bool {
        matches!(self, Self::UnsupportedType(_) | Self::UnknownSemanticType(_))
    }

    /// Failure raised by the driver itself rather than detected by the core.
    #[must_use]
    pub fn is_driver_error(&self) -> bool {
        matches!(self, Self::Driver { .. } | Self::Connection { .. })
    }
}

impl From<serde_json::Error> for SqlCommandError {
    fn from(err: serde_json::Error) -> Self {
        SqlCommandError::ConfigError(format!("invalid connector options: {err}"))
    }
}
