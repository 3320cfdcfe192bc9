use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::error::SqlCommandError;

/// Values that can be bound as parameters, written back by the server, or read from rows.
///
/// Every semantic type has exactly one variant; `Null` stands in for the absence of a value of
/// any type.
/// ```rust
/// use sql_command::prelude::*;
///
/// let values = vec![
///     DbValue::I32(1),
///     DbValue::Text("alice".into()),
///     DbValue::Bool(true),
/// ];
/// # let _ = values;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum DbValue {
    /// NULL value
    Null,
    /// Unicode text
    Text(String),
    /// Binary data
    Binary(Vec<u8>),
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    /// Fixed-point decimal
    Decimal(BigDecimal),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    DateTimeOffset(DateTime<FixedOffset>),
    /// Time of day or elapsed interval
    TimeSpan(TimeDelta),
    Guid(Uuid),
}

impl DbValue {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Widen any integer variant to `i64`, if it fits.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DbValue::I8(v) => Some(i64::from(*v)),
            DbValue::I16(v) => Some(i64::from(*v)),
            DbValue::I32(v) => Some(i64::from(*v)),
            DbValue::I64(v) => Some(*v),
            DbValue::U8(v) => Some(i64::from(*v)),
            DbValue::U16(v) => Some(i64::from(*v)),
            DbValue::U32(v) => Some(i64::from(*v)),
            DbValue::U64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let DbValue::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        if let DbValue::Bool(value) = self {
            return Some(*value);
        } else if let Some(i) = self.as_i64() {
            if i == 1 {
                return Some(true);
            } else if i == 0 {
                return Some(false);
            }
        }
        None
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DbValue::F32(v) => Some(f64::from(*v)),
            DbValue::F64(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        if let DbValue::DateTime(value) = self {
            return Some(*value);
        } else if let Some(s) = self.as_text() {
            // Try "YYYY-MM-DD HH:MM:SS"
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(dt);
            }
            // Try fractional seconds and the ISO "T" separator
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
                return Some(dt);
            }
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
                return Some(dt);
            }
        }
        None
    }

    #[must_use]
    pub fn as_binary(&self) -> Option<&[u8]> {
        if let DbValue::Binary(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    /// The semantic type this value naturally carries. `Null` reports `Object`.
    #[must_use]
    pub fn semantic_type(&self) -> SemanticType {
        match self {
            DbValue::Null => SemanticType::Object,
            DbValue::Text(_) => SemanticType::Text,
            DbValue::Binary(_) => SemanticType::Binary,
            DbValue::Bool(_) => SemanticType::Boolean,
            DbValue::I8(_) => SemanticType::Int8,
            DbValue::I16(_) => SemanticType::Int16,
            DbValue::I32(_) => SemanticType::Int32,
            DbValue::I64(_) => SemanticType::Int64,
            DbValue::U8(_) => SemanticType::UInt8,
            DbValue::U16(_) => SemanticType::UInt16,
            DbValue::U32(_) => SemanticType::UInt32,
            DbValue::U64(_) => SemanticType::UInt64,
            DbValue::F32(_) => SemanticType::Float32,
            DbValue::F64(_) => SemanticType::Float64,
            DbValue::Decimal(_) => SemanticType::Decimal,
            DbValue::Date(_) => SemanticType::Date,
            DbValue::DateTime(_) => SemanticType::DateTime,
            DbValue::DateTimeOffset(_) => SemanticType::DateTimeOffset,
            DbValue::TimeSpan(_) => SemanticType::TimeSpan,
            DbValue::Guid(_) => SemanticType::Guid,
        }
    }

    /// Render as JSON. Decimals travel as strings to keep precision; time spans as milliseconds.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            DbValue::Null => JsonValue::Null,
            DbValue::Text(s) => JsonValue::from(s.as_str()),
            DbValue::Binary(b) => JsonValue::from(b.clone()),
            DbValue::Bool(b) => JsonValue::from(*b),
            DbValue::I8(v) => JsonValue::from(*v),
            DbValue::I16(v) => JsonValue::from(*v),
            DbValue::I32(v) => JsonValue::from(*v),
            DbValue::I64(v) => JsonValue::from(*v),
            DbValue::U8(v) => JsonValue::from(*v),
            DbValue::U16(v) => JsonValue::from(*v),
            DbValue::U32(v) => JsonValue::from(*v),
            DbValue::U64(v) => JsonValue::from(*v),
            DbValue::F32(v) => JsonValue::from(*v),
            DbValue::F64(v) => JsonValue::from(*v),
            DbValue::Decimal(d) => JsonValue::from(d.to_string()),
            DbValue::Date(d) => JsonValue::from(d.format("%Y-%m-%d").to_string()),
            DbValue::DateTime(dt) => {
                JsonValue::from(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
            }
            DbValue::DateTimeOffset(dt) => JsonValue::from(dt.to_rfc3339()),
            DbValue::TimeSpan(span) => JsonValue::from(span.num_milliseconds()),
            DbValue::Guid(g) => JsonValue::from(g.to_string()),
        }
    }
}

macro_rules! impl_from_native {
    ($($native:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$native> for DbValue {
                fn from(value: $native) -> Self {
                    DbValue::$variant(value)
                }
            }
        )*
    };
}

impl_from_native!(
    String => Text,
    Vec<u8> => Binary,
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    BigDecimal => Decimal,
    NaiveDate => Date,
    NaiveDateTime => DateTime,
    DateTime<FixedOffset> => DateTimeOffset,
    TimeDelta => TimeSpan,
    Uuid => Guid,
);

impl From<&str> for DbValue {
    fn from(value: &str) -> Self {
        DbValue::Text(value.to_owned())
    }
}

impl From<&[u8]> for DbValue {
    fn from(value: &[u8]) -> Self {
        DbValue::Binary(value.to_vec())
    }
}

impl<T: Into<DbValue>> From<Option<T>> for DbValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(DbValue::Null, Into::into)
    }
}

/// Closed set of value categories used to direct extraction and coercion, independent of the
/// native types a driver happens to hand back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SemanticType {
    Text,
    Binary,
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Decimal,
    Date,
    DateTime,
    DateTimeOffset,
    TimeSpan,
    Guid,
    /// Untyped; values pass through as the driver produced them.
    Object,
    /// Decoding XML is left to the caller.
    Xml,
}

impl SemanticType {
    const ALL: [SemanticType; 21] = [
        SemanticType::Text,
        SemanticType::Binary,
        SemanticType::Boolean,
        SemanticType::Int8,
        SemanticType::Int16,
        SemanticType::Int32,
        SemanticType::Int64,
        SemanticType::UInt8,
        SemanticType::UInt16,
        SemanticType::UInt32,
        SemanticType::UInt64,
        SemanticType::Float32,
        SemanticType::Float64,
        SemanticType::Decimal,
        SemanticType::Date,
        SemanticType::DateTime,
        SemanticType::DateTimeOffset,
        SemanticType::TimeSpan,
        SemanticType::Guid,
        SemanticType::Object,
        SemanticType::Xml,
    ];

    /// Stable numeric code of this type.
    #[must_use]
    pub fn code(self) -> u16 {
        // ALL is declared in variant order
        self as u16
    }

    /// Look a type up by its numeric code.
    ///
    /// # Errors
    /// Returns `SqlCommandError::UnknownSemanticType` when the code is out of range.
    pub fn from_code(code: u16) -> Result<Self, SqlCommandError> {
        Self::ALL
            .get(usize::from(code))
            .copied()
            .ok_or_else(|| SqlCommandError::UnknownSemanticType(format!("code {code}")))
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            SemanticType::Text => "text",
            SemanticType::Binary => "binary",
            SemanticType::Boolean => "boolean",
            SemanticType::Int8 => "int8",
            SemanticType::Int16 => "int16",
            SemanticType::Int32 => "int32",
            SemanticType::Int64 => "int64",
            SemanticType::UInt8 => "uint8",
            SemanticType::UInt16 => "uint16",
            SemanticType::UInt32 => "uint32",
            SemanticType::UInt64 => "uint64",
            SemanticType::Float32 => "float32",
            SemanticType::Float64 => "float64",
            SemanticType::Decimal => "decimal",
            SemanticType::Date => "date",
            SemanticType::DateTime => "datetime",
            SemanticType::DateTimeOffset => "datetimeoffset",
            SemanticType::TimeSpan => "timespan",
            SemanticType::Guid => "guid",
            SemanticType::Object => "object",
            SemanticType::Xml => "xml",
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SemanticType {
    type Err = SqlCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|ty| ty.name() == wanted)
            .ok_or_else(|| SqlCommandError::UnknownSemanticType(s.to_owned()))
    }
}

/// Which way a parameter's value flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ParameterDirection {
    #[default]
    In,
    Out,
    InOut,
    /// Procedure status code slot
    ReturnValue,
}

impl ParameterDirection {
    /// Whether the server writes a value back for this direction.
    #[must_use]
    pub fn is_output(self) -> bool {
        matches!(
            self,
            ParameterDirection::Out | ParameterDirection::InOut | ParameterDirection::ReturnValue
        )
    }
}

/// How the command text is interpreted by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    /// Ad-hoc SQL text
    Text,
    /// Name of a stored procedure
    StoredProcedure,
}
