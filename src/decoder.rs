//! Type-directed extraction of output parameter values.
//!
//! Drivers write whatever native value they received from the server into the parameter store.
//! The decoder turns that value into the one representation each semantic type owns, so callers
//! see `DbValue::I32` for an `Int32` output no matter whether the driver produced an `i64`, a
//! `u8` or a numeric string.

use std::str::FromStr;

use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{DateTime, NaiveDate, NaiveTime};
use uuid::Uuid;

use crate::error::SqlCommandError;
use crate::params::ParameterList;
use crate::types::{DbValue, SemanticType};

/// Anything output values can be read back from after a command ran.
pub trait ParameterStore {
    /// Raw value stored under `name`.
    ///
    /// # Errors
    /// Binding errors when the name is missing or ambiguous.
    fn stored_value(&self, name: &str) -> Result<&DbValue, SqlCommandError>;
}

impl ParameterStore for ParameterList {
    fn stored_value(&self, name: &str) -> Result<&DbValue, SqlCommandError> {
        self.value(name)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResultDecoder;

impl ResultDecoder {
    /// Read the value stored under `name` as `semantic_type`.
    ///
    /// # Errors
    /// * `UnsupportedType` for `Xml`, whatever the store holds.
    /// * Binding errors when the store has no single parameter with this name.
    /// * `Conversion` when the stored value cannot represent the semantic type.
    pub fn extract<S: ParameterStore + ?Sized>(
        name: &str,
        semantic_type: SemanticType,
        store: &S,
    ) -> Result<DbValue, SqlCommandError> {
        if semantic_type == SemanticType::Xml {
            return Err(SqlCommandError::UnsupportedType(semantic_type));
        }
        let raw = store.stored_value(name)?;
        Self::coerce(raw.clone(), semantic_type)
    }

    /// [`ResultDecoder::extract`] with the type given by name or code, as it arrives from
    /// configuration or metadata.
    ///
    /// # Errors
    /// `UnknownSemanticType` for a tag outside the closed set, otherwise as `extract`.
    pub fn extract_tagged<S: ParameterStore + ?Sized>(
        name: &str,
        type_tag: &str,
        store: &S,
    ) -> Result<DbValue, SqlCommandError> {
        let semantic_type = SemanticType::from_str(type_tag)?;
        Self::extract(name, semantic_type, store)
    }

    /// Convert `value` to the representation owned by `semantic_type`. `Null` stays `Null`.
    ///
    /// # Errors
    /// `UnsupportedType` for `Xml`; `Conversion` when the value does not fit.
    pub fn coerce(value: DbValue, semantic_type: SemanticType) -> Result<DbValue, SqlCommandError> {
        let converted = match semantic_type {
            SemanticType::Xml => return Err(SqlCommandError::UnsupportedType(semantic_type)),
            SemanticType::Object => return Ok(value),
            _ if value.is_null() => return Ok(value),
            SemanticType::Text => to_text(&value).map(DbValue::Text),
            SemanticType::Binary => to_binary(&value).map(DbValue::Binary),
            SemanticType::Boolean => to_bool(&value).map(DbValue::Bool),
            SemanticType::Int8 => to_integer(&value).map(DbValue::I8),
            SemanticType::Int16 => to_integer(&value).map(DbValue::I16),
            SemanticType::Int32 => to_integer(&value).map(DbValue::I32),
            SemanticType::Int64 => to_integer(&value).map(DbValue::I64),
            SemanticType::UInt8 => to_integer(&value).map(DbValue::U8),
            SemanticType::UInt16 => to_integer(&value).map(DbValue::U16),
            SemanticType::UInt32 => to_integer(&value).map(DbValue::U32),
            SemanticType::UInt64 => to_integer(&value).map(DbValue::U64),
            SemanticType::Float32 => to_f32(&value).map(DbValue::F32),
            SemanticType::Float64 => to_f64(&value).map(DbValue::F64),
            SemanticType::Decimal => to_decimal(&value).map(DbValue::Decimal),
            SemanticType::Date => to_date(&value).map(DbValue::Date),
            SemanticType::DateTime => to_datetime(&value).map(DbValue::DateTime),
            SemanticType::DateTimeOffset => to_datetime_offset(&value).map(DbValue::DateTimeOffset),
            SemanticType::TimeSpan => to_time_span(&value).map(DbValue::TimeSpan),
            SemanticType::Guid => to_guid(&value).map(DbValue::Guid),
        };

        converted.ok_or_else(|| {
            SqlCommandError::Conversion(format!("cannot read {value:?} as {semantic_type}"))
        })
    }
}

fn to_text(value: &DbValue) -> Option<String> {
    match value {
        DbValue::Text(s) => Some(s.clone()),
        DbValue::Guid(g) => Some(g.to_string()),
        DbValue::Decimal(d) => Some(d.to_string()),
        other => other.as_i64().map(|i| i.to_string()),
    }
}

fn to_binary(value: &DbValue) -> Option<Vec<u8>> {
    match value {
        DbValue::Binary(b) => Some(b.clone()),
        DbValue::Text(s) => Some(s.as_bytes().to_vec()),
        DbValue::Guid(g) => Some(g.as_bytes().to_vec()),
        _ => None,
    }
}

fn to_bool(value: &DbValue) -> Option<bool> {
    if let Some(s) = value.as_text() {
        return match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        };
    }
    value.as_bool()
}

fn as_i128(value: &DbValue) -> Option<i128> {
    match value {
        DbValue::U64(v) => Some(i128::from(*v)),
        DbValue::Bool(b) => Some(i128::from(*b)),
        DbValue::Decimal(d) if d.is_integer() => d.to_i128(),
        DbValue::Text(s) => s.trim().parse().ok(),
        other => other.as_i64().map(i128::from),
    }
}

fn to_integer<T: TryFrom<i128>>(value: &DbValue) -> Option<T> {
    as_i128(value).and_then(|v| T::try_from(v).ok())
}

#[allow(clippy::cast_precision_loss)]
fn to_f64(value: &DbValue) -> Option<f64> {
    match value {
        DbValue::Decimal(d) => d.to_f64(),
        DbValue::Text(s) => s.trim().parse().ok(),
        DbValue::U64(v) => Some(*v as f64),
        other => other
            .as_f64()
            .or_else(|| other.as_i64().map(|i| i as f64)),
    }
}

/// Narrowed from `f64`; finite values outside the `f32` range do not fit.
#[allow(clippy::cast_possible_truncation)]
fn to_f32(value: &DbValue) -> Option<f32> {
    if let DbValue::F32(v) = value {
        return Some(*v);
    }
    let wide = to_f64(value)?;
    let narrow = wide as f32;
    if wide.is_finite() && narrow.is_infinite() {
        None
    } else {
        Some(narrow)
    }
}

fn to_decimal(value: &DbValue) -> Option<BigDecimal> {
    match value {
        DbValue::Decimal(d) => Some(d.clone()),
        DbValue::Text(s) => BigDecimal::from_str(s.trim()).ok(),
        DbValue::U64(v) => Some(BigDecimal::from(*v)),
        DbValue::F32(_) | DbValue::F64(_) => value
            .as_f64()
            .filter(|f| f.is_finite())
            .and_then(|f| BigDecimal::from_str(&f.to_string()).ok()),
        other => other.as_i64().map(BigDecimal::from),
    }
}

fn to_date(value: &DbValue) -> Option<NaiveDate> {
    match value {
        DbValue::Date(d) => Some(*d),
        DbValue::DateTime(dt) => Some(dt.date()),
        DbValue::DateTimeOffset(dt) => Some(dt.date_naive()),
        DbValue::Text(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .ok()
            .or_else(|| value.as_datetime().map(|dt| dt.date())),
        _ => None,
    }
}

fn to_datetime(value: &DbValue) -> Option<chrono::NaiveDateTime> {
    match value {
        DbValue::DateTime(dt) => Some(*dt),
        DbValue::Date(d) => d.and_hms_opt(0, 0, 0),
        DbValue::DateTimeOffset(dt) => Some(dt.naive_local()),
        other => other.as_datetime(),
    }
}

fn to_datetime_offset(value: &DbValue) -> Option<DateTime<chrono::FixedOffset>> {
    match value {
        DbValue::DateTimeOffset(dt) => Some(*dt),
        // naive values are taken as UTC
        DbValue::DateTime(dt) => Some(dt.and_utc().fixed_offset()),
        DbValue::Text(s) => DateTime::parse_from_rfc3339(s.trim()).ok(),
        _ => None,
    }
}

fn to_time_span(value: &DbValue) -> Option<chrono::TimeDelta> {
    match value {
        DbValue::TimeSpan(span) => Some(*span),
        DbValue::Text(s) => {
            let midnight = NaiveTime::from_hms_opt(0, 0, 0)?;
            NaiveTime::parse_from_str(s.trim(), "%H:%M:%S%.f")
                .ok()
                .map(|t| t.signed_duration_since(midnight))
        }
        _ => None,
    }
}

fn to_guid(value: &DbValue) -> Option<Uuid> {
    match value {
        DbValue::Guid(g) => Some(*g),
        DbValue::Text(s) => Uuid::parse_str(s.trim()).ok(),
        DbValue::Binary(b) => Uuid::from_slice(b).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Parameter;

    fn store_with(value: DbValue) -> ParameterList {
        ParameterList::new().with(Parameter::new("@p", value))
    }

    #[test]
    fn int32_from_stored_42() {
        let store = store_with(DbValue::I64(42));
        let v = ResultDecoder::extract("@p", SemanticType::Int32, &store).unwrap();
        assert_eq!(v, DbValue::I32(42));
    }

    #[test]
    fn xml_is_unsupported_regardless_of_contents() {
        for value in [DbValue::Null, DbValue::from("<a/>"), DbValue::I32(1)] {
            let err =
                ResultDecoder::extract("@p", SemanticType::Xml, &store_with(value)).unwrap_err();
            assert!(matches!(err, SqlCommandError::UnsupportedType(SemanticType::Xml)));
        }
        // even when the parameter is missing
        let err = ResultDecoder::extract("@nope", SemanticType::Xml, &ParameterList::new())
            .unwrap_err();
        assert!(err.is_unsupported_type());
    }

    #[test]
    fn unknown_tag_is_out_of_range() {
        let err = ResultDecoder::extract_tagged("@p", "hierarchyid", &store_with(DbValue::Null))
            .unwrap_err();
        assert!(matches!(err, SqlCommandError::UnknownSemanticType(_)));
    }

    #[test]
    fn null_survives_every_supported_type() {
        let store = store_with(DbValue::Null);
        for code in 0..=19 {
            let ty = SemanticType::from_code(code).unwrap();
            assert_eq!(ResultDecoder::extract("@p", ty, &store).unwrap(), DbValue::Null, "{ty}");
        }
    }

    #[test]
    fn narrowing_overflow_is_a_conversion_error() {
        let err = ResultDecoder::coerce(DbValue::I64(300), SemanticType::UInt8).unwrap_err();
        assert!(matches!(err, SqlCommandError::Conversion(_)));
        assert_eq!(
            ResultDecoder::coerce(DbValue::I32(-1), SemanticType::Int8).unwrap(),
            DbValue::I8(-1)
        );
    }

    #[test]
    fn float_narrowing_overflow_is_a_conversion_error() {
        let err = ResultDecoder::coerce(DbValue::F64(1e300), SemanticType::Float32).unwrap_err();
        assert!(matches!(err, SqlCommandError::Conversion(_)));
        assert_eq!(
            ResultDecoder::coerce(DbValue::F64(1.5), SemanticType::Float32).unwrap(),
            DbValue::F32(1.5)
        );
        // infinities are representable in both widths
        assert_eq!(
            ResultDecoder::coerce(DbValue::F64(f64::INFINITY), SemanticType::Float32).unwrap(),
            DbValue::F32(f32::INFINITY)
        );
    }

    #[test]
    fn every_supported_type_extracts_its_own_representation() {
        let guid = Uuid::from_u128(0x0123_4567_89ab_cdef_0123_4567_89ab_cdef);
        let date = NaiveDate::from_ymd_opt(2024, 5, 17).unwrap();
        let datetime = date.and_hms_opt(8, 30, 0).unwrap();
        let offset = DateTime::parse_from_rfc3339("2024-05-17T08:30:00+02:00").unwrap();
        let cases = [
            (SemanticType::Text, DbValue::from("hello"), DbValue::from("hello")),
            (SemanticType::Binary, DbValue::from("ab"), DbValue::Binary(vec![0x61, 0x62])),
            (SemanticType::Boolean, DbValue::I32(1), DbValue::Bool(true)),
            (SemanticType::Int8, DbValue::I64(-8), DbValue::I8(-8)),
            (SemanticType::Int16, DbValue::I32(-1600), DbValue::I16(-1600)),
            (SemanticType::Int32, DbValue::I64(42), DbValue::I32(42)),
            (SemanticType::Int64, DbValue::I32(-7), DbValue::I64(-7)),
            (SemanticType::UInt8, DbValue::I16(200), DbValue::U8(200)),
            (SemanticType::UInt16, DbValue::I32(60_000), DbValue::U16(60_000)),
            (
                SemanticType::UInt32,
                DbValue::I64(4_000_000_000),
                DbValue::U32(4_000_000_000),
            ),
            (
                SemanticType::UInt64,
                DbValue::from("18446744073709551615"),
                DbValue::U64(u64::MAX),
            ),
            (SemanticType::Float32, DbValue::F64(0.25), DbValue::F32(0.25)),
            (SemanticType::Float64, DbValue::I32(3), DbValue::F64(3.0)),
            (
                SemanticType::Decimal,
                DbValue::I64(1250),
                DbValue::Decimal(BigDecimal::from(1250)),
            ),
            (SemanticType::Date, DbValue::DateTime(datetime), DbValue::Date(date)),
            (
                SemanticType::DateTime,
                DbValue::DateTime(datetime),
                DbValue::DateTime(datetime),
            ),
            (
                SemanticType::DateTimeOffset,
                DbValue::from("2024-05-17T08:30:00+02:00"),
                DbValue::DateTimeOffset(offset),
            ),
            (
                SemanticType::TimeSpan,
                DbValue::TimeSpan(chrono::TimeDelta::minutes(90)),
                DbValue::TimeSpan(chrono::TimeDelta::minutes(90)),
            ),
            (SemanticType::Guid, DbValue::from(guid.to_string()), DbValue::Guid(guid)),
            (SemanticType::Object, DbValue::U16(9), DbValue::U16(9)),
        ];

        let covered: Vec<_> = cases.iter().map(|(ty, _, _)| *ty).collect();
        for code in 0..=20 {
            let ty = SemanticType::from_code(code).unwrap();
            assert_eq!(covered.contains(&ty), ty != SemanticType::Xml, "{ty}");
        }

        for (ty, stored, expected) in cases {
            let got = ResultDecoder::extract("@p", ty, &store_with(stored)).unwrap();
            assert_eq!(got, expected, "{ty}");
            if ty != SemanticType::Object {
                assert_eq!(got.semantic_type(), ty);
            }
        }
    }

    #[test]
    fn text_conversions() {
        assert_eq!(
            ResultDecoder::coerce(DbValue::from("12.50"), SemanticType::Decimal).unwrap(),
            DbValue::Decimal(BigDecimal::from_str("12.50").unwrap())
        );
        assert_eq!(
            ResultDecoder::coerce(DbValue::from("true"), SemanticType::Boolean).unwrap(),
            DbValue::Bool(true)
        );
        let guid = Uuid::nil();
        assert_eq!(
            ResultDecoder::coerce(DbValue::from(guid.to_string()), SemanticType::Guid).unwrap(),
            DbValue::Guid(guid)
        );
        assert_eq!(
            ResultDecoder::coerce(DbValue::from("01:02:03"), SemanticType::TimeSpan).unwrap(),
            DbValue::TimeSpan(chrono::TimeDelta::seconds(3723))
        );
    }

    #[test]
    fn dates_widen_and_narrow() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let dt = ResultDecoder::coerce(DbValue::Date(date), SemanticType::DateTime).unwrap();
        assert_eq!(dt, DbValue::DateTime(date.and_hms_opt(0, 0, 0).unwrap()));
        let back = ResultDecoder::coerce(dt, SemanticType::Date).unwrap();
        assert_eq!(back, DbValue::Date(date));
    }

    #[test]
    fn object_passes_through() {
        let v = DbValue::Binary(vec![1, 2]);
        assert_eq!(ResultDecoder::coerce(v.clone(), SemanticType::Object).unwrap(), v);
    }
}
