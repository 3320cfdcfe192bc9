use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeDelta};
use uuid::Uuid;

use crate::decoder::ResultDecoder;
use crate::error::SqlCommandError;
use crate::types::{DbValue, SemanticType};

use super::row::DbRow;

/// Native types a single column value can be decoded into.
pub trait FromDbValue: Sized {
    /// # Errors
    /// `Conversion` when the value is NULL or cannot represent `Self`.
    fn from_db_value(value: &DbValue) -> Result<Self, SqlCommandError>;
}

/// Types a whole row can be decoded into.
///
/// Scalars read the first column; tuples read columns positionally; `DbRow` keeps the row as is.
pub trait FromDbRow: Sized {
    /// # Errors
    /// `Conversion` when a column is missing or has the wrong type.
    fn from_db_row(row: &DbRow) -> Result<Self, SqlCommandError>;
}

fn null_error<T>() -> SqlCommandError {
    SqlCommandError::Conversion(format!(
        "unexpected NULL for non-optional {}",
        std::any::type_name::<T>()
    ))
}

macro_rules! impl_from_db_value {
    ($($native:ty => $semantic:ident :: $variant:ident),* $(,)?) => {
        $(
            impl FromDbValue for $native {
                fn from_db_value(value: &DbValue) -> Result<Self, SqlCommandError> {
                    match ResultDecoder::coerce(value.clone(), SemanticType::$semantic)? {
                        DbValue::$variant(v) => Ok(v),
                        DbValue::Null => Err(null_error::<$native>()),
                        other => Err(SqlCommandError::Conversion(format!(
                            "expected {} but decoded {other:?}",
                            SemanticType::$semantic
                        ))),
                    }
                }
            }

            impl FromDbRow for $native {
                fn from_db_row(row: &DbRow) -> Result<Self, SqlCommandError> {
                    first_column(row)
                }
            }
        )*
    };
}

impl_from_db_value!(
    String => Text::Text,
    Vec<u8> => Binary::Binary,
    bool => Boolean::Bool,
    i8 => Int8::I8,
    i16 => Int16::I16,
    i32 => Int32::I32,
    i64 => Int64::I64,
    u8 => UInt8::U8,
    u16 => UInt16::U16,
    u32 => UInt32::U32,
    u64 => UInt64::U64,
    f32 => Float32::F32,
    f64 => Float64::F64,
    BigDecimal => Decimal::Decimal,
    NaiveDate => Date::Date,
    NaiveDateTime => DateTime::DateTime,
    DateTime<FixedOffset> => DateTimeOffset::DateTimeOffset,
    TimeDelta => TimeSpan::TimeSpan,
    Uuid => Guid::Guid,
);

impl FromDbValue for DbValue {
    fn from_db_value(value: &DbValue) -> Result<Self, SqlCommandError> {
        Ok(value.clone())
    }
}

impl<T: FromDbValue> FromDbValue for Option<T> {
    fn from_db_value(value: &DbValue) -> Result<Self, SqlCommandError> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_db_value(value).map(Some)
        }
    }
}

impl<T: FromDbValue> FromDbRow for Option<T> {
    fn from_db_row(row: &DbRow) -> Result<Self, SqlCommandError> {
        first_column(row)
    }
}

impl FromDbRow for DbValue {
    fn from_db_row(row: &DbRow) -> Result<Self, SqlCommandError> {
        first_column(row)
    }
}

impl FromDbRow for DbRow {
    fn from_db_row(row: &DbRow) -> Result<Self, SqlCommandError> {
        Ok(row.clone())
    }
}

fn first_column<T: FromDbValue>(row: &DbRow) -> Result<T, SqlCommandError> {
    column(row, 0)
}

/// Decode the column at `index`.
///
/// # Errors
/// `Conversion` when the row has no such column or the value does not fit.
pub fn column<T: FromDbValue>(row: &DbRow, index: usize) -> Result<T, SqlCommandError> {
    let value = row.get_by_index(index).ok_or_else(|| {
        SqlCommandError::Conversion(format!(
            "row has {} columns, column {index} requested",
            row.len()
        ))
    })?;
    T::from_db_value(value)
}

/// Decode the column called `name`.
///
/// # Errors
/// `Conversion` when the row has no such column or the value does not fit.
pub fn named_column<T: FromDbValue>(row: &DbRow, name: &str) -> Result<T, SqlCommandError> {
    let value = row
        .get(name)
        .ok_or_else(|| SqlCommandError::Conversion(format!("row has no column {name}")))?;
    T::from_db_value(value)
}

macro_rules! impl_from_db_row_tuple {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name: FromDbValue),+> FromDbRow for ($($name,)+) {
            fn from_db_row(row: &DbRow) -> Result<Self, SqlCommandError> {
                Ok(($(column::<$name>(row, $idx)?,)+))
            }
        }
    };
}

impl_from_db_row_tuple!(A: 0, B: 1);
impl_from_db_row_tuple!(A: 0, B: 1, C: 2);
impl_from_db_row_tuple!(A: 0, B: 1, C: 2, D: 3);
impl_from_db_row_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4);
impl_from_db_row_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::ResultSet;

    #[test]
    fn scalars_read_first_column() {
        let rs = ResultSet::with_columns(["n", "s"]).row(vec![DbValue::I64(3), DbValue::from("x")]);
        assert_eq!(i32::from_db_row(&rs.results[0]).unwrap(), 3);
        let pair: (i64, String) = FromDbRow::from_db_row(&rs.results[0]).unwrap();
        assert_eq!(pair, (3, "x".to_string()));
    }

    #[test]
    fn null_needs_option() {
        let rs = ResultSet::with_columns(["n"]).row(vec![DbValue::Null]);
        assert!(i32::from_db_row(&rs.results[0]).is_err());
        assert_eq!(Option::<i32>::from_db_row(&rs.results[0]).unwrap(), None);
    }

    #[test]
    fn named_lookup() {
        let rs = ResultSet::with_columns(["id", "name"])
            .row(vec![DbValue::I32(1), DbValue::from("a")]);
        let name: String = named_column(&rs.results[0], "name").unwrap();
        assert_eq!(name, "a");
        assert!(named_column::<String>(&rs.results[0], "nope").is_err());
    }
}
