use crate::error::SqlCommandError;

use super::from_row::FromDbRow;
use super::result_set::ResultSet;

/// How one declared result set of a multi-set call is decoded.
///
/// `Vec<T>` reads the whole sequence; `Option<T>` reads a single row (or none) and fails when the
/// set holds more than one.
pub trait ResultSlot: Sized {
    /// # Errors
    /// `MultipleRows` for a single-row slot over several rows; `Conversion` on decode failure.
    fn decode_slot(set: ResultSet) -> Result<Self, SqlCommandError>;
}

impl<T: FromDbRow> ResultSlot for Vec<T> {
    fn decode_slot(set: ResultSet) -> Result<Self, SqlCommandError> {
        set.results.iter().map(T::from_db_row).collect()
    }
}

impl<T: FromDbRow> ResultSlot for Option<T> {
    fn decode_slot(set: ResultSet) -> Result<Self, SqlCommandError> {
        match set.results.as_slice() {
            [] => Ok(None),
            [row] => T::from_db_row(row).map(Some),
            rows => Err(SqlCommandError::MultipleRows { rows: rows.len() }),
        }
    }
}

/// Ordered tuple of result-set slots, one per result set the command produces.
///
/// Implemented for tuples of 1 to 10 [`ResultSlot`]s; slot `n` is filled from the `n`th result
/// set, by position only.
pub trait ResultSlots: Sized {
    /// Number of result sets this shape consumes.
    const COUNT: usize;

    /// Decode `sets`, which holds exactly `COUNT` result sets in server order.
    ///
    /// # Errors
    /// `ResultSetExhausted` if fewer sets were supplied, otherwise the slot's decode error.
    fn decode_slots(sets: Vec<ResultSet>) -> Result<Self, SqlCommandError>;
}

fn next_set(
    sets: &mut std::vec::IntoIter<ResultSet>,
    slot: usize,
) -> Result<ResultSet, SqlCommandError> {
    sets.next()
        .ok_or(SqlCommandError::ResultSetExhausted { slot: slot + 1, available: slot })
}

macro_rules! impl_result_slots {
    ($count:expr; $($name:ident : $idx:tt),+) => {
        impl<$($name: ResultSlot),+> ResultSlots for ($($name,)+) {
            const COUNT: usize = $count;

            fn decode_slots(sets: Vec<ResultSet>) -> Result<Self, SqlCommandError> {
                let mut sets = sets.into_iter();
                Ok(($($name::decode_slot(next_set(&mut sets, $idx)?)?,)+))
            }
        }
    };
}

impl_result_slots!(1; A: 0);
impl_result_slots!(2; A: 0, B: 1);
impl_result_slots!(3; A: 0, B: 1, C: 2);
impl_result_slots!(4; A: 0, B: 1, C: 2, D: 3);
impl_result_slots!(5; A: 0, B: 1, C: 2, D: 3, E: 4);
impl_result_slots!(6; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
impl_result_slots!(7; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6);
impl_result_slots!(8; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7);
impl_result_slots!(9; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7, I: 8);
impl_result_slots!(10; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7, I: 8, J: 9);
