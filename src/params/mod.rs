//! Parameters, parameter lists and record binding.

mod binder;
mod list;
mod macros;
mod parameter;

pub use binder::{FieldMeta, ParameterBinder, ParameterRecord, RecordField};
pub use list::ParameterList;
pub use parameter::Parameter;
