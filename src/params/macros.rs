/// Implement [`ParameterRecord`](crate::params::ParameterRecord) for a struct by listing its
/// fields in declaration order, each with optional [`FieldMeta`](crate::params::FieldMeta).
///
/// Field values are cloned and converted with `Into<DbValue>`.
/// ```rust
/// use sql_command::impl_parameter_record;
/// use sql_command::prelude::*;
///
/// struct NewUser {
///     id: i32,
///     name: String,
///     password_hash: String,
/// }
///
/// impl_parameter_record!(NewUser {
///     id,
///     name => FieldMeta::new().name("@FullName"),
///     password_hash => FieldMeta::hidden(),
/// });
///
/// let user = NewUser { id: 1, name: "Ada".into(), password_hash: "x".into() };
/// let params = ParameterBinder::new().bind(&user);
/// assert_eq!(params.names(), vec!["@id".to_string(), "@FullName".to_string()]);
/// ```
#[macro_export]
macro_rules! impl_parameter_record {
    ($ty:ty { $($field:ident $(=> $meta:expr)?),* $(,)? }) => {
        impl $crate::params::ParameterRecord for $ty {
            fn parameter_fields(&self) -> ::std::vec::Vec<$crate::params::RecordField> {
                ::std::vec![
                    $(
                        $crate::params::RecordField::new(
                            stringify!($field),
                            ::std::clone::Clone::clone(&self.$field),
                        )
                        $(.with_meta($meta))?
                    ),*
                ]
            }
        }
    };
}
