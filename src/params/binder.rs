use tracing::trace;

use crate::types::{DbValue, ParameterDirection, SemanticType};

use super::{Parameter, ParameterList};

/// Optional per-field overrides consulted when a record is bound.
///
/// Every override is optional; whatever is left unset falls back to the binder defaults.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldMeta {
    pub visible: Option<bool>,
    pub parameter_name: Option<String>,
    pub semantic_type: Option<SemanticType>,
    pub direction: Option<ParameterDirection>,
    pub size: Option<u32>,
}

impl FieldMeta {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata that keeps the field out of the parameter list.
    #[must_use]
    pub fn hidden() -> Self {
        Self {
            visible: Some(false),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    #[must_use]
    pub fn name(mut self, parameter_name: impl Into<String>) -> Self {
        self.parameter_name = Some(parameter_name.into());
        self
    }

    #[must_use]
    pub fn semantic_type(mut self, semantic_type: SemanticType) -> Self {
        self.semantic_type = Some(semantic_type);
        self
    }

    #[must_use]
    pub fn direction(mut self, direction: ParameterDirection) -> Self {
        self.direction = Some(direction);
        self
    }

    #[must_use]
    pub fn size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }
}

/// One field of a record, as exposed to the binder.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordField {
    pub field_name: &'static str,
    pub value: DbValue,
    pub meta: Option<FieldMeta>,
}

impl RecordField {
    #[must_use]
    pub fn new(field_name: &'static str, value: impl Into<DbValue>) -> Self {
        Self {
            field_name,
            value: value.into(),
            meta: None,
        }
    }

    #[must_use]
    pub fn with_meta(mut self, meta: FieldMeta) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// Records that can be turned into a parameter list.
///
/// Implement by hand or with [`impl_parameter_record!`](crate::impl_parameter_record). Fields are
/// reported in declaration order.
pub trait ParameterRecord {
    fn parameter_fields(&self) -> Vec<RecordField>;
}

/// Builds parameter lists from records.
#[derive(Debug, Clone)]
pub struct ParameterBinder {
    prefix: String,
}

impl Default for ParameterBinder {
    fn default() -> Self {
        Self {
            prefix: "@".to_owned(),
        }
    }
}

impl ParameterBinder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binder that derives default names as `prefix + field_name`.
    #[must_use]
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Produce one parameter per visible field, in field order.
    #[must_use]
    pub fn bind<R: ParameterRecord + ?Sized>(&self, record: &R) -> ParameterList {
        record
            .parameter_fields()
            .into_iter()
            .filter_map(|field| self.bind_field(field))
            .collect()
    }

    fn bind_field(&self, field: RecordField) -> Option<Parameter> {
        let Some(meta) = field.meta else {
            // unannotated fields still bind, with every default
            return Some(Parameter::new(
                format!("{}{}", self.prefix, field.field_name),
                field.value,
            ));
        };

        if meta.visible == Some(false) {
            trace!(field = field.field_name, "skipping hidden field");
            return None;
        }

        let name = meta
            .parameter_name
            .unwrap_or_else(|| format!("{}{}", self.prefix, field.field_name));
        let mut parameter = Parameter::new(name, field.value)
            .with_semantic_type(meta.semantic_type.unwrap_or(SemanticType::Object))
            .with_direction(meta.direction.unwrap_or_default());
        parameter.size = meta.size;
        Some(parameter)
    }
}
