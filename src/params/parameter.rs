use crate::types::{DbValue, ParameterDirection, SemanticType};

/// One bound value together with the metadata the driver needs to describe it.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Addressing key, including any prefix such as `@`
    pub name: String,
    pub value: DbValue,
    pub semantic_type: SemanticType,
    pub direction: ParameterDirection,
    /// Maximum length for text/binary parameters
    pub size: Option<u32>,
    pub precision: Option<u8>,
    pub scale: Option<u8>,
}

impl Parameter {
    /// Create a parameter with every piece of metadata left at its default.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<DbValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            semantic_type: SemanticType::Object,
            direction: ParameterDirection::In,
            size: None,
            precision: None,
            scale: None,
        }
    }

    /// Input parameter whose semantic type is taken from the value.
    #[must_use]
    pub fn input(name: impl Into<String>, value: impl Into<DbValue>) -> Self {
        let value = value.into();
        let semantic_type = value.semantic_type();
        Self {
            semantic_type,
            ..Self::new(name, value)
        }
    }

    /// Output-only parameter; the server supplies its value.
    #[must_use]
    pub fn output(name: impl Into<String>, semantic_type: SemanticType) -> Self {
        Self {
            semantic_type,
            direction: ParameterDirection::Out,
            ..Self::new(name, DbValue::Null)
        }
    }

    /// Parameter that is sent to the server and read back afterwards.
    #[must_use]
    pub fn in_out(
        name: impl Into<String>,
        value: impl Into<DbValue>,
        semantic_type: SemanticType,
    ) -> Self {
        Self {
            semantic_type,
            direction: ParameterDirection::InOut,
            ..Self::new(name, value)
        }
    }

    /// Synthetic slot for a procedure's integer status code.
    #[must_use]
    pub fn return_value(name: impl Into<String>) -> Self {
        Self {
            semantic_type: SemanticType::Int32,
            direction: ParameterDirection::ReturnValue,
            ..Self::new(name, DbValue::Null)
        }
    }

    #[must_use]
    pub fn with_semantic_type(mut self, semantic_type: SemanticType) -> Self {
        self.semantic_type = semantic_type;
        self
    }

    #[must_use]
    pub fn with_direction(mut self, direction: ParameterDirection) -> Self {
        self.direction = direction;
        self
    }

    #[must_use]
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    #[must_use]
    pub fn with_precision(mut self, precision: u8, scale: u8) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }

    /// Whether the server writes a value back into this parameter.
    #[must_use]
    pub fn is_output(&self) -> bool {
        self.direction.is_output()
    }
}
