use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingRequiredField { field: String },

    #[error("Invalid value '{value}' for {field} (expected one of: {expected})")]
    InvalidEnumValue {
        field: String,
        value: String,
        expected: &'static str,
    },

    #[error("Invalid size '{value}' for {field} (expected <positive integer><K|M|G>, e.g. 500M)")]
    InvalidSizeFormat { field: String, value: String },

    #[error("Invalid duration '{value}' for {field} (expected <integer>[s|ms], e.g. 10s)")]
    InvalidDuration { field: String, value: String },

    #[error("Invalid type for {field}: expected {expected}")]
    InvalidType {
        field: String,
        expected: &'static str,
    },

    #[error("Value out of range for {field}: {reason}")]
    OutOfRange { field: String, reason: String },

    #[error("Invalid process name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Invalid environment variable '{key}' in {field}: {reason}")]
    InvalidEnvironment {
        field: String,
        key: String,
        reason: String,
    },

    #[error("Duplicate process name '{name}' (first defined at index {first_index})")]
    DuplicateName { name: String, first_index: usize },
}

impl ValidationError {
    /// Field the error refers to
    pub fn field(&self) -> &str {
        match self {
            Self::MissingRequiredField { field }
            | Self::InvalidEnumValue { field, .. }
            | Self::InvalidSizeFormat { field, .. }
            | Self::InvalidDuration { field, .. }
            | Self::InvalidType { field, .. }
            | Self::OutOfRange { field, .. }
            | Self::InvalidEnvironment { field, .. } => field,
            Self::InvalidName { .. } | Self::DuplicateName { .. } => "name",
        }
    }
}

/// Every problem found in one raw descriptor, in field order. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub(crate) fn new(errors: Vec<ValidationError>) -> Self {
        debug_assert!(!errors.is_empty());
        Self(errors)
    }

    pub fn first(&self) -> &ValidationError {
        &self.0[0]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<ValidationError> {
        self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
