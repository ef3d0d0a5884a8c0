//! Error types for the `loopcast-models` crate.

/// Errors produced when constructing model types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// A value that must carry content was empty or whitespace.
    #[error("{field} must not be empty")]
    EmptyValue {
        /// The name of the offending field.
        field: &'static str,
    },
}

/// Reject empty and whitespace-only values.
pub(crate) fn non_empty(field: &'static str, value: String) -> Result<String, ModelError> {
    if value.trim().is_empty() {
        Err(ModelError::EmptyValue { field })
    } else {
        Ok(value)
    }
}
