//! Errors raised while reading, writing or encoding dynamic values

#[derive(Debug, thiserror::Error)]
pub enum TfplugError {
    #[error("Attribute not found: {0}")]
    AttributeNotFound(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Decoding error: {0}")]
    DecodingError(String),

    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// The path walks through a value that has no such attribute, key or index
    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

pub type Result<T> = std::result::Result<T, TfplugError>;

impl TfplugError {
    /// True when the error only says the attribute is absent from the value
    pub fn is_not_found(&self) -> bool {
        matches!(self, TfplugError::AttributeNotFound(_))
    }
}
