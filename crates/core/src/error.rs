#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Encryption key must resolve to 32 bytes, got {actual}")]
    KeyLength { actual: usize },

    #[error("Encrypted payload is too short ({len} bytes); expected a 16-byte IV followed by ciphertext")]
    PayloadTooShort { len: usize },

    #[error("Failed to decrypt dataset: {0}. Check that ANNOTATION_DATASET_KEY matches the key used to encrypt the file")]
    Decryption(String),

    #[error("Annotation dataset not found; tried: {}", .candidates.join(", "))]
    DatasetNotFound { candidates: Vec<String> },

    #[error("Annotation dataset is invalid: {0}")]
    DatasetInvalid(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Short, stable name of the error kind for structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::KeyLength { .. } => "key_length",
            Self::PayloadTooShort { .. } => "payload_too_short",
            Self::Decryption(_) => "decryption",
            Self::DatasetNotFound { .. } => "dataset_not_found",
            Self::DatasetInvalid(_) => "dataset_invalid",
            Self::Validation(_) => "validation",
            Self::Internal(_) => "internal",
        }
    }
}
