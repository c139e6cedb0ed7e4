use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Critical configuration error: {0}")]
    CriticalConfiguration(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Parsing timeout: {0}")]
    ParsingTimeout(String),

    #[error("Memory limit exceeded: {0}")]
    MemoryLimitExceeded(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("Decryption error: {0}")]
    Decryption(String),

    #[error("Algorithm unavailable: {0}")]
    AlgorithmUnavailable(String),

    #[error("Hashing algorithm unavailable: {0}")]
    HashingAlgorithmUnavailable(String),

    #[error("Internal hashing error: {0}")]
    InternalHashing(String),

    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<std::io::Error> for CryptoError {
    fn from(e: std::io::Error) -> Self {
        CryptoError::Io(e.to_string())
    }
}

impl CryptoError {
    /// Whether the error belongs to the validation family: structural or
    /// semantic rejection of untrusted input. Always recoverable by the
    /// caller; never a process-level failure.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CryptoError::Validation(_)
                | CryptoError::ParsingTimeout(_)
                | CryptoError::MemoryLimitExceeded(_)
        )
    }
}
