//! Error types for cryptographic operations

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Key error: {0}")]
    KeyError(String),

    #[error("Decoding error: {0}")]
    Decoding(String),

    #[error("Unsupported key type: {0}")]
    UnsupportedKeyType(String),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Key is not extractable")]
    NotExtractable,

    #[error("Key usage ({0}) is not permitted for this key")]
    UsageNotPermitted(String),

    #[error("Encoding error: {0}")]
    Encoding(#[from] keyconvert_encoding::EncodingError),
}

pub type Result<T> = std::result::Result<T, CryptoError>;
