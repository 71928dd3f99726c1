/*!
 * Conversion engine errors and handling/conversion
 */

use keyconvert_crypto::CryptoError;
use keyconvert_encoding::EncodingError;
use thiserror::Error;

/// Key conversion errors
///
/// Every failure is terminal, nothing is retried internally.
#[derive(Error, Debug)]
pub enum KeyConvertError {
    /// Private material was requested but no private key is committed
    #[error("No Private Key")]
    NoPrivateKey,

    /// Public material was requested but no public key is committed
    #[error("No Public Key")]
    NoPublicKey,

    /// The format exists but not for this key type
    #[error("{format} format is not available for KeyType {key_type}")]
    UnsupportedFormat { format: String, key_type: String },

    /// Import input couldn't be classified
    #[error("Unknown Private Key Encoding: {0}")]
    UnknownEncoding(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Certificate error: {0}")]
    Certificate(String),

    #[error("Provider error: {0}")]
    Provider(#[from] CryptoError),
}

pub type Result<T> = std::result::Result<T, KeyConvertError>;

impl KeyConvertError {
    pub(crate) fn unsupported(format: impl ToString, key_type: impl ToString) -> Self {
        KeyConvertError::UnsupportedFormat {
            format: format.to_string(),
            key_type: key_type.to_string(),
        }
    }
}

impl From<EncodingError> for KeyConvertError {
    fn from(error: EncodingError) -> Self {
        KeyConvertError::MalformedInput(error.to_string())
    }
}

impl From<rcgen::Error> for KeyConvertError {
    fn from(error: rcgen::Error) -> Self {
        KeyConvertError::Certificate(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_format_message() {
        let error = KeyConvertError::unsupported("mnemonic", "public");
        assert_eq!(
            error.to_string(),
            "mnemonic format is not available for KeyType public"
        );
    }

    #[test]
    fn encoding_errors_are_malformed_input() {
        let error: KeyConvertError = EncodingError::InvalidLength(12).into();
        assert!(matches!(error, KeyConvertError::MalformedInput(_)));
    }
}
