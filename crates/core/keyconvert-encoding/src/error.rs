//! Encoding errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncodingError {
    #[error("Invalid base58 encoding: {0}")]
    InvalidBase58(String),

    #[error("Invalid version byte: expected 0x{expected:02x}, got 0x{found:02x}")]
    InvalidVersion { expected: u8, found: u8 },

    #[error("Invalid payload length: {0}")]
    InvalidLength(usize),

    #[error("Mnemonic error: {0}")]
    Mnemonic(String),

    #[error("Decoding error: {0}")]
    Decoding(String),

    #[error("PEM error: {0}")]
    Pem(#[from] pem_rfc7468::Error),
}
