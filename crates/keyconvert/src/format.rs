//! Import/export formats

use std::{fmt, str::FromStr};

use keyconvert_crypto::JWK;
use serde::{Deserialize, Serialize};

use crate::errors::KeyConvertError;

/// Every external format the engine can import from or export to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Format {
    /// Hex of the private scalar or the public point
    Hex,
    /// Provider raw export (public point, or the private scalar)
    Raw,
    /// Provider raw export of the private scalar only
    RawPrivate,
    /// BIP39 mnemonic of the private scalar
    Mnemonic,
    /// Wallet Import Format
    Wif,
    Pkcs8,
    /// SEC1 `EC PRIVATE KEY`
    Pkcs1,
    Ssh,
    Jwk,
    Spki,
}

impl Format {
    /// Formats delegated straight to the provider's export
    pub fn is_pass_through(&self) -> bool {
        matches!(self, Format::Raw | Format::RawPrivate | Format::Spki)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Format::Hex => "hex",
            Format::Raw => "raw",
            Format::RawPrivate => "raw:private",
            Format::Mnemonic => "mnemonic",
            Format::Wif => "wif",
            Format::Pkcs8 => "pkcs8",
            Format::Pkcs1 => "pkcs1",
            Format::Ssh => "ssh",
            Format::Jwk => "jwk",
            Format::Spki => "spki",
        }
    }
}

impl FromStr for Format {
    type Err = KeyConvertError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "hex" => Ok(Format::Hex),
            "raw" => Ok(Format::Raw),
            "raw:private" => Ok(Format::RawPrivate),
            "mnemonic" | "bip39" => Ok(Format::Mnemonic),
            "wif" => Ok(Format::Wif),
            "pkcs8" => Ok(Format::Pkcs8),
            "pkcs1" => Ok(Format::Pkcs1),
            "ssh" => Ok(Format::Ssh),
            "jwk" => Ok(Format::Jwk),
            "spki" => Ok(Format::Spki),
            _ => Err(KeyConvertError::UnknownEncoding(value.to_string())),
        }
    }
}

impl TryFrom<String> for Format {
    type Error = KeyConvertError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Format> for String {
    fn from(format: Format) -> Self {
        format.name().to_string()
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Result of an export
#[derive(Debug, Clone)]
pub enum ExportOutput {
    Text(String),
    Bytes(Vec<u8>),
    KeyObject(JWK),
}

impl ExportOutput {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ExportOutput::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            ExportOutput::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_key_object(&self) -> Option<&JWK> {
        match self {
            ExportOutput::KeyObject(jwk) => Some(jwk),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_roundtrip() {
        for format in [
            Format::Hex,
            Format::Raw,
            Format::RawPrivate,
            Format::Mnemonic,
            Format::Wif,
            Format::Pkcs8,
            Format::Pkcs1,
            Format::Ssh,
            Format::Jwk,
            Format::Spki,
        ] {
            assert_eq!(format.to_string().parse::<Format>().unwrap(), format);
        }
    }

    #[test]
    fn mnemonic_alias() {
        assert_eq!("bip39".parse::<Format>().unwrap(), Format::Mnemonic);
        assert_eq!("BIP39".parse::<Format>().unwrap(), Format::Mnemonic);
        assert_eq!(Format::Mnemonic.to_string(), "mnemonic");
    }

    #[test]
    fn pass_through() {
        assert!(Format::Spki.is_pass_through());
        assert!(!Format::Pkcs8.is_pass_through());
        assert!(!Format::Jwk.is_pass_through());
    }

    #[test]
    fn unknown_name() {
        assert!(matches!(
            "base58".parse::<Format>().unwrap_err(),
            KeyConvertError::UnknownEncoding(_)
        ));
    }
}
