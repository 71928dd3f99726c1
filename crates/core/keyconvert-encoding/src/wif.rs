//! Wallet Import Format (WIF) encoding/decoding
//!
//! A WIF string is base58check over `version || private key || [0x01]`.
//! The optional trailing `0x01` flags that the matching public key is used
//! in compressed form.
//!
//! See: <https://en.bitcoin.it/wiki/Wallet_import_format>

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::EncodingError;

/// Version byte for mainnet private keys
pub const MAINNET_PRIVATE_KEY_VERSION: u8 = 0x80;

/// Trailing byte marking a compressed public key
pub const COMPRESSED_FLAG: u8 = 0x01;

/// Length of the private key carried in a WIF payload
pub const PRIVATE_KEY_LENGTH: usize = 32;

/// A decoded WIF payload
#[derive(Debug, Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Wif {
    pub version: u8,
    pub private_key: Vec<u8>,
    pub compressed: bool,
}

/// Encode a 32 byte private key as a WIF string
pub fn encode(version: u8, private_key: &[u8], compressed: bool) -> Result<String, EncodingError> {
    if private_key.len() != PRIVATE_KEY_LENGTH {
        return Err(EncodingError::InvalidLength(private_key.len()));
    }

    let mut payload = Zeroizing::new(Vec::with_capacity(PRIVATE_KEY_LENGTH + 1));
    payload.extend_from_slice(private_key);
    if compressed {
        payload.push(COMPRESSED_FLAG);
    }

    Ok(bs58::encode(payload.as_slice())
        .with_check_version(version)
        .into_string())
}

/// Decode a WIF string
///
/// If `expected_version` is set the version byte must match it.
pub fn decode(wif: &str, expected_version: Option<u8>) -> Result<Wif, EncodingError> {
    let data = Zeroizing::new(
        bs58::decode(wif.trim())
            .with_check(None)
            .into_vec()
            .map_err(|e| EncodingError::InvalidBase58(e.to_string()))?,
    );

    let compressed = match data.len() {
        33 => false,
        34 if data[33] == COMPRESSED_FLAG => true,
        34 => {
            return Err(EncodingError::Decoding(format!(
                "Invalid compression flag (0x{:02x})",
                data[33]
            )));
        }
        len => return Err(EncodingError::InvalidLength(len)),
    };

    let version = data[0];
    if let Some(expected) = expected_version
        && expected != version
    {
        return Err(EncodingError::InvalidVersion {
            expected,
            found: version,
        });
    }

    Ok(Wif {
        version,
        private_key: data[1..=PRIVATE_KEY_LENGTH].to_vec(),
        compressed,
    })
}
