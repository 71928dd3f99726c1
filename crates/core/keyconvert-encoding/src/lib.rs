//! Text codecs used by keyconvert
//!
//! This crate provides the encoding primitives the conversion engine delegates to:
//! - Wallet Import Format (WIF) encoding/decoding of private scalars
//! - BIP39 mnemonic encoding/decoding of entropy
//! - PEM framing and private key marker detection

pub mod mnemonic;
pub mod pem;
pub mod wif;

pub use mnemonic::{entropy_to_mnemonic, mnemonic_to_entropy};
pub use wif::{COMPRESSED_FLAG, MAINNET_PRIVATE_KEY_VERSION, Wif};

mod error;
pub use error::EncodingError;
