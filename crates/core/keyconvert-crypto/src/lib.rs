//! Curves, key objects and the key provider capability for keyconvert
//!
//! This crate provides:
//! - JWK (JSON Web Key) types per RFC 7517
//! - Curve identity and EC/OKP family classification
//! - Key operations for Ed25519, P-256, P-384 and secp256k1 (generation,
//!   PKCS8/SEC1/SPKI codecs, signing)
//! - The [`KeyProvider`] trait over opaque [`KeyHandle`]s, and the default
//!   [`NativeProvider`]

mod curve;
mod error;
mod jwk;
mod key_pair;
pub mod native;
pub mod ops;
pub mod provider;

pub mod ed25519;
pub mod p256;
pub mod p384;
pub mod secp256k1;

pub use curve::{Curve, CurveFamily};
pub use error::{CryptoError, Result};
pub use jwk::{ECParams, JWK, OctectParams, Params};
pub use key_pair::KeyPair;
pub use native::NativeProvider;
pub use provider::{
    ExportedKey, KeyData, KeyFormat, KeyHandle, KeyKind, KeyParams, KeyProvider, KeyUsage,
};
