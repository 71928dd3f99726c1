//! Key pair produced by the per-curve generators

use std::fmt;

use zeroize::Zeroizing;

use crate::{Curve, JWK};

/// Generated key pair with raw bytes and JWK representation
///
/// `public_bytes` is the SEC1 uncompressed point for EC curves and the
/// 32 byte point encoding for Ed25519.
#[derive(Clone)]
pub struct KeyPair {
    pub curve: Curve,
    pub private_bytes: Zeroizing<Vec<u8>>,
    pub public_bytes: Vec<u8>,
    pub jwk: JWK,
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("curve", &self.curve)
            .field("public_bytes", &self.public_bytes)
            .finish_non_exhaustive()
    }
}
