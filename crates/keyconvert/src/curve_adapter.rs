//! Curve family classification and Edwards point derivation
//!
//! Only the OKP family needs an explicit scalar to point step here. EC points
//! are always derived by the provider on import.

use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD};
use keyconvert_crypto::{CryptoError, Curve, CurveFamily, JWK, OctectParams, Params, ed25519};

use crate::errors::Result;

#[derive(Debug, Clone, Copy)]
pub struct CurveAdapter {
    curve: Curve,
}

impl CurveAdapter {
    pub fn new(curve: Curve) -> Self {
        CurveAdapter { curve }
    }

    pub fn family(&self) -> CurveFamily {
        CurveFamily::classify(self.curve.name())
    }

    /// JWK `kty` tag for the curve
    pub fn kty(&self) -> &'static str {
        self.family().kty()
    }

    /// True when point derivation can't be left to the provider
    pub fn requires_point_derivation(&self) -> bool {
        self.family() == CurveFamily::OKP
    }

    /// Derives the public point from an Edwards seed, split into `x`/`y` halves
    pub fn derive_point(&self, seed: &[u8]) -> Result<(Vec<u8>, Vec<u8>)> {
        if !self.requires_point_derivation() {
            return Err(CryptoError::UnsupportedKeyType(format!(
                "{} points are derived by the provider",
                self.curve
            ))
            .into());
        }

        let point = ed25519::public_from_secret(seed)?;
        let (x, y) = point.split_at(point.len() / 2);
        Ok((x.to_vec(), y.to_vec()))
    }

    /// Structured key object for an Edwards seed, point split across `x`/`y`
    pub fn okp_jwk(&self, seed: &[u8]) -> Result<JWK> {
        let (x, y) = self.derive_point(seed)?;
        Ok(JWK {
            key_id: None,
            params: Params::OKP(OctectParams {
                curve: self.curve.name().to_string(),
                x: BASE64_URL_SAFE_NO_PAD.encode(x),
                y: Some(BASE64_URL_SAFE_NO_PAD.encode(y)),
                d: Some(BASE64_URL_SAFE_NO_PAD.encode(seed)),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 8032 section 7.1, test 1
    const SEED: &str = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";
    const PUBLIC: &str = "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a";

    #[test]
    fn classification() {
        assert_eq!(CurveAdapter::new(Curve::Secp256k1).kty(), "EC");
        assert_eq!(CurveAdapter::new(Curve::P256).kty(), "EC");
        assert_eq!(CurveAdapter::new(Curve::Ed25519).kty(), "OKP");
        assert!(!CurveAdapter::new(Curve::P384).requires_point_derivation());
    }

    #[test]
    fn derive_matches_reference() {
        let seed = hex::decode(SEED).unwrap();
        let (x, y) = CurveAdapter::new(Curve::Ed25519).derive_point(&seed).unwrap();

        assert_eq!(hex::encode(&x), PUBLIC[..32]);
        assert_eq!(hex::encode(&y), PUBLIC[32..]);
    }

    #[test]
    fn okp_jwk_is_split() {
        let seed = hex::decode(SEED).unwrap();
        let jwk = CurveAdapter::new(Curve::Ed25519).okp_jwk(&seed).unwrap();

        assert_eq!(jwk.kty(), "OKP");
        assert_eq!(hex::encode(jwk.public_bytes().unwrap()), PUBLIC);
        assert!(jwk.y().is_some());
    }

    #[test]
    fn ec_derivation_is_delegated() {
        assert!(
            CurveAdapter::new(Curve::Secp256k1)
                .derive_point(&[1u8; 32])
                .is_err()
        );
    }
}
