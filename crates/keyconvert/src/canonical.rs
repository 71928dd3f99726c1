//! Canonical key model shared by every conversion

use keyconvert_crypto::{Curve, CurveFamily, JWK, KeyHandle, ops};

use crate::errors::Result;

/// Explicit public key representation
///
/// For EC curves `x`/`y` are the affine coordinates. For Ed25519 they are
/// the first and second half of the 32 byte point encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    curve: Curve,
    compressed: Vec<u8>,
    x: Vec<u8>,
    y: Vec<u8>,
}

impl PublicKey {
    /// Builds the public key from a JWK's coordinates, validating the point
    pub fn from_jwk(jwk: &JWK) -> Result<Self> {
        let curve = jwk.curve()?;
        Self::from_point(curve, &jwk.public_bytes()?)
    }

    /// Builds the public key from a point encoding (compressed or not)
    pub fn from_point(curve: Curve, point: &[u8]) -> Result<Self> {
        let point = ops::validate_public(curve, point)?;
        let compressed = ops::compress(curve, &point)?;

        let (x, y) = match curve.family() {
            CurveFamily::EC => point[1..].split_at(curve.scalar_len()),
            CurveFamily::OKP => point.split_at(point.len() / 2),
        };

        Ok(PublicKey {
            curve,
            x: x.to_vec(),
            y: y.to_vec(),
            compressed,
        })
    }

    pub fn curve(&self) -> Curve {
        self.curve
    }

    /// SEC1 compressed point (EC) or the 32 byte point encoding (Ed25519)
    pub fn compressed(&self) -> &[u8] {
        &self.compressed
    }

    pub fn x(&self) -> &[u8] {
        &self.x
    }

    pub fn y(&self) -> &[u8] {
        &self.y
    }

    /// SEC1 uncompressed point (`04 || x || y`) for EC, the point encoding for Ed25519
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(1 + self.x.len() + self.y.len());
        if self.curve.family() == CurveFamily::EC {
            bytes.push(0x04);
        }
        bytes.extend_from_slice(&self.x);
        bytes.extend_from_slice(&self.y);
        bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

/// A committed key pair
///
/// Private material stays inside the provider's handles.
#[derive(Debug, Clone)]
pub struct CanonicalKey {
    pub(crate) curve: Curve,
    pub(crate) private: Option<KeyHandle>,
    pub(crate) public: Option<KeyHandle>,
    pub(crate) public_key: Option<PublicKey>,
}

impl CanonicalKey {
    pub fn curve(&self) -> Curve {
        self.curve
    }

    pub fn private(&self) -> Option<&KeyHandle> {
        self.private.as_ref()
    }

    pub fn public(&self) -> Option<&KeyHandle> {
        self.public.as_ref()
    }

    pub fn public_key(&self) -> Option<&PublicKey> {
        self.public_key.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ec_public_key() {
        let keypair = ops::generate(Curve::P384, None).unwrap();
        let public = PublicKey::from_jwk(&keypair.jwk).unwrap();

        assert_eq!(public.x().len(), 48);
        assert_eq!(public.y().len(), 48);
        assert_eq!(public.compressed().len(), 49);
        assert_eq!(public.to_bytes(), keypair.public_bytes);
        assert!(public.to_hex().starts_with("04"));
    }

    #[test]
    fn okp_public_key_halves() {
        let keypair = ops::generate(Curve::Ed25519, None).unwrap();
        let public = PublicKey::from_point(Curve::Ed25519, &keypair.public_bytes).unwrap();

        assert_eq!(public.x(), &keypair.public_bytes[..16]);
        assert_eq!(public.y(), &keypair.public_bytes[16..]);
        assert_eq!(public.compressed(), keypair.public_bytes.as_slice());
        assert_eq!(public.to_hex(), hex::encode(&keypair.public_bytes));
    }

    #[test]
    fn compressed_ec_point_accepted() {
        let keypair = ops::generate(Curve::Secp256k1, None).unwrap();
        let compressed = ops::compress(Curve::Secp256k1, &keypair.public_bytes).unwrap();

        let public = PublicKey::from_point(Curve::Secp256k1, &compressed).unwrap();
        assert_eq!(public.compressed(), compressed.as_slice());
        assert_eq!(public.to_bytes(), keypair.public_bytes);
    }
}
