//! Curve dispatched key operations
//!
//! Thin routing over the per-curve modules so callers can work from a
//! [`Curve`] value instead of naming a module.

use zeroize::Zeroizing;

use crate::{CryptoError, Curve, JWK, KeyPair, ed25519, error::Result, p256, p384, secp256k1};

macro_rules! dispatch {
    ($curve:expr, $func:ident ( $($arg:expr),* )) => {
        match $curve {
            Curve::Ed25519 => ed25519::$func($($arg),*),
            Curve::P256 => p256::$func($($arg),*),
            Curve::P384 => p384::$func($($arg),*),
            Curve::Secp256k1 => secp256k1::$func($($arg),*),
        }
    };
}

/// Generates a key pair, from `secret` when given
pub fn generate(curve: Curve, secret: Option<&[u8]>) -> Result<KeyPair> {
    if let Some(secret) = secret
        && secret.len() != curve.scalar_len()
    {
        return Err(CryptoError::KeyError(format!(
            "{curve} private key must be {} bytes, got {}",
            curve.scalar_len(),
            secret.len()
        )));
    }
    dispatch!(curve, generate(secret))
}

/// Public JWK from a point encoding
pub fn public_jwk(curve: Curve, public: &[u8]) -> Result<JWK> {
    dispatch!(curve, public_jwk(public))
}

/// Validates a point, returning its canonical (uncompressed) encoding
pub fn validate_public(curve: Curve, public: &[u8]) -> Result<Vec<u8>> {
    dispatch!(curve, validate_public(public))
}

pub fn compress(curve: Curve, public: &[u8]) -> Result<Vec<u8>> {
    dispatch!(curve, compress(public))
}

pub fn private_to_pkcs8(curve: Curve, secret: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    dispatch!(curve, private_to_pkcs8(secret))
}

pub fn private_from_pkcs8(curve: Curve, der: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    dispatch!(curve, private_from_pkcs8(der))
}

/// SEC1 `ECPrivateKey` DER, EC curves only
pub fn private_to_sec1(curve: Curve, secret: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    match curve {
        Curve::Ed25519 => Err(no_sec1(curve)),
        Curve::P256 => p256::private_to_sec1(secret),
        Curve::P384 => p384::private_to_sec1(secret),
        Curve::Secp256k1 => secp256k1::private_to_sec1(secret),
    }
}

pub fn private_from_sec1(curve: Curve, der: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    match curve {
        Curve::Ed25519 => Err(no_sec1(curve)),
        Curve::P256 => p256::private_from_sec1(der),
        Curve::P384 => p384::private_from_sec1(der),
        Curve::Secp256k1 => secp256k1::private_from_sec1(der),
    }
}

pub fn public_to_spki(curve: Curve, public: &[u8]) -> Result<Vec<u8>> {
    dispatch!(curve, public_to_spki(public))
}

pub fn public_from_spki(curve: Curve, der: &[u8]) -> Result<Vec<u8>> {
    dispatch!(curve, public_from_spki(der))
}

pub fn sign(curve: Curve, secret: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    dispatch!(curve, sign(secret, data))
}

pub fn verify(curve: Curve, public: &[u8], data: &[u8], signature: &[u8]) -> Result<bool> {
    dispatch!(curve, verify(public, data, signature))
}

fn no_sec1(curve: Curve) -> CryptoError {
    CryptoError::UnsupportedKeyType(format!("{curve} keys have no SEC1 encoding"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURVES: [Curve; 4] = [Curve::Ed25519, Curve::P256, Curve::P384, Curve::Secp256k1];

    #[test]
    fn generate_every_curve() {
        for curve in CURVES {
            let keypair = generate(curve, None).unwrap();
            assert_eq!(keypair.curve, curve);
            assert_eq!(keypair.private_bytes.len(), curve.scalar_len());
            assert_eq!(keypair.jwk.curve().unwrap(), curve);
            assert_eq!(keypair.jwk.kty(), curve.family().kty());
        }
    }

    #[test]
    fn secret_length_checked() {
        assert!(matches!(
            generate(Curve::P256, Some(&[1u8; 31])).unwrap_err(),
            CryptoError::KeyError(_)
        ));
        assert!(matches!(
            generate(Curve::P384, Some(&[1u8; 32])).unwrap_err(),
            CryptoError::KeyError(_)
        ));
    }

    #[test]
    fn scalar_out_of_range() {
        assert!(generate(Curve::Secp256k1, Some(&[0u8; 32])).is_err());
        assert!(generate(Curve::P256, Some(&[0xffu8; 32])).is_err());
    }

    #[test]
    fn ed25519_has_no_sec1() {
        assert!(matches!(
            private_to_sec1(Curve::Ed25519, &[1u8; 32]).unwrap_err(),
            CryptoError::UnsupportedKeyType(_)
        ));
    }

    #[test]
    fn sign_verify_every_curve() {
        for curve in CURVES {
            let keypair = generate(curve, None).unwrap();
            let signature = sign(curve, &keypair.private_bytes, b"data").unwrap();
            assert!(verify(curve, &keypair.public_bytes, b"data", &signature).unwrap());
        }
    }
}
