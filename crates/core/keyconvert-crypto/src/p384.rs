//! P-384 (secp384r1) key operations

use p384::{
    EncodedPoint, PublicKey, SecretKey,
    ecdsa::{
        Signature, SigningKey, VerifyingKey,
        signature::{Signer, Verifier},
    },
    elliptic_curve::sec1::ToEncodedPoint,
    pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey},
};
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use crate::{CryptoError, Curve, JWK, KeyPair, error::Result};

/// Generates a P-384 key pair, optionally from an existing secret scalar
pub fn generate(secret: Option<&[u8]>) -> Result<KeyPair> {
    let signing_key = match secret {
        Some(secret) => SigningKey::from_slice(secret).map_err(|e| {
            CryptoError::KeyError(format!("P-384 secret material isn't valid: {e}"))
        })?,
        None => SigningKey::random(&mut OsRng),
    };

    let private_bytes = Zeroizing::new(signing_key.to_bytes().to_vec());
    let point = signing_key.verifying_key().to_encoded_point(false);
    let (x, y) = coordinates(&point)?;

    Ok(KeyPair {
        curve: Curve::P384,
        jwk: JWK::ec(Curve::P384, x, y, Some(&private_bytes)),
        private_bytes,
        public_bytes: point.as_bytes().to_vec(),
    })
}

/// Generates a public JWK from P-384 raw bytes (compressed or uncompressed)
pub fn public_jwk(data: &[u8]) -> Result<JWK> {
    let point = public_key(data)?.to_encoded_point(false);
    let (x, y) = coordinates(&point)?;
    Ok(JWK::ec(Curve::P384, x, y, None))
}

/// Checks the point is on the curve, returning it uncompressed
pub fn validate_public(data: &[u8]) -> Result<Vec<u8>> {
    Ok(public_key(data)?.to_encoded_point(false).as_bytes().to_vec())
}

/// SEC1 compressed form of a point
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    Ok(public_key(data)?.to_encoded_point(true).as_bytes().to_vec())
}

pub fn private_to_pkcs8(secret: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    let der = secret_key(secret)?
        .to_pkcs8_der()
        .map_err(|e| CryptoError::Format(format!("Couldn't encode P-384 PKCS8: {e}")))?;
    Ok(Zeroizing::new(der.as_bytes().to_vec()))
}

pub fn private_from_pkcs8(der: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    let key = SecretKey::from_pkcs8_der(der)
        .map_err(|e| CryptoError::Format(format!("Invalid P-384 PKCS8 private key: {e}")))?;
    Ok(Zeroizing::new(key.to_bytes().to_vec()))
}

/// SEC1 `ECPrivateKey` DER
pub fn private_to_sec1(secret: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    secret_key(secret)?
        .to_sec1_der()
        .map_err(|e| CryptoError::Format(format!("Couldn't encode P-384 SEC1: {e}")))
}

pub fn private_from_sec1(der: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    let key = SecretKey::from_sec1_der(der)
        .map_err(|e| CryptoError::Format(format!("Invalid P-384 SEC1 private key: {e}")))?;
    Ok(Zeroizing::new(key.to_bytes().to_vec()))
}

pub fn public_to_spki(data: &[u8]) -> Result<Vec<u8>> {
    let der = public_key(data)?
        .to_public_key_der()
        .map_err(|e| CryptoError::Format(format!("Couldn't encode P-384 SPKI: {e}")))?;
    Ok(der.as_bytes().to_vec())
}

pub fn public_from_spki(der: &[u8]) -> Result<Vec<u8>> {
    let key = PublicKey::from_public_key_der(der)
        .map_err(|e| CryptoError::Format(format!("Invalid P-384 SPKI public key: {e}")))?;
    Ok(key.to_encoded_point(false).as_bytes().to_vec())
}

/// ECDSA/SHA-384 signature as fixed size `r || s`
pub fn sign(secret: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let signing_key = SigningKey::from_slice(secret)
        .map_err(|e| CryptoError::KeyError(format!("P-384 secret material isn't valid: {e}")))?;
    let signature: Signature = signing_key.sign(data);
    Ok(signature.to_bytes().to_vec())
}

pub fn verify(public: &[u8], data: &[u8], signature: &[u8]) -> Result<bool> {
    let verifying_key = VerifyingKey::from_sec1_bytes(public)
        .map_err(|e| CryptoError::KeyError(format!("P-384 public key isn't valid: {e}")))?;
    let signature = Signature::from_slice(signature)
        .map_err(|e| CryptoError::Decoding(format!("Invalid P-384 signature: {e}")))?;
    Ok(verifying_key.verify(data, &signature).is_ok())
}

fn secret_key(secret: &[u8]) -> Result<SecretKey> {
    SecretKey::from_slice(secret)
        .map_err(|e| CryptoError::KeyError(format!("P-384 secret material isn't valid: {e}")))
}

fn public_key(data: &[u8]) -> Result<PublicKey> {
    PublicKey::from_sec1_bytes(data)
        .map_err(|e| CryptoError::KeyError(format!("P-384 public key isn't valid: {e}")))
}

fn coordinates(point: &EncodedPoint) -> Result<(&[u8], &[u8])> {
    let x = point
        .x()
        .ok_or_else(|| CryptoError::KeyError("Couldn't get X coordinate".into()))?;
    let y = point
        .y()
        .ok_or_else(|| CryptoError::KeyError("Couldn't get Y coordinate".into()))?;
    Ok((x.as_slice(), y.as_slice()))
}

#[cfg(test)]
mod tests {
    use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD};

    use super::*;

    const D: &str = "sbb1acpuGPO2P3-aAchoUO5Ghs9Iyecm52HgcvVWR58Pmd-uvKZd-38OhCNCiaNd";
    const X: &str = "zBTXJl2R0sjxCYxvq6_eQovQWTyZUlv5wMWV857GNvYT39h7AMCPCVRrH9l6qVfb";
    const Y: &str = "meSAqJ1ycBRzuA2FwKjHWDT6BaDufqxADi6GMSqbCTvZzb0qxgHKdXCXHcbl1EPv";

    #[test]
    fn generate_from_secret() {
        let secret_bytes = BASE64_URL_SAFE_NO_PAD.decode(D).unwrap();
        let keypair = generate(Some(&secret_bytes)).unwrap();

        assert_eq!(keypair.jwk.d(), Some(D));
        assert_eq!(keypair.jwk.x(), X);
        assert_eq!(keypair.jwk.y(), Some(Y));
        assert_eq!(keypair.public_bytes.len(), 97);
    }

    #[test]
    fn public_jwk_from_compressed() {
        let secret_bytes = BASE64_URL_SAFE_NO_PAD.decode(D).unwrap();
        let keypair = generate(Some(&secret_bytes)).unwrap();
        let compressed = compress(&keypair.public_bytes).unwrap();

        let jwk = public_jwk(&compressed).unwrap();
        assert_eq!(jwk.curve_name(), "P-384");
        assert!(jwk.d().is_none());
        assert_eq!(jwk.x(), X);
        assert_eq!(jwk.y(), Some(Y));
    }

    #[test]
    fn invalid_point() {
        assert!(matches!(
            validate_public(&[4u8; 97]).unwrap_err(),
            CryptoError::KeyError(_)
        ));
    }

    #[test]
    fn pkcs8_and_sec1() {
        let secret = BASE64_URL_SAFE_NO_PAD.decode(D).unwrap();

        let pkcs8 = private_to_pkcs8(&secret).unwrap();
        assert_eq!(private_from_pkcs8(&pkcs8).unwrap().as_slice(), secret.as_slice());

        let sec1 = private_to_sec1(&secret).unwrap();
        assert_eq!(private_from_sec1(&sec1).unwrap().as_slice(), secret.as_slice());
    }

    #[test]
    fn spki() {
        let keypair = generate(None).unwrap();
        let der = public_to_spki(&keypair.public_bytes).unwrap();
        assert_eq!(public_from_spki(&der).unwrap(), keypair.public_bytes);
    }

    #[test]
    fn sign_verify() {
        let keypair = generate(None).unwrap();
        let signature = sign(&keypair.private_bytes, b"hello").unwrap();

        assert_eq!(signature.len(), 96);
        assert!(verify(&keypair.public_bytes, b"hello", &signature).unwrap());
        assert!(!verify(&keypair.public_bytes, b"goodbye", &signature).unwrap());
    }
}
