//! secp256k1 key operations

use k256::{
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

/// Generates a secp256k1 key pair, optionally from an existing secret scalar
pub fn generate(secret: Option<&[u8]>) -> Result<KeyPair> {
    let signing_key = match secret {
        Some(secret) => SigningKey::from_slice(secret).map_err(|e| {
            CryptoError::KeyError(format!("secp256k1 secret material isn't valid: {e}"))
        })?,
        None => SigningKey::random(&mut OsRng),
    };

    let private_bytes = Zeroizing::new(signing_key.to_bytes().to_vec());
    let point = signing_key.verifying_key().to_encoded_point(false);
    let (x, y) = coordinates(&point)?;

    Ok(KeyPair {
        curve: Curve::Secp256k1,
        jwk: JWK::ec(Curve::Secp256k1, x, y, Some(&private_bytes)),
        private_bytes,
        public_bytes: point.as_bytes().to_vec(),
    })
}

/// Generates a public JWK from secp256k1 raw bytes (compressed or uncompressed)
pub fn public_jwk(data: &[u8]) -> Result<JWK> {
    let point = public_key(data)?.to_encoded_point(false);
    let (x, y) = coordinates(&point)?;
    Ok(JWK::ec(Curve::Secp256k1, x, y, None))
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
        .map_err(|e| CryptoError::Format(format!("Couldn't encode secp256k1 PKCS8: {e}")))?;
    Ok(Zeroizing::new(der.as_bytes().to_vec()))
}

pub fn private_from_pkcs8(der: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    let key = SecretKey::from_pkcs8_der(der)
        .map_err(|e| CryptoError::Format(format!("Invalid secp256k1 PKCS8 private key: {e}")))?;
    Ok(Zeroizing::new(key.to_bytes().to_vec()))
}

/// SEC1 `ECPrivateKey` DER
pub fn private_to_sec1(secret: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    secret_key(secret)?
        .to_sec1_der()
        .map_err(|e| CryptoError::Format(format!("Couldn't encode secp256k1 SEC1: {e}")))
}

pub fn private_from_sec1(der: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    let key = SecretKey::from_sec1_der(der)
        .map_err(|e| CryptoError::Format(format!("Invalid secp256k1 SEC1 private key: {e}")))?;
    Ok(Zeroizing::new(key.to_bytes().to_vec()))
}

pub fn public_to_spki(data: &[u8]) -> Result<Vec<u8>> {
    let der = public_key(data)?
        .to_public_key_der()
        .map_err(|e| CryptoError::Format(format!("Couldn't encode secp256k1 SPKI: {e}")))?;
    Ok(der.as_bytes().to_vec())
}

pub fn public_from_spki(der: &[u8]) -> Result<Vec<u8>> {
    let key = PublicKey::from_public_key_der(der)
        .map_err(|e| CryptoError::Format(format!("Invalid secp256k1 SPKI public key: {e}")))?;
    Ok(key.to_encoded_point(false).as_bytes().to_vec())
}

/// ECDSA/SHA-256 signature as fixed size `r || s`
pub fn sign(secret: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let signing_key = SigningKey::from_slice(secret)
        .map_err(|e| CryptoError::KeyError(format!("secp256k1 secret material isn't valid: {e}")))?;
    let signature: Signature = signing_key.sign(data);
    Ok(signature.to_bytes().to_vec())
}

pub fn verify(public: &[u8], data: &[u8], signature: &[u8]) -> Result<bool> {
    let verifying_key = VerifyingKey::from_sec1_bytes(public)
        .map_err(|e| CryptoError::KeyError(format!("secp256k1 public key isn't valid: {e}")))?;
    let signature = Signature::from_slice(signature)
        .map_err(|e| CryptoError::Decoding(format!("Invalid secp256k1 signature: {e}")))?;
    Ok(verifying_key.verify(data, &signature).is_ok())
}

fn secret_key(secret: &[u8]) -> Result<SecretKey> {
    SecretKey::from_slice(secret)
        .map_err(|e| CryptoError::KeyError(format!("secp256k1 secret material isn't valid: {e}")))
}

fn public_key(data: &[u8]) -> Result<PublicKey> {
    PublicKey::from_sec1_bytes(data)
        .map_err(|e| CryptoError::KeyError(format!("secp256k1 public key isn't valid: {e}")))
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
