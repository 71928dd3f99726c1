//! Ed25519 key operations

use ed25519_dalek::{
    Signature, Signer, SigningKey, Verifier, VerifyingKey,
    pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey},
};
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use crate::{CryptoError, Curve, JWK, KeyPair, error::Result};

/// Length of an Ed25519 seed and of an encoded point
pub const KEY_LENGTH: usize = 32;

/// Generates an Ed25519 signing key pair, optionally from an existing seed
pub fn generate(seed: Option<&[u8]>) -> Result<KeyPair> {
    let signing_key = match seed {
        Some(seed) => signing_key(seed)?,
        None => SigningKey::generate(&mut OsRng),
    };

    let private_bytes = Zeroizing::new(signing_key.to_bytes().to_vec());
    let public_bytes = signing_key.verifying_key().to_bytes().to_vec();

    Ok(KeyPair {
        curve: Curve::Ed25519,
        jwk: JWK::okp(Curve::Ed25519, &public_bytes, Some(&private_bytes)),
        private_bytes,
        public_bytes,
    })
}

/// Derives the encoded public point from a 32 byte seed
pub fn public_from_secret(seed: &[u8]) -> Result<Vec<u8>> {
    Ok(signing_key(seed)?.verifying_key().to_bytes().to_vec())
}

/// Generates a public JWK from the 32 byte point encoding
pub fn public_jwk(data: &[u8]) -> Result<JWK> {
    let public = validate_public(data)?;
    Ok(JWK::okp(Curve::Ed25519, &public, None))
}

/// Checks the bytes decode to a valid Edwards point
pub fn validate_public(data: &[u8]) -> Result<Vec<u8>> {
    Ok(verifying_key(data)?.to_bytes().to_vec())
}

/// Ed25519 points are always compressed
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    validate_public(data)
}

pub fn private_to_pkcs8(seed: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    let der = signing_key(seed)?
        .to_pkcs8_der()
        .map_err(|e| CryptoError::Format(format!("Couldn't encode Ed25519 PKCS8: {e}")))?;
    Ok(Zeroizing::new(der.as_bytes().to_vec()))
}

pub fn private_from_pkcs8(der: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    let key = SigningKey::from_pkcs8_der(der)
        .map_err(|e| CryptoError::Format(format!("Invalid Ed25519 PKCS8 private key: {e}")))?;
    Ok(Zeroizing::new(key.to_bytes().to_vec()))
}

pub fn public_to_spki(data: &[u8]) -> Result<Vec<u8>> {
    let der = verifying_key(data)?
        .to_public_key_der()
        .map_err(|e| CryptoError::Format(format!("Couldn't encode Ed25519 SPKI: {e}")))?;
    Ok(der.as_bytes().to_vec())
}

pub fn public_from_spki(der: &[u8]) -> Result<Vec<u8>> {
    let key = VerifyingKey::from_public_key_der(der)
        .map_err(|e| CryptoError::Format(format!("Invalid Ed25519 SPKI public key: {e}")))?;
    Ok(key.to_bytes().to_vec())
}

pub fn sign(seed: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    Ok(signing_key(seed)?.sign(data).to_bytes().to_vec())
}

pub fn verify(public: &[u8], data: &[u8], signature: &[u8]) -> Result<bool> {
    let signature = Signature::from_slice(signature)
        .map_err(|e| CryptoError::Decoding(format!("Invalid Ed25519 signature: {e}")))?;
    Ok(verifying_key(public)?.verify(data, &signature).is_ok())
}

fn signing_key(seed: &[u8]) -> Result<SigningKey> {
    let seed: &[u8; KEY_LENGTH] = seed.try_into().map_err(|_| {
        CryptoError::KeyError(format!(
            "Ed25519 seed must be {KEY_LENGTH} bytes, got {}",
            seed.len()
        ))
    })?;
    Ok(SigningKey::from_bytes(seed))
}

fn verifying_key(data: &[u8]) -> Result<VerifyingKey> {
    let bytes: &[u8; KEY_LENGTH] = data.try_into().map_err(|_| {
        CryptoError::KeyError(format!(
            "Invalid public key byte length: expected {KEY_LENGTH}, got {}",
            data.len()
        ))
    })?;
    VerifyingKey::from_bytes(bytes)
        .map_err(|e| CryptoError::KeyError(format!("Couldn't create ED25519 VerifyingKey: {e}")))
}

#[cfg(test)]
mod tests {
    use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD};

    use super::*;

    // RFC 8032 section 7.1, test 1
    const RFC_SEED: &str = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";
    const RFC_PUBLIC: &str = "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a";

    #[test]
    fn public_from_rfc8032_seed() {
        let seed = hex::decode(RFC_SEED).unwrap();
        assert_eq!(
            public_from_secret(&seed).unwrap(),
            hex::decode(RFC_PUBLIC).unwrap()
        );
    }

    #[test]
    fn generate_from_seed() {
        let d = "X20biMbNG8QUQDnBv4RrZzkS3Civfc2zWHcDkeUeS9g";
        let x = "yb2ttOBWPH2qO-oTrFGs8mgw3cu0nCfjnPt-q9dag7E";

        let seed = BASE64_URL_SAFE_NO_PAD.decode(d).unwrap();
        let keypair = generate(Some(&seed)).unwrap();

        assert_eq!(keypair.jwk.d(), Some(d));
        assert_eq!(keypair.jwk.x(), x);
        assert_eq!(keypair.jwk.kty(), "OKP");
    }

    #[test]
    fn seed_wrong_length() {
        assert!(matches!(
            generate(Some(&[1u8; 31])).unwrap_err(),
            CryptoError::KeyError(_)
        ));
    }

    #[test]
    fn pkcs8_spki() {
        let keypair = generate(None).unwrap();

        let pkcs8 = private_to_pkcs8(&keypair.private_bytes).unwrap();
        assert_eq!(
            private_from_pkcs8(&pkcs8).unwrap().as_slice(),
            keypair.private_bytes.as_slice()
        );

        let spki = public_to_spki(&keypair.public_bytes).unwrap();
        assert_eq!(public_from_spki(&spki).unwrap(), keypair.public_bytes);
    }

    #[test]
    fn sign_verify() {
        let keypair = generate(None).unwrap();
        let signature = sign(&keypair.private_bytes, b"hello").unwrap();

        assert_eq!(signature.len(), 64);
        assert!(verify(&keypair.public_bytes, b"hello", &signature).unwrap());
        assert!(!verify(&keypair.public_bytes, b"hello!", &signature).unwrap());
    }
}
