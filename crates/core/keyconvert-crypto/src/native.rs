//! Default key provider backed by the RustCrypto curve crates

use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::{
    CryptoError, Curve, JWK,
    error::Result,
    ops,
    provider::{ExportedKey, KeyData, KeyFormat, KeyHandle, KeyKind, KeyParams, KeyProvider, KeyUsage},
};

/// In-process provider
///
/// Private handles hold the raw scalar (Ed25519: the seed), public handles
/// hold the SEC1 uncompressed point (Ed25519: the 32 byte point encoding).
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeProvider;

impl NativeProvider {
    pub fn new() -> Self {
        NativeProvider
    }

    fn import_jwk(&self, jwk: &JWK, params: &KeyParams) -> Result<KeyHandle> {
        let curve = jwk.curve()?;
        if curve != params.curve {
            return Err(CryptoError::KeyError(format!(
                "JWK curve ({curve}) doesn't match the requested curve ({})",
                params.curve
            )));
        }
        if jwk.kty() != curve.family().kty() {
            return Err(CryptoError::KeyError(format!(
                "JWK key type ({}) doesn't match curve ({curve})",
                jwk.kty()
            )));
        }

        if jwk.is_private() {
            let secret = jwk.private_bytes()?;
            let keypair = ops::generate(curve, Some(&secret))?;

            if !jwk.x().is_empty() {
                let supplied = ops::validate_public(curve, &jwk.public_bytes()?)?;
                if supplied != keypair.public_bytes {
                    return Err(CryptoError::KeyError(
                        "JWK public coordinates don't match the private key".into(),
                    ));
                }
            }

            Ok(KeyHandle::new(
                KeyKind::Private,
                params,
                keypair.private_bytes.to_vec(),
            ))
        } else {
            let public = ops::validate_public(curve, &jwk.public_bytes()?)?;
            Ok(KeyHandle::new(KeyKind::Public, params, public))
        }
    }
}

impl KeyProvider for NativeProvider {
    async fn generate_key(&self, params: &KeyParams) -> Result<(KeyHandle, KeyHandle)> {
        let keypair = ops::generate(params.curve, None)?;
        debug!("generated {} key pair", params.curve);

        Ok((
            KeyHandle::new(KeyKind::Private, params, keypair.private_bytes.to_vec()),
            KeyHandle::new(KeyKind::Public, params, keypair.public_bytes.clone()),
        ))
    }

    async fn import_key(
        &self,
        format: KeyFormat,
        data: KeyData,
        params: &KeyParams,
    ) -> Result<KeyHandle> {
        let curve = params.curve;
        let handle = match (format, &data) {
            (KeyFormat::Raw, KeyData::Bytes(bytes)) => KeyHandle::new(
                KeyKind::Public,
                params,
                ops::validate_public(curve, bytes)?,
            ),
            (KeyFormat::RawPrivate, KeyData::Bytes(bytes)) => private_handle(curve, bytes, params)?,
            (KeyFormat::Pkcs8, KeyData::Bytes(bytes)) => {
                let secret = ops::private_from_pkcs8(curve, bytes)?;
                private_handle(curve, &secret, params)?
            }
            (KeyFormat::Spki, KeyData::Bytes(bytes)) => KeyHandle::new(
                KeyKind::Public,
                params,
                ops::public_from_spki(curve, bytes)?,
            ),
            (KeyFormat::Jwk, KeyData::Jwk(jwk)) => self.import_jwk(jwk, params)?,
            _ => {
                warn!("import rejected: format ({format}) doesn't match the supplied data");
                return Err(CryptoError::Format(format!(
                    "Key data doesn't match import format ({format})"
                )));
            }
        };

        debug!("imported {} {} key from {format}", handle.kind(), curve);
        Ok(handle)
    }

    async fn export_key(&self, format: KeyFormat, key: &KeyHandle) -> Result<ExportedKey> {
        if !key.extractable() {
            warn!("export rejected: {} key is not extractable", key.kind());
            return Err(CryptoError::NotExtractable);
        }

        let curve = key.curve();
        let exported = match (format, key.kind()) {
            (KeyFormat::Raw, _) | (KeyFormat::RawPrivate, KeyKind::Private) => {
                ExportedKey::Bytes(Zeroizing::new(key.material().to_vec()))
            }
            (KeyFormat::Pkcs8, KeyKind::Private) => {
                ExportedKey::Bytes(ops::private_to_pkcs8(curve, key.material())?)
            }
            (KeyFormat::Spki, KeyKind::Public) => ExportedKey::Bytes(Zeroizing::new(
                ops::public_to_spki(curve, key.material())?,
            )),
            (KeyFormat::Jwk, KeyKind::Private) => {
                ExportedKey::Jwk(ops::generate(curve, Some(key.material()))?.jwk)
            }
            (KeyFormat::Jwk, KeyKind::Public) => {
                ExportedKey::Jwk(ops::public_jwk(curve, key.material())?)
            }
            (format, kind) => {
                return Err(CryptoError::Format(format!(
                    "{format} export isn't available for {kind} keys"
                )));
            }
        };

        Ok(exported)
    }

    async fn sign(&self, key: &KeyHandle, data: &[u8]) -> Result<Vec<u8>> {
        if key.kind() != KeyKind::Private || !key.has_usage(KeyUsage::Sign) {
            return Err(CryptoError::UsageNotPermitted(KeyUsage::Sign.to_string()));
        }
        ops::sign(key.curve(), key.material(), data)
    }

    async fn verify(&self, key: &KeyHandle, data: &[u8], signature: &[u8]) -> Result<bool> {
        if key.kind() != KeyKind::Public || !key.has_usage(KeyUsage::Verify) {
            return Err(CryptoError::UsageNotPermitted(KeyUsage::Verify.to_string()));
        }
        ops::verify(key.curve(), key.material(), data, signature)
    }
}

fn private_handle(curve: Curve, secret: &[u8], params: &KeyParams) -> Result<KeyHandle> {
    let keypair = ops::generate(curve, Some(secret))?;
    Ok(KeyHandle::new(
        KeyKind::Private,
        params,
        keypair.private_bytes.to_vec(),
    ))
}
