/*!
 * Key material conversion engine
 *
 * Normalizes an asymmetric key pair from any supported serialization (hex,
 * raw bytes, BIP39 mnemonic, WIF, PEM/PKCS8/SEC1/OpenSSH, JWK) into a single
 * canonical key, then re-serializes it, issues X.509 certificates for it or
 * derives an address from it.
 *
 * Example:
 * ```
 * use keyconvert::{Curve, KeyConvert, KeyKind, NativeProvider, config::KeyConvertConfig, format::Format};
 *
 * # async fn run() -> keyconvert::errors::Result<()> {
 * let config = KeyConvertConfig::builder(Curve::Secp256k1).build()?;
 * let mut kc = KeyConvert::new(config, NativeProvider::new());
 *
 * kc.import("01".repeat(32).into(), Some(Format::Hex)).await?;
 * let wif = kc.export(Format::Wif, KeyKind::Private, None).await?;
 * # Ok(())
 * # }
 * ```
 */

use canonical::{CanonicalKey, PublicKey};
use config::{Algorithm, KeyConvertConfig};
use errors::{KeyConvertError, Result};
use tracing::debug;

pub mod address;
pub mod canonical;
pub mod certificate;
pub mod config;
pub mod curve_adapter;
pub mod errors;
pub mod export;
pub mod format;
pub mod import;
mod ssh;

pub use keyconvert_crypto::{
    CryptoError, Curve, CurveFamily, JWK, KeyHandle, KeyKind, KeyProvider, KeyUsage,
    NativeProvider,
};
pub use keyconvert_encoding as encoding;

/// Conversion engine bound to one curve and one provider
///
/// Holds at most one committed key pair. `import` and `generate` replace it
/// wholesale, every other operation only reads it.
pub struct KeyConvert<P: KeyProvider = NativeProvider> {
    pub(crate) config: KeyConvertConfig,
    pub(crate) provider: P,
    pub(crate) key: Option<CanonicalKey>,
}

impl<P: KeyProvider> KeyConvert<P> {
    pub fn new(config: KeyConvertConfig, provider: P) -> Self {
        KeyConvert {
            config,
            provider,
            key: None,
        }
    }

    pub fn config(&self) -> &KeyConvertConfig {
        &self.config
    }

    pub fn curve(&self) -> Curve {
        self.config.curve
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// The committed key pair, if any
    pub fn key(&self) -> Option<&CanonicalKey> {
        self.key.as_ref()
    }

    /// Public representation of the committed key pair
    pub fn public_key(&self) -> Option<&PublicKey> {
        self.key.as_ref().and_then(|key| key.public_key())
    }

    pub(crate) fn private_handle(&self) -> Result<&KeyHandle> {
        self.key
            .as_ref()
            .and_then(|key| key.private())
            .ok_or(KeyConvertError::NoPrivateKey)
    }

    pub(crate) fn public_handle(&self) -> Result<&KeyHandle> {
        self.key
            .as_ref()
            .and_then(|key| key.public())
            .ok_or(KeyConvertError::NoPublicKey)
    }

    pub(crate) fn handle(&self, kind: KeyKind) -> Result<&KeyHandle> {
        match kind {
            KeyKind::Private => self.private_handle(),
            KeyKind::Public => self.public_handle(),
        }
    }

    /// Generates a fresh key pair on the configured curve and commits it
    pub async fn generate(&mut self) -> Result<()> {
        let (private, public) = self
            .provider
            .generate_key(&self.config.key_params())
            .await?;
        let key = self.commit_handles(private, Some(public)).await?;

        debug!("generated {} key pair", self.curve());
        self.key = Some(key);
        Ok(())
    }

    /// Signs `data` with the committed private key
    pub async fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.check_signing_algorithm()?;
        let private = self.private_handle()?;
        Ok(self.provider.sign(private, data).await?)
    }

    /// Verifies `signature` over `data` against the committed public key
    pub async fn verify(&self, data: &[u8], signature: &[u8]) -> Result<bool> {
        self.check_signing_algorithm()?;
        let public = self.public_handle()?;
        Ok(self.provider.verify(public, data, signature).await?)
    }

    /// Key agreement keys are never used for signatures
    fn check_signing_algorithm(&self) -> Result<()> {
        if self.config.algorithm == Algorithm::Ecdh {
            return Err(KeyConvertError::Config(format!(
                "{} keys can't sign or verify",
                self.config.algorithm
            )));
        }
        Ok(())
    }
}
