//! Key provider capability
//!
//! A provider owns key material behind opaque [`KeyHandle`]s and exposes
//! generate/import/export/sign over them. The conversion engine never touches
//! private material except through a provider export.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::{CryptoError, Curve, JWK, error::Result};

/// Capabilities a key may be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyUsage {
    Encrypt,
    Decrypt,
    Sign,
    Verify,
    DeriveKey,
    DeriveBits,
    WrapKey,
    UnwrapKey,
}

impl KeyUsage {
    /// Default usage set: sign, verify, deriveKey, deriveBits
    pub fn defaults() -> Vec<KeyUsage> {
        vec![
            KeyUsage::Sign,
            KeyUsage::Verify,
            KeyUsage::DeriveKey,
            KeyUsage::DeriveBits,
        ]
    }
}

impl fmt::Display for KeyUsage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            KeyUsage::Encrypt => "encrypt",
            KeyUsage::Decrypt => "decrypt",
            KeyUsage::Sign => "sign",
            KeyUsage::Verify => "verify",
            KeyUsage::DeriveKey => "deriveKey",
            KeyUsage::DeriveBits => "deriveBits",
            KeyUsage::WrapKey => "wrapKey",
            KeyUsage::UnwrapKey => "unwrapKey",
        };
        write!(f, "{name}")
    }
}

/// Which half of a key pair a handle holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyKind {
    Private,
    Public,
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            KeyKind::Private => write!(f, "private"),
            KeyKind::Public => write!(f, "public"),
        }
    }
}

/// Formats a provider can import and export natively
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFormat {
    /// Public point (SEC1 uncompressed / Ed25519 encoding), or the private scalar on export
    Raw,
    /// Private scalar only
    RawPrivate,
    /// PKCS8 DER private key
    Pkcs8,
    /// SubjectPublicKeyInfo DER public key
    Spki,
    Jwk,
}

impl fmt::Display for KeyFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            KeyFormat::Raw => write!(f, "raw"),
            KeyFormat::RawPrivate => write!(f, "raw:private"),
            KeyFormat::Pkcs8 => write!(f, "pkcs8"),
            KeyFormat::Spki => write!(f, "spki"),
            KeyFormat::Jwk => write!(f, "jwk"),
        }
    }
}

/// Parameters every imported or generated key is bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyParams {
    pub curve: Curve,
    pub extractable: bool,
    pub usages: Vec<KeyUsage>,
}

/// Input handed to [`KeyProvider::import_key`]
pub enum KeyData {
    Bytes(Zeroizing<Vec<u8>>),
    Jwk(JWK),
}

/// Output of [`KeyProvider::export_key`]
pub enum ExportedKey {
    Bytes(Zeroizing<Vec<u8>>),
    Jwk(JWK),
}

impl fmt::Debug for ExportedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportedKey::Bytes(_) => f.debug_tuple("Bytes").finish_non_exhaustive(),
            ExportedKey::Jwk(_) => f.debug_tuple("Jwk").finish_non_exhaustive(),
        }
    }
}

impl ExportedKey {
    pub fn into_bytes(self) -> Result<Zeroizing<Vec<u8>>> {
        match self {
            ExportedKey::Bytes(bytes) => Ok(bytes),
            ExportedKey::Jwk(_) => Err(CryptoError::Format(
                "Expected exported bytes, got a JWK".into(),
            )),
        }
    }

    pub fn into_jwk(self) -> Result<JWK> {
        match self {
            ExportedKey::Jwk(jwk) => Ok(jwk),
            ExportedKey::Bytes(_) => Err(CryptoError::Format(
                "Expected an exported JWK, got bytes".into(),
            )),
        }
    }
}

/// Opaque key handle
///
/// Material is provider specific and zeroized on drop. Only the provider that
/// created a handle should interpret [`KeyHandle::material`].
#[derive(Clone)]
pub struct KeyHandle {
    kind: KeyKind,
    curve: Curve,
    extractable: bool,
    usages: Vec<KeyUsage>,
    material: Zeroizing<Vec<u8>>,
}

impl KeyHandle {
    pub fn new(kind: KeyKind, params: &KeyParams, material: Vec<u8>) -> Self {
        KeyHandle {
            kind,
            curve: params.curve,
            extractable: params.extractable,
            usages: params.usages.clone(),
            material: Zeroizing::new(material),
        }
    }

    pub fn kind(&self) -> KeyKind {
        self.kind
    }

    pub fn curve(&self) -> Curve {
        self.curve
    }

    pub fn extractable(&self) -> bool {
        self.extractable
    }

    pub fn usages(&self) -> &[KeyUsage] {
        &self.usages
    }

    pub fn has_usage(&self, usage: KeyUsage) -> bool {
        self.usages.contains(&usage)
    }

    pub fn material(&self) -> &[u8] {
        &self.material
    }
}

impl fmt::Debug for KeyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyHandle")
            .field("kind", &self.kind)
            .field("curve", &self.curve)
            .field("extractable", &self.extractable)
            .field("usages", &self.usages)
            .finish_non_exhaustive()
    }
}

/// Cryptographic provider
#[allow(async_fn_in_trait)]
pub trait KeyProvider {
    /// Generates a fresh key pair, returning the (private, public) handles
    async fn generate_key(&self, params: &KeyParams) -> Result<(KeyHandle, KeyHandle)>;

    /// Imports key material
    ///
    /// `Raw`/`Spki` and public JWKs produce public handles. `RawPrivate`,
    /// `Pkcs8` and JWKs carrying `d` produce private handles.
    async fn import_key(
        &self,
        format: KeyFormat,
        data: KeyData,
        params: &KeyParams,
    ) -> Result<KeyHandle>;

    /// Exports a key in the given format
    ///
    /// Fails with [`CryptoError::NotExtractable`] for non-extractable keys
    async fn export_key(&self, format: KeyFormat, key: &KeyHandle) -> Result<ExportedKey>;

    /// Signs `data` with a private key holding the `sign` usage
    async fn sign(&self, key: &KeyHandle, data: &[u8]) -> Result<Vec<u8>>;

    /// Verifies `signature` with a public key holding the `verify` usage
    async fn verify(&self, key: &KeyHandle, data: &[u8], signature: &[u8]) -> Result<bool>;
}
