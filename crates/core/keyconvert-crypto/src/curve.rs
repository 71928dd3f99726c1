//! Curve identity and curve family classification

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::CryptoError;

/// Elliptic curves a key pair can live on
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash, Zeroize)]
#[serde(try_from = "String", into = "String")]
pub enum Curve {
    Ed25519,
    P256,
    P384,
    Secp256k1,
}

/// The two curve shapes handled
///
/// Short-Weierstrass curves are `EC` keys, Edwards curves are `OKP` keys (RFC 8037).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveFamily {
    EC,
    OKP,
}

impl CurveFamily {
    /// Classifies a curve name by its short-Weierstrass markers (`secp`, `P-`)
    pub fn classify(name: &str) -> Self {
        let name = name.to_ascii_lowercase();
        if name.contains("secp") || name.starts_with("p-") {
            CurveFamily::EC
        } else {
            CurveFamily::OKP
        }
    }

    /// JWK `kty` tag for this family
    pub fn kty(&self) -> &'static str {
        match self {
            CurveFamily::EC => "EC",
            CurveFamily::OKP => "OKP",
        }
    }
}

impl Curve {
    /// JWK `crv` name
    pub fn name(&self) -> &'static str {
        match self {
            Curve::Ed25519 => "Ed25519",
            Curve::P256 => "P-256",
            Curve::P384 => "P-384",
            Curve::Secp256k1 => "secp256k1",
        }
    }

    pub fn family(&self) -> CurveFamily {
        CurveFamily::classify(self.name())
    }

    /// Length in bytes of a private scalar (or Edwards seed)
    pub fn scalar_len(&self) -> usize {
        match self {
            Curve::P384 => 48,
            _ => 32,
        }
    }
}

impl FromStr for Curve {
    type Err = CryptoError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "ed25519" => Ok(Curve::Ed25519),
            "p-256" | "secp256r1" | "prime256v1" => Ok(Curve::P256),
            "p-384" | "secp384r1" => Ok(Curve::P384),
            "secp256k1" => Ok(Curve::Secp256k1),
            _ => Err(CryptoError::UnsupportedKeyType(value.to_string())),
        }
    }
}

impl TryFrom<&str> for Curve {
    type Error = CryptoError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<String> for Curve {
    type Error = CryptoError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Curve> for String {
    fn from(curve: Curve) -> Self {
        curve.name().to_string()
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
