//! JWK (JSON Web Key) types per RFC 7517

use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::{CryptoError, Curve, error::Result};

/// RFC 7517 JWK Struct
#[derive(Debug, Serialize, Deserialize, Clone, Zeroize, ZeroizeOnDrop)]
pub struct JWK {
    #[serde(rename = "kid")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
    #[serde(flatten)]
    pub params: Params,
}

/// JWK Key Types and associated Parameters
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Zeroize, ZeroizeOnDrop)]
#[serde(tag = "kty")]
pub enum Params {
    EC(ECParams),
    OKP(OctectParams),
}

/// Elliptic Curve parameters (P-256, P-384, secp256k1)
#[derive(Debug, Serialize, Deserialize, Clone, Zeroize, PartialEq, ZeroizeOnDrop)]
pub struct ECParams {
    #[serde(rename = "crv")]
    pub curve: String,
    #[serde(default)]
    pub x: String,
    #[serde(default)]
    pub y: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
}

/// Octet Key Pair parameters (Ed25519)
///
/// `y` is not part of RFC 8037. When present the 32 byte point is split across
/// `x` (first half) and `y` (second half).
#[derive(Debug, Serialize, Deserialize, Clone, Zeroize, PartialEq, ZeroizeOnDrop)]
pub struct OctectParams {
    #[serde(rename = "crv")]
    pub curve: String,
    #[serde(default)]
    pub x: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
}

impl JWK {
    /// Builds an EC JWK from raw coordinates and an optional private scalar
    pub fn ec(curve: Curve, x: &[u8], y: &[u8], d: Option<&[u8]>) -> Self {
        JWK {
            key_id: None,
            params: Params::EC(ECParams {
                curve: curve.name().to_string(),
                x: BASE64_URL_SAFE_NO_PAD.encode(x),
                y: BASE64_URL_SAFE_NO_PAD.encode(y),
                d: d.map(|d| BASE64_URL_SAFE_NO_PAD.encode(d)),
            }),
        }
    }

    /// Builds an RFC 8037 OKP JWK from the encoded point and an optional seed
    pub fn okp(curve: Curve, point: &[u8], d: Option<&[u8]>) -> Self {
        JWK {
            key_id: None,
            params: Params::OKP(OctectParams {
                curve: curve.name().to_string(),
                x: BASE64_URL_SAFE_NO_PAD.encode(point),
                y: None,
                d: d.map(|d| BASE64_URL_SAFE_NO_PAD.encode(d)),
            }),
        }
    }

    /// Parses a JWK from a JSON value
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| CryptoError::Format(format!("Not a valid JWK: {e}")))
    }

    /// Curve named by `crv`
    pub fn curve(&self) -> Result<Curve> {
        self.curve_name().parse()
    }

    pub fn curve_name(&self) -> &str {
        match &self.params {
            Params::EC(params) => &params.curve,
            Params::OKP(params) => &params.curve,
        }
    }

    /// `kty` tag
    pub fn kty(&self) -> &'static str {
        match &self.params {
            Params::EC(_) => "EC",
            Params::OKP(_) => "OKP",
        }
    }

    /// Encoded private scalar (`d`), if present
    pub fn d(&self) -> Option<&str> {
        match &self.params {
            Params::EC(params) => params.d.as_deref(),
            Params::OKP(params) => params.d.as_deref(),
        }
    }

    /// Encoded `x` coordinate (empty if absent)
    pub fn x(&self) -> &str {
        match &self.params {
            Params::EC(params) => &params.x,
            Params::OKP(params) => &params.x,
        }
    }

    /// Encoded `y` coordinate, if present and non-empty
    pub fn y(&self) -> Option<&str> {
        let y = match &self.params {
            Params::EC(params) => Some(params.y.as_str()),
            Params::OKP(params) => params.y.as_deref(),
        };
        y.filter(|y| !y.is_empty())
    }

    pub fn is_private(&self) -> bool {
        self.d().is_some_and(|d| !d.is_empty())
    }

    /// Decodes the private scalar
    pub fn private_bytes(&self) -> Result<Zeroizing<Vec<u8>>> {
        let d = self
            .d()
            .ok_or_else(|| CryptoError::KeyError("JWK has no private key (d)".into()))?;
        decode_param("d", d)
    }

    /// Decodes the public key material
    ///
    /// EC keys yield the SEC1 uncompressed point (`04 || x || y`). OKP keys
    /// yield the point encoding, joined from `x` and `y` when split.
    pub fn public_bytes(&self) -> Result<Vec<u8>> {
        match &self.params {
            Params::EC(params) => {
                let x = decode_param("x", &params.x)?;
                let y = decode_param("y", &params.y)?;
                let mut point = Vec::with_capacity(1 + x.len() + y.len());
                point.push(0x04);
                point.extend_from_slice(&x);
                point.extend_from_slice(&y);
                Ok(point)
            }
            Params::OKP(params) => {
                let mut point = decode_param("x", &params.x)?.to_vec();
                if let Some(y) = params.y.as_deref()
                    && !y.is_empty()
                {
                    point.extend_from_slice(&decode_param("y", y)?);
                }
                Ok(point)
            }
        }
    }

    /// Same key with the private scalar removed
    pub fn to_public(&self) -> JWK {
        let mut public = self.clone();
        match &mut public.params {
            Params::EC(params) => params.d.zeroize(),
            Params::OKP(params) => params.d.zeroize(),
        }
        public
    }

    /// Layers the fields of `other` over this key
    ///
    /// Fields that `other` leaves empty keep their value from `self`.
    pub fn merge(&self, other: &JWK) -> Result<JWK> {
        let mut merged = self.clone();
        match (&mut merged.params, &other.params) {
            (Params::EC(base), Params::EC(over)) if base.curve == over.curve => {
                overlay(&mut base.x, &over.x);
                overlay(&mut base.y, &over.y);
                if over.d.is_some() {
                    base.d.clone_from(&over.d);
                }
            }
            (Params::OKP(base), Params::OKP(over)) if base.curve == over.curve => {
                overlay(&mut base.x, &over.x);
                if over.y.is_some() {
                    base.y.clone_from(&over.y);
                }
                if over.d.is_some() {
                    base.d.clone_from(&over.d);
                }
            }
            _ => {
                return Err(CryptoError::KeyError(format!(
                    "Can't merge JWKs of different key types ({} {}) ({} {})",
                    self.kty(),
                    self.curve_name(),
                    other.kty(),
                    other.curve_name()
                )));
            }
        }
        if other.key_id.is_some() {
            merged.key_id.clone_from(&other.key_id);
        }
        Ok(merged)
    }

    /// Rewrites an OKP point into the split `x`/`y` halves form
    ///
    /// EC keys are returned unchanged.
    pub fn split_okp_point(&self) -> Result<JWK> {
        let mut split = self.clone();
        if let Params::OKP(params) = &mut split.params {
            let point = self.public_bytes()?;
            let (x, y) = point.split_at(point.len() / 2);
            params.x = BASE64_URL_SAFE_NO_PAD.encode(x);
            params.y = Some(BASE64_URL_SAFE_NO_PAD.encode(y));
        }
        Ok(split)
    }
}

fn overlay(base: &mut String, over: &str) {
    if !over.is_empty() {
        *base = over.to_string();
    }
}

fn decode_param(name: &str, value: &str) -> Result<Zeroizing<Vec<u8>>> {
    BASE64_URL_SAFE_NO_PAD
        .decode(value)
        .map(Zeroizing::new)
        .map_err(|e| CryptoError::Decoding(format!("JWK parameter ({name}) isn't valid base64url: {e}")))
}
