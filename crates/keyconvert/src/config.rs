/*!
 * KeyConvert configuration options
 *
 * Curve identity, algorithm, extractability and usage tags are fixed at
 * construction and bound to every key the engine imports.
 */

use std::fmt;

use keyconvert_crypto::{Curve, CurveFamily, KeyParams, KeyUsage};
use serde::{Deserialize, Serialize};

use crate::errors::{KeyConvertError, Result};

/// Signing/key agreement algorithm bound to the curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    #[serde(rename = "ECDSA")]
    Ecdsa,
    #[serde(rename = "EdDSA")]
    EdDsa,
    #[serde(rename = "ECDH")]
    Ecdh,
}

impl Algorithm {
    /// ECDSA for short-Weierstrass curves, EdDSA for Edwards curves
    pub fn default_for(curve: Curve) -> Self {
        match curve.family() {
            CurveFamily::EC => Algorithm::Ecdsa,
            CurveFamily::OKP => Algorithm::EdDsa,
        }
    }

    /// True if the algorithm can be used with keys of this family
    pub fn fits(&self, family: CurveFamily) -> bool {
        matches!(
            (self, family),
            (Algorithm::Ecdsa | Algorithm::Ecdh, CurveFamily::EC)
                | (Algorithm::EdDsa, CurveFamily::OKP)
        )
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Algorithm::Ecdsa => write!(f, "ECDSA"),
            Algorithm::EdDsa => write!(f, "EdDSA"),
            Algorithm::Ecdh => write!(f, "ECDH"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyConvertConfig {
    pub curve: Curve,
    pub algorithm: Algorithm,
    pub extractable: bool,
    pub usages: Vec<KeyUsage>,
}

/// On-disk shape of the config, every field but the curve is optional
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    curve: Curve,
    algorithm: Option<Algorithm>,
    extractable: Option<bool>,
    usages: Option<Vec<KeyUsage>>,
}

impl KeyConvertConfig {
    /// Returns a builder for `KeyConvertConfig`
    /// Example:
    /// ```
    /// use keyconvert::{Curve, config::KeyConvertConfig};
    ///
    /// let config = KeyConvertConfig::builder(Curve::Secp256k1).build();
    /// ```
    pub fn builder(curve: Curve) -> KeyConvertConfigBuilder {
        KeyConvertConfigBuilder::new(curve)
    }

    /// Loads a config from JSON
    /// Example:
    /// ```
    /// use keyconvert::config::KeyConvertConfig;
    ///
    /// let config = KeyConvertConfig::from_json(r#"{"curve": "P-256", "extractable": false}"#).unwrap();
    /// assert!(!config.extractable);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let file: ConfigFile = serde_json::from_str(json)
            .map_err(|e| KeyConvertError::Config(format!("Couldn't parse config: {e}")))?;

        let mut builder = KeyConvertConfigBuilder::new(file.curve);
        if let Some(algorithm) = file.algorithm {
            builder = builder.with_algorithm(algorithm);
        }
        if let Some(extractable) = file.extractable {
            builder = builder.with_extractable(extractable);
        }
        if let Some(usages) = file.usages {
            builder = builder.with_usages(usages);
        }
        builder.build()
    }

    /// Provider parameters for keys imported under this config
    pub fn key_params(&self) -> KeyParams {
        KeyParams {
            curve: self.curve,
            extractable: self.extractable,
            usages: self.usages.clone(),
        }
    }
}

/// Builder for `KeyConvertConfig`.
/// Example:
/// ```
/// use keyconvert::{Curve, KeyUsage, config::KeyConvertConfig};
///
/// let config = KeyConvertConfig::builder(Curve::Ed25519)
///     .with_extractable(true)
///     .with_usages(vec![KeyUsage::Sign, KeyUsage::Verify])
///     .build();
/// ```
pub struct KeyConvertConfigBuilder {
    /// Curve every key lives on
    curve: Curve,

    /// Defaults to ECDSA on EC curves and EdDSA on Ed25519
    algorithm: Option<Algorithm>,

    /// Can key material leave the provider?
    /// Defaults to `true`
    extractable: bool,

    /// Defaults to sign, verify, deriveKey, deriveBits
    usages: Option<Vec<KeyUsage>>,
}

impl KeyConvertConfigBuilder {
    pub fn new(curve: Curve) -> KeyConvertConfigBuilder {
        KeyConvertConfigBuilder {
            curve,
            algorithm: None,
            extractable: true,
            usages: None,
        }
    }

    /// Build the `KeyConvertConfig` from the builder
    pub fn build(self) -> Result<KeyConvertConfig> {
        let algorithm = self
            .algorithm
            .unwrap_or_else(|| Algorithm::default_for(self.curve));
        if !algorithm.fits(self.curve.family()) {
            return Err(KeyConvertError::Config(format!(
                "Algorithm ({algorithm}) can't be used with curve ({})",
                self.curve
            )));
        }

        let usages = self.usages.unwrap_or_else(KeyUsage::defaults);
        if usages.is_empty() {
            return Err(KeyConvertError::Config(
                "At least one key usage is required".into(),
            ));
        }

        Ok(KeyConvertConfig {
            curve: self.curve,
            algorithm,
            extractable: self.extractable,
            usages,
        })
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = Some(algorithm);
        self
    }

    pub fn with_extractable(mut self, extractable: bool) -> Self {
        self.extractable = extractable;
        self
    }

    pub fn with_usages(mut self, usages: Vec<KeyUsage>) -> Self {
        self.usages = Some(usages);
        self
    }
}
