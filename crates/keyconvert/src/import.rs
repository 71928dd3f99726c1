/*!
 * Import dispatch
 *
 * Every input is normalized to a structured key object (JWK) carrying the
 * private scalar and public coordinates, then committed through the provider
 * as a private and a public handle. Opaque handles skip normalization.
 */

use keyconvert_crypto::{
    CurveFamily, JWK, KeyData, KeyFormat, KeyHandle, KeyKind, KeyParams, KeyProvider,
};
use keyconvert_encoding::{MAINNET_PRIVATE_KEY_VERSION, mnemonic_to_entropy, pem, wif};
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::{
    KeyConvert,
    canonical::{CanonicalKey, PublicKey},
    curve_adapter::CurveAdapter,
    errors::{KeyConvertError, Result},
    format::Format,
    ssh,
};

/// Input accepted by [`KeyConvert::import`]
pub enum KeyInput {
    /// Provider handles, used as-is. The public handle is optional.
    Handle {
        private: KeyHandle,
        public: Option<KeyHandle>,
    },
    /// Raw scalar bytes, or PKCS8 DER with a `pkcs8` hint
    Bytes(Vec<u8>),
    /// PEM, hex, mnemonic, WIF or JWK text
    Text(String),
    /// Structured key object carrying `d`
    Object(serde_json::Value),
}

impl From<Vec<u8>> for KeyInput {
    fn from(bytes: Vec<u8>) -> Self {
        KeyInput::Bytes(bytes)
    }
}

impl From<&[u8]> for KeyInput {
    fn from(bytes: &[u8]) -> Self {
        KeyInput::Bytes(bytes.to_vec())
    }
}

impl From<String> for KeyInput {
    fn from(text: String) -> Self {
        KeyInput::Text(text)
    }
}

impl From<&str> for KeyInput {
    fn from(text: &str) -> Self {
        KeyInput::Text(text.to_string())
    }
}

impl From<serde_json::Value> for KeyInput {
    fn from(value: serde_json::Value) -> Self {
        KeyInput::Object(value)
    }
}

impl<P: KeyProvider> KeyConvert<P> {
    /// Imports a key pair, replacing the committed one
    ///
    /// The previous key pair is kept if any step fails.
    ///
    /// # Arguments
    /// * `input` - Key material
    /// * `hint` - How text or bytes are encoded (`None` for raw bytes and key objects)
    pub async fn import(&mut self, input: KeyInput, hint: Option<Format>) -> Result<()> {
        let key = match self.resolve(input, hint).await {
            Ok(key) => key,
            Err(err) => {
                warn!("import rejected: {err}");
                return Err(err);
            }
        };

        debug!("committed {} key pair", key.curve);
        self.key = Some(key);
        Ok(())
    }

    async fn resolve(&self, input: KeyInput, hint: Option<Format>) -> Result<CanonicalKey> {
        match input {
            KeyInput::Handle { private, public } => {
                debug!("import: provider handle");
                self.commit_handles(private, public).await
            }
            KeyInput::Text(text) => self.import_text(&text, hint).await,
            KeyInput::Bytes(bytes) => self.import_bytes(Zeroizing::new(bytes), hint).await,
            KeyInput::Object(value) => self.import_object(value, hint).await,
        }
    }

    async fn import_text(&self, text: &str, hint: Option<Format>) -> Result<CanonicalKey> {
        if pem::is_private_key(text) {
            debug!("import: PEM private key");
            let der = ssh::private_pem_to_pkcs8(self.curve(), text)?;
            return self.import_pkcs8(der).await;
        }

        match hint {
            Some(Format::Mnemonic) => {
                debug!("import: mnemonic");
                let entropy = mnemonic_to_entropy(text)?;
                self.convert_scalar(&entropy).await
            }
            Some(Format::Wif) => {
                debug!("import: WIF");
                let decoded = wif::decode(text, Some(MAINNET_PRIVATE_KEY_VERSION))?;
                self.convert_scalar(&decoded.private_key).await
            }
            Some(Format::Hex | Format::Raw | Format::RawPrivate) => {
                debug!("import: hex text");
                let bytes = Zeroizing::new(hex::decode(text.trim()).map_err(|e| {
                    KeyConvertError::MalformedInput(format!("Invalid hex private key: {e}"))
                })?);
                self.convert_scalar(&bytes).await
            }
            Some(Format::Jwk) => {
                let value = serde_json::from_str(text).map_err(|e| {
                    KeyConvertError::MalformedInput(format!("Invalid JWK text: {e}"))
                })?;
                self.import_object(value, hint).await
            }
            Some(format @ (Format::Pkcs8 | Format::Pkcs1 | Format::Ssh)) => {
                Err(KeyConvertError::MalformedInput(format!(
                    "{format} text is missing its PEM private key marker"
                )))
            }
            Some(Format::Spki) | None => Err(KeyConvertError::UnknownEncoding(
                hint.map_or("none".to_string(), |format| format.to_string()),
            )),
        }
    }

    async fn import_bytes(
        &self,
        bytes: Zeroizing<Vec<u8>>,
        hint: Option<Format>,
    ) -> Result<CanonicalKey> {
        match hint {
            None | Some(Format::Raw | Format::RawPrivate | Format::Hex) => {
                debug!("import: raw bytes");
                self.convert_scalar(&bytes).await
            }
            Some(Format::Pkcs8) => {
                debug!("import: PKCS8 DER");
                self.import_pkcs8(bytes).await
            }
            Some(format) => Err(KeyConvertError::UnknownEncoding(format!(
                "{format} can't be imported from bytes"
            ))),
        }
    }

    async fn import_object(
        &self,
        value: serde_json::Value,
        hint: Option<Format>,
    ) -> Result<CanonicalKey> {
        if let Some(format) = hint
            && format != Format::Jwk
        {
            return Err(KeyConvertError::UnknownEncoding(format!(
                "{format} can't be imported from a key object"
            )));
        }

        let has_private = value
            .get("d")
            .and_then(|d| d.as_str())
            .is_some_and(|d| !d.is_empty());
        if !has_private {
            return Err(KeyConvertError::UnknownEncoding(
                "Unknown Input: key object has no private key (d)".into(),
            ));
        }

        debug!("import: structured key object");
        let jwk = JWK::from_value(value)
            .map_err(|e| KeyConvertError::MalformedInput(e.to_string()))?;
        self.commit_jwk(jwk).await
    }

    /// PKCS8 DER goes through the provider, which also yields the coordinates
    async fn import_pkcs8(&self, der: Zeroizing<Vec<u8>>) -> Result<CanonicalKey> {
        let handle = self
            .provider
            .import_key(KeyFormat::Pkcs8, KeyData::Bytes(der), &self.derivation_params())
            .await?;
        let jwk = self
            .provider
            .export_key(KeyFormat::Jwk, &handle)
            .await?
            .into_jwk()?;
        self.commit_jwk(jwk).await
    }

    /// Canonical conversion of a raw private scalar
    ///
    /// Edwards points are derived here, EC points by the provider's import.
    async fn convert_scalar(&self, scalar: &[u8]) -> Result<CanonicalKey> {
        let adapter = CurveAdapter::new(self.curve());

        let jwk = match adapter.family() {
            CurveFamily::OKP => adapter.okp_jwk(scalar)?,
            CurveFamily::EC => {
                let handle = self
                    .provider
                    .import_key(
                        KeyFormat::RawPrivate,
                        KeyData::Bytes(Zeroizing::new(scalar.to_vec())),
                        &self.derivation_params(),
                    )
                    .await?;
                self.provider
                    .export_key(KeyFormat::Jwk, &handle)
                    .await?
                    .into_jwk()?
            }
        };

        self.commit_jwk(jwk).await
    }

    /// Imports the private and public halves of a structured key object
    async fn commit_jwk(&self, jwk: JWK) -> Result<CanonicalKey> {
        let curve = jwk
            .curve()
            .map_err(|e| KeyConvertError::MalformedInput(e.to_string()))?;
        if curve != self.curve() {
            return Err(KeyConvertError::MalformedInput(format!(
                "Key object curve ({curve}) doesn't match the configured curve ({})",
                self.curve()
            )));
        }
        if jwk.x().is_empty() {
            return Err(KeyConvertError::MalformedInput(
                "missing required coordinate (x)".into(),
            ));
        }

        let params = self.config.key_params();
        let public_jwk = jwk.to_public();
        let public_key = PublicKey::from_jwk(&public_jwk)?;

        let private = self
            .provider
            .import_key(KeyFormat::Jwk, KeyData::Jwk(jwk), &params)
            .await?;
        let public = self
            .provider
            .import_key(KeyFormat::Jwk, KeyData::Jwk(public_jwk), &params)
            .await?;

        Ok(CanonicalKey {
            curve,
            private: Some(private),
            public: Some(public),
            public_key: Some(public_key),
        })
    }

    /// Builds a key pair from provider handles
    ///
    /// The public representation is read back from the public handle when it
    /// is extractable.
    pub(crate) async fn commit_handles(
        &self,
        private: KeyHandle,
        public: Option<KeyHandle>,
    ) -> Result<CanonicalKey> {
        self.check_handle(&private, KeyKind::Private)?;

        let public_key = match &public {
            Some(public) => {
                self.check_handle(public, KeyKind::Public)?;
                if public.extractable() {
                    let jwk = self
                        .provider
                        .export_key(KeyFormat::Jwk, public)
                        .await?
                        .into_jwk()?;
                    Some(PublicKey::from_jwk(&jwk)?)
                } else {
                    None
                }
            }
            None => None,
        };

        Ok(CanonicalKey {
            curve: self.curve(),
            private: Some(private),
            public,
            public_key,
        })
    }

    fn check_handle(&self, handle: &KeyHandle, kind: KeyKind) -> Result<()> {
        if handle.kind() != kind || handle.curve() != self.curve() {
            return Err(KeyConvertError::MalformedInput(format!(
                "Expected a {kind} {} key handle, got a {} {} key handle",
                self.curve(),
                handle.kind(),
                handle.curve()
            )));
        }
        Ok(())
    }

    /// Transient parameters for reading coordinates back out of the provider
    ///
    /// Committed handles always use the configured parameters.
    fn derivation_params(&self) -> KeyParams {
        KeyParams {
            extractable: true,
            ..self.config.key_params()
        }
    }
}
