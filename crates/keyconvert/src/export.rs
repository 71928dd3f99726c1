/*!
 * Export dispatch
 *
 * Serializes the committed key pair. Every format other than the provider
 * pass-through ones (`raw`, `raw:private`, `spki`) requires a private key.
 */

use keyconvert_crypto::{CryptoError, Curve, CurveFamily, KeyFormat, KeyKind, KeyProvider, ops};
use keyconvert_encoding::{MAINNET_PRIVATE_KEY_VERSION, entropy_to_mnemonic, pem, wif};
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::{
    KeyConvert,
    errors::{KeyConvertError, Result},
    format::{ExportOutput, Format},
    ssh,
};

/// Largest scalar the mnemonic and WIF encodings carry
const MAX_ENCODED_SCALAR: usize = 32;

impl<P: KeyProvider> KeyConvert<P> {
    /// Exports the committed key pair
    ///
    /// # Arguments
    /// * `format` - Output format
    /// * `kind` - Private or public half
    /// * `comment` - Comment attached to SSH public key lines
    pub async fn export(
        &self,
        format: Format,
        kind: KeyKind,
        comment: Option<&str>,
    ) -> Result<ExportOutput> {
        debug!("export: {format} {kind}");
        match self.dispatch(format, kind, comment).await {
            Ok(output) => Ok(output),
            Err(err) => {
                warn!("export ({format} {kind}) rejected: {err}");
                Err(err)
            }
        }
    }

    async fn dispatch(
        &self,
        format: Format,
        kind: KeyKind,
        comment: Option<&str>,
    ) -> Result<ExportOutput> {
        if !format.is_pass_through() {
            self.private_handle()?;
        }

        let output = match format {
            Format::Hex => ExportOutput::Text(match kind {
                KeyKind::Private => self.private_key_hex().await?,
                KeyKind::Public => self.public_key_hex().await?,
            }),
            Format::Mnemonic => {
                self.require_private(format, kind)?;
                let scalar = self.encodable_scalar(format).await?;
                ExportOutput::Text(entropy_to_mnemonic(&scalar)?.to_string())
            }
            Format::Wif => {
                self.require_private(format, kind)?;
                ExportOutput::Text(self.wif().await?)
            }
            Format::Pkcs8 | Format::Pkcs1 | Format::Ssh => {
                ExportOutput::Text(self.export_pem(format, kind, comment).await?)
            }
            Format::Jwk => {
                let private = self
                    .provider
                    .export_key(KeyFormat::Jwk, self.private_handle()?)
                    .await?
                    .into_jwk()?;
                let public = self
                    .provider
                    .export_key(KeyFormat::Jwk, self.public_handle()?)
                    .await?
                    .into_jwk()?;
                ExportOutput::KeyObject(private.merge(&public)?.split_okp_point()?)
            }
            Format::Raw => self.pass_through(KeyFormat::Raw, kind).await?,
            Format::RawPrivate => self.pass_through(KeyFormat::RawPrivate, kind).await?,
            Format::Spki => self.pass_through(KeyFormat::Spki, kind).await?,
        };

        Ok(output)
    }

    /// Hex of the private scalar, read from the provider's structured export
    pub async fn private_key_hex(&self) -> Result<String> {
        Ok(hex::encode(self.private_scalar().await?.as_slice()))
    }

    /// Hex of the public point (SEC1 uncompressed for EC curves)
    pub async fn public_key_hex(&self) -> Result<String> {
        let public = self.public_handle()?;
        if !public.extractable() {
            return Err(CryptoError::NotExtractable.into());
        }
        self.public_key()
            .map(|key| key.to_hex())
            .ok_or(KeyConvertError::NoPublicKey)
    }

    /// Legacy wallet encoding of the private scalar, compressed flag always set
    pub(crate) async fn wif(&self) -> Result<String> {
        let scalar = self.encodable_scalar(Format::Wif).await?;
        Ok(wif::encode(MAINNET_PRIVATE_KEY_VERSION, &scalar, true)?)
    }

    pub(crate) async fn private_scalar(&self) -> Result<Zeroizing<Vec<u8>>> {
        let jwk = self
            .provider
            .export_key(KeyFormat::Jwk, self.private_handle()?)
            .await?
            .into_jwk()?;
        Ok(jwk.private_bytes()?)
    }

    /// Private scalar for the mnemonic and WIF encodings
    ///
    /// Both need a 32 byte short-Weierstrass scalar (mnemonic: any scalar of up to 32 bytes).
    async fn encodable_scalar(&self, format: Format) -> Result<Zeroizing<Vec<u8>>> {
        let curve = self.curve();
        if format == Format::Wif && curve.family() == CurveFamily::OKP {
            return Err(KeyConvertError::unsupported(format, curve));
        }

        let scalar = self.private_scalar().await?;
        let fits = match format {
            Format::Wif => scalar.len() == MAX_ENCODED_SCALAR,
            _ => scalar.len() <= MAX_ENCODED_SCALAR,
        };
        if !fits {
            return Err(KeyConvertError::unsupported(format, curve));
        }
        Ok(scalar)
    }

    fn require_private(&self, format: Format, kind: KeyKind) -> Result<()> {
        match kind {
            KeyKind::Private => Ok(()),
            KeyKind::Public => Err(KeyConvertError::unsupported(format, kind)),
        }
    }

    /// PEM and SSH text
    ///
    /// Ed25519 private keys in `ssh`/`pkcs8` come back as the provider's PKCS8
    /// PEM. Everything else is re-serialized from the PKCS8 export.
    async fn export_pem(
        &self,
        format: Format,
        kind: KeyKind,
        comment: Option<&str>,
    ) -> Result<String> {
        let curve = self.curve();
        let der = self
            .provider
            .export_key(KeyFormat::Pkcs8, self.private_handle()?)
            .await?
            .into_bytes()?;

        match kind {
            KeyKind::Private => {
                if curve == Curve::Ed25519 && matches!(format, Format::Ssh | Format::Pkcs8) {
                    return Ok(pem::encode(pem::PRIVATE_KEY_LABEL, &der)?);
                }

                let secret = ops::private_from_pkcs8(curve, &der)?;
                match format {
                    Format::Pkcs1 if curve.family() == CurveFamily::OKP => {
                        Err(KeyConvertError::unsupported(format, curve))
                    }
                    Format::Pkcs1 => Ok(pem::encode(
                        pem::EC_PRIVATE_KEY_LABEL,
                        &ops::private_to_sec1(curve, &secret)?,
                    )?),
                    _ => Ok(pem::encode(
                        pem::PRIVATE_KEY_LABEL,
                        &ops::private_to_pkcs8(curve, &secret)?,
                    )?),
                }
            }
            KeyKind::Public => {
                let secret = ops::private_from_pkcs8(curve, &der)?;
                let point = ops::generate(curve, Some(&secret))?.public_bytes;
                ssh::public_key_line(curve, &point, comment)
            }
        }
    }

    async fn pass_through(&self, format: KeyFormat, kind: KeyKind) -> Result<ExportOutput> {
        let exported = self
            .provider
            .export_key(format, self.handle(kind)?)
            .await?
            .into_bytes()?;
        Ok(ExportOutput::Bytes(exported.to_vec()))
    }
}
