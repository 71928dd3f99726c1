/*!
 * X.509 certificate issuance
 *
 * The subject public key is embedded from its SPKI export and the signing key
 * is loaded from its PKCS8 export, both through the provider.
 *
 * rcgen has no secp256k1 algorithm. secp256k1 signing goes through k256 and is
 * labelled ecdsa-with-SHA256. A secp256k1 subject key is written by rcgen under
 * the P-256 label, then relabelled with its real SPKI and the TBS re-signed.
 */

use base64::{Engine, prelude::BASE64_STANDARD};
use k256::{
    ecdsa::{self, signature::Signer},
    pkcs8::der::{
        self, Decode, Encode, Reader, SliceReader, Tag,
        asn1::{AnyRef, BitStringRef},
    },
};
use keyconvert_crypto::{Curve, KeyFormat, KeyHandle, KeyProvider, ops};
use keyconvert_encoding::pem;
use rcgen::{
    BasicConstraints, CertificateParams, CustomExtension, DistinguishedName, DnType, IsCa, Issuer,
    KeyIdMethod, KeyPair, KeyUsagePurpose, PublicKeyData, SerialNumber, SignatureAlgorithm,
    SigningKey, SubjectPublicKeyInfo,
};
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::{
    KeyConvert,
    errors::{KeyConvertError, Result},
};

/// Certificate signature algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningAlgorithm {
    EcdsaP256Sha256,
    EcdsaP384Sha384,
    /// ecdsa-with-SHA256 over secp256k1
    EcdsaSecp256k1Sha256,
    Ed25519,
}

impl SigningAlgorithm {
    /// Algorithm for a signing key's curve
    pub fn for_curve(curve: Curve) -> Self {
        match curve {
            Curve::P256 => SigningAlgorithm::EcdsaP256Sha256,
            Curve::P384 => SigningAlgorithm::EcdsaP384Sha384,
            Curve::Secp256k1 => SigningAlgorithm::EcdsaSecp256k1Sha256,
            Curve::Ed25519 => SigningAlgorithm::Ed25519,
        }
    }

    /// The rcgen algorithm whose signature AlgorithmIdentifier is written
    fn rcgen(&self) -> &'static SignatureAlgorithm {
        match self {
            SigningAlgorithm::EcdsaP256Sha256 | SigningAlgorithm::EcdsaSecp256k1Sha256 => {
                &rcgen::PKCS_ECDSA_P256_SHA256
            }
            SigningAlgorithm::EcdsaP384Sha384 => &rcgen::PKCS_ECDSA_P384_SHA384,
            SigningAlgorithm::Ed25519 => &rcgen::PKCS_ED25519,
        }
    }
}

/// Key usage bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyUsageFlag {
    DigitalSignature,
    NonRepudiation,
    KeyEncipherment,
    DataEncipherment,
    KeyAgreement,
    KeyCertSign,
    CrlSign,
}

impl From<KeyUsageFlag> for KeyUsagePurpose {
    fn from(flag: KeyUsageFlag) -> Self {
        match flag {
            KeyUsageFlag::DigitalSignature => KeyUsagePurpose::DigitalSignature,
            KeyUsageFlag::NonRepudiation => KeyUsagePurpose::ContentCommitment,
            KeyUsageFlag::KeyEncipherment => KeyUsagePurpose::KeyEncipherment,
            KeyUsageFlag::DataEncipherment => KeyUsagePurpose::DataEncipherment,
            KeyUsageFlag::KeyAgreement => KeyUsagePurpose::KeyAgreement,
            KeyUsageFlag::KeyCertSign => KeyUsagePurpose::KeyCertSign,
            KeyUsageFlag::CrlSign => KeyUsagePurpose::CrlSign,
        }
    }
}

/// Certificate extensions
///
/// Basic constraints and key usage are always encoded as critical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertificateExtension {
    BasicConstraints { ca: bool, path_length: Option<u8> },
    SubjectKeyIdentifier,
    AuthorityKeyIdentifier,
    KeyUsage(Vec<KeyUsageFlag>),
    /// DER encoded extension value under an arbitrary OID
    Custom {
        oid: Vec<u64>,
        content: Vec<u8>,
        critical: bool,
    },
}

impl CertificateExtension {
    /// CA with path length 2, subject/authority key identifiers,
    /// digitalSignature|nonRepudiation|keyEncipherment|dataEncipherment
    pub fn defaults() -> Vec<CertificateExtension> {
        vec![
            CertificateExtension::BasicConstraints {
                ca: true,
                path_length: Some(2),
            },
            CertificateExtension::SubjectKeyIdentifier,
            CertificateExtension::AuthorityKeyIdentifier,
            CertificateExtension::KeyUsage(vec![
                KeyUsageFlag::DigitalSignature,
                KeyUsageFlag::NonRepudiation,
                KeyUsageFlag::KeyEncipherment,
                KeyUsageFlag::DataEncipherment,
            ]),
        ]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CertificateEncoding {
    #[default]
    Pem,
    /// DER rendered as lowercase hex
    Der,
    /// DER rendered as standard base64
    Base64,
}

/// Options for [`KeyConvert::issue_certificate`]
#[derive(Debug, Clone)]
pub struct CertificateOptions {
    /// Decimal serial number
    /// Default: milliseconds since the UNIX epoch
    pub serial_number: String,

    /// Default: `CN=localhost`
    pub subject: String,

    /// A bare name is a common name
    /// Default: `BTC`
    pub issuer: String,

    /// Default: 2020-01-01
    pub not_before: OffsetDateTime,

    /// Default: 2022-01-02
    pub not_after: OffsetDateTime,

    /// Default: chosen from the signing key's curve
    pub signing_algorithm: Option<SigningAlgorithm>,

    /// Default: the committed public key
    pub public_key: Option<KeyHandle>,

    /// Default: the committed private key
    pub signing_key: Option<KeyHandle>,

    /// Replaces the defaults entirely when set
    pub extensions: Option<Vec<CertificateExtension>>,

    pub encoding: CertificateEncoding,
}

impl Default for CertificateOptions {
    fn default() -> Self {
        let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        CertificateOptions {
            serial_number: millis.to_string(),
            subject: "CN=localhost".into(),
            issuer: "BTC".into(),
            not_before: rcgen::date_time_ymd(2020, 1, 1),
            not_after: rcgen::date_time_ymd(2022, 1, 2),
            signing_algorithm: None,
            public_key: None,
            signing_key: None,
            extensions: None,
            encoding: CertificateEncoding::default(),
        }
    }
}

impl<P: KeyProvider> KeyConvert<P> {
    /// Issues an X.509 certificate for the committed key pair
    pub async fn issue_certificate(&self, options: CertificateOptions) -> Result<String> {
        match self.build_certificate(options).await {
            Ok(certificate) => Ok(certificate),
            Err(err) => {
                warn!("certificate issuance failed: {err}");
                Err(err)
            }
        }
    }

    async fn build_certificate(&self, options: CertificateOptions) -> Result<String> {
        let public = match &options.public_key {
            Some(public) => public,
            None => self.public_handle()?,
        };
        let signer = match &options.signing_key {
            Some(signer) => signer,
            None => self.private_handle()?,
        };

        let algorithm = SigningAlgorithm::for_curve(signer.curve());
        if let Some(requested) = options.signing_algorithm
            && requested != algorithm
        {
            return Err(KeyConvertError::Certificate(format!(
                "{requested:?} can't be used with a {} signing key",
                signer.curve()
            )));
        }
        debug!(
            "issuing certificate for {} key, signed with {algorithm:?}",
            public.curve()
        );

        let spki = self
            .provider
            .export_key(KeyFormat::Spki, public)
            .await?
            .into_bytes()?;
        let subject_key = match public.curve() {
            Curve::Secp256k1 => SubjectKey::Secp256k1(Secp256k1Public::from_spki(spki.to_vec())?),
            _ => SubjectKey::Spki(SubjectPublicKeyInfo::from_der(&spki)?),
        };

        let pkcs8 = self
            .provider
            .export_key(KeyFormat::Pkcs8, signer)
            .await?
            .into_bytes()?;
        let signing_key = match signer.curve() {
            Curve::Secp256k1 => CertificateSigner::Secp256k1(Secp256k1Signer::from_pkcs8(&pkcs8)?),
            _ => CertificateSigner::Rcgen(KeyPair::from_pem_and_sign_algo(
                &pem::encode(pem::PRIVATE_KEY_LABEL, &pkcs8)?,
                algorithm.rcgen(),
            )?),
        };

        let mut issuer_params = CertificateParams::default();
        issuer_params.distinguished_name = distinguished_name(&options.issuer)?;
        let issuer = Issuer::new(issuer_params, &signing_key);

        let mut params = CertificateParams::default();
        params.distinguished_name = distinguished_name(&options.subject)?;
        params.serial_number = Some(serial_number(&options.serial_number)?);
        params.not_before = options.not_before;
        params.not_after = options.not_after;
        apply_extensions(
            &mut params,
            options
                .extensions
                .unwrap_or_else(CertificateExtension::defaults),
        );

        let mut der = params.signed_by(&subject_key, &issuer)?.der().to_vec();
        if let SubjectKey::Secp256k1(subject) = &subject_key {
            der = relabel_subject_key(&der, subject, &signing_key)?;
        }

        Ok(match options.encoding {
            CertificateEncoding::Pem => pem::encode(pem::CERTIFICATE_LABEL, &der)?,
            CertificateEncoding::Der => hex::encode(&der),
            CertificateEncoding::Base64 => BASE64_STANDARD.encode(&der),
        })
    }
}

/// secp256k1 public key handed to rcgen
///
/// `der_bytes`/`algorithm` describe the point under the P-256 label rcgen
/// writes, `spki` is the real encoding used for key identifiers.
struct Secp256k1Public {
    point: Vec<u8>,
    spki: Vec<u8>,
}

impl Secp256k1Public {
    fn from_spki(spki: Vec<u8>) -> Result<Self> {
        let point = ops::public_from_spki(Curve::Secp256k1, &spki)?;
        Ok(Secp256k1Public { point, spki })
    }
}

impl PublicKeyData for Secp256k1Public {
    fn subject_public_key_info(&self) -> Vec<u8> {
        self.spki.clone()
    }

    fn der_bytes(&self) -> &[u8] {
        &self.point
    }

    fn algorithm(&self) -> &'static SignatureAlgorithm {
        &rcgen::PKCS_ECDSA_P256_SHA256
    }
}

/// A point under the P-256 label, as rcgen serializes it
struct P256Labelled<'a>(&'a [u8]);

impl PublicKeyData for P256Labelled<'_> {
    fn der_bytes(&self) -> &[u8] {
        self.0
    }

    fn algorithm(&self) -> &'static SignatureAlgorithm {
        &rcgen::PKCS_ECDSA_P256_SHA256
    }
}

struct Secp256k1Signer {
    key: ecdsa::SigningKey,
    public: Secp256k1Public,
}

impl Secp256k1Signer {
    fn from_pkcs8(der: &[u8]) -> Result<Self> {
        let secret = ops::private_from_pkcs8(Curve::Secp256k1, der)?;
        let key = ecdsa::SigningKey::from_slice(&secret).map_err(|e| {
            KeyConvertError::Certificate(format!("secp256k1 signing key isn't valid: {e}"))
        })?;
        let point = ops::generate(Curve::Secp256k1, Some(secret.as_slice()))?.public_bytes;
        let spki = ops::public_to_spki(Curve::Secp256k1, &point)?;

        Ok(Secp256k1Signer {
            key,
            public: Secp256k1Public { point, spki },
        })
    }
}

impl PublicKeyData for Secp256k1Signer {
    fn subject_public_key_info(&self) -> Vec<u8> {
        self.public.subject_public_key_info()
    }

    fn der_bytes(&self) -> &[u8] {
        self.public.der_bytes()
    }

    fn algorithm(&self) -> &'static SignatureAlgorithm {
        self.public.algorithm()
    }
}

impl SigningKey for Secp256k1Signer {
    /// DER encoded ECDSA/SHA-256 signature
    fn sign(&self, msg: &[u8]) -> std::result::Result<Vec<u8>, rcgen::Error> {
        let signature: ecdsa::Signature = self.key.sign(msg);
        Ok(signature.to_der().as_bytes().to_vec())
    }
}

enum SubjectKey {
    Spki(SubjectPublicKeyInfo),
    Secp256k1(Secp256k1Public),
}

impl PublicKeyData for SubjectKey {
    fn subject_public_key_info(&self) -> Vec<u8> {
        match self {
            SubjectKey::Spki(key) => key.subject_public_key_info(),
            SubjectKey::Secp256k1(key) => key.subject_public_key_info(),
        }
    }

    fn der_bytes(&self) -> &[u8] {
        match self {
            SubjectKey::Spki(key) => key.der_bytes(),
            SubjectKey::Secp256k1(key) => key.der_bytes(),
        }
    }

    fn algorithm(&self) -> &'static SignatureAlgorithm {
        match self {
            SubjectKey::Spki(key) => key.algorithm(),
            SubjectKey::Secp256k1(key) => key.algorithm(),
        }
    }
}

enum CertificateSigner {
    Rcgen(KeyPair),
    Secp256k1(Secp256k1Signer),
}

impl PublicKeyData for CertificateSigner {
    fn subject_public_key_info(&self) -> Vec<u8> {
        match self {
            CertificateSigner::Rcgen(key) => key.subject_public_key_info(),
            CertificateSigner::Secp256k1(key) => key.subject_public_key_info(),
        }
    }

    fn der_bytes(&self) -> &[u8] {
        match self {
            CertificateSigner::Rcgen(key) => key.der_bytes(),
            CertificateSigner::Secp256k1(key) => key.der_bytes(),
        }
    }

    fn algorithm(&self) -> &'static SignatureAlgorithm {
        match self {
            CertificateSigner::Rcgen(key) => key.algorithm(),
            CertificateSigner::Secp256k1(key) => key.algorithm(),
        }
    }
}

impl SigningKey for CertificateSigner {
    fn sign(&self, msg: &[u8]) -> std::result::Result<Vec<u8>, rcgen::Error> {
        match self {
            CertificateSigner::Rcgen(key) => key.sign(msg),
            CertificateSigner::Secp256k1(key) => key.sign(msg),
        }
    }
}

/// Swaps the P-256 labelled subject key for the real secp256k1 SPKI and
/// re-signs the TBS certificate
fn relabel_subject_key(
    certificate: &[u8],
    subject: &Secp256k1Public,
    signer: &CertificateSigner,
) -> Result<Vec<u8>> {
    let certificate = AnyRef::from_der(certificate).map_err(asn1_error)?;
    let mut reader = SliceReader::new(certificate.value()).map_err(asn1_error)?;
    let tbs: AnyRef = reader.decode().map_err(asn1_error)?;
    let signature_algorithm: AnyRef = reader.decode().map_err(asn1_error)?;

    let labelled = P256Labelled(&subject.point).subject_public_key_info();
    let contents = tbs.value();
    let start = contents
        .windows(labelled.len())
        .position(|window| window == labelled.as_slice())
        .ok_or_else(|| {
            KeyConvertError::Certificate("Subject public key not found in TBS certificate".into())
        })?;

    let mut patched = Vec::with_capacity(contents.len());
    patched.extend_from_slice(&contents[..start]);
    patched.extend_from_slice(&subject.spki);
    patched.extend_from_slice(&contents[start + labelled.len()..]);

    let mut body = AnyRef::new(Tag::Sequence, &patched)
        .and_then(|tbs| tbs.to_der())
        .map_err(asn1_error)?;
    let signature = signer.sign(&body)?;
    body.extend(signature_algorithm.to_der().map_err(asn1_error)?);
    body.extend(
        BitStringRef::from_bytes(&signature)
            .and_then(|bits| bits.to_der())
            .map_err(asn1_error)?,
    );

    AnyRef::new(Tag::Sequence, &body)
        .and_then(|certificate| certificate.to_der())
        .map_err(asn1_error)
}

fn asn1_error(error: der::Error) -> KeyConvertError {
    KeyConvertError::Certificate(format!("DER error: {error}"))
}

fn apply_extensions(params: &mut CertificateParams, extensions: Vec<CertificateExtension>) {
    params.is_ca = IsCa::NoCa;
    params.key_usages.clear();
    params.custom_extensions.clear();
    params.use_authority_key_identifier_extension = false;

    for extension in extensions {
        match extension {
            CertificateExtension::BasicConstraints { ca: false, .. } => {
                params.is_ca = IsCa::ExplicitNoCa;
            }
            CertificateExtension::BasicConstraints {
                ca: true,
                path_length,
            } => {
                params.is_ca = IsCa::Ca(match path_length {
                    Some(length) => BasicConstraints::Constrained(length),
                    None => BasicConstraints::Unconstrained,
                });
            }
            CertificateExtension::SubjectKeyIdentifier => {
                params.key_identifier_method = KeyIdMethod::Sha256;
            }
            CertificateExtension::AuthorityKeyIdentifier => {
                params.use_authority_key_identifier_extension = true;
            }
            CertificateExtension::KeyUsage(flags) => {
                params.key_usages = flags.into_iter().map(KeyUsagePurpose::from).collect();
            }
            CertificateExtension::Custom {
                oid,
                content,
                critical,
            } => {
                let mut custom = CustomExtension::from_oid_content(&oid, content);
                custom.set_criticality(critical);
                params.custom_extensions.push(custom);
            }
        }
    }
}

/// Parses `KEY=value` pairs separated by commas, a bare name is a common name
fn distinguished_name(name: &str) -> Result<DistinguishedName> {
    let mut dn = DistinguishedName::new();

    if !name.contains('=') {
        dn.push(DnType::CommonName, name.trim());
        return Ok(dn);
    }

    for part in name.split(',') {
        let (key, value) = part.split_once('=').ok_or_else(|| {
            KeyConvertError::MalformedInput(format!("Invalid distinguished name part ({part})"))
        })?;
        let dn_type = match key.trim().to_ascii_uppercase().as_str() {
            "CN" => DnType::CommonName,
            "O" => DnType::OrganizationName,
            "OU" => DnType::OrganizationalUnitName,
            "C" => DnType::CountryName,
            "L" => DnType::LocalityName,
            "ST" => DnType::StateOrProvinceName,
            other => {
                return Err(KeyConvertError::MalformedInput(format!(
                    "Unsupported distinguished name attribute ({other})"
                )));
            }
        };
        dn.push(dn_type, value.trim());
    }

    Ok(dn)
}

fn serial_number(serial: &str) -> Result<SerialNumber> {
    let value: u128 = serial.trim().parse().map_err(|e| {
        KeyConvertError::MalformedInput(format!("Serial number ({serial}) isn't decimal: {e}"))
    })?;

    let bytes = value.to_be_bytes();
    let start = bytes
        .iter()
        .position(|b| *b != 0)
        .unwrap_or(bytes.len() - 1);
    Ok(SerialNumber::from_slice(&bytes[start..]))
}
