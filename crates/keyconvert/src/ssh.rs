//! PEM private key normalization and SSH key text

use keyconvert_crypto::{CryptoError, Curve, ops};
use keyconvert_encoding::pem;
use ssh_key::{
    PrivateKey,
    private::{EcdsaKeypair, KeypairData},
    public::{EcdsaPublicKey, Ed25519PublicKey, KeyData},
};
use tracing::debug;
use zeroize::Zeroizing;

use crate::errors::{KeyConvertError, Result};

/// Normalizes a PEM private key (PKCS8, SEC1 or unencrypted OpenSSH) to PKCS8 DER
pub(crate) fn private_pem_to_pkcs8(curve: Curve, text: &str) -> Result<Zeroizing<Vec<u8>>> {
    let label = pem::label(text)
        .ok_or_else(|| KeyConvertError::MalformedInput("Missing PEM private key marker".into()))?;
    debug!("normalizing ({label}) PEM to PKCS8");

    match label {
        pem::PRIVATE_KEY_LABEL => {
            let (_, der) = pem::decode(text)?;
            Ok(Zeroizing::new(der))
        }
        pem::EC_PRIVATE_KEY_LABEL => {
            let (_, der) = pem::decode(text)?;
            let der = Zeroizing::new(der);
            let secret = ops::private_from_sec1(curve, &der)
                .map_err(|e| KeyConvertError::MalformedInput(e.to_string()))?;
            Ok(ops::private_to_pkcs8(curve, &secret)?)
        }
        pem::OPENSSH_PRIVATE_KEY_LABEL => {
            let secret = openssh_private_scalar(curve, text)?;
            Ok(ops::private_to_pkcs8(curve, &secret)?)
        }
        other => Err(KeyConvertError::MalformedInput(format!(
            "Unsupported PEM private key ({other})"
        ))),
    }
}

/// Extracts the private scalar from an unencrypted OpenSSH private key
fn openssh_private_scalar(curve: Curve, text: &str) -> Result<Zeroizing<Vec<u8>>> {
    let key = PrivateKey::from_openssh(text)
        .map_err(|e| KeyConvertError::MalformedInput(format!("Invalid OpenSSH private key: {e}")))?;
    if key.is_encrypted() {
        return Err(KeyConvertError::MalformedInput(
            "Encrypted OpenSSH private keys aren't supported".into(),
        ));
    }

    let (key_curve, secret) = match key.key_data() {
        KeypairData::Ed25519(keypair) => (
            Curve::Ed25519,
            Zeroizing::new(keypair.private.to_bytes().to_vec()),
        ),
        KeypairData::Ecdsa(EcdsaKeypair::NistP256 { private, .. }) => {
            (Curve::P256, Zeroizing::new(private.as_slice().to_vec()))
        }
        KeypairData::Ecdsa(EcdsaKeypair::NistP384 { private, .. }) => {
            (Curve::P384, Zeroizing::new(private.as_slice().to_vec()))
        }
        _ => {
            return Err(KeyConvertError::MalformedInput(format!(
                "Unsupported OpenSSH key type ({})",
                key.algorithm()
            )));
        }
    };

    if key_curve != curve {
        return Err(KeyConvertError::MalformedInput(format!(
            "OpenSSH key is {key_curve}, expected {curve}"
        )));
    }
    Ok(secret)
}

/// Renders a public point as an OpenSSH public key line
///
/// `point` is the SEC1 uncompressed point for EC curves and the 32 byte
/// encoding for Ed25519. secp256k1 has no SSH key type.
pub(crate) fn public_key_line(curve: Curve, point: &[u8], comment: Option<&str>) -> Result<String> {
    let key_data = match curve {
        Curve::Ed25519 => {
            let bytes: [u8; 32] = point.try_into().map_err(|_| {
                CryptoError::KeyError(format!(
                    "Invalid Ed25519 public key length ({})",
                    point.len()
                ))
            })?;
            KeyData::Ed25519(Ed25519PublicKey(bytes))
        }
        Curve::P256 | Curve::P384 => KeyData::Ecdsa(
            EcdsaPublicKey::from_sec1_bytes(point)
                .map_err(|e| CryptoError::KeyError(format!("Invalid SSH ECDSA public key: {e}")))?,
        ),
        Curve::Secp256k1 => return Err(KeyConvertError::unsupported("ssh", curve)),
    };

    ssh_key::PublicKey::new(key_data, comment.unwrap_or_default())
        .to_openssh()
        .map_err(|e| {
            KeyConvertError::from(CryptoError::Format(format!(
                "Couldn't encode SSH public key: {e}"
            )))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ed25519_public_line() {
        let keypair = ops::generate(Curve::Ed25519, None).unwrap();
        let line = public_key_line(Curve::Ed25519, &keypair.public_bytes, Some("me@host")).unwrap();

        assert!(line.starts_with("ssh-ed25519 AAAA"));
        assert!(line.ends_with(" me@host"));
    }

    #[test]
    fn p384_public_line() {
        let keypair = ops::generate(Curve::P384, None).unwrap();
        let line = public_key_line(Curve::P384, &keypair.public_bytes, None).unwrap();

        assert!(line.starts_with("ecdsa-sha2-nistp384 "));
    }

    #[test]
    fn secp256k1_has_no_ssh_type() {
        let keypair = ops::generate(Curve::Secp256k1, None).unwrap();
        assert!(matches!(
            public_key_line(Curve::Secp256k1, &keypair.public_bytes, None).unwrap_err(),
            KeyConvertError::UnsupportedFormat { .. }
        ));
    }

    #[test]
    fn sec1_pem_normalized() {
        let keypair = ops::generate(Curve::P256, None).unwrap();
        let sec1 = ops::private_to_sec1(Curve::P256, &keypair.private_bytes).unwrap();
        let text = pem::encode(pem::EC_PRIVATE_KEY_LABEL, &sec1).unwrap();

        let der = private_pem_to_pkcs8(Curve::P256, &text).unwrap();
        assert_eq!(
            ops::private_from_pkcs8(Curve::P256, &der).unwrap().as_slice(),
            keypair.private_bytes.as_slice()
        );
    }

    #[test]
    fn openssh_private_key_normalized() {
        let seed = [7u8; 32];
        let keypair = ssh_key::private::Ed25519Keypair::from_seed(&seed);
        let text = PrivateKey::from(keypair)
            .to_openssh(ssh_key::LineEnding::LF)
            .unwrap();

        let der = private_pem_to_pkcs8(Curve::Ed25519, &text).unwrap();
        assert_eq!(
            ops::private_from_pkcs8(Curve::Ed25519, &der).unwrap().as_slice(),
            seed.as_slice()
        );
        assert!(matches!(
            private_pem_to_pkcs8(Curve::P256, &text).unwrap_err(),
            KeyConvertError::MalformedInput(_)
        ));
    }

    #[test]
    fn unsupported_label() {
        let text = pem::encode("RSA PRIVATE KEY", &[0u8; 8]).unwrap();
        assert!(matches!(
            private_pem_to_pkcs8(Curve::P256, &text).unwrap_err(),
            KeyConvertError::MalformedInput(_)
        ));
    }
}
