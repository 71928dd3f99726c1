//! Pay-to-public-key-hash address derivation
//!
//! The private key round trips through its WIF encoding, the public key is
//! recomputed from the decoded scalar and hashed with RIPEMD-160(SHA-256(..)).

use k256::{SecretKey, elliptic_curve::sec1::ToEncodedPoint};
use keyconvert_crypto::{Curve, KeyProvider};
use keyconvert_encoding::{MAINNET_PRIVATE_KEY_VERSION, wif};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::{
    KeyConvert,
    errors::{KeyConvertError, Result},
};

/// Mainnet P2PKH version byte
pub const P2PKH_VERSION: u8 = 0x00;

/// RIPEMD-160(SHA-256(data))
pub fn hash160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(Sha256::digest(data)).into()
}

impl<P: KeyProvider> KeyConvert<P> {
    /// Derives the mainnet P2PKH address of the committed secp256k1 key
    pub async fn derive_address(&self) -> Result<String> {
        if self.curve() != Curve::Secp256k1 {
            warn!("address derivation rejected for {} key", self.curve());
            return Err(KeyConvertError::unsupported("address", self.curve()));
        }

        let encoded = self.wif().await?;
        let decoded = wif::decode(&encoded, Some(MAINNET_PRIVATE_KEY_VERSION))?;
        let secret = SecretKey::from_slice(&decoded.private_key).map_err(|e| {
            KeyConvertError::MalformedInput(format!("secp256k1 scalar isn't valid: {e}"))
        })?;
        let point = secret.public_key().to_encoded_point(decoded.compressed);

        let address = bs58::encode(hash160(point.as_bytes()))
            .with_check_version(P2PKH_VERSION)
            .into_string();
        debug!("derived address {address}");
        Ok(address)
    }
}
