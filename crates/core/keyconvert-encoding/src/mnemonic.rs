//! BIP39 mnemonic encoding/decoding
//!
//! Maps raw entropy (16 to 32 bytes, in 4 byte steps) to a checksummed
//! English word sequence and back.
//!
//! See: <https://github.com/bitcoin/bips/blob/master/bip-0039.mediawiki>

use bip39::Mnemonic;
use zeroize::Zeroizing;

use crate::EncodingError;

/// Encode entropy bytes as a space separated mnemonic phrase
pub fn entropy_to_mnemonic(entropy: &[u8]) -> Result<Zeroizing<String>, EncodingError> {
    let mnemonic = Mnemonic::from_entropy(entropy)
        .map_err(|e| EncodingError::Mnemonic(format!("Couldn't encode entropy: {e}")))?;

    Ok(Zeroizing::new(mnemonic.to_string()))
}

/// Decode a mnemonic phrase back to its entropy bytes
///
/// Whitespace between words is normalized and words are matched case-insensitively.
pub fn mnemonic_to_entropy(phrase: &str) -> Result<Zeroizing<Vec<u8>>, EncodingError> {
    let normalized = Zeroizing::new(
        phrase
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" "),
    );

    let mnemonic = Mnemonic::parse_normalized(&normalized)
        .map_err(|e| EncodingError::Mnemonic(format!("Couldn't parse mnemonic: {e}")))?;

    Ok(Zeroizing::new(mnemonic.to_entropy()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZERO_PHRASE: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon art";

    #[test]
    fn zero_entropy_vector() {
        let phrase = entropy_to_mnemonic(&[0u8; 32]).unwrap();
        assert_eq!(phrase.as_str(), ZERO_PHRASE);
    }

    #[test]
    fn decode_vector() {
        let entropy = mnemonic_to_entropy(ZERO_PHRASE).unwrap();
        assert_eq!(entropy.as_slice(), &[0u8; 32]);
    }

    #[test]
    fn decode_normalizes_whitespace_and_case() {
        let messy = format!("  {}  ", ZERO_PHRASE.to_uppercase().replace(' ', "\n "));
        let entropy = mnemonic_to_entropy(&messy).unwrap();
        assert_eq!(entropy.as_slice(), &[0u8; 32]);
    }

    #[test]
    fn bad_checksum() {
        let phrase = ZERO_PHRASE.replace(" art", " abandon");
        assert!(matches!(
            mnemonic_to_entropy(&phrase).unwrap_err(),
            EncodingError::Mnemonic(_)
        ));
    }

    #[test]
    fn entropy_too_long() {
        assert!(matches!(
            entropy_to_mnemonic(&[7u8; 48]).unwrap_err(),
            EncodingError::Mnemonic(_)
        ));
    }
}
