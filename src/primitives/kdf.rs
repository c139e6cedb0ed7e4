use crate::errors::CryptoError;
use hkdf::Hkdf;
use sha2::Sha256;
use sha3::Sha3_256;
use zeroize::Zeroizing;

/// Key derivation algorithms available to suite configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KdfAlgorithm {
    HkdfSha256,
    HkdfSha3_256,
}

impl KdfAlgorithm {
    /// Resolve a configured algorithm name.
    pub fn from_name(name: &str) -> Result<Self, CryptoError> {
        match name {
            "HKDF-SHA256" => Ok(Self::HkdfSha256),
            "HKDF-SHA3-256" => Ok(Self::HkdfSha3_256),
            other => Err(CryptoError::AlgorithmUnavailable(format!("unknown KDF: {other}"))),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::HkdfSha256 => "HKDF-SHA256",
            Self::HkdfSha3_256 => "HKDF-SHA3-256",
        }
    }
}

/// Derive `output_len` key bytes from `ikm` with `salt` and a domain-separation
/// `info` label. The output is held in a `Zeroizing` buffer so it is wiped on
/// drop.
pub fn derive(
    algorithm: KdfAlgorithm,
    ikm: &[u8],
    salt: &[u8],
    info: &[u8],
    output_len: usize,
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let mut okm = Zeroizing::new(vec![0u8; output_len]);
    match algorithm {
        KdfAlgorithm::HkdfSha256 => {
            let hk = Hkdf::<Sha256>::new(Some(salt), ikm);
            hk.expand(info, &mut okm)
                .map_err(|e| CryptoError::Encryption(format!("hkdf expand: {e}")))?;
        }
        KdfAlgorithm::HkdfSha3_256 => {
            let hk = Hkdf::<Sha3_256>::new(Some(salt), ikm);
            hk.expand(info, &mut okm)
                .map_err(|e| CryptoError::Encryption(format!("hkdf expand: {e}")))?;
        }
    }
    Ok(okm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_for_same_inputs() {
        let a = derive(KdfAlgorithm::HkdfSha256, b"ikm", b"salt", b"label", 32).unwrap();
        let b = derive(KdfAlgorithm::HkdfSha256, b"ikm", b"salt", b"label", 32).unwrap();
        assert_eq!(*a, *b);
    }

    #[test]
    fn label_separates_domains() {
        let a = derive(KdfAlgorithm::HkdfSha256, b"ikm", b"salt", b"label-a", 32).unwrap();
        let b = derive(KdfAlgorithm::HkdfSha256, b"ikm", b"salt", b"label-b", 32).unwrap();
        assert_ne!(*a, *b);
    }

    #[test]
    fn sha3_variant_differs_from_sha2() {
        let a = derive(KdfAlgorithm::HkdfSha256, b"ikm", b"salt", b"label", 32).unwrap();
        let b = derive(KdfAlgorithm::HkdfSha3_256, b"ikm", b"salt", b"label", 32).unwrap();
        assert_ne!(*a, *b);
    }

    #[test]
    fn unknown_name_is_unavailable() {
        assert!(matches!(
            KdfAlgorithm::from_name("PBKDF2"),
            Err(CryptoError::AlgorithmUnavailable(_))
        ));
    }
}
