use crate::errors::CryptoError;
use pqcrypto_dilithium::{dilithium2, dilithium3, dilithium5};
use pqcrypto_traits::sign::{DetachedSignature as _, PublicKey as _, SecretKey as _};
use zeroize::Zeroizing;

/// Post-quantum signature schemes available for module-integrity checks.
/// ML-DSA names are accepted as aliases for the matching Dilithium level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    Dilithium2,
    Dilithium3,
    Dilithium5,
}

impl SignatureAlgorithm {
    pub fn from_name(name: &str) -> Result<Self, CryptoError> {
        match name {
            "DILITHIUM2" | "ML-DSA-44" => Ok(Self::Dilithium2),
            "DILITHIUM3" | "ML-DSA-65" => Ok(Self::Dilithium3),
            "DILITHIUM5" | "ML-DSA-87" => Ok(Self::Dilithium5),
            other => Err(CryptoError::AlgorithmUnavailable(format!(
                "unknown signature algorithm: {other}"
            ))),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Dilithium2 => "DILITHIUM2",
            Self::Dilithium3 => "DILITHIUM3",
            Self::Dilithium5 => "DILITHIUM5",
        }
    }
}

/// Generate a signing keypair: (public key bytes, secret key bytes).
pub fn generate_keypair(
    algorithm: SignatureAlgorithm,
) -> Result<(Vec<u8>, Zeroizing<Vec<u8>>), CryptoError> {
    match algorithm {
        SignatureAlgorithm::Dilithium2 => {
            let (pk, sk) = dilithium2::keypair();
            Ok((pk.as_bytes().to_vec(), Zeroizing::new(sk.as_bytes().to_vec())))
        }
        SignatureAlgorithm::Dilithium3 => {
            let (pk, sk) = dilithium3::keypair();
            Ok((pk.as_bytes().to_vec(), Zeroizing::new(sk.as_bytes().to_vec())))
        }
        SignatureAlgorithm::Dilithium5 => {
            let (pk, sk) = dilithium5::keypair();
            Ok((pk.as_bytes().to_vec(), Zeroizing::new(sk.as_bytes().to_vec())))
        }
    }
}

/// Produce a detached signature over `message`.
pub fn sign(
    algorithm: SignatureAlgorithm,
    message: &[u8],
    secret_key: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    match algorithm {
        SignatureAlgorithm::Dilithium2 => {
            let sk = dilithium2::SecretKey::from_bytes(secret_key)
                .map_err(|e| CryptoError::Validation(format!("dilithium2 secret key: {e}")))?;
            Ok(dilithium2::detached_sign(message, &sk).as_bytes().to_vec())
        }
        SignatureAlgorithm::Dilithium3 => {
            let sk = dilithium3::SecretKey::from_bytes(secret_key)
                .map_err(|e| CryptoError::Validation(format!("dilithium3 secret key: {e}")))?;
            Ok(dilithium3::detached_sign(message, &sk).as_bytes().to_vec())
        }
        SignatureAlgorithm::Dilithium5 => {
            let sk = dilithium5::SecretKey::from_bytes(secret_key)
                .map_err(|e| CryptoError::Validation(format!("dilithium5 secret key: {e}")))?;
            Ok(dilithium5::detached_sign(message, &sk).as_bytes().to_vec())
        }
    }
}

/// Verify a detached signature. A signature that does not verify is a normal
/// `Ok(false)`; only malformed key or signature bytes are errors.
pub fn verify(
    algorithm: SignatureAlgorithm,
    message: &[u8],
    signature: &[u8],
    public_key: &[u8],
) -> Result<bool, CryptoError> {
    match algorithm {
        SignatureAlgorithm::Dilithium2 => {
            let pk = dilithium2::PublicKey::from_bytes(public_key)
                .map_err(|e| CryptoError::Validation(format!("dilithium2 public key: {e}")))?;
            let sig = match dilithium2::DetachedSignature::from_bytes(signature) {
                Ok(s) => s,
                Err(_) => return Ok(false),
            };
            Ok(dilithium2::verify_detached_signature(&sig, message, &pk).is_ok())
        }
        SignatureAlgorithm::Dilithium3 => {
            let pk = dilithium3::PublicKey::from_bytes(public_key)
                .map_err(|e| CryptoError::Validation(format!("dilithium3 public key: {e}")))?;
            let sig = match dilithium3::DetachedSignature::from_bytes(signature) {
                Ok(s) => s,
                Err(_) => return Ok(false),
            };
            Ok(dilithium3::verify_detached_signature(&sig, message, &pk).is_ok())
        }
        SignatureAlgorithm::Dilithium5 => {
            let pk = dilithium5::PublicKey::from_bytes(public_key)
                .map_err(|e| CryptoError::Validation(format!("dilithium5 public key: {e}")))?;
            let sig = match dilithium5::DetachedSignature::from_bytes(signature) {
                Ok(s) => s,
                Err(_) => return Ok(false),
            };
            Ok(dilithium5::verify_detached_signature(&sig, message, &pk).is_ok())
        }
    }
}
