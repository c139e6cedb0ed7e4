use crate::errors::CryptoError;
use crate::primitives::random::generate_random_bytes;
use p256::elliptic_curve::rand_core::OsRng;
use pqcrypto_kyber::{kyber768, kyber1024};
use pqcrypto_traits::kem::{Ciphertext as _, PublicKey as _, SecretKey as _, SharedSecret as _};
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};
use zeroize::Zeroizing;

/// X25519 public key, secret key, and shared secret size in bytes.
pub const X25519_KEY_SIZE: usize = 32;
/// Kyber768 component sizes in bytes.
pub const KYBER768_PUBLIC_KEY_SIZE: usize = 1184;
pub const KYBER768_SECRET_KEY_SIZE: usize = 2400;
pub const KYBER768_CIPHERTEXT_SIZE: usize = 1088;
/// Kyber1024 component sizes in bytes.
pub const KYBER1024_PUBLIC_KEY_SIZE: usize = 1568;
pub const KYBER1024_SECRET_KEY_SIZE: usize = 3168;
pub const KYBER1024_CIPHERTEXT_SIZE: usize = 1568;

/// Classical key-exchange primitives usable as the non-PQC half of a hybrid
/// suite. Both are ephemeral-static ECDH shaped into a KEM: the encapsulation
/// ciphertext is the ephemeral public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassicalKemAlgorithm {
    X25519,
    P256,
}

impl ClassicalKemAlgorithm {
    pub fn from_name(name: &str) -> Result<Self, CryptoError> {
        match name {
            "X25519" => Ok(Self::X25519),
            "P256" => Ok(Self::P256),
            other => {
                Err(CryptoError::AlgorithmUnavailable(format!("unknown classical KEM: {other}")))
            }
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::X25519 => "X25519",
            Self::P256 => "P256",
        }
    }
}

/// Post-quantum KEMs usable as the PQC half of a hybrid suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PqcKemAlgorithm {
    Kyber768,
    Kyber1024,
}

impl PqcKemAlgorithm {
    pub fn from_name(name: &str) -> Result<Self, CryptoError> {
        match name {
            "KYBER768" => Ok(Self::Kyber768),
            "KYBER1024" => Ok(Self::Kyber1024),
            other => Err(CryptoError::AlgorithmUnavailable(format!("unknown PQC KEM: {other}"))),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Kyber768 => "KYBER768",
            Self::Kyber1024 => "KYBER1024",
        }
    }

    #[must_use]
    pub fn ciphertext_size(&self) -> usize {
        match self {
            Self::Kyber768 => KYBER768_CIPHERTEXT_SIZE,
            Self::Kyber1024 => KYBER1024_CIPHERTEXT_SIZE,
        }
    }
}

/// Result of a KEM encapsulation: the transmissible ciphertext and the local
/// shared secret. The secret is wiped on drop.
pub struct KemOutput {
    pub ciphertext: Vec<u8>,
    pub shared_secret: Zeroizing<Vec<u8>>,
}

fn fixed<const N: usize>(bytes: &[u8], what: &str) -> Result<[u8; N], CryptoError> {
    bytes.try_into().map_err(|_| {
        CryptoError::Validation(format!("{what} must be {N} bytes, got {}", bytes.len()))
    })
}

// --- classical half ---

/// Generate a classical keypair: (public key bytes, secret key bytes).
/// X25519 keys are raw 32-byte values; P-256 public keys are SEC1-encoded
/// uncompressed points with a raw 32-byte scalar as the secret.
pub fn classical_generate_keypair(
    algorithm: ClassicalKemAlgorithm,
) -> Result<(Vec<u8>, Zeroizing<Vec<u8>>), CryptoError> {
    match algorithm {
        ClassicalKemAlgorithm::X25519 => {
            let sk_bytes: [u8; X25519_KEY_SIZE] =
                fixed(&generate_random_bytes(X25519_KEY_SIZE)?, "x25519 seed")?;
            let sk = StaticSecret::from(sk_bytes);
            let pk = X25519PublicKey::from(&sk);
            Ok((pk.as_bytes().to_vec(), Zeroizing::new(sk_bytes.to_vec())))
        }
        ClassicalKemAlgorithm::P256 => {
            let sk = p256::SecretKey::random(&mut OsRng);
            let pk = sk.public_key();
            Ok((
                pk.to_sec1_bytes().to_vec(),
                Zeroizing::new(sk.to_bytes().to_vec()),
            ))
        }
    }
}

/// Encapsulate against a recipient's classical public key.
pub fn classical_encapsulate(
    algorithm: ClassicalKemAlgorithm,
    recipient_public: &[u8],
) -> Result<KemOutput, CryptoError> {
    match algorithm {
        ClassicalKemAlgorithm::X25519 => {
            let pk_bytes: [u8; X25519_KEY_SIZE] = fixed(recipient_public, "x25519 public key")?;
            let recipient = X25519PublicKey::from(pk_bytes);
            let eph_bytes: [u8; X25519_KEY_SIZE] =
                fixed(&generate_random_bytes(X25519_KEY_SIZE)?, "x25519 seed")?;
            let eph = StaticSecret::from(eph_bytes);
            let eph_pub = X25519PublicKey::from(&eph);
            let shared = eph.diffie_hellman(&recipient);
            Ok(KemOutput {
                ciphertext: eph_pub.as_bytes().to_vec(),
                shared_secret: Zeroizing::new(shared.as_bytes().to_vec()),
            })
        }
        ClassicalKemAlgorithm::P256 => {
            let recipient = p256::PublicKey::from_sec1_bytes(recipient_public)
                .map_err(|e| CryptoError::Validation(format!("p256 public key: {e}")))?;
            let eph = p256::ecdh::EphemeralSecret::random(&mut OsRng);
            let eph_pub = p256::PublicKey::from(&eph);
            let shared = eph.diffie_hellman(&recipient);
            Ok(KemOutput {
                ciphertext: eph_pub.to_sec1_bytes().to_vec(),
                shared_secret: Zeroizing::new(shared.raw_secret_bytes().to_vec()),
            })
        }
    }
}

/// Recover the classical shared secret from an encapsulation ciphertext.
pub fn classical_decapsulate(
    algorithm: ClassicalKemAlgorithm,
    ciphertext: &[u8],
    recipient_secret: &[u8],
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    match algorithm {
        ClassicalKemAlgorithm::X25519 => {
            let sk_bytes: [u8; X25519_KEY_SIZE] = fixed(recipient_secret, "x25519 secret key")?;
            let eph_bytes: [u8; X25519_KEY_SIZE] = fixed(ciphertext, "x25519 ciphertext")?;
            let sk = StaticSecret::from(sk_bytes);
            let eph_pub = X25519PublicKey::from(eph_bytes);
            let shared = sk.diffie_hellman(&eph_pub);
            Ok(Zeroizing::new(shared.as_bytes().to_vec()))
        }
        ClassicalKemAlgorithm::P256 => {
            let sk = p256::SecretKey::from_slice(recipient_secret)
                .map_err(|e| CryptoError::Validation(format!("p256 secret key: {e}")))?;
            let eph_pub = p256::PublicKey::from_sec1_bytes(ciphertext)
                .map_err(|e| CryptoError::Validation(format!("p256 ciphertext: {e}")))?;
            let shared = p256::ecdh::diffie_hellman(sk.to_nonzero_scalar(), eph_pub.as_affine());
            Ok(Zeroizing::new(shared.raw_secret_bytes().to_vec()))
        }
    }
}

// --- post-quantum half ---

/// Generate a PQC keypair: (public key bytes, secret key bytes).
pub fn pqc_generate_keypair(
    algorithm: PqcKemAlgorithm,
) -> Result<(Vec<u8>, Zeroizing<Vec<u8>>), CryptoError> {
    match algorithm {
        PqcKemAlgorithm::Kyber768 => {
            let (pk, sk) = kyber768::keypair();
            Ok((pk.as_bytes().to_vec(), Zeroizing::new(sk.as_bytes().to_vec())))
        }
        PqcKemAlgorithm::Kyber1024 => {
            let (pk, sk) = kyber1024::keypair();
            Ok((pk.as_bytes().to_vec(), Zeroizing::new(sk.as_bytes().to_vec())))
        }
    }
}

/// Encapsulate against a recipient's PQC public key.
pub fn pqc_encapsulate(
    algorithm: PqcKemAlgorithm,
    recipient_public: &[u8],
) -> Result<KemOutput, CryptoError> {
    match algorithm {
        PqcKemAlgorithm::Kyber768 => {
            let pk = kyber768::PublicKey::from_bytes(recipient_public)
                .map_err(|e| CryptoError::Validation(format!("kyber768 public key: {e}")))?;
            let (ss, ct) = kyber768::encapsulate(&pk);
            Ok(KemOutput {
                ciphertext: ct.as_bytes().to_vec(),
                shared_secret: Zeroizing::new(ss.as_bytes().to_vec()),
            })
        }
        PqcKemAlgorithm::Kyber1024 => {
            let pk = kyber1024::PublicKey::from_bytes(recipient_public)
                .map_err(|e| CryptoError::Validation(format!("kyber1024 public key: {e}")))?;
            let (ss, ct) = kyber1024::encapsulate(&pk);
            Ok(KemOutput {
                ciphertext: ct.as_bytes().to_vec(),
                shared_secret: Zeroizing::new(ss.as_bytes().to_vec()),
            })
        }
    }
}

/// Recover the PQC shared secret from an encapsulation ciphertext.
pub fn pqc_decapsulate(
    algorithm: PqcKemAlgorithm,
    ciphertext: &[u8],
    recipient_secret: &[u8],
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    match algorithm {
        PqcKemAlgorithm::Kyber768 => {
            let sk = kyber768::SecretKey::from_bytes(recipient_secret)
                .map_err(|e| CryptoError::Validation(format!("kyber768 secret key: {e}")))?;
            let ct = kyber768::Ciphertext::from_bytes(ciphertext)
                .map_err(|e| CryptoError::Validation(format!("kyber768 ciphertext: {e}")))?;
            let ss = kyber768::decapsulate(&ct, &sk);
            Ok(Zeroizing::new(ss.as_bytes().to_vec()))
        }
        PqcKemAlgorithm::Kyber1024 => {
            let sk = kyber1024::SecretKey::from_bytes(recipient_secret)
                .map_err(|e| CryptoError::Validation(format!("kyber1024 secret key: {e}")))?;
            let ct = kyber1024::Ciphertext::from_bytes(ciphertext)
                .map_err(|e| CryptoError::Validation(format!("kyber1024 ciphertext: {e}")))?;
            let ss = kyber1024::decapsulate(&ct, &sk);
            Ok(Zeroizing::new(ss.as_bytes().to_vec()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn x25519_encapsulation_agrees() {
        let (pk, sk) = classical_generate_keypair(ClassicalKemAlgorithm::X25519).unwrap();
        let out = classical_encapsulate(ClassicalKemAlgorithm::X25519, &pk).unwrap();
        let ss = classical_decapsulate(ClassicalKemAlgorithm::X25519, &out.ciphertext, &sk).unwrap();
        assert_eq!(*out.shared_secret, *ss);
        assert_eq!(out.ciphertext.len(), X25519_KEY_SIZE);
    }

    #[test]
    fn p256_encapsulation_agrees() {
        let (pk, sk) = classical_generate_keypair(ClassicalKemAlgorithm::P256).unwrap();
        let out = classical_encapsulate(ClassicalKemAlgorithm::P256, &pk).unwrap();
        let ss = classical_decapsulate(ClassicalKemAlgorithm::P256, &out.ciphertext, &sk).unwrap();
        assert_eq!(*out.shared_secret, *ss);
    }

    #[test]
    fn kyber768_encapsulation_agrees() {
        let (pk, sk) = pqc_generate_keypair(PqcKemAlgorithm::Kyber768).unwrap();
        assert_eq!(pk.len(), KYBER768_PUBLIC_KEY_SIZE);
        assert_eq!(sk.len(), KYBER768_SECRET_KEY_SIZE);
        let out = pqc_encapsulate(PqcKemAlgorithm::Kyber768, &pk).unwrap();
        assert_eq!(out.ciphertext.len(), KYBER768_CIPHERTEXT_SIZE);
        let ss = pqc_decapsulate(PqcKemAlgorithm::Kyber768, &out.ciphertext, &sk).unwrap();
        assert_eq!(*out.shared_secret, *ss);
    }

    #[test]
    fn wrong_length_inputs_rejected() {
        assert!(classical_encapsulate(ClassicalKemAlgorithm::X25519, &[0u8; 31]).is_err());
        assert!(pqc_encapsulate(PqcKemAlgorithm::Kyber768, &[0u8; 100]).is_err());
    }
}
