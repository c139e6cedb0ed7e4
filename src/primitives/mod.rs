//! Primitive adapters: thin capability interfaces over the underlying
//! cryptographic libraries. Core logic treats these as black boxes; nothing
//! above this module touches a vendor API directly.
//! - KEM: classical (X25519, P-256 ECDH) and post-quantum (Kyber)
//! - KDF: HKDF with domain-separation label
//! - AEAD: AES-256-GCM, ChaCha20-Poly1305
//! - Signatures: Dilithium (ML-DSA)
//! - Randomness: OS-backed CSPRNG

pub mod aead;
pub mod kdf;
pub mod kem;
pub mod random;
pub mod sig;

pub use aead::{AeadOutput, SymmetricAlgorithm, AEAD_TAG_LEN};
pub use kdf::KdfAlgorithm;
pub use kem::{ClassicalKemAlgorithm, KemOutput, PqcKemAlgorithm};
pub use random::generate_random_bytes;
pub use sig::SignatureAlgorithm;
