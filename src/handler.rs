//! Hybrid PQC crypto handler: authenticated hybrid encryption/decryption for
//! one configured cipher suite. Classical and post-quantum KEM outputs are
//! combined through the suite's KDF into a single symmetric key, which drives
//! the suite's AEAD cipher.

use crate::bundle::{codec, EncryptedBundle};
use crate::config::{ResolvedSuite, SuiteDescriptor};
use crate::errors::CryptoError;
use crate::primitives::aead::AEAD_NONCE_LEN;
use crate::primitives::{aead, kdf, kem, random};
use std::path::Path;
use zeroize::Zeroizing;

/// Length of the fresh random salt carried in the bundle for key re-derivation.
pub const KDF_SALT_LEN: usize = 32;
/// Length of the derived symmetric key.
pub const DERIVED_KEY_LEN: usize = 32;

/// A recipient's public half: one key per KEM in the hybrid pair.
#[derive(Debug, Clone)]
pub struct RecipientPublicKeys {
    pub classical: Vec<u8>,
    pub pqc: Vec<u8>,
}

/// A recipient's private half. Wiped on drop.
pub struct RecipientPrivateKeys {
    pub classical: Zeroizing<Vec<u8>>,
    pub pqc: Zeroizing<Vec<u8>>,
}

/// Closed polymorphic interface every registered handler implements. The
/// registry owns one instance per suite; handlers hold no per-call mutable
/// state and are safe to share across threads.
pub trait CryptoHandler: std::fmt::Debug + Send + Sync {
    /// The suite this handler serves.
    fn suite_id(&self) -> &str;

    /// Whether this handler recognizes the given content. Used for decryption
    /// dispatch; internal probe failures collapse to `false` rather than
    /// propagating.
    fn can_handle(&self, file_path: Option<&Path>, content_peek: &[u8]) -> bool;

    /// Encrypt `plaintext` for the recipient. Never returns partial output.
    fn encrypt(
        &self,
        plaintext: &[u8],
        recipient: &RecipientPublicKeys,
    ) -> Result<EncryptedBundle, CryptoError>;

    /// Decrypt a bundle. Authentication failure is an opaque
    /// `DecryptionError`, indistinguishable from a wrong key.
    fn decrypt(
        &self,
        bundle: &EncryptedBundle,
        recipient: &RecipientPrivateKeys,
    ) -> Result<Zeroizing<Vec<u8>>, CryptoError>;
}

/// Handler for `hybrid-pqc` suites.
#[derive(Debug)]
pub struct HybridPqcHandler {
    suite: SuiteDescriptor,
    resolved: ResolvedSuite,
}

impl HybridPqcHandler {
    /// Build a handler for one suite, resolving its algorithm names once.
    pub fn new(suite: SuiteDescriptor) -> Result<Self, CryptoError> {
        let resolved = suite.resolve()?;
        Ok(Self { suite, resolved })
    }

    /// The suite this handler was built from.
    #[must_use]
    pub fn suite(&self) -> &SuiteDescriptor {
        &self.suite
    }

    fn derive_symmetric_key(
        &self,
        classical_secret: &[u8],
        pqc_secret: &[u8],
        salt: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        let mut combined = Zeroizing::new(Vec::with_capacity(
            classical_secret.len() + pqc_secret.len(),
        ));
        combined.extend_from_slice(classical_secret);
        combined.extend_from_slice(pqc_secret);
        kdf::derive(
            self.resolved.kdf,
            &combined,
            salt,
            self.suite.kdf_label.as_bytes(),
            DERIVED_KEY_LEN,
        )
    }
}

fn opaque_decryption<E>(_: E) -> CryptoError {
    CryptoError::Decryption("could not decrypt data".into())
}

impl CryptoHandler for HybridPqcHandler {
    fn suite_id(&self) -> &str {
        &self.suite.id
    }

    fn can_handle(&self, _file_path: Option<&Path>, content_peek: &[u8]) -> bool {
        if content_peek.is_empty() {
            // Nothing to contradict the suite; the generic case when this
            // handler acts as the active encryption handler.
            return true;
        }
        if let Some(format_id) = codec::peek_format_identifier(content_peek) {
            return format_id == self.suite.format_identifier;
        }
        // Legacy JSON artifacts: a peek may be truncated, so sniff for the
        // quoted format identifier instead of decoding.
        content_peek.first() == Some(&b'{')
            && String::from_utf8_lossy(content_peek)
                .contains(&format!("\"{}\"", self.suite.format_identifier))
    }

    fn encrypt(
        &self,
        plaintext: &[u8],
        recipient: &RecipientPublicKeys,
    ) -> Result<EncryptedBundle, CryptoError> {
        let classical = kem::classical_encapsulate(self.resolved.classical_kem, &recipient.classical)
            .map_err(|e| CryptoError::Encryption(format!("classical encapsulation: {e}")))?;
        let pqc = kem::pqc_encapsulate(self.resolved.pqc_kem, &recipient.pqc)
            .map_err(|e| CryptoError::Encryption(format!("PQC encapsulation: {e}")))?;

        let salt = random::generate_random_bytes(KDF_SALT_LEN)?;
        let key = self.derive_symmetric_key(&classical.shared_secret, &pqc.shared_secret, &salt)?;

        let iv = random::generate_random_bytes(AEAD_NONCE_LEN)?;
        let sealed = aead::encrypt(self.resolved.symmetric, &key, &iv, plaintext, b"")?;

        Ok(EncryptedBundle {
            format_identifier: self.suite.format_identifier.clone(),
            suite_id: self.suite.id.clone(),
            classical_kem_ciphertext: classical.ciphertext,
            pqc_kem_ciphertext: pqc.ciphertext,
            kdf_salt: salt,
            symmetric_iv: iv,
            symmetric_ciphertext: sealed.ciphertext,
            symmetric_auth_tag: sealed.tag,
        })
    }

    fn decrypt(
        &self,
        bundle: &EncryptedBundle,
        recipient: &RecipientPrivateKeys,
    ) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        // Every sub-step failure maps to the same opaque error so callers
        // cannot distinguish a bad KEM ciphertext from a bad tag.
        let classical_secret = kem::classical_decapsulate(
            self.resolved.classical_kem,
            &bundle.classical_kem_ciphertext,
            &recipient.classical,
        )
        .map_err(opaque_decryption)?;
        let pqc_secret = kem::pqc_decapsulate(
            self.resolved.pqc_kem,
            &bundle.pqc_kem_ciphertext,
            &recipient.pqc,
        )
        .map_err(opaque_decryption)?;

        let key = self
            .derive_symmetric_key(&classical_secret, &pqc_secret, &bundle.kdf_salt)
            .map_err(opaque_decryption)?;

        aead::decrypt(
            self.resolved.symmetric,
            &key,
            &bundle.symmetric_iv,
            &bundle.symmetric_ciphertext,
            &bundle.symmetric_auth_tag,
            b"",
        )
        .map_err(opaque_decryption)
    }
}

/// Generate a hybrid keypair for a suite: one classical and one PQC keypair.
pub fn generate_keypair(
    suite: &SuiteDescriptor,
) -> Result<(RecipientPublicKeys, RecipientPrivateKeys), CryptoError> {
    let resolved = suite.resolve()?;
    let (classical_pk, classical_sk) = kem::classical_generate_keypair(resolved.classical_kem)?;
    let (pqc_pk, pqc_sk) = kem::pqc_generate_keypair(resolved.pqc_kem)?;
    Ok((
        RecipientPublicKeys { classical: classical_pk, pqc: pqc_pk },
        RecipientPrivateKeys { classical: classical_sk, pqc: pqc_sk },
    ))
}
