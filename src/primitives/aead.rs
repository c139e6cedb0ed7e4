use crate::errors::CryptoError;
use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit, Payload},
};
use chacha20poly1305::ChaCha20Poly1305;
use zeroize::Zeroizing;

/// Authentication tag length shared by both supported ciphers.
pub const AEAD_TAG_LEN: usize = 16;
/// Nonce length both supported ciphers operate with.
pub const AEAD_NONCE_LEN: usize = 12;

/// Symmetric AEAD algorithms available to suite configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymmetricAlgorithm {
    Aes256Gcm,
    ChaCha20Poly1305,
}

impl SymmetricAlgorithm {
    /// Resolve a configured algorithm name.
    pub fn from_name(name: &str) -> Result<Self, CryptoError> {
        match name {
            "AES256GCM" => Ok(Self::Aes256Gcm),
            "CHACHA20POLY1305" => Ok(Self::ChaCha20Poly1305),
            other => {
                Err(CryptoError::AlgorithmUnavailable(format!("unknown AEAD cipher: {other}")))
            }
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Aes256Gcm => "AES256GCM",
            Self::ChaCha20Poly1305 => "CHACHA20POLY1305",
        }
    }
}

/// Ciphertext and detached authentication tag.
#[derive(Debug, Clone)]
pub struct AeadOutput {
    pub ciphertext: Vec<u8>,
    pub tag: Vec<u8>,
}

fn check_lengths(key: &[u8], iv: &[u8]) -> Result<(), CryptoError> {
    if key.len() != 32 {
        return Err(CryptoError::Encryption(format!("AEAD key must be 32 bytes, got {}", key.len())));
    }
    if iv.len() != AEAD_NONCE_LEN {
        return Err(CryptoError::Encryption(format!(
            "AEAD nonce must be {AEAD_NONCE_LEN} bytes, got {}",
            iv.len()
        )));
    }
    Ok(())
}

/// Encrypt `plaintext` under `key`/`iv` with optional associated data.
/// The cipher's appended tag is split off and returned separately.
pub fn encrypt(
    algorithm: SymmetricAlgorithm,
    key: &[u8],
    iv: &[u8],
    plaintext: &[u8],
    associated_data: &[u8],
) -> Result<AeadOutput, CryptoError> {
    check_lengths(key, iv)?;
    let nonce = Nonce::from_slice(iv);
    let payload = Payload { msg: plaintext, aad: associated_data };
    let mut sealed = match algorithm {
        SymmetricAlgorithm::Aes256Gcm => {
            let cipher = Aes256Gcm::new_from_slice(key)
                .map_err(|e| CryptoError::Encryption(format!("cipher key: {e}")))?;
            cipher
                .encrypt(nonce, payload)
                .map_err(|_| CryptoError::Encryption("AEAD encryption failed".into()))?
        }
        SymmetricAlgorithm::ChaCha20Poly1305 => {
            let cipher = ChaCha20Poly1305::new_from_slice(key)
                .map_err(|e| CryptoError::Encryption(format!("cipher key: {e}")))?;
            cipher
                .encrypt(nonce, payload)
                .map_err(|_| CryptoError::Encryption("AEAD encryption failed".into()))?
        }
    };
    if sealed.len() < AEAD_TAG_LEN {
        return Err(CryptoError::Encryption("sealed output shorter than tag".into()));
    }
    let tag = sealed.split_off(sealed.len() - AEAD_TAG_LEN);
    Ok(AeadOutput { ciphertext: sealed, tag })
}

/// Decrypt `ciphertext` with its detached `tag`. Fails closed with
/// `DecryptionError` on any authentication mismatch.
pub fn decrypt(
    algorithm: SymmetricAlgorithm,
    key: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
    associated_data: &[u8],
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    check_lengths(key, iv)
        .map_err(|_| CryptoError::Decryption("AEAD decryption failed".into()))?;
    if tag.len() != AEAD_TAG_LEN {
        return Err(CryptoError::Decryption("AEAD decryption failed".into()));
    }
    let nonce = Nonce::from_slice(iv);
    let mut sealed = Vec::with_capacity(ciphertext.len() + tag.len());
    sealed.extend_from_slice(ciphertext);
    sealed.extend_from_slice(tag);
    let payload = Payload { msg: &sealed, aad: associated_data };
    let opened = match algorithm {
        SymmetricAlgorithm::Aes256Gcm => {
            let cipher = Aes256Gcm::new_from_slice(key)
                .map_err(|_| CryptoError::Decryption("AEAD decryption failed".into()))?;
            cipher
                .decrypt(nonce, payload)
                .map_err(|_| CryptoError::Decryption("AEAD decryption failed".into()))?
        }
        SymmetricAlgorithm::ChaCha20Poly1305 => {
            let cipher = ChaCha20Poly1305::new_from_slice(key)
                .map_err(|_| CryptoError::Decryption("AEAD decryption failed".into()))?;
            cipher
                .decrypt(nonce, payload)
                .map_err(|_| CryptoError::Decryption("AEAD decryption failed".into()))?
        }
    };
    Ok(Zeroizing::new(opened))
}
