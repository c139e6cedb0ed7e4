//! Secure bundle: the at-rest artifact produced by hybrid encryption.
//! - binary wire codec with per-field CRC32 and strict parse limits
//! - guarded legacy JSON header shim for pre-binary artifacts

pub mod codec;
pub mod legacy;

use crate::errors::CryptoError;

pub use codec::{parse_bundle, parse_bundle_with_options, peek_format_identifier, to_bytes, ParseOptions};
pub use legacy::parse_legacy_bundle;

/// Bundle magic, the first four bytes of every binary artifact.
pub const BUNDLE_MAGIC: &[u8; 4] = b"FAVA";
/// Current wire format version.
pub const BUNDLE_VERSION: u16 = 0x0200;
/// Fixed header size in bytes.
pub const HEADER_SIZE: usize = 32;
/// Size of one field directory entry in bytes.
pub const DIR_ENTRY_SIZE: usize = 16;
/// Hard cap on a serialized bundle. Anything larger is rejected before any
/// other parsing work happens.
pub const MAX_BUNDLE_SIZE: usize = 100 * 1024 * 1024;
/// Cap on the field directory before it is allocated.
pub const MAX_FIELD_COUNT: u16 = 64;
/// Permitted symmetric IV lengths.
pub const MIN_IV_LEN: usize = 12;
pub const MAX_IV_LEN: usize = 32;

/// Bundle type tag carried in the header.
pub const BUNDLE_TYPE_HYBRID_PQC: u8 = 1;
/// Compression tags. Only uncompressed payloads are produced today; the flag
/// exists in the wire format for forward compatibility.
pub const COMPRESSION_NONE: u8 = 0;

/// Field type tags in directory entries.
pub const FIELD_TYPE_STRING: u8 = 1;
pub const FIELD_TYPE_BYTES: u8 = 2;

/// Stable field id assignment. The numeric values are a wire contract:
/// renumbering breaks every previously written artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum FieldId {
    FormatIdentifier = 1,
    SuiteId = 2,
    ClassicalKemCiphertext = 3,
    PqcKemCiphertext = 4,
    SymmetricIv = 5,
    EncryptedData = 6,
    AuthTag = 7,
    KdfSalt = 8,
}

impl FieldId {
    #[must_use]
    pub fn from_u16(v: u16) -> Option<Self> {
        match v {
            1 => Some(Self::FormatIdentifier),
            2 => Some(Self::SuiteId),
            3 => Some(Self::ClassicalKemCiphertext),
            4 => Some(Self::PqcKemCiphertext),
            5 => Some(Self::SymmetricIv),
            6 => Some(Self::EncryptedData),
            7 => Some(Self::AuthTag),
            8 => Some(Self::KdfSalt),
            _ => None,
        }
    }
}

/// The at-rest artifact holding every ciphertext component and the metadata
/// needed to decrypt it later, absent the private keys. Constructed by the
/// handler during encryption and immediately serialized; reconstructed by the
/// codec from validated input and read-only thereafter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedBundle {
    pub format_identifier: String,
    pub suite_id: String,
    pub classical_kem_ciphertext: Vec<u8>,
    pub pqc_kem_ciphertext: Vec<u8>,
    pub kdf_salt: Vec<u8>,
    pub symmetric_iv: Vec<u8>,
    pub symmetric_ciphertext: Vec<u8>,
    pub symmetric_auth_tag: Vec<u8>,
}

/// Suite ids are restricted to `[A-Za-z0-9_-]+`.
#[must_use]
pub fn is_valid_suite_id(s: &str) -> bool {
    !s.is_empty()
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

impl EncryptedBundle {
    /// Field-level semantic validation shared by the serializer and both
    /// parsers.
    pub fn validate(&self) -> Result<(), CryptoError> {
        if self.format_identifier.is_empty() {
            return Err(CryptoError::Validation("format identifier is empty".into()));
        }
        if !is_valid_suite_id(&self.suite_id) {
            return Err(CryptoError::Validation(format!(
                "suite id {:?} contains characters outside [A-Za-z0-9_-]",
                self.suite_id
            )));
        }
        let iv_len = self.symmetric_iv.len();
        if !(MIN_IV_LEN..=MAX_IV_LEN).contains(&iv_len) {
            return Err(CryptoError::Validation(format!(
                "IV length {iv_len} outside permitted range [{MIN_IV_LEN},{MAX_IV_LEN}]"
            )));
        }
        if self.classical_kem_ciphertext.is_empty() {
            return Err(CryptoError::Validation("classical KEM ciphertext is empty".into()));
        }
        if self.pqc_kem_ciphertext.is_empty() {
            return Err(CryptoError::Validation("PQC KEM ciphertext is empty".into()));
        }
        if self.kdf_salt.is_empty() {
            return Err(CryptoError::Validation("KDF salt is empty".into()));
        }
        if self.symmetric_auth_tag.is_empty() {
            return Err(CryptoError::Validation("authentication tag is empty".into()));
        }
        Ok(())
    }
}

/// Parse an artifact in whichever format it carries: the binary format when
/// the magic matches, otherwise the legacy JSON shim.
pub fn parse_auto(bytes: &[u8]) -> Result<EncryptedBundle, CryptoError> {
    if bytes.len() >= BUNDLE_MAGIC.len() && &bytes[..BUNDLE_MAGIC.len()] == BUNDLE_MAGIC {
        codec::parse_bundle(bytes)
    } else {
        legacy::parse_legacy_bundle(bytes)
    }
}
