//! Binary serializer/parser for the secure bundle wire format.
//!
//! Layout, little-endian throughout:
//! - header (32 bytes): magic "FAVA" | version u16 | bundle type u8 |
//!   compression u8 | total size u32 | field count u16 | header CRC32 u32
//!   (over the preceding 14 bytes) | 14 reserved zero bytes
//! - field directory: `field_count` entries of 16 bytes: field id u16 |
//!   field type u8 | compression u8 | absolute offset u32 | length u32 |
//!   CRC32 u32 of the field data
//! - field data region
//!
//! The parser never trusts a length or offset before bounds-checking it, and
//! runs its checks cheapest-first so hostile input is rejected with the least
//! work.

use crate::bundle::{
    EncryptedBundle, FieldId, BUNDLE_MAGIC, BUNDLE_TYPE_HYBRID_PQC, BUNDLE_VERSION,
    COMPRESSION_NONE, DIR_ENTRY_SIZE, FIELD_TYPE_BYTES, FIELD_TYPE_STRING, HEADER_SIZE,
    MAX_BUNDLE_SIZE, MAX_FIELD_COUNT,
};
use crate::errors::CryptoError;
use crc32fast::Hasher as Crc32Hasher;
use std::time::{Duration, Instant};

/// The portion of the header covered by the header CRC: magic, version,
/// bundle type, compression flag, total size, field count.
const HEADER_CRC_SPAN: usize = 14;

/// Knobs for hostile-input defense. The time budget is a deadline checked
/// between field-processing steps, not preemption.
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    pub time_budget: Duration,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { time_budget: Duration::from_secs(2) }
    }
}

fn crc32(data: &[u8]) -> u32 {
    let mut hasher = Crc32Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Serialize a fully populated bundle.
///
/// # Errors
/// Returns `SerializationError` if a required field is unset or a field-level
/// invariant (suite id charset, IV length) is violated.
pub fn to_bytes(bundle: &EncryptedBundle) -> Result<Vec<u8>, CryptoError> {
    bundle.validate().map_err(|e| CryptoError::Serialization(e.to_string()))?;

    let fields: [(FieldId, u8, &[u8]); 8] = [
        (FieldId::FormatIdentifier, FIELD_TYPE_STRING, bundle.format_identifier.as_bytes()),
        (FieldId::SuiteId, FIELD_TYPE_STRING, bundle.suite_id.as_bytes()),
        (FieldId::ClassicalKemCiphertext, FIELD_TYPE_BYTES, &bundle.classical_kem_ciphertext),
        (FieldId::PqcKemCiphertext, FIELD_TYPE_BYTES, &bundle.pqc_kem_ciphertext),
        (FieldId::SymmetricIv, FIELD_TYPE_BYTES, &bundle.symmetric_iv),
        (FieldId::EncryptedData, FIELD_TYPE_BYTES, &bundle.symmetric_ciphertext),
        (FieldId::AuthTag, FIELD_TYPE_BYTES, &bundle.symmetric_auth_tag),
        (FieldId::KdfSalt, FIELD_TYPE_BYTES, &bundle.kdf_salt),
    ];

    let data_start = HEADER_SIZE + fields.len() * DIR_ENTRY_SIZE;
    let payload_len: usize = fields.iter().map(|(_, _, data)| data.len()).sum();
    let total_size = data_start
        .checked_add(payload_len)
        .ok_or_else(|| CryptoError::Serialization("bundle size overflow".into()))?;
    if total_size > MAX_BUNDLE_SIZE {
        return Err(CryptoError::Serialization(format!(
            "serialized bundle of {total_size} bytes exceeds maximum size {MAX_BUNDLE_SIZE}"
        )));
    }

    let mut out = Vec::with_capacity(total_size);

    // Header.
    out.extend_from_slice(BUNDLE_MAGIC);
    out.extend_from_slice(&BUNDLE_VERSION.to_le_bytes());
    out.push(BUNDLE_TYPE_HYBRID_PQC);
    out.push(COMPRESSION_NONE);
    out.extend_from_slice(&(total_size as u32).to_le_bytes());
    out.extend_from_slice(&(fields.len() as u16).to_le_bytes());
    let header_crc = crc32(&out[..HEADER_CRC_SPAN]);
    out.extend_from_slice(&header_crc.to_le_bytes());
    out.resize(HEADER_SIZE, 0);

    // Field directory.
    let mut offset = data_start;
    for (id, field_type, data) in &fields {
        out.extend_from_slice(&(*id as u16).to_le_bytes());
        out.push(*field_type);
        out.push(COMPRESSION_NONE);
        out.extend_from_slice(&(offset as u32).to_le_bytes());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(&crc32(data).to_le_bytes());
        offset += data.len();
    }

    // Field data region.
    for (_, _, data) in &fields {
        out.extend_from_slice(data);
    }
    debug_assert_eq!(out.len(), total_size);
    Ok(out)
}

/// Parse a binary bundle with default parse options.
pub fn parse_bundle(bytes: &[u8]) -> Result<EncryptedBundle, CryptoError> {
    parse_bundle_with_options(bytes, ParseOptions::default())
}

/// Parse a binary bundle, validating in strict cheapest-first order: size
/// ceiling, magic, header CRC, version, declared size, field count, per-field
/// bounds and CRC, then field semantics.
pub fn parse_bundle_with_options(
    bytes: &[u8],
    options: ParseOptions,
) -> Result<EncryptedBundle, CryptoError> {
    let deadline = Instant::now() + options.time_budget;

    // 1. Size ceiling before touching anything else.
    if bytes.len() > MAX_BUNDLE_SIZE {
        return Err(CryptoError::Validation(format!(
            "input of {} bytes exceeds maximum size {MAX_BUNDLE_SIZE}",
            bytes.len()
        )));
    }

    // 2. Magic gate.
    if bytes.len() < HEADER_SIZE || &bytes[..BUNDLE_MAGIC.len()] != BUNDLE_MAGIC {
        return Err(CryptoError::Validation("Invalid magic number".into()));
    }

    // 3. Header integrity before interpreting header fields.
    let stored_header_crc = read_u32(bytes, HEADER_CRC_SPAN);
    if crc32(&bytes[..HEADER_CRC_SPAN]) != stored_header_crc {
        return Err(CryptoError::Validation("header CRC mismatch".into()));
    }

    // 4. Version.
    let version = read_u16(bytes, 4);
    if version != BUNDLE_VERSION {
        return Err(CryptoError::Validation(format!(
            "unsupported bundle version {version:#06x}"
        )));
    }

    // 5. Declared size must match reality exactly.
    let total_size = read_u32(bytes, 8) as usize;
    if total_size != bytes.len() {
        return Err(CryptoError::Validation(format!(
            "declared total size {total_size} does not match input length {}",
            bytes.len()
        )));
    }

    // 6. Field count bound before allocating the directory.
    let field_count = read_u16(bytes, 12);
    if field_count > MAX_FIELD_COUNT {
        return Err(CryptoError::Validation(format!(
            "field count {field_count} exceeds limit {MAX_FIELD_COUNT}"
        )));
    }
    let dir_end = HEADER_SIZE + usize::from(field_count) * DIR_ENTRY_SIZE;
    if dir_end > total_size {
        return Err(CryptoError::Validation("field directory extends past input".into()));
    }

    // 7. Per-field bounds check, slice, CRC check.
    let mut format_identifier: Option<String> = None;
    let mut suite_id: Option<String> = None;
    let mut classical_kem_ciphertext: Option<Vec<u8>> = None;
    let mut pqc_kem_ciphertext: Option<Vec<u8>> = None;
    let mut kdf_salt: Option<Vec<u8>> = None;
    let mut symmetric_iv: Option<Vec<u8>> = None;
    let mut symmetric_ciphertext: Option<Vec<u8>> = None;
    let mut symmetric_auth_tag: Option<Vec<u8>> = None;

    for i in 0..usize::from(field_count) {
        if Instant::now() >= deadline {
            return Err(CryptoError::ParsingTimeout(
                "bundle parsing exceeded its time budget".into(),
            ));
        }
        let entry = HEADER_SIZE + i * DIR_ENTRY_SIZE;
        let raw_id = read_u16(bytes, entry);
        let offset = read_u32(bytes, entry + 4) as usize;
        let length = read_u32(bytes, entry + 8) as usize;
        let stored_crc = read_u32(bytes, entry + 12);

        let end = offset.checked_add(length).ok_or_else(|| {
            CryptoError::Validation(format!("field {raw_id} offset+length overflows"))
        })?;
        if offset < dir_end || end > total_size {
            return Err(CryptoError::Validation(format!(
                "field {raw_id} [{offset}, {end}) out of bounds"
            )));
        }
        let data = &bytes[offset..end];
        if crc32(data) != stored_crc {
            return Err(CryptoError::Validation(format!("field {raw_id} CRC mismatch")));
        }

        // Unknown field ids are ignored for forward compatibility; the size
        // and CRC checks above still apply to them.
        let Some(id) = FieldId::from_u16(raw_id) else { continue };
        let slot = match id {
            FieldId::FormatIdentifier => {
                assign_string(&mut format_identifier, raw_id, data)?;
                continue;
            }
            FieldId::SuiteId => {
                assign_string(&mut suite_id, raw_id, data)?;
                continue;
            }
            FieldId::ClassicalKemCiphertext => &mut classical_kem_ciphertext,
            FieldId::PqcKemCiphertext => &mut pqc_kem_ciphertext,
            FieldId::SymmetricIv => &mut symmetric_iv,
            FieldId::EncryptedData => &mut symmetric_ciphertext,
            FieldId::AuthTag => &mut symmetric_auth_tag,
            FieldId::KdfSalt => &mut kdf_salt,
        };
        if slot.is_some() {
            return Err(CryptoError::Validation(format!("duplicate field {raw_id}")));
        }
        *slot = Some(data.to_vec());
    }

    // 8. Field-specific semantic validation on the assembled bundle.
    let bundle = EncryptedBundle {
        format_identifier: required(format_identifier, "format identifier")?,
        suite_id: required(suite_id, "suite id")?,
        classical_kem_ciphertext: required(classical_kem_ciphertext, "classical KEM ciphertext")?,
        pqc_kem_ciphertext: required(pqc_kem_ciphertext, "PQC KEM ciphertext")?,
        kdf_salt: required(kdf_salt, "KDF salt")?,
        symmetric_iv: required(symmetric_iv, "symmetric IV")?,
        symmetric_ciphertext: symmetric_ciphertext.unwrap_or_default(),
        symmetric_auth_tag: required(symmetric_auth_tag, "authentication tag")?,
    };
    bundle.validate()?;
    Ok(bundle)
}

fn assign_string(
    slot: &mut Option<String>,
    raw_id: u16,
    data: &[u8],
) -> Result<(), CryptoError> {
    if slot.is_some() {
        return Err(CryptoError::Validation(format!("duplicate field {raw_id}")));
    }
    let s = std::str::from_utf8(data)
        .map_err(|_| CryptoError::Validation(format!("field {raw_id} is not valid UTF-8")))?;
    *slot = Some(s.to_string());
    Ok(())
}

fn required<T>(value: Option<T>, what: &str) -> Result<T, CryptoError> {
    value.ok_or_else(|| CryptoError::Validation(format!("missing required field: {what}")))
}

/// Cheap probe used for handler dispatch: extract the format identifier from
/// a (possibly truncated) peek of a binary bundle without validating the rest
/// of the artifact. Only the header CRC and the identifier field's own CRC
/// are checked. Returns `None` on anything that does not look like a healthy
/// binary bundle prefix.
#[must_use]
pub fn peek_format_identifier(peek: &[u8]) -> Option<String> {
    if peek.len() < HEADER_SIZE || &peek[..BUNDLE_MAGIC.len()] != BUNDLE_MAGIC {
        return None;
    }
    if crc32(&peek[..HEADER_CRC_SPAN]) != read_u32(peek, HEADER_CRC_SPAN) {
        return None;
    }
    if read_u16(peek, 4) != BUNDLE_VERSION {
        return None;
    }
    let field_count = read_u16(peek, 12);
    if field_count > MAX_FIELD_COUNT {
        return None;
    }
    for i in 0..usize::from(field_count) {
        let entry = HEADER_SIZE + i * DIR_ENTRY_SIZE;
        if entry + DIR_ENTRY_SIZE > peek.len() {
            return None;
        }
        if read_u16(peek, entry) != FieldId::FormatIdentifier as u16 {
            continue;
        }
        let offset = read_u32(peek, entry + 4) as usize;
        let length = read_u32(peek, entry + 8) as usize;
        let end = offset.checked_add(length)?;
        if end > peek.len() {
            return None;
        }
        let data = &peek[offset..end];
        if crc32(data) != read_u32(peek, entry + 12) {
            return None;
        }
        return std::str::from_utf8(data).ok().map(str::to_string);
    }
    None
}
