//! Legacy JSON header shim.
//!
//! Early artifacts carried a JSON header instead of the binary format. This
//! parser is tried only when the binary magic does not match, and it is
//! deliberately guarded: the global size ceiling applies first, then a lower
//! legacy-specific cap, then a byte-level nesting scan, all before serde is
//! allowed to touch the input. Best-effort compatibility only; the binary
//! format is authoritative.

use crate::bundle::{EncryptedBundle, MAX_BUNDLE_SIZE};
use crate::errors::CryptoError;
use serde::Deserialize;

/// Legacy payloads larger than this are rejected before any decoding.
pub const MAX_LEGACY_SIZE: usize = 10 * 1024 * 1024;
/// Maximum structural nesting depth tolerated in a legacy payload.
pub const MAX_LEGACY_DEPTH: usize = 32;

#[derive(Debug, Deserialize)]
struct LegacyHeader {
    format: String,
    suite_id: String,
    classical_kem_ciphertext: String,
    pqc_kem_ciphertext: String,
    kdf_salt: String,
    iv: String,
    ciphertext: String,
    auth_tag: String,
}

/// Scan raw bytes for structural nesting depth without building a tree.
/// Brace/bracket characters inside JSON strings are skipped.
fn structural_depth(bytes: &[u8], limit: usize) -> usize {
    let mut depth: usize = 0;
    let mut max_depth: usize = 0;
    let mut in_string = false;
    let mut escaped = false;
    for &b in bytes {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                if depth > max_depth {
                    max_depth = depth;
                    if max_depth > limit {
                        return max_depth;
                    }
                }
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    max_depth
}

fn decode_hex(value: &str, what: &str) -> Result<Vec<u8>, CryptoError> {
    hex::decode(value)
        .map_err(|_| CryptoError::Validation(format!("legacy field {what} is not valid hex")))
}

/// Parse a legacy JSON artifact into a bundle.
///
/// # Errors
/// `ValidationError` / `MemoryLimitExceededError` on anything oversized,
/// over-nested, undecodable, or failing the shared field-level invariants.
pub fn parse_legacy_bundle(bytes: &[u8]) -> Result<EncryptedBundle, CryptoError> {
    if bytes.len() > MAX_BUNDLE_SIZE {
        return Err(CryptoError::Validation(format!(
            "input of {} bytes exceeds maximum size {MAX_BUNDLE_SIZE}",
            bytes.len()
        )));
    }
    if bytes.len() > MAX_LEGACY_SIZE {
        return Err(CryptoError::MemoryLimitExceeded(format!(
            "legacy payload of {} bytes exceeds the {MAX_LEGACY_SIZE} byte limit",
            bytes.len()
        )));
    }
    if structural_depth(bytes, MAX_LEGACY_DEPTH) > MAX_LEGACY_DEPTH {
        return Err(CryptoError::Validation(format!(
            "legacy payload nesting exceeds depth limit {MAX_LEGACY_DEPTH}"
        )));
    }

    let header: LegacyHeader = serde_json::from_slice(bytes)
        .map_err(|e| CryptoError::Validation(format!("legacy header decode failed: {e}")))?;

    let bundle = EncryptedBundle {
        format_identifier: header.format,
        suite_id: header.suite_id,
        classical_kem_ciphertext: decode_hex(
            &header.classical_kem_ciphertext,
            "classical_kem_ciphertext",
        )?,
        pqc_kem_ciphertext: decode_hex(&header.pqc_kem_ciphertext, "pqc_kem_ciphertext")?,
        kdf_salt: decode_hex(&header.kdf_salt, "kdf_salt")?,
        symmetric_iv: decode_hex(&header.iv, "iv")?,
        symmetric_ciphertext: decode_hex(&header.ciphertext, "ciphertext")?,
        symmetric_auth_tag: decode_hex(&header.auth_tag, "auth_tag")?,
    };
    bundle.validate()?;
    Ok(bundle)
}
