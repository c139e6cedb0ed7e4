use fava_crypto::bundle::{
    self, codec, parse_bundle, to_bytes, EncryptedBundle, ParseOptions, DIR_ENTRY_SIZE,
    HEADER_SIZE, MAX_BUNDLE_SIZE,
};
use fava_crypto::errors::CryptoError;
use std::time::Duration;

fn sample_bundle() -> EncryptedBundle {
    EncryptedBundle {
        format_identifier: "FAVA_PQC_HYBRID_V2".to_string(),
        suite_id: "X25519_KYBER768_AES256GCM".to_string(),
        classical_kem_ciphertext: vec![0x11; 32],
        pqc_kem_ciphertext: vec![0x22; 1088],
        kdf_salt: vec![0x33; 32],
        symmetric_iv: vec![0x44; 12],
        symmetric_ciphertext: vec![0x55; 73],
        symmetric_auth_tag: vec![0x66; 16],
    }
}

fn crc32(data: &[u8]) -> u32 {
    let mut h = crc32fast::Hasher::new();
    h.update(data);
    h.finalize()
}

/// Recompute the header CRC after patching any of the first 14 bytes.
fn fix_header_crc(bytes: &mut [u8]) {
    let crc = crc32(&bytes[..14]);
    bytes[14..18].copy_from_slice(&crc.to_le_bytes());
}

#[test]
fn roundtrip_is_field_equal() {
    let bundle = sample_bundle();
    let bytes = to_bytes(&bundle).unwrap();
    let parsed = parse_bundle(&bytes).unwrap();
    assert_eq!(parsed, bundle);
}

#[test]
fn serialized_layout_starts_with_magic_and_version() {
    let bytes = to_bytes(&sample_bundle()).unwrap();
    assert_eq!(&bytes[..4], b"FAVA");
    assert_eq!(u16::from_le_bytes([bytes[4], bytes[5]]), 0x0200);
    let total = u32::from_le_bytes(bytes[8..12].try_into().unwrap()) as usize;
    assert_eq!(total, bytes.len());
}

#[test]
fn tampering_field_data_is_detected() {
    let bytes = to_bytes(&sample_bundle()).unwrap();
    let data_start = HEADER_SIZE + 8 * DIR_ENTRY_SIZE;
    for index in [data_start, data_start + (bytes.len() - data_start) / 2, bytes.len() - 1] {
        let mut tampered = bytes.clone();
        tampered[index] ^= 0x01;
        let err = parse_bundle(&tampered).unwrap_err();
        match err {
            CryptoError::Validation(msg) => assert!(msg.contains("CRC mismatch"), "{msg}"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}

#[test]
fn oversized_input_is_rejected_before_parsing() {
    let huge = vec![0u8; MAX_BUNDLE_SIZE + 1];
    let err = parse_bundle(&huge).unwrap_err();
    match err {
        CryptoError::Validation(msg) => assert!(msg.contains("exceeds maximum size"), "{msg}"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn bundle_at_exact_size_ceiling_roundtrips() {
    let mut bundle = sample_bundle();
    let base = to_bytes(&bundle).unwrap().len();
    bundle.symmetric_ciphertext = vec![0xAB; bundle.symmetric_ciphertext.len() + (MAX_BUNDLE_SIZE - base)];
    let bytes = to_bytes(&bundle).unwrap();
    assert_eq!(bytes.len(), MAX_BUNDLE_SIZE);
    let parsed = parse_bundle(&bytes).unwrap();
    assert_eq!(parsed.symmetric_ciphertext.len(), bundle.symmetric_ciphertext.len());

    bundle.symmetric_ciphertext.push(0xAB);
    let err = to_bytes(&bundle).unwrap_err();
    assert!(matches!(err, CryptoError::Serialization(_)));
}

#[test]
fn wrong_magic_is_rejected_cheaply() {
    let fake = [b"FAKE".as_slice(), &[b'x'; 100]].concat();
    let err = parse_bundle(&fake).unwrap_err();
    match err {
        CryptoError::Validation(msg) => assert!(msg.contains("Invalid magic number"), "{msg}"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn truncated_header_is_rejected() {
    let err = parse_bundle(b"FAVA").unwrap_err();
    assert!(matches!(err, CryptoError::Validation(_)));
}

#[test]
fn corrupted_header_fails_crc_before_version_check() {
    let mut bytes = to_bytes(&sample_bundle()).unwrap();
    bytes[5] ^= 0xFF; // version high byte, covered by the header CRC
    let err = parse_bundle(&bytes).unwrap_err();
    match err {
        CryptoError::Validation(msg) => assert!(msg.contains("header CRC mismatch"), "{msg}"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn unsupported_version_is_rejected() {
    let mut bytes = to_bytes(&sample_bundle()).unwrap();
    bytes[4..6].copy_from_slice(&0x0100u16.to_le_bytes());
    fix_header_crc(&mut bytes);
    let err = parse_bundle(&bytes).unwrap_err();
    match err {
        CryptoError::Validation(msg) => assert!(msg.contains("unsupported bundle version"), "{msg}"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn declared_size_must_match_input_length() {
    let mut bytes = to_bytes(&sample_bundle()).unwrap();
    bytes.pop();
    let err = parse_bundle(&bytes).unwrap_err();
    match err {
        CryptoError::Validation(msg) => assert!(msg.contains("does not match input length"), "{msg}"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn field_count_above_limit_is_rejected() {
    let mut bytes = to_bytes(&sample_bundle()).unwrap();
    bytes[12..14].copy_from_slice(&65u16.to_le_bytes());
    fix_header_crc(&mut bytes);
    let err = parse_bundle(&bytes).unwrap_err();
    match err {
        CryptoError::Validation(msg) => assert!(msg.contains("field count"), "{msg}"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn out_of_bounds_field_is_rejected_before_slicing() {
    let mut bytes = to_bytes(&sample_bundle()).unwrap();
    // Inflate the first directory entry's length far past the input.
    let entry = HEADER_SIZE;
    bytes[entry + 8..entry + 12].copy_from_slice(&u32::MAX.to_le_bytes());
    let err = parse_bundle(&bytes).unwrap_err();
    assert!(matches!(err, CryptoError::Validation(_)));
}

#[test]
fn unknown_field_ids_are_ignored_but_still_crc_checked() {
    let bundle = sample_bundle();
    let mut bytes = to_bytes(&bundle).unwrap();
    // Reassign the encrypted-data entry (field id 6, the sixth entry) to an
    // unknown id. The parser must skip it, leaving the ciphertext empty.
    let entry = HEADER_SIZE + 5 * DIR_ENTRY_SIZE;
    bytes[entry..entry + 2].copy_from_slice(&999u16.to_le_bytes());
    let parsed = parse_bundle(&bytes).unwrap();
    assert!(parsed.symmetric_ciphertext.is_empty());

    // Corrupting the unknown field's payload must still fail its CRC check.
    let offset = u32::from_le_bytes(bytes[entry + 4..entry + 8].try_into().unwrap()) as usize;
    bytes[offset] ^= 0x01;
    let err = parse_bundle(&bytes).unwrap_err();
    match err {
        CryptoError::Validation(msg) => assert!(msg.contains("CRC mismatch"), "{msg}"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn exhausted_time_budget_aborts_parsing() {
    let bytes = to_bytes(&sample_bundle()).unwrap();
    let err = codec::parse_bundle_with_options(
        &bytes,
        ParseOptions { time_budget: Duration::ZERO },
    )
    .unwrap_err();
    assert!(matches!(err, CryptoError::ParsingTimeout(_)));
}

#[test]
fn suite_id_charset_is_enforced() {
    for good in ["X25519_KYBER768_AES256GCM", "suite-1", "S1"] {
        let mut bundle = sample_bundle();
        bundle.suite_id = good.to_string();
        assert!(to_bytes(&bundle).is_ok(), "{good} should serialize");
    }
    for bad in ["has space", "at@sign", "hash#tag", ""] {
        let mut bundle = sample_bundle();
        bundle.suite_id = bad.to_string();
        assert!(
            matches!(to_bytes(&bundle), Err(CryptoError::Serialization(_))),
            "{bad:?} should be rejected"
        );
    }
}

#[test]
fn iv_length_bounds_are_enforced() {
    for good in [12usize, 16, 24, 32] {
        let mut bundle = sample_bundle();
        bundle.symmetric_iv = vec![0x44; good];
        let bytes = to_bytes(&bundle).unwrap();
        assert_eq!(parse_bundle(&bytes).unwrap().symmetric_iv.len(), good);
    }
    for bad in [8usize, 10, 36, 64] {
        let mut bundle = sample_bundle();
        bundle.symmetric_iv = vec![0x44; bad];
        assert!(
            matches!(to_bytes(&bundle), Err(CryptoError::Serialization(_))),
            "IV length {bad} should be rejected"
        );
    }
}

#[test]
fn peek_extracts_format_identifier() {
    let bytes = to_bytes(&sample_bundle()).unwrap();
    assert_eq!(
        codec::peek_format_identifier(&bytes).as_deref(),
        Some("FAVA_PQC_HYBRID_V2")
    );
    assert_eq!(codec::peek_format_identifier(b"FAKE-not-a-bundle"), None);
}

#[test]
fn parse_auto_routes_on_magic() {
    let bytes = to_bytes(&sample_bundle()).unwrap();
    assert!(bundle::parse_auto(&bytes).is_ok());
    assert!(bundle::parse_auto(b"garbage").is_err());
}
