use fava_crypto::bundle::legacy::{parse_legacy_bundle, MAX_LEGACY_SIZE};
use fava_crypto::errors::CryptoError;

fn legacy_json() -> String {
    format!(
        concat!(
            "{{\"format\":\"FAVA_PQC_HYBRID_V1\",",
            "\"suite_id\":\"X25519_KYBER768_AES256GCM\",",
            "\"classical_kem_ciphertext\":\"{}\",",
            "\"pqc_kem_ciphertext\":\"{}\",",
            "\"kdf_salt\":\"{}\",",
            "\"iv\":\"{}\",",
            "\"ciphertext\":\"{}\",",
            "\"auth_tag\":\"{}\"}}"
        ),
        hex::encode([0x11; 32]),
        hex::encode([0x22; 64]),
        hex::encode([0x33; 32]),
        hex::encode([0x44; 12]),
        hex::encode([0x55; 40]),
        hex::encode([0x66; 16]),
    )
}

#[test]
fn valid_legacy_payload_parses() {
    let bundle = parse_legacy_bundle(legacy_json().as_bytes()).unwrap();
    assert_eq!(bundle.format_identifier, "FAVA_PQC_HYBRID_V1");
    assert_eq!(bundle.suite_id, "X25519_KYBER768_AES256GCM");
    assert_eq!(bundle.classical_kem_ciphertext, vec![0x11; 32]);
    assert_eq!(bundle.symmetric_iv.len(), 12);
}

#[test]
fn oversized_legacy_payload_is_rejected_before_decoding() {
    let padded = vec![b' '; MAX_LEGACY_SIZE + 1];
    let err = parse_legacy_bundle(&padded).unwrap_err();
    assert!(matches!(err, CryptoError::MemoryLimitExceeded(_)));
}

#[test]
fn deeply_nested_payload_is_rejected_before_decoding() {
    let mut nested = vec![b'['; 40];
    nested.extend(vec![b']'; 40]);
    let err = parse_legacy_bundle(&nested).unwrap_err();
    match err {
        CryptoError::Validation(msg) => assert!(msg.contains("depth limit"), "{msg}"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn braces_inside_strings_do_not_count_toward_depth() {
    // An extra string field full of braces must not trip the depth scanner.
    let mut json = legacy_json();
    let brace_soup = "{".repeat(64);
    json.insert_str(json.len() - 1, &format!(",\"note\":\"{brace_soup}\""));
    assert!(parse_legacy_bundle(json.as_bytes()).is_ok());
}

#[test]
fn undecodable_payload_is_a_validation_error() {
    let err = parse_legacy_bundle(b"not json at all").unwrap_err();
    assert!(matches!(err, CryptoError::Validation(_)));
}

#[test]
fn invalid_hex_field_is_rejected() {
    let json = legacy_json().replace(&hex::encode([0x44; 12]), "zz-not-hex");
    let err = parse_legacy_bundle(json.as_bytes()).unwrap_err();
    match err {
        CryptoError::Validation(msg) => assert!(msg.contains("not valid hex"), "{msg}"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn legacy_fields_share_binary_invariants() {
    // Out-of-range IV length fails the shared semantic validation.
    let json = legacy_json().replace(&hex::encode([0x44; 12]), &hex::encode([0x44; 8]));
    let err = parse_legacy_bundle(json.as_bytes()).unwrap_err();
    match err {
        CryptoError::Validation(msg) => assert!(msg.contains("IV length"), "{msg}"),
        other => panic!("expected validation error, got {other:?}"),
    }
}
