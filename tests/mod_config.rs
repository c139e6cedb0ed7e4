use fava_crypto::config::{CryptoConfig, DEFAULT_KDF_LABEL, SUITE_TYPE_HYBRID_PQC};
use fava_crypto::errors::CryptoError;

const MINIMAL_TOML: &str = r#"
active_encryption_suite_id = "X25519_KYBER768_AES256GCM"
decryption_attempt_order = ["X25519_KYBER768_AES256GCM"]

[[suites]]
id = "X25519_KYBER768_AES256GCM"
classical_kem = "X25519"
pqc_kem = "KYBER768"
symmetric = "AES256GCM"
kdf = "HKDF-SHA256"
format_identifier = "FAVA_PQC_HYBRID_V2"
"#;

#[test]
fn minimal_config_parses_with_defaults() {
    let cfg = CryptoConfig::from_toml_str(MINIMAL_TOML).unwrap();
    let suite = cfg.suite("X25519_KYBER768_AES256GCM").unwrap();
    assert_eq!(suite.suite_type, SUITE_TYPE_HYBRID_PQC);
    assert_eq!(suite.kdf_label, DEFAULT_KDF_LABEL);
    assert!(!cfg.module_integrity.enabled);
    suite.resolve().unwrap();
}

#[test]
fn unknown_suite_lookup_is_none() {
    let cfg = CryptoConfig::from_toml_str(MINIMAL_TOML).unwrap();
    assert!(cfg.suite("NOPE").is_none());
}

#[test]
fn invalid_suite_id_charset_is_rejected() {
    let toml = MINIMAL_TOML.replace("X25519_KYBER768_AES256GCM", "bad suite id");
    assert!(matches!(
        CryptoConfig::from_toml_str(&toml),
        Err(CryptoError::Configuration(_))
    ));
}

#[test]
fn duplicate_suite_ids_are_rejected() {
    let mut toml = MINIMAL_TOML.to_string();
    toml.push_str(
        r#"
[[suites]]
id = "X25519_KYBER768_AES256GCM"
classical_kem = "X25519"
pqc_kem = "KYBER768"
symmetric = "AES256GCM"
kdf = "HKDF-SHA256"
format_identifier = "FAVA_PQC_HYBRID_V2_DUP"
"#,
    );
    match CryptoConfig::from_toml_str(&toml).unwrap_err() {
        CryptoError::Configuration(msg) => assert!(msg.contains("duplicate"), "{msg}"),
        other => panic!("expected configuration error, got {other:?}"),
    }
}

#[test]
fn unknown_algorithm_names_are_rejected() {
    let toml = MINIMAL_TOML.replace("KYBER768\"", "NTRU\"");
    match CryptoConfig::from_toml_str(&toml).unwrap_err() {
        CryptoError::Configuration(msg) => assert!(msg.contains("NTRU"), "{msg}"),
        other => panic!("expected configuration error, got {other:?}"),
    }
}

#[test]
fn active_suite_must_be_declared() {
    let toml = MINIMAL_TOML.replacen(
        "active_encryption_suite_id = \"X25519_KYBER768_AES256GCM\"",
        "active_encryption_suite_id = \"UNDECLARED\"",
        1,
    );
    match CryptoConfig::from_toml_str(&toml).unwrap_err() {
        CryptoError::Configuration(msg) => assert!(msg.contains("UNDECLARED"), "{msg}"),
        other => panic!("expected configuration error, got {other:?}"),
    }
}

#[test]
fn empty_decryption_order_is_rejected() {
    let toml = MINIMAL_TOML.replace(
        "decryption_attempt_order = [\"X25519_KYBER768_AES256GCM\"]",
        "decryption_attempt_order = []",
    );
    assert!(matches!(
        CryptoConfig::from_toml_str(&toml),
        Err(CryptoError::Configuration(_))
    ));
}

#[test]
fn module_integrity_requires_decodable_key_when_enabled() {
    let mut toml = MINIMAL_TOML.to_string();
    toml.push_str(
        r#"
[module_integrity]
enabled = true
public_key_base64 = "%%%"
algorithm = "DILITHIUM3"
"#,
    );
    assert!(matches!(
        CryptoConfig::from_toml_str(&toml),
        Err(CryptoError::Configuration(_))
    ));
}

#[test]
fn unknown_signature_algorithm_is_rejected_when_enabled() {
    let mut toml = MINIMAL_TOML.to_string();
    toml.push_str(
        r#"
[module_integrity]
enabled = true
public_key_base64 = "AAAA"
algorithm = "RSA4096"
"#,
    );
    match CryptoConfig::from_toml_str(&toml).unwrap_err() {
        CryptoError::Configuration(msg) => assert!(msg.contains("RSA4096"), "{msg}"),
        other => panic!("expected configuration error, got {other:?}"),
    }
}

#[test]
fn config_loads_from_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fava-crypto.toml");
    std::fs::write(&path, MINIMAL_TOML).unwrap();
    let cfg = CryptoConfig::load_from_path(&path).unwrap();
    assert_eq!(cfg.active_encryption_suite_id, "X25519_KYBER768_AES256GCM");

    assert!(matches!(
        CryptoConfig::load_from_path(&dir.path().join("missing.toml")),
        Err(CryptoError::Configuration(_))
    ));
}
