//! Crypto configuration: suite descriptors plus the global selection of the
//! active encryption suite, the ordered decryption-attempt list, and the
//! module-integrity verification settings. Loaded from TOML; immutable once
//! validated.

use crate::bundle::is_valid_suite_id;
use crate::errors::CryptoError;
use crate::primitives::{ClassicalKemAlgorithm, KdfAlgorithm, PqcKemAlgorithm, SymmetricAlgorithm};
use crate::primitives::sig::SignatureAlgorithm;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// The only suite type this subsystem implements.
pub const SUITE_TYPE_HYBRID_PQC: &str = "hybrid-pqc";
/// Domain-separation label fed to the KDF unless a suite overrides it.
pub const DEFAULT_KDF_LABEL: &str = "HybridSymmetricKey";

fn default_suite_type() -> String {
    SUITE_TYPE_HYBRID_PQC.to_string()
}

fn default_kdf_label() -> String {
    DEFAULT_KDF_LABEL.to_string()
}

fn default_sig_algorithm() -> String {
    "DILITHIUM3".to_string()
}

/// One configured cipher suite. Immutable once loaded; referenced by id from
/// the locator and handlers.
#[derive(Debug, Clone, Deserialize)]
pub struct SuiteDescriptor {
    pub id: String,
    #[serde(default = "default_suite_type")]
    pub suite_type: String,
    pub classical_kem: String,
    pub pqc_kem: String,
    pub symmetric: String,
    pub kdf: String,
    #[serde(default = "default_kdf_label")]
    pub kdf_label: String,
    pub format_identifier: String,
}

/// Algorithm names resolved to their adapter enums. Resolution happens once
/// when a handler is built, not per operation.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedSuite {
    pub classical_kem: ClassicalKemAlgorithm,
    pub pqc_kem: PqcKemAlgorithm,
    pub symmetric: SymmetricAlgorithm,
    pub kdf: KdfAlgorithm,
}

impl SuiteDescriptor {
    /// Resolve the configured algorithm names against the available adapters.
    pub fn resolve(&self) -> Result<ResolvedSuite, CryptoError> {
        Ok(ResolvedSuite {
            classical_kem: ClassicalKemAlgorithm::from_name(&self.classical_kem)?,
            pqc_kem: PqcKemAlgorithm::from_name(&self.pqc_kem)?,
            symmetric: SymmetricAlgorithm::from_name(&self.symmetric)?,
            kdf: KdfAlgorithm::from_name(&self.kdf)?,
        })
    }
}

/// Settings for verifying loadable binary modules against a detached
/// post-quantum signature.
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleIntegrityConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub public_key_base64: String,
    #[serde(default = "default_sig_algorithm")]
    pub algorithm: String,
}

impl Default for ModuleIntegrityConfig {
    fn default() -> Self {
        Self { enabled: false, public_key_base64: String::new(), algorithm: default_sig_algorithm() }
    }
}

impl ModuleIntegrityConfig {
    /// Decode the configured public key.
    pub fn public_key(&self) -> Result<Vec<u8>, CryptoError> {
        BASE64
            .decode(self.public_key_base64.trim())
            .map_err(|e| CryptoError::Configuration(format!("module public key is not valid base64: {e}")))
    }
}

/// Top-level crypto configuration, handed to the locator and handlers by the
/// embedding application.
#[derive(Debug, Clone, Deserialize)]
pub struct CryptoConfig {
    pub suites: Vec<SuiteDescriptor>,
    pub active_encryption_suite_id: String,
    pub decryption_attempt_order: Vec<String>,
    #[serde(default)]
    pub module_integrity: ModuleIntegrityConfig,
}

impl CryptoConfig {
    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, CryptoError> {
        let cfg: CryptoConfig = toml::from_str(s)
            .map_err(|e| CryptoError::Configuration(format!("config parse failed: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load and validate configuration from a TOML file.
    pub fn load_from_path(path: &Path) -> Result<Self, CryptoError> {
        let s = std::fs::read_to_string(path)
            .map_err(|e| CryptoError::Configuration(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&s)
    }

    /// Look up a suite descriptor by id.
    #[must_use]
    pub fn suite(&self, id: &str) -> Option<&SuiteDescriptor> {
        self.suites.iter().find(|s| s.id == id)
    }

    /// Schema-level validation. Unknown suite ids in the decryption-attempt
    /// order are tolerated here (the locator warns and skips them); anything
    /// that would make encryption or verification impossible is an error.
    pub fn validate(&self) -> Result<(), CryptoError> {
        if self.suites.is_empty() {
            return Err(CryptoError::Configuration("no cipher suites configured".into()));
        }
        let mut seen: HashSet<&str> = HashSet::new();
        for suite in &self.suites {
            if !is_valid_suite_id(&suite.id) {
                return Err(CryptoError::Configuration(format!(
                    "suite id {:?} contains characters outside [A-Za-z0-9_-]",
                    suite.id
                )));
            }
            if !seen.insert(suite.id.as_str()) {
                return Err(CryptoError::Configuration(format!("duplicate suite id {:?}", suite.id)));
            }
            if suite.suite_type != SUITE_TYPE_HYBRID_PQC {
                return Err(CryptoError::Configuration(format!(
                    "suite {:?} has unsupported type {:?}",
                    suite.id, suite.suite_type
                )));
            }
            if suite.format_identifier.is_empty() {
                return Err(CryptoError::Configuration(format!(
                    "suite {:?} has an empty format identifier",
                    suite.id
                )));
            }
            suite.resolve().map_err(|e| {
                CryptoError::Configuration(format!("suite {:?}: {e}", suite.id))
            })?;
        }
        if self.suite(&self.active_encryption_suite_id).is_none() {
            return Err(CryptoError::Configuration(format!(
                "active encryption suite {:?} is not a configured suite",
                self.active_encryption_suite_id
            )));
        }
        if self.decryption_attempt_order.is_empty() {
            return Err(CryptoError::Configuration("decryption attempt order is empty".into()));
        }
        for id in &self.decryption_attempt_order {
            if self.suite(id).is_none() {
                log::warn!("decryption attempt order names unknown suite {id:?}");
            }
        }
        if self.module_integrity.enabled {
            SignatureAlgorithm::from_name(&self.module_integrity.algorithm).map_err(|e| {
                CryptoError::Configuration(format!("module integrity: {e}"))
            })?;
            let key = self.module_integrity.public_key()?;
            if key.is_empty() {
                return Err(CryptoError::Configuration(
                    "module integrity enabled but no public key configured".into(),
                ));
            }
        }
        Ok(())
    }
}
