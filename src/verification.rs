//! Module-integrity verification facade: check that a loadable binary module
//! was signed by the holder of the configured post-quantum key. A signature
//! that does not verify is a normal `false`; only infrastructure problems
//! (malformed keys, unknown algorithms, unreadable files) are errors.

use crate::config::CryptoConfig;
use crate::errors::CryptoError;
use crate::primitives::sig::{self, SignatureAlgorithm};
use std::path::{Path, PathBuf};

/// Verify `artifact` against a detached signature and raw public key bytes.
pub fn verify_module_signature(
    artifact: &[u8],
    signature: &[u8],
    public_key: &[u8],
    algorithm_name: &str,
) -> Result<bool, CryptoError> {
    let algorithm = SignatureAlgorithm::from_name(algorithm_name)?;
    sig::verify(algorithm, artifact, signature, public_key)
}

/// Config-driven verification. When verification is disabled the facade
/// short-circuits to `true` without touching the signature adapter.
pub fn verify_module_with_config(
    config: &CryptoConfig,
    artifact: &[u8],
    signature: &[u8],
) -> Result<bool, CryptoError> {
    let integrity = &config.module_integrity;
    if !integrity.enabled {
        log::warn!("module signature verification is disabled; skipping check");
        return Ok(true);
    }
    let public_key = integrity.public_key()?;
    let verified = verify_module_signature(artifact, signature, &public_key, &integrity.algorithm)?;
    if verified {
        log::info!("module signature verified ({})", integrity.algorithm);
    } else {
        log::error!("module signature verification failed ({})", integrity.algorithm);
    }
    Ok(verified)
}

/// Detached-signature sidecar path: `<artifact>.<algorithm>.sig`.
#[must_use]
pub fn signature_sidecar_path(artifact: &Path, algorithm_name: &str) -> PathBuf {
    PathBuf::from(format!(
        "{}.{}.sig",
        artifact.display(),
        algorithm_name.to_ascii_lowercase()
    ))
}

/// Verify a module file on disk against its detached signature sidecar.
pub fn verify_module_file(config: &CryptoConfig, artifact: &Path) -> Result<bool, CryptoError> {
    if !config.module_integrity.enabled {
        log::warn!("module signature verification is disabled; skipping check");
        return Ok(true);
    }
    let bytes = std::fs::read(artifact)
        .map_err(|e| CryptoError::Io(format!("cannot read module {}: {e}", artifact.display())))?;
    let sidecar = signature_sidecar_path(artifact, &config.module_integrity.algorithm);
    let signature = std::fs::read(&sidecar)
        .map_err(|e| CryptoError::Io(format!("cannot read signature {}: {e}", sidecar.display())))?;
    verify_module_with_config(config, &bytes, &signature)
}
