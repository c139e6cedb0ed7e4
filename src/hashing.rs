//! Hashing service: stateless digest computation over a configured algorithm
//! with an explicit fallback policy. Algorithm availability is probed once at
//! construction and cached; it is never re-probed per call. Fallback is a
//! plain control-flow decision on the returned error kind, not unwinding.

use crate::errors::CryptoError;
use sha2::{Digest, Sha256, Sha512};
use sha3::{Sha3_256, Sha3_512};

/// Digest algorithms the service can be configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha256,
    Sha512,
    Sha3_256,
    Sha3_512,
}

impl HashAlgorithm {
    pub fn from_name(name: &str) -> Result<Self, CryptoError> {
        match name {
            "SHA256" | "SHA-256" => Ok(Self::Sha256),
            "SHA512" | "SHA-512" => Ok(Self::Sha512),
            "SHA3-256" => Ok(Self::Sha3_256),
            "SHA3-512" => Ok(Self::Sha3_512),
            other => Err(CryptoError::HashingAlgorithmUnavailable(format!(
                "unknown hash algorithm: {other}"
            ))),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sha256 => "SHA256",
            Self::Sha512 => "SHA512",
            Self::Sha3_256 => "SHA3-256",
            Self::Sha3_512 => "SHA3-512",
        }
    }
}

fn digest(algorithm: HashAlgorithm, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let out = match algorithm {
        HashAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
        HashAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
        HashAlgorithm::Sha3_256 => Sha3_256::digest(data).to_vec(),
        HashAlgorithm::Sha3_512 => Sha3_512::digest(data).to_vec(),
    };
    if out.is_empty() {
        return Err(CryptoError::InternalHashing(format!(
            "{} produced an empty digest",
            algorithm.name()
        )));
    }
    Ok(out)
}

/// Probe an algorithm once: attempt a digest and record whether it worked.
fn probe(algorithm: HashAlgorithm) -> bool {
    digest(algorithm, b"availability probe").is_ok()
}

/// Stateless digest service bound to a configured primary algorithm and an
/// optional fallback.
pub struct HashingService {
    primary_name: String,
    primary: Option<HashAlgorithm>,
    fallback: Option<HashAlgorithm>,
}

impl HashingService {
    /// Resolve and probe the configured algorithms. Unknown or unavailable
    /// names are recorded as absent here and surface as
    /// `HashingAlgorithmUnavailableError` when used.
    #[must_use]
    pub fn new(primary: &str, fallback: Option<&str>) -> Self {
        let resolve = |name: &str| HashAlgorithm::from_name(name).ok().filter(|a| probe(*a));
        let primary_alg = resolve(primary);
        if primary_alg.is_none() {
            log::warn!("configured hash algorithm {primary:?} is unavailable");
        }
        let fallback_alg = fallback.and_then(|name| {
            let alg = resolve(name);
            if alg.is_none() {
                log::warn!("configured fallback hash algorithm {name:?} is unavailable");
            }
            alg
        });
        Self { primary_name: primary.to_string(), primary: primary_alg, fallback: fallback_alg }
    }

    /// Digest with the primary algorithm only.
    pub fn hash(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        match self.primary {
            Some(alg) => digest(alg, data),
            None => Err(CryptoError::HashingAlgorithmUnavailable(self.primary_name.clone())),
        }
    }

    /// Digest with the primary algorithm, explicitly invoking the fallback
    /// when and only when the primary is unavailable. Internal faults are not
    /// masked by the fallback.
    pub fn hash_with_fallback(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        match self.hash(data) {
            Ok(d) => Ok(d),
            Err(CryptoError::HashingAlgorithmUnavailable(name)) => match self.fallback {
                Some(alg) => {
                    log::warn!("hash algorithm {name:?} unavailable, falling back to {}", alg.name());
                    digest(alg, data)
                }
                None => Err(CryptoError::HashingAlgorithmUnavailable(name)),
            },
            Err(other) => Err(other),
        }
    }

    /// Hex-encoded digest, for log-safe fingerprints.
    pub fn hash_hex(&self, data: &[u8]) -> Result<String, CryptoError> {
        Ok(hex::encode(self.hash_with_fallback(data)?))
    }

    /// Whether the primary algorithm survived its availability probe.
    #[must_use]
    pub fn primary_available(&self) -> bool {
        self.primary.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_known_vector() {
        let svc = HashingService::new("SHA256", None);
        let d = svc.hash(b"abc").unwrap();
        assert_eq!(
            hex::encode(d),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn unknown_primary_falls_back() {
        let svc = HashingService::new("WHIRLPOOL", Some("SHA256"));
        assert!(!svc.primary_available());
        assert!(matches!(
            svc.hash(b"x"),
            Err(CryptoError::HashingAlgorithmUnavailable(_))
        ));
        let d = svc.hash_with_fallback(b"abc").unwrap();
        assert_eq!(d.len(), 32);
    }

    #[test]
    fn unknown_primary_without_fallback_errors() {
        let svc = HashingService::new("WHIRLPOOL", None);
        assert!(matches!(
            svc.hash_with_fallback(b"x"),
            Err(CryptoError::HashingAlgorithmUnavailable(_))
        ));
    }

    #[test]
    fn sha3_differs_from_sha2() {
        let a = HashingService::new("SHA256", None).hash(b"abc").unwrap();
        let b = HashingService::new("SHA3-256", None).hash(b"abc").unwrap();
        assert_ne!(a, b);
    }
}
