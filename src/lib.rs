pub mod bundle;
pub mod config;
pub mod errors;
pub mod handler;
pub mod hashing;
pub mod locator;
pub mod logger;
pub mod primitives;
pub mod verification;

use crate::bundle::EncryptedBundle;
use crate::config::CryptoConfig;
use crate::errors::CryptoError;
use crate::handler::{RecipientPrivateKeys, RecipientPublicKeys};
use crate::locator::CryptoServiceLocator;
use zeroize::Zeroizing;

pub use crate::bundle::{parse_bundle, to_bytes};
pub use crate::handler::generate_keypair;
pub use crate::verification::{verify_module_signature, verify_module_with_config};

/// The assembled crypto subsystem: validated configuration plus a populated
/// handler registry. Constructed once at application startup and shared from
/// there; individual operations are synchronous and safe to call
/// concurrently.
pub struct CryptoContext {
    config: CryptoConfig,
    locator: CryptoServiceLocator,
}

impl CryptoContext {
    /// Validate the configuration and build the handler registry from it.
    pub fn new(config: CryptoConfig) -> Result<Self, CryptoError> {
        config.validate()?;
        let locator = locator::build_locator(&config)?;
        Ok(Self { config, locator })
    }

    #[must_use]
    pub fn config(&self) -> &CryptoConfig {
        &self.config
    }

    #[must_use]
    pub fn locator(&self) -> &CryptoServiceLocator {
        &self.locator
    }

    /// Encrypt plaintext with the active encryption suite and serialize the
    /// resulting bundle.
    pub fn encrypt_bytes(
        &self,
        plaintext: &[u8],
        recipient: &RecipientPublicKeys,
    ) -> Result<Vec<u8>, CryptoError> {
        let handler = self.locator.get_active_encryption_handler(&self.config)?;
        let bundle = handler.encrypt(plaintext, recipient)?;
        bundle::to_bytes(&bundle)
    }

    /// Parse an artifact and attempt decryption with each configured suite in
    /// the decryption-attempt order until one succeeds. The failure is opaque
    /// regardless of which suite or sub-step rejected the input.
    pub fn decrypt_bytes(
        &self,
        artifact: &[u8],
        recipient: &RecipientPrivateKeys,
    ) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        let parsed = bundle::parse_auto(artifact)?;
        self.decrypt_bundle(&parsed, recipient)
    }

    /// Attempt decryption of an already-parsed bundle.
    pub fn decrypt_bundle(
        &self,
        bundle: &EncryptedBundle,
        recipient: &RecipientPrivateKeys,
    ) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        for handler in self.locator.get_decryption_handlers_in_order(&self.config) {
            match handler.decrypt(bundle, recipient) {
                Ok(plaintext) => return Ok(plaintext),
                Err(e) => {
                    log::info!("suite {} could not decrypt artifact: {e}", handler.suite_id());
                }
            }
        }
        Err(CryptoError::Decryption("could not decrypt data".into()))
    }
}

/// Initializes the crypto subsystem's logging. Call once at application
/// startup before any other operation.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    logger::init()?;
    Ok(())
}
