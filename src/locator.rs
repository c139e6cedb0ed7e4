//! Crypto service locator: the process-wide mapping from suite id to handler.
//! Explicitly constructed at startup from configuration and passed to
//! whichever component needs it; reads vastly outnumber writes, so the
//! handler list sits behind a read-write lock. Registration and reset happen
//! at startup and in tests only.

use crate::config::CryptoConfig;
use crate::errors::CryptoError;
use crate::handler::{CryptoHandler, HybridPqcHandler};
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;

/// Shared handle to a registered handler.
pub type SharedHandler = Arc<dyn CryptoHandler>;

/// Registry of crypto handlers in registration order.
pub struct CryptoServiceLocator {
    handlers: RwLock<Vec<(String, SharedHandler)>>,
}

impl Default for CryptoServiceLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl CryptoServiceLocator {
    /// An empty registry. Populate it with `register_crypto_handler` or use
    /// `build_locator`.
    #[must_use]
    pub fn new() -> Self {
        Self { handlers: RwLock::new(Vec::new()) }
    }

    /// Register a handler for a suite id. Overwriting an existing
    /// registration is allowed (reconfiguration, tests) and logged.
    pub fn register_crypto_handler(&self, suite_id: &str, handler: SharedHandler) {
        let mut handlers = self.handlers.write();
        if let Some(slot) = handlers.iter_mut().find(|(id, _)| id == suite_id) {
            log::info!("replacing registered crypto handler for suite {suite_id}");
            slot.1 = handler;
        } else {
            log::info!("registered crypto handler for suite {suite_id}");
            handlers.push((suite_id.to_string(), handler));
        }
    }

    /// First registered handler whose `can_handle` accepts the content, in
    /// registration order.
    #[must_use]
    pub fn get_handler_for_file(
        &self,
        file_path: Option<&Path>,
        content_peek: &[u8],
    ) -> Option<SharedHandler> {
        self.handlers
            .read()
            .iter()
            .find(|(_, h)| h.can_handle(file_path, content_peek))
            .map(|(_, h)| Arc::clone(h))
    }

    /// Handler registered for a specific suite id.
    #[must_use]
    pub fn get_handler_for_suite(&self, suite_id: &str) -> Option<SharedHandler> {
        self.handlers
            .read()
            .iter()
            .find(|(id, _)| id == suite_id)
            .map(|(_, h)| Arc::clone(h))
    }

    /// Resolve the configured active encryption suite to its handler. A
    /// missing registration is a fatal startup condition, not a per-request
    /// failure.
    pub fn get_active_encryption_handler(
        &self,
        config: &CryptoConfig,
    ) -> Result<SharedHandler, CryptoError> {
        self.get_handler_for_suite(&config.active_encryption_suite_id).ok_or_else(|| {
            CryptoError::CriticalConfiguration(format!(
                "no registered handler for active encryption suite {:?}",
                config.active_encryption_suite_id
            ))
        })
    }

    /// Handlers for the configured decryption-attempt order, preserving that
    /// order. Suite ids with no registration are skipped with a warning.
    #[must_use]
    pub fn get_decryption_handlers_in_order(&self, config: &CryptoConfig) -> Vec<SharedHandler> {
        let mut out = Vec::with_capacity(config.decryption_attempt_order.len());
        for suite_id in &config.decryption_attempt_order {
            match self.get_handler_for_suite(suite_id) {
                Some(h) => out.push(h),
                None => {
                    log::warn!("skipping decryption suite {suite_id:?}: no registered handler");
                }
            }
        }
        out
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.read().is_empty()
    }

    /// Return the registry to its empty startup state. Intended for tests;
    /// production code populates the registry once and leaves it alone.
    pub fn reset(&self) {
        self.handlers.write().clear();
    }
}

/// Build a populated locator from configuration: one hybrid handler per
/// configured suite. Fails with `CriticalConfigurationError` when the active
/// encryption suite ends up without a handler.
pub fn build_locator(config: &CryptoConfig) -> Result<CryptoServiceLocator, CryptoError> {
    let locator = CryptoServiceLocator::new();
    for suite in &config.suites {
        let handler = HybridPqcHandler::new(suite.clone())?;
        locator.register_crypto_handler(&suite.id, Arc::new(handler));
    }
    // Surface a broken active-suite configuration at startup.
    locator.get_active_encryption_handler(config)?;
    Ok(locator)
}
