use crate::errors::CryptoError;

/// Fill and return `n` cryptographically secure random bytes from the OS.
pub fn generate_random_bytes(n: usize) -> Result<Vec<u8>, CryptoError> {
    let mut buf = vec![0u8; n];
    getrandom::fill(&mut buf)
        .map_err(|e| CryptoError::Encryption(format!("os random source failed: {e}")))?;
    Ok(buf)
}
