//! OS-backed randomness for nonces and identifier draws.
//!
//! The protocol needs unpredictable bytes in two places: the 12-byte GCM
//! nonce prefixed to wrapped key material, and the 40-bit client
//! identifiers drawn at registration. Both come straight from the
//! operating system's CSPRNG; there is no userspace PRNG state to seed or
//! reseed.

use crate::CryptoError;

/// Fill `buf` entirely with CSPRNG output.
///
/// # Errors
///
/// Returns [`CryptoError::RandomFailed`] when the operating system cannot
/// supply entropy. The buffer contents are unspecified in that case and
/// must not be used.
pub fn fill_random(buf: &mut [u8]) -> Result<(), CryptoError> {
    getrandom::getrandom(buf).map_err(|_| CryptoError::RandomFailed)
}

/// Draw a fresh `N`-byte array from the CSPRNG.
///
/// # Errors
///
/// Returns [`CryptoError::RandomFailed`] when the operating system cannot
/// supply entropy.
pub fn random_array<const N: usize>() -> Result<[u8; N], CryptoError> {
    let mut buf = [0u8; N];
    fill_random(&mut buf)?;
    Ok(buf)
}
