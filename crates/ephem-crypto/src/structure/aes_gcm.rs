//! AES-256-GCM authenticated encryption.
//!
//! A fresh random 12-byte nonce is generated on every encrypt call and
//! prefixed to the ciphertext; decrypt reads it back from the first
//! 12 bytes before verifying the tag. Storage collaborators use this to
//! wrap client key bundles at rest.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};

use crate::{AES_KEY_SIZE, CryptoError, GCM_NONCE_SIZE, random};

/// Keyed AES-256-GCM structure.
pub struct AesGcm {
    cipher: Aes256Gcm,
}

impl AesGcm {
    /// Key the structure with a 32-byte (256-bit) key.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::KeyInitFailure`] if the key is not 32 bytes.
    pub fn new(key: &[u8]) -> Result<Self, CryptoError> {
        if key.len() != AES_KEY_SIZE {
            return Err(CryptoError::KeyInitFailure {
                algorithm: "aes-256-gcm",
            });
        }
        let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| CryptoError::KeyInitFailure {
            algorithm: "aes-256-gcm",
        })?;
        Ok(Self { cipher })
    }

    /// Encrypt and authenticate, returning `nonce || ciphertext || tag`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::RandomFailed`] if nonce generation fails, or
    /// [`CryptoError::CipherOperationFailure`] on an encryption error.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let nonce: [u8; GCM_NONCE_SIZE] = random::random_array()?;
        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|_| CryptoError::CipherOperationFailure {
                algorithm: "aes-256-gcm",
                cause: "encryption failed".into(),
            })?;
        let mut out = Vec::with_capacity(GCM_NONCE_SIZE + ciphertext.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    /// Verify and decrypt a `nonce || ciphertext || tag` message.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::CipherOperationFailure`] if the input is too
    /// short to carry a nonce or the tag does not verify.
    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if data.len() <= GCM_NONCE_SIZE {
            return Err(CryptoError::CipherOperationFailure {
                algorithm: "aes-256-gcm",
                cause: "ciphertext shorter than nonce".into(),
            });
        }
        let (nonce, ciphertext) = data.split_at(GCM_NONCE_SIZE);
        self.cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CryptoError::CipherOperationFailure {
                algorithm: "aes-256-gcm",
                cause: "authentication failed".into(),
            })
    }
}
