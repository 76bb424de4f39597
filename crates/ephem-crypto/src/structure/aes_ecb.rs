//! AES-256 in ECB mode without padding.
//!
//! Fixed-size block operations only; inputs must be a whole number of
//! 16-byte blocks.

use aes::Aes256;
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};

use crate::{AES_BLOCK_SIZE, AES_KEY_SIZE, CryptoError};

/// Keyed AES-256-ECB cipher structure.
pub struct AesEcb {
    cipher: Aes256,
}

impl AesEcb {
    /// Key the structure with a 32-byte (256-bit) key.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::KeyInitFailure`] if the key is not 32 bytes.
    pub fn new(key: &[u8]) -> Result<Self, CryptoError> {
        if key.len() != AES_KEY_SIZE {
            return Err(CryptoError::KeyInitFailure {
                algorithm: "aes-256-ecb",
            });
        }
        let cipher = Aes256::new_from_slice(key).map_err(|_| CryptoError::KeyInitFailure {
            algorithm: "aes-256-ecb",
        })?;
        Ok(Self { cipher })
    }

    /// Encrypt a whole number of 16-byte blocks.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::LengthMismatch`] if `plaintext` is not a
    /// multiple of the block size.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        check_block_multiple(plaintext)?;
        let mut out = Vec::with_capacity(plaintext.len());
        for chunk in plaintext.chunks_exact(AES_BLOCK_SIZE) {
            let mut block = GenericArray::clone_from_slice(chunk);
            self.cipher.encrypt_block(&mut block);
            out.extend_from_slice(&block);
        }
        Ok(out)
    }

    /// Decrypt a whole number of 16-byte blocks.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::LengthMismatch`] if `ciphertext` is not a
    /// multiple of the block size.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        check_block_multiple(ciphertext)?;
        let mut out = Vec::with_capacity(ciphertext.len());
        for chunk in ciphertext.chunks_exact(AES_BLOCK_SIZE) {
            let mut block = GenericArray::clone_from_slice(chunk);
            self.cipher.decrypt_block(&mut block);
            out.extend_from_slice(&block);
        }
        Ok(out)
    }
}

fn check_block_multiple(data: &[u8]) -> Result<(), CryptoError> {
    if data.is_empty() || data.len() % AES_BLOCK_SIZE != 0 {
        return Err(CryptoError::LengthMismatch {
            field: "aes-ecb input",
            expected_bits: AES_BLOCK_SIZE * 8,
            actual_bits: data.len() * 8,
        });
    }
    Ok(())
}
