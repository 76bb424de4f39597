//! 3DES (EDE3) block cipher structure.
//!
//! 192-bit key, 64-bit block, no padding. One of the two interchangeable
//! EBID ciphers.

use des::TdesEde3;
use des::cipher::generic_array::GenericArray;
use des::cipher::{Block, BlockDecrypt, BlockEncrypt, KeyInit};

use crate::{BLOCK64_KEY_SIZE, BLOCK64_SIZE, CryptoError};

/// Keyed 3DES cipher operating on single 8-byte blocks.
pub struct TripleDes {
    cipher: TdesEde3,
}

impl TripleDes {
    /// Key the cipher with a 24-byte (192-bit) key.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::KeyInitFailure`] if the key is not 24 bytes.
    pub fn new(key: &[u8]) -> Result<Self, CryptoError> {
        if key.len() != BLOCK64_KEY_SIZE {
            return Err(CryptoError::KeyInitFailure { algorithm: "3des" });
        }
        let cipher =
            TdesEde3::new_from_slice(key).map_err(|_| CryptoError::KeyInitFailure {
                algorithm: "3des",
            })?;
        Ok(Self { cipher })
    }

    /// Encrypt one 8-byte block.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::LengthMismatch`] unless `input` is exactly
    /// 8 bytes.
    pub fn encrypt_block(&self, input: &[u8]) -> Result<[u8; 8], CryptoError> {
        let mut block = to_block(input)?;
        self.cipher.encrypt_block(&mut block);
        Ok(block.into())
    }

    /// Decrypt one 8-byte block.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::LengthMismatch`] unless `input` is exactly
    /// 8 bytes.
    pub fn decrypt_block(&self, input: &[u8]) -> Result<[u8; 8], CryptoError> {
        let mut block = to_block(input)?;
        self.cipher.decrypt_block(&mut block);
        Ok(block.into())
    }
}

fn to_block(input: &[u8]) -> Result<Block<TdesEde3>, CryptoError> {
    if input.len() != BLOCK64_SIZE {
        return Err(CryptoError::LengthMismatch {
            field: "3des block",
            expected_bits: BLOCK64_SIZE * 8,
            actual_bits: input.len() * 8,
        });
    }
    Ok(GenericArray::clone_from_slice(input))
}
