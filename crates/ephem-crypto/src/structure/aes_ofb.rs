//! AES-256 in OFB mode, keyed with the federation key.
//!
//! The IV is not random: by protocol design it is set on every encrypt
//! call to the very block being processed, which makes the country-code
//! encryption deterministic given (key, EBID). Decryption takes the IV as
//! an explicit parameter, so a keyed structure holds no per-call state.

use aes::Aes256;
use ofb::Ofb;
use ofb::cipher::{KeyIvInit, StreamCipher};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{AES_BLOCK_SIZE, AES_KEY_SIZE, CryptoError};

type OfbAes256 = Ofb<Aes256>;

/// Keyed AES-256-OFB stream cipher structure.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct AesOfb {
    key: [u8; AES_KEY_SIZE],
}

impl AesOfb {
    /// Key the structure with a 32-byte (256-bit) key.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::KeyInitFailure`] if the key is not 32 bytes.
    pub fn new(key: &[u8]) -> Result<Self, CryptoError> {
        if key.len() != AES_KEY_SIZE {
            return Err(CryptoError::KeyInitFailure {
                algorithm: "aes-256-ofb",
            });
        }
        let mut bytes = [0u8; AES_KEY_SIZE];
        bytes.copy_from_slice(key);
        Ok(Self { key: bytes })
    }

    /// Encrypt one 16-byte block, using the block itself as the IV.
    ///
    /// Deterministic: the same (key, block) pair always yields the same
    /// ciphertext. This is the protocol-fixed construction, not an
    /// oversight to be replaced with a random IV.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::LengthMismatch`] unless `block` is exactly
    /// 16 bytes.
    pub fn encrypt(&self, block: &[u8]) -> Result<[u8; AES_BLOCK_SIZE], CryptoError> {
        if block.len() != AES_BLOCK_SIZE {
            return Err(CryptoError::LengthMismatch {
                field: "aes-ofb block",
                expected_bits: AES_BLOCK_SIZE * 8,
                actual_bits: block.len() * 8,
            });
        }
        let mut out = [0u8; AES_BLOCK_SIZE];
        out.copy_from_slice(block);
        self.keystream(block, &mut out)?;
        Ok(out)
    }

    /// Decrypt `data` under an explicit IV.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::LengthMismatch`] if `iv` is not 16 bytes, or
    /// [`CryptoError::CipherOperationFailure`] if the cipher cannot run.
    pub fn decrypt(&self, iv: &[u8], data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut out = data.to_vec();
        self.keystream(iv, &mut out)?;
        Ok(out)
    }

    fn keystream(&self, iv: &[u8], buf: &mut [u8]) -> Result<(), CryptoError> {
        if iv.len() != AES_BLOCK_SIZE {
            return Err(CryptoError::LengthMismatch {
                field: "aes-ofb iv",
                expected_bits: AES_BLOCK_SIZE * 8,
                actual_bits: iv.len() * 8,
            });
        }
        let mut cipher = OfbAes256::new_from_slices(&self.key, iv).map_err(|e| {
            CryptoError::CipherOperationFailure {
                algorithm: "aes-256-ofb",
                cause: e.to_string(),
            }
        })?;
        cipher.apply_keystream(buf);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; 32] = [0x5a; 32];

    #[test]
    fn test_encrypt_deterministic_for_same_block() {
        let ofb = AesOfb::new(&KEY).unwrap();
        let block = [0x11u8; 16];
        assert_eq!(ofb.encrypt(&block).unwrap(), ofb.encrypt(&block).unwrap());
    }

    #[test]
    fn test_iv_follows_block() {
        // Two different blocks must see two different keystreams
        let ofb = AesOfb::new(&KEY).unwrap();
        let a = [0x11u8; 16];
        let b = [0x22u8; 16];
        let ka: Vec<u8> = ofb
            .encrypt(&a)
            .unwrap()
            .iter()
            .zip(a.iter())
            .map(|(c, p)| c ^ p)
            .collect();
        let kb: Vec<u8> = ofb
            .encrypt(&b)
            .unwrap()
            .iter()
            .zip(b.iter())
            .map(|(c, p)| c ^ p)
            .collect();
        assert_ne!(ka, kb);
    }

    #[test]
    fn test_decrypt_with_matching_iv_roundtrips() {
        let ofb = AesOfb::new(&KEY).unwrap();
        let block = [0x33u8; 16];
        let ciphertext = ofb.encrypt(&block).unwrap();
        // OFB is symmetric: decrypting under the same IV recovers the block
        assert_eq!(ofb.decrypt(&block, &ciphertext).unwrap(), block.to_vec());
    }

    #[test]
    fn test_wrong_key_size_rejected() {
        assert!(matches!(
            AesOfb::new(&[0u8; 16]),
            Err(CryptoError::KeyInitFailure { .. })
        ));
    }

    #[test]
    fn test_wrong_block_size_rejected() {
        let ofb = AesOfb::new(&KEY).unwrap();
        assert!(ofb.encrypt(&[0u8; 8]).is_err());
        assert!(ofb.decrypt(&[0u8; 8], &[0u8; 16]).is_err());
    }
}
