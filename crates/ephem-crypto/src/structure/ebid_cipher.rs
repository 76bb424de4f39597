//! Selectable 64-bit block cipher for EBID encryption.
//!
//! Whether a deployment encrypts EBIDs with 3DES or Skinny-64-192 is a
//! configuration decision made once at construction; call sites only see
//! the bound variant.

use crate::CryptoError;
use crate::skinny64::Skinny64;
use crate::structure::TripleDes;

/// Deployment-time choice of EBID cipher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EbidCipherKind {
    /// 3DES (EDE3), 192-bit key
    TripleDes,
    /// Skinny-64-192 lightweight cipher
    Skinny64,
}

/// A keyed 64-bit block cipher bound to one of the two EBID algorithms.
pub enum EbidCipher {
    /// 3DES-backed variant
    TripleDes(TripleDes),
    /// Skinny-64-192-backed variant
    Skinny64(Skinny64),
}

impl EbidCipher {
    /// Key the selected algorithm with a 24-byte (192-bit) key.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::KeyInitFailure`] if the key does not match
    /// the algorithm's required size.
    pub fn new(kind: EbidCipherKind, key: &[u8]) -> Result<Self, CryptoError> {
        match kind {
            EbidCipherKind::TripleDes => TripleDes::new(key).map(Self::TripleDes),
            EbidCipherKind::Skinny64 => Skinny64::new(key).map(Self::Skinny64),
        }
    }

    /// Encrypt one 8-byte block.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::LengthMismatch`] unless `input` is exactly
    /// 8 bytes.
    pub fn encrypt(&self, input: &[u8]) -> Result<[u8; 8], CryptoError> {
        match self {
            Self::TripleDes(cipher) => cipher.encrypt_block(input),
            Self::Skinny64(cipher) => cipher.encrypt_block(input),
        }
    }

    /// Decrypt one 8-byte block.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::LengthMismatch`] unless `input` is exactly
    /// 8 bytes.
    pub fn decrypt(&self, input: &[u8]) -> Result<[u8; 8], CryptoError> {
        match self {
            Self::TripleDes(cipher) => cipher.decrypt_block(input),
            Self::Skinny64(cipher) => cipher.decrypt_block(input),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; 24] = [0x0f; 24];

    #[test]
    fn test_both_variants_roundtrip() {
        let block = [0xc4u8, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        for kind in [EbidCipherKind::TripleDes, EbidCipherKind::Skinny64] {
            let cipher = EbidCipher::new(kind, &KEY).unwrap();
            let ct = cipher.encrypt(&block).unwrap();
            assert_eq!(cipher.decrypt(&ct).unwrap(), block);
        }
    }

    #[test]
    fn test_variants_disagree() {
        // Same key, different algorithms: ciphertexts must differ
        let block = [0u8; 8];
        let des = EbidCipher::new(EbidCipherKind::TripleDes, &KEY).unwrap();
        let skinny = EbidCipher::new(EbidCipherKind::Skinny64, &KEY).unwrap();
        assert_ne!(des.encrypt(&block).unwrap(), skinny.encrypt(&block).unwrap());
    }

    #[test]
    fn test_wrong_key_size_rejected_for_both() {
        for kind in [EbidCipherKind::TripleDes, EbidCipherKind::Skinny64] {
            assert!(matches!(
                EbidCipher::new(kind, &[0u8; 16]),
                Err(CryptoError::KeyInitFailure { .. })
            ));
        }
    }
}
