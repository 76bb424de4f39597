//! HMAC-SHA-256 MAC structure.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::{CryptoError, HMAC_OUTPUT_SIZE};

/// Key-bound HMAC-SHA-256 structure; `mac` is its only operation.
#[derive(Clone)]
pub struct HmacSha256 {
    mac: Hmac<Sha256>,
}

impl HmacSha256 {
    /// Bind a key to the MAC structure.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::KeyInitFailure`] for an empty key.
    pub fn new(key: &[u8]) -> Result<Self, CryptoError> {
        if key.is_empty() {
            return Err(CryptoError::KeyInitFailure {
                algorithm: "hmac-sha256",
            });
        }
        let mac = Hmac::<Sha256>::new_from_slice(key).map_err(|_| CryptoError::KeyInitFailure {
            algorithm: "hmac-sha256",
        })?;
        Ok(Self { mac })
    }

    /// Compute the 32-byte tag over `message`.
    #[must_use]
    pub fn mac(&self, message: &[u8]) -> [u8; HMAC_OUTPUT_SIZE] {
        let mut mac = self.mac.clone();
        mac.update(message);
        mac.finalize().into_bytes().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 4231 test case 1
    #[test]
    fn test_rfc4231_vector_1() {
        let key = [0x0bu8; 20];
        let hmac = HmacSha256::new(&key).unwrap();
        let tag = hmac.mac(b"Hi There");
        let expected =
            hex::decode("b0344c61d8db38535ca8afceaf0bf12b881dc200c9833da726e9376c2e32cff7")
                .unwrap();
        assert_eq!(tag.to_vec(), expected);
    }

    #[test]
    fn test_tag_depends_on_key() {
        let a = HmacSha256::new(&[1u8; 32]).unwrap();
        let b = HmacSha256::new(&[2u8; 32]).unwrap();
        assert_ne!(a.mac(b"msg"), b.mac(b"msg"));
    }

    #[test]
    fn test_empty_key_rejected() {
        assert!(matches!(
            HmacSha256::new(&[]),
            Err(CryptoError::KeyInitFailure { .. })
        ));
    }
}
