//! Protocol crypto operations: EBID and country-code encryption, salted
//! MAC generation and validation.
//!
//! All byte-level layouts here are protocol-fixed:
//! - EBID plaintext: 24-bit epoch (big-endian, top byte of the 32-bit epoch
//!   dropped) followed by the 40-bit permanent identifier
//! - Hello message: ECC(1) || EBID(8) || Time(2) || MAC(5), 16 bytes
//! - Every MAC is computed over `salt_byte || payload`

use subtle::ConstantTimeEq;

use ephem_crypto::CryptoError;
use ephem_crypto::structure::{AesOfb, EbidCipher, HmacSha256};

use crate::tuple::{EBID_SIZE, EphemeralTuple, ID_A_SIZE};

/// Size of a hello message in bytes.
pub const HELLO_MESSAGE_SIZE: usize = 16;

/// Offset of the truncated MAC inside a hello message.
const HELLO_MAC_OFFSET: usize = 11;

/// Size of the truncated hello MAC in bytes (40 bits).
pub const HELLO_MAC_SIZE: usize = 5;

/// Size of the payload authenticated by typed request MACs: 64-bit EBID
/// followed by a 32-bit time.
pub const MAC_PAYLOAD_SIZE: usize = 12;

/// Domain-separation byte prefixed to every MAC computation, one value per
/// authenticated request type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum DigestSalt {
    /// Hello message broadcast between devices
    Hello = 0x01,
    /// Exposure status request
    Status = 0x02,
    /// Unregister request
    Unregister = 0x03,
    /// Contact-history deletion request
    DeleteHistory = 0x04,
}

/// Check that `bytes` carries exactly `expected_bits` bits.
///
/// # Errors
///
/// Returns [`CryptoError::LengthMismatch`] with the expected and actual bit
/// counts otherwise.
pub fn assert_length(
    field: &'static str,
    expected_bits: usize,
    bytes: &[u8],
) -> Result<(), CryptoError> {
    if bytes.len() * 8 != expected_bits {
        return Err(CryptoError::LengthMismatch {
            field,
            expected_bits,
            actual_bits: bytes.len() * 8,
        });
    }
    Ok(())
}

/// Encrypt (epoch || idA) into an 8-byte EBID.
///
/// The epoch is truncated to its low 24 bits, big-endian.
///
/// # Errors
///
/// Returns [`CryptoError::LengthMismatch`] if `id_a` is not 5 bytes, or a
/// cipher error from the EBID cipher.
pub fn generate_ebid(
    cipher: &EbidCipher,
    epoch_id: u32,
    id_a: &[u8],
) -> Result<[u8; EBID_SIZE], CryptoError> {
    assert_length("idA", ID_A_SIZE * 8, id_a)?;

    let epoch = epoch_id.to_be_bytes();
    let mut plaintext = [0u8; EBID_SIZE];
    plaintext[..3].copy_from_slice(&epoch[1..]);
    plaintext[3..].copy_from_slice(id_a);

    cipher.encrypt(&plaintext)
}

/// Decrypt an EBID back into its (24-bit epoch || 40-bit idA) plaintext.
///
/// # Errors
///
/// Returns [`CryptoError::LengthMismatch`] if `ebid` is not 8 bytes, or a
/// cipher error from the EBID cipher.
pub fn decrypt_ebid(cipher: &EbidCipher, ebid: &[u8]) -> Result<[u8; EBID_SIZE], CryptoError> {
    assert_length("ebid", EBID_SIZE * 8, ebid)?;
    cipher.decrypt(ebid)
}

/// Encrypt a country code against an EBID.
///
/// The EBID is zero-padded to one AES block, encrypted under the federation
/// key with AES-OFB (IV = the padded EBID), and the first ciphertext byte is
/// XORed with the country code. XOR is self-inverse, so this same operation
/// also decrypts: feeding it an encrypted country code yields the plain one.
///
/// # Errors
///
/// Returns [`CryptoError::LengthMismatch`] if `ebid` is not 8 bytes, or a
/// cipher error from the AES structure.
pub fn encrypt_country_code(
    federation_cipher: &AesOfb,
    ebid: &[u8],
    country_code: u8,
) -> Result<u8, CryptoError> {
    assert_length("ebid", EBID_SIZE * 8, ebid)?;

    // Pad to 128 bits
    let mut padded = [0u8; 16];
    padded[..EBID_SIZE].copy_from_slice(ebid);

    // Truncate the ciphertext to its most significant byte
    let encrypted = federation_cipher.encrypt(&padded)?;
    Ok(encrypted[0] ^ country_code)
}

/// Generate the full tuple for one epoch: EBID plus encrypted country code.
///
/// # Errors
///
/// Propagates any failure from [`generate_ebid`] or
/// [`encrypt_country_code`].
pub fn generate_ephemeral_tuple(
    ebid_cipher: &EbidCipher,
    federation_cipher: &AesOfb,
    epoch_id: u32,
    id_a: &[u8],
    country_code: u8,
) -> Result<EphemeralTuple, CryptoError> {
    let ebid = generate_ebid(ebid_cipher, epoch_id, id_a)?;
    let ecc = encrypt_country_code(federation_cipher, &ebid, country_code)?;
    Ok(EphemeralTuple::new(epoch_id, ebid, ecc))
}

/// HMAC over `salt || payload`.
fn generate_hmac(hmac: &HmacSha256, salt: DigestSalt, payload: &[u8]) -> [u8; 32] {
    let mut message = Vec::with_capacity(1 + payload.len());
    message.push(salt as u8);
    message.extend_from_slice(payload);
    hmac.mac(&message)
}

/// Compute the truncated 40-bit MAC of a hello message.
///
/// The MAC covers the first 11 bytes (ECC || EBID || Time), salted with
/// [`DigestSalt::Hello`], truncated to its first 5 bytes.
///
/// # Errors
///
/// Returns [`CryptoError::LengthMismatch`] if `hello` is not 16 bytes.
pub fn generate_mac_hello(
    hmac: &HmacSha256,
    hello: &[u8],
) -> Result<[u8; HELLO_MAC_SIZE], CryptoError> {
    assert_length("hello message", HELLO_MESSAGE_SIZE * 8, hello)?;

    let tag = generate_hmac(hmac, DigestSalt::Hello, &hello[..HELLO_MAC_OFFSET]);
    let mut truncated = [0u8; HELLO_MAC_SIZE];
    truncated.copy_from_slice(&tag[..HELLO_MAC_SIZE]);
    Ok(truncated)
}

/// Validate the MAC carried in a hello message's last 5 bytes.
///
/// Comparison is constant time. A mismatch returns `Ok(false)`, never an
/// error.
///
/// # Errors
///
/// Returns [`CryptoError::LengthMismatch`] if `hello` is not 16 bytes.
pub fn mac_hello_validation(hmac: &HmacSha256, hello: &[u8]) -> Result<bool, CryptoError> {
    let expected = generate_mac_hello(hmac, hello)?;
    Ok(bool::from(
        expected.as_slice().ct_eq(&hello[HELLO_MAC_OFFSET..]),
    ))
}

/// Validate a full 32-byte MAC over a 12-byte (EBID || Time) payload for a
/// given request type.
///
/// Comparison is constant time.
///
/// # Errors
///
/// Returns [`CryptoError::LengthMismatch`] if `payload` is not 12 bytes or
/// `mac` is not 32 bytes.
pub fn mac_validation_for_type(
    hmac: &HmacSha256,
    payload: &[u8],
    mac: &[u8],
    salt: DigestSalt,
) -> Result<bool, CryptoError> {
    assert_length("concat(EBID | Time)", MAC_PAYLOAD_SIZE * 8, payload)?;
    assert_length("mac", 256, mac)?;

    let expected = generate_hmac(hmac, salt, payload);
    Ok(bool::from(expected.as_slice().ct_eq(mac)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ephem_crypto::structure::EbidCipherKind;
    use proptest::prelude::*;

    const EBID_KEY: [u8; 24] = [0x42; 24];
    const FEDERATION_KEY: [u8; 32] = [0x24; 32];
    const MAC_KEY: [u8; 32] = [0x77; 32];

    fn skinny() -> EbidCipher {
        EbidCipher::new(EbidCipherKind::Skinny64, &EBID_KEY).unwrap()
    }

    fn federation() -> AesOfb {
        AesOfb::new(&FEDERATION_KEY).unwrap()
    }

    fn hmac() -> HmacSha256 {
        HmacSha256::new(&MAC_KEY).unwrap()
    }

    #[test]
    fn test_ebid_epoch_truncated_to_24_bits() {
        let cipher = skinny();
        let id_a = [1u8, 2, 3, 4, 5];
        // Epochs that agree on their low 24 bits produce identical EBIDs
        let a = generate_ebid(&cipher, 0x0100_0042, &id_a).unwrap();
        let b = generate_ebid(&cipher, 0xff00_0042, &id_a).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_short_id_a_rejected_with_bit_counts() {
        let cipher = skinny();
        let err = generate_ebid(&cipher, 1, &[0u8; 4]).unwrap_err();
        match err {
            CryptoError::LengthMismatch {
                field,
                expected_bits,
                actual_bits,
            } => {
                assert_eq!(field, "idA");
                assert_eq!(expected_bits, 40);
                assert_eq!(actual_bits, 32);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_country_code_self_inverse() {
        let fed = federation();
        let ebid = [9u8; 8];
        let cc = 0x33;
        let ecc = encrypt_country_code(&fed, &ebid, cc).unwrap();
        assert_eq!(encrypt_country_code(&fed, &ebid, ecc).unwrap(), cc);
    }

    #[test]
    fn test_mac_hello_validation_accepts_and_rejects() {
        let hmac = hmac();
        let mut hello = [0u8; HELLO_MESSAGE_SIZE];
        hello[..11].copy_from_slice(&[0x10u8; 11]);
        let mac = generate_mac_hello(&hmac, &hello).unwrap();
        hello[11..].copy_from_slice(&mac);
        assert!(mac_hello_validation(&hmac, &hello).unwrap());

        // Any single flipped bit must invalidate the message
        for byte in 0..HELLO_MESSAGE_SIZE {
            let mut tampered = hello;
            tampered[byte] ^= 0x01;
            assert!(!mac_hello_validation(&hmac, &tampered).unwrap());
        }
    }

    #[test]
    fn test_mac_salt_domain_separation() {
        let hmac = hmac();
        let payload = [0x55u8; MAC_PAYLOAD_SIZE];
        let tag = generate_hmac(&hmac, DigestSalt::Status, &payload);
        assert!(mac_validation_for_type(&hmac, &payload, &tag, DigestSalt::Status).unwrap());
        assert!(!mac_validation_for_type(&hmac, &payload, &tag, DigestSalt::Unregister).unwrap());
    }

    #[test]
    fn test_mac_payload_length_enforced() {
        let hmac = hmac();
        let err =
            mac_validation_for_type(&hmac, &[0u8; 16], &[0u8; 32], DigestSalt::Status).unwrap_err();
        assert!(matches!(
            err,
            CryptoError::LengthMismatch {
                expected_bits: 96,
                actual_bits: 128,
                ..
            }
        ));
    }

    proptest! {
        #[test]
        fn prop_ebid_roundtrip(id_a in proptest::array::uniform5(any::<u8>()),
                               epoch_id in 0u32..0x0100_0000) {
            let cipher = skinny();
            let ebid = generate_ebid(&cipher, epoch_id, &id_a).unwrap();
            let plain = decrypt_ebid(&cipher, &ebid).unwrap();

            let mut expected = [0u8; 8];
            expected[..3].copy_from_slice(&epoch_id.to_be_bytes()[1..]);
            expected[3..].copy_from_slice(&id_a);
            prop_assert_eq!(plain, expected);
        }

        #[test]
        fn prop_country_code_self_inverse(ebid in proptest::array::uniform8(any::<u8>()),
                                          cc in any::<u8>()) {
            let fed = federation();
            let ecc = encrypt_country_code(&fed, &ebid, cc).unwrap();
            prop_assert_eq!(encrypt_country_code(&fed, &ebid, ecc).unwrap(), cc);
        }
    }
}
