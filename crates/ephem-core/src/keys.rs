//! ECDH key derivation and client registration.
//!
//! At registration a client sends an ephemeral secp256r1 public key. The
//! server agrees on a shared secret with its long-term key pair and expands
//! it into two independent 256-bit keys (request MAC key and tuple key)
//! using HMAC-SHA-256 under two fixed labels. A fresh random 40-bit
//! identifier is drawn, redrawn on collision, and the resulting bundle is
//! handed to the storage collaborator.
//!
//! Key material is zeroized on drop and never appears in logs.

use p256::ecdh;
use p256::{PublicKey, SecretKey};
use rand_core::OsRng;
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use ephem_crypto::CryptoError;
use ephem_crypto::random;
use ephem_crypto::structure::HmacSha256;

use crate::store::KeyStore;
use crate::tuple::ID_A_SIZE;

/// Size of each derived key in bytes (256 bits).
pub const DERIVED_KEY_SIZE: usize = 32;

/// Bound on identifier redraws; with a 40-bit space and realistic
/// registration volumes a single draw suffices in practice.
const MAX_ID_CREATION_ATTEMPTS: usize = 10;

const LABEL_KEY_FOR_MAC: &[u8] = b"mac";
const LABEL_KEY_FOR_TUPLES: &[u8] = b"tuples";

/// Per-device secret material created once at registration.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct ClientIdentifierBundle {
    /// Permanent 40-bit application identifier
    pub id: [u8; ID_A_SIZE],
    /// Key authenticating this device's requests
    pub key_for_mac: [u8; DERIVED_KEY_SIZE],
    /// Key from which this device's tuples are derived
    pub key_for_tuples: [u8; DERIVED_KEY_SIZE],
}

impl std::fmt::Debug for ClientIdentifierBundle {
    // Key material stays out of Debug output
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientIdentifierBundle")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// The two keys derived from one ECDH agreement.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKeys {
    /// Key authenticating the device's requests
    pub key_for_mac: [u8; DERIVED_KEY_SIZE],
    /// Key from which the device's tuples are derived
    pub key_for_tuples: [u8; DERIVED_KEY_SIZE],
}

/// The server's long-term secp256r1 key pair.
pub struct ServerKeyPair {
    secret: SecretKey,
}

impl ServerKeyPair {
    /// Generate a fresh key pair from the OS CSPRNG.
    #[must_use]
    pub fn generate() -> Self {
        Self {
            secret: SecretKey::random(&mut OsRng),
        }
    }

    /// Load a key pair from a raw 32-byte scalar.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::KeyInitFailure`] if the bytes are not a valid
    /// non-zero scalar.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let secret = SecretKey::from_slice(bytes).map_err(|_| CryptoError::KeyInitFailure {
            algorithm: "secp256r1",
        })?;
        Ok(Self { secret })
    }

    /// SEC1-encoded public key, as clients must present theirs.
    #[must_use]
    pub fn public_key_sec1(&self) -> Vec<u8> {
        self.secret.public_key().to_sec1_bytes().into_vec()
    }
}

/// Derive the per-device MAC and tuple keys from a client's ephemeral
/// public key.
///
/// The client's SEC1-encoded point is validated against the curve, the
/// ECDH shared secret is computed with the server's long-term key, and two
/// independent keys are expanded from it under fixed labels. The two keys
/// are never equal (distinct HMAC inputs) and are never logged.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidPublicKey`] if the client bytes do not
/// decode to a point on secp256r1.
pub fn derive_keys_from_client_public_key(
    server_key_pair: &ServerKeyPair,
    client_public_key: &[u8],
) -> Result<DerivedKeys, CryptoError> {
    let client =
        PublicKey::from_sec1_bytes(client_public_key).map_err(|_| CryptoError::InvalidPublicKey)?;

    let shared = ecdh::diffie_hellman(
        server_key_pair.secret.to_nonzero_scalar(),
        client.as_affine(),
    );

    let prf = HmacSha256::new(shared.raw_secret_bytes().as_slice())?;
    Ok(DerivedKeys {
        key_for_mac: prf.mac(LABEL_KEY_FOR_MAC),
        key_for_tuples: prf.mac(LABEL_KEY_FOR_TUPLES),
    })
}

/// Register a client: derive its keys, draw an unused 40-bit identifier
/// and persist the bundle through the storage collaborator.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidPublicKey`] for a bad client key,
/// [`CryptoError::RandomFailed`] if the CSPRNG fails, or
/// [`CryptoError::IdentifierExhausted`] if no unused identifier could be
/// drawn within the attempt bound.
pub fn register_client(
    server_key_pair: &ServerKeyPair,
    client_public_key: &[u8],
    store: &dyn KeyStore,
) -> Result<ClientIdentifierBundle, CryptoError> {
    let derived = derive_keys_from_client_public_key(server_key_pair, client_public_key)?;

    let mut attempts = 0;
    let id = loop {
        if attempts == MAX_ID_CREATION_ATTEMPTS {
            return Err(CryptoError::IdentifierExhausted);
        }
        attempts += 1;

        let candidate: [u8; ID_A_SIZE] = random::random_array()?;
        if store.find(&candidate).is_none() {
            break candidate;
        }
    };
    debug!(attempts, "allocated client identifier");

    let bundle = ClientIdentifierBundle {
        id,
        key_for_mac: derived.key_for_mac,
        key_for_tuples: derived.key_for_tuples,
    };
    store.create(bundle.clone());
    Ok(bundle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryKeyStore;
    use std::sync::Mutex;

    #[test]
    fn test_derivation_symmetric_between_peers() {
        // The client performing ECDH with the server's public key must land
        // on the same two keys.
        let server = ServerKeyPair::generate();
        let client = ServerKeyPair::generate();

        let on_server =
            derive_keys_from_client_public_key(&server, &client.public_key_sec1()).unwrap();
        let on_client =
            derive_keys_from_client_public_key(&client, &server.public_key_sec1()).unwrap();

        assert_eq!(on_server.key_for_mac, on_client.key_for_mac);
        assert_eq!(on_server.key_for_tuples, on_client.key_for_tuples);
    }

    #[test]
    fn test_derived_keys_are_independent() {
        let server = ServerKeyPair::generate();
        let client = ServerKeyPair::generate();
        let keys = derive_keys_from_client_public_key(&server, &client.public_key_sec1()).unwrap();
        assert_ne!(keys.key_for_mac, keys.key_for_tuples);
    }

    #[test]
    fn test_invalid_public_key_rejected() {
        let server = ServerKeyPair::generate();
        for bad in [&[][..], &[0x04, 0x01, 0x02][..], &[0xffu8; 65][..]] {
            assert!(matches!(
                derive_keys_from_client_public_key(&server, bad),
                Err(CryptoError::InvalidPublicKey)
            ));
        }
    }

    #[test]
    fn test_register_persists_bundle() {
        let server = ServerKeyPair::generate();
        let client = ServerKeyPair::generate();
        let store = MemoryKeyStore::new();

        let bundle = register_client(&server, &client.public_key_sec1(), &store).unwrap();
        let stored = store.find(&bundle.id).unwrap();
        assert_eq!(stored, bundle);
    }

    /// Store stub that reports a collision for the first N lookups.
    struct CollidingStore {
        collisions_left: Mutex<usize>,
        inner: MemoryKeyStore,
    }

    impl KeyStore for CollidingStore {
        fn find(&self, id: &[u8; ID_A_SIZE]) -> Option<ClientIdentifierBundle> {
            let mut left = self.collisions_left.lock().unwrap();
            if *left > 0 {
                *left -= 1;
                return Some(ClientIdentifierBundle {
                    id: *id,
                    key_for_mac: [0u8; 32],
                    key_for_tuples: [0u8; 32],
                });
            }
            self.inner.find(id)
        }

        fn create(&self, bundle: ClientIdentifierBundle) {
            self.inner.create(bundle);
        }

        fn delete(&self, id: &[u8; ID_A_SIZE]) {
            self.inner.delete(id);
        }
    }

    #[test]
    fn test_identifier_redrawn_on_collision() {
        let server = ServerKeyPair::generate();
        let client = ServerKeyPair::generate();
        let store = CollidingStore {
            collisions_left: Mutex::new(3),
            inner: MemoryKeyStore::new(),
        };

        let bundle = register_client(&server, &client.public_key_sec1(), &store).unwrap();
        assert!(store.inner.find(&bundle.id).is_some());
    }

    #[test]
    fn test_identifier_space_exhaustion_bounded() {
        let server = ServerKeyPair::generate();
        let client = ServerKeyPair::generate();
        let store = CollidingStore {
            collisions_left: Mutex::new(usize::MAX),
            inner: MemoryKeyStore::new(),
        };

        assert!(matches!(
            register_client(&server, &client.public_key_sec1(), &store),
            Err(CryptoError::IdentifierExhausted)
        ));
    }
}
