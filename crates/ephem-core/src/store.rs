//! Key-storage collaborator interface.
//!
//! Persistence of registered client key material lives outside this core;
//! callers supply a [`KeyStore`] implementation. Encryption-at-rest of the
//! stored bundles, if any, is the implementation's concern.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::debug;

use crate::keys::ClientIdentifierBundle;
use crate::tuple::ID_A_SIZE;

/// Storage collaborator holding registered client key bundles, keyed by
/// the permanent 40-bit identifier.
pub trait KeyStore: Send + Sync {
    /// Look up a bundle by identifier.
    fn find(&self, id: &[u8; ID_A_SIZE]) -> Option<ClientIdentifierBundle>;

    /// Persist a freshly created bundle.
    fn create(&self, bundle: ClientIdentifierBundle);

    /// Remove a bundle on unregistration.
    fn delete(&self, id: &[u8; ID_A_SIZE]);
}

/// In-memory [`KeyStore`], used by tests and single-process deployments.
#[derive(Default)]
pub struct MemoryKeyStore {
    entries: Mutex<HashMap<[u8; ID_A_SIZE], ClientIdentifierBundle>>,
}

impl MemoryKeyStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyStore for MemoryKeyStore {
    fn find(&self, id: &[u8; ID_A_SIZE]) -> Option<ClientIdentifierBundle> {
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.get(id).cloned()
    }

    fn create(&self, bundle: ClientIdentifierBundle) {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        debug!(id = ?bundle.id, "storing client key bundle");
        entries.insert(bundle.id, bundle);
    }

    fn delete(&self, id: &[u8; ID_A_SIZE]) {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        debug!(id = ?id, "deleting client key bundle");
        entries.remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle(id: [u8; ID_A_SIZE]) -> ClientIdentifierBundle {
        ClientIdentifierBundle {
            id,
            key_for_mac: [1u8; 32],
            key_for_tuples: [2u8; 32],
        }
    }

    #[test]
    fn test_create_find_delete() {
        let store = MemoryKeyStore::new();
        let id = [1, 2, 3, 4, 5];
        assert!(store.find(&id).is_none());

        store.create(bundle(id));
        assert_eq!(store.find(&id).unwrap().key_for_mac, [1u8; 32]);

        store.delete(&id);
        assert!(store.find(&id).is_none());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let store = MemoryKeyStore::new();
        let id = [9u8; 5];
        store.delete(&id);
        store.create(bundle(id));
        store.delete(&id);
        store.delete(&id);
        assert!(store.find(&id).is_none());
    }
}
