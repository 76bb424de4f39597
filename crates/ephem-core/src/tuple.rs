//! Ephemeral tuple model and protocol time constants.

/// Duration of one protocol epoch in seconds.
pub const EPOCH_DURATION_SECS: u32 = 900;

/// Size of an EBID in bytes (64 bits).
pub const EBID_SIZE: usize = 8;

/// Size of the permanent per-device identifier in bytes (40 bits).
pub const ID_A_SIZE: usize = 5;

/// The (epoch, EBID, encrypted country code) triple issued to a device for
/// one 900-second epoch. Immutable once constructed; exactly one instance
/// exists per (device, epoch).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EphemeralTuple {
    /// Epoch index since the protocol's service start (24-bit range)
    pub epoch_id: u32,
    /// Encrypted (epoch || idA) block
    pub ebid: [u8; EBID_SIZE],
    /// Country code XOR-masked with an AES-OFB keystream byte
    pub encrypted_country_code: u8,
}

impl EphemeralTuple {
    /// Build a tuple for one epoch.
    #[must_use]
    pub fn new(epoch_id: u32, ebid: [u8; EBID_SIZE], encrypted_country_code: u8) -> Self {
        Self {
            epoch_id,
            ebid,
            encrypted_country_code,
        }
    }
}
