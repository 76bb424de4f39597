//! Cryptographic error types.

use thiserror::Error;

/// Errors surfaced by the protocol crypto engine.
///
/// Every cryptographic failure propagates to the caller; nothing is
/// zero-filled or silently replaced with a default key.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// A protocol field does not have its mandated bit length
    #[error("{field} should be {expected_bits}-bits sized but is {actual_bits}-bits sized")]
    LengthMismatch {
        /// Name of the offending field
        field: &'static str,
        /// Mandated size in bits
        expected_bits: usize,
        /// Size in bits of the value that was supplied
        actual_bits: usize,
    },

    /// A cipher could not be keyed (wrong key length or unusable key)
    #[error("failed to initialize {algorithm} key")]
    KeyInitFailure {
        /// Algorithm that rejected the key
        algorithm: &'static str,
    },

    /// A keyed cipher failed at runtime
    #[error("{algorithm} operation failed: {cause}")]
    CipherOperationFailure {
        /// Algorithm that failed
        algorithm: &'static str,
        /// Underlying cause
        cause: String,
    },

    /// The client's ephemeral public key is not a valid point on the curve
    #[error("invalid client public key")]
    InvalidPublicKey,

    /// A tuple batch failed; the whole batch is discarded
    #[error("tuple batch generation failed at epoch {epoch}")]
    BatchGenerationFailure {
        /// Epoch whose computation failed first
        epoch: u32,
        /// Failure that aborted the batch
        #[source]
        cause: Box<CryptoError>,
    },

    /// `exec` was called on a stopped tuple generator
    #[error("tuple generator is stopped")]
    GeneratorStopped,

    /// No unused 40-bit identifier could be drawn within the attempt bound
    #[error("could not allocate an unused client identifier")]
    IdentifierExhausted,

    /// The OS CSPRNG failed
    #[error("random number generation failed")]
    RandomFailed,
}
