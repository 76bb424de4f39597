//! # ephem-core
//!
//! Protocol engine for the ephem proximity-tracing protocol.
//!
//! This crate provides:
//! - Generation and decryption of Ephemeral Bluetooth Identifiers (EBIDs)
//!   and encrypted country codes
//! - Salted HMAC generation and validation for authenticated requests
//! - ECDH-based derivation of per-device key material at registration
//! - A concurrent, fail-fast generator for epoch-ordered tuple batches
//!
//! Transport, persistence and risk scoring are external collaborators; the
//! only storage surface here is the [`store::KeyStore`] trait.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod generator;
pub mod keys;
pub mod pool;
pub mod protocol;
pub mod store;
pub mod tuple;

pub use ephem_crypto::CryptoError;
pub use generator::TupleGenerator;
pub use keys::{ClientIdentifierBundle, ServerKeyPair};
pub use tuple::EphemeralTuple;
