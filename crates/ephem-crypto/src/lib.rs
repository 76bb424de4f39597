//! # ephem-crypto
//!
//! Cryptographic primitives for the ephem proximity-tracing protocol.
//!
//! This crate provides:
//! - The cipher structures used by the protocol engine: 3DES, AES-OFB,
//!   AES-ECB, AES-GCM and HMAC-SHA-256
//! - A from-scratch Skinny-64-192 tweakable block cipher
//! - The selectable 64-bit block cipher used for EBID encryption
//! - Secure random number generation
//!
//! ## Cryptographic Suite
//!
//! | Function | Algorithm | Key size |
//! |----------|-----------|----------|
//! | EBID encryption | 3DES or Skinny-64-192 | 192-bit |
//! | Country-code encryption | AES-256-OFB | 256-bit |
//! | Stored-key wrapping | AES-256-GCM | 256-bit |
//! | Request authentication | HMAC-SHA-256 | 256-bit |

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod error;
pub mod random;
pub mod skinny64;
pub mod structure;

pub use error::CryptoError;

/// Block size of the 64-bit EBID ciphers (3DES, Skinny-64-192)
pub const BLOCK64_SIZE: usize = 8;

/// Key size of the 64-bit EBID ciphers (192 bits)
pub const BLOCK64_KEY_SIZE: usize = 24;

/// AES block size
pub const AES_BLOCK_SIZE: usize = 16;

/// AES-256 key size
pub const AES_KEY_SIZE: usize = 32;

/// HMAC-SHA-256 output size
pub const HMAC_OUTPUT_SIZE: usize = 32;

/// AES-GCM nonce size, prefixed to every GCM ciphertext
pub const GCM_NONCE_SIZE: usize = 12;
