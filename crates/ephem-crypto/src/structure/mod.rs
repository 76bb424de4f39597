//! Cipher structures used by the protocol engine.
//!
//! Each structure binds one secret key to one algorithm and exposes the
//! uniform capability set `encrypt` / `decrypt` (plus `mac` for the MAC
//! structure). Variants are concrete types selected at construction, not a
//! trait-object hierarchy; the only runtime choice the protocol makes is
//! the 64-bit EBID cipher, modeled by [`EbidCipher`].
//!
//! None of the structures carries per-call mutable state: IVs and nonces
//! are explicit parameters or derived per call, so a keyed structure can be
//! checked out of a pool and used without further synchronization.

mod aes_ecb;
mod aes_gcm;
mod aes_ofb;
mod ebid_cipher;
mod hmac_sha256;
mod triple_des;

pub use aes_ecb::AesEcb;
pub use aes_gcm::AesGcm;
pub use aes_ofb::AesOfb;
pub use ebid_cipher::{EbidCipher, EbidCipherKind};
pub use hmac_sha256::HmacSha256;
pub use triple_des::TripleDes;
