//! Cryptographic primitives for the chunked stream.
//!
//! Provides key derivation, the per-chunk AEAD, the nonce counter and the
//! running file MAC.

pub mod aead;
pub mod kdf;
pub mod mac;
pub mod nonce;

pub use aead::{open_chunk, random_array, seal_chunk};
pub use kdf::{Argon2Params, KeyMaterial, derive_keys};
pub use mac::MacAccumulator;
pub use nonce::NonceCounter;

/// Length of the salt (16 bytes).
pub const SALT_LEN: usize = 16;
/// Length of the nonce (24 bytes for XChaCha20-Poly1305).
pub const NONCE_LEN: usize = 24;
/// Length of each derived key (32 bytes / 256 bits).
pub const KEY_LEN: usize = 32;
/// Length of the running MAC digest (HMAC-SHA-256).
pub const MAC_LEN: usize = 32;
/// Length of the Poly1305 authentication tag.
pub const TAG_LEN: usize = 16;
/// Length of the little-endian payload length field in each chunk.
pub const LENGTH_LEN: usize = 4;

/// Size of one chunk on the wire.
pub const CHUNK_LEN: usize = 4096;
/// Bytes in front of the ciphertext: nonce followed by payload length.
pub const CHUNK_PREFIX_LEN: usize = NONCE_LEN + LENGTH_LEN;
/// Maximum plaintext bytes carried by one chunk.
pub const MAX_PAYLOAD_LEN: usize = CHUNK_LEN - CHUNK_PREFIX_LEN - TAG_LEN;
