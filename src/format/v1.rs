//! Header format v1.
//!
//! ```text
//! MAGIC (2) | VERSION (2, BE) | NONCE BASE (24) | SALT (16) | ZERO (20)
//! ```
//!
//! Argon2 parameters are not stored; v1 files always use
//! [`Argon2Params::LEGACY`](crate::crypto::Argon2Params::LEGACY).

use super::{COMMON_LEN, HEADER_LEN, check_padding, read_common, write_common};
use crate::crypto::{NONCE_LEN, SALT_LEN};
use crate::error::Result;

pub const VERSION_V1: u16 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderV1 {
    pub nonce_base: [u8; NONCE_LEN],
    pub salt: [u8; SALT_LEN],
}

impl HeaderV1 {
    pub fn new(nonce_base: [u8; NONCE_LEN], salt: [u8; SALT_LEN]) -> Self {
        Self { nonce_base, salt }
    }

    /// Parses a 64-byte v1 header whose magic and version were already checked.
    pub fn parse(data: &[u8]) -> Result<Self> {
        check_padding(data, COMMON_LEN, VERSION_V1)?;
        let (nonce_base, salt) = read_common(data);
        Ok(Self { nonce_base, salt })
    }

    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        write_common(&mut buf, VERSION_V1, &self.nonce_base, &self.salt);
        buf
    }
}
