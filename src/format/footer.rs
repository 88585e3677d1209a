//! File trailer.
//!
//! ```text
//! SENTINEL (4) | CHUNK COUNT (8, LE) | FILE MAC (32) | ZERO (20)
//! ```

use crate::crypto::MAC_LEN;
use crate::error::{Result, SaltedError};

/// Magic and version of the footer; also marks the end of the chunk stream.
pub const FOOTER_MAGIC: [u8; 4] = [0x44, 0x44, 0x00, 0x01];
/// Size of the footer on disk.
pub const FOOTER_LEN: usize = 64;

const COUNT_OFFSET: usize = FOOTER_MAGIC.len();
const MAC_OFFSET: usize = COUNT_OFFSET + 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footer {
    chunk_count: u64,
    mac: [u8; MAC_LEN],
}

impl Footer {
    pub(crate) fn new(chunk_count: u64, mac: [u8; MAC_LEN]) -> Self {
        Self { chunk_count, mac }
    }

    pub fn chunk_count(&self) -> u64 {
        self.chunk_count
    }

    pub fn mac(&self) -> &[u8; MAC_LEN] {
        &self.mac
    }

    /// Whether `block` starts with the footer sentinel.
    pub fn is_footer(block: &[u8]) -> bool {
        block.starts_with(&FOOTER_MAGIC)
    }

    pub fn to_bytes(&self) -> [u8; FOOTER_LEN] {
        let mut buf = [0u8; FOOTER_LEN];
        buf[..COUNT_OFFSET].copy_from_slice(&FOOTER_MAGIC);
        buf[COUNT_OFFSET..MAC_OFFSET].copy_from_slice(&self.chunk_count.to_le_bytes());
        buf[MAC_OFFSET..MAC_OFFSET + MAC_LEN].copy_from_slice(&self.mac);
        buf
    }

    /// Extracts chunk count and MAC. The trailing padding is not inspected.
    ///
    /// `chunk` is the index the footer was found at, for error context.
    pub fn from_bytes(data: &[u8], chunk: u64) -> Result<Self> {
        if data.len() < FOOTER_LEN || !Self::is_footer(data) {
            return Err(SaltedError::Truncated { chunk });
        }

        let mut count = [0u8; 8];
        count.copy_from_slice(&data[COUNT_OFFSET..MAC_OFFSET]);
        let mut mac = [0u8; MAC_LEN];
        mac.copy_from_slice(&data[MAC_OFFSET..MAC_OFFSET + MAC_LEN]);

        Ok(Self {
            chunk_count: u64::from_le_bytes(count),
            mac,
        })
    }
}
