//! Header format v2.
//!
//! ```text
//! MAGIC (2) | VERSION (2, BE) | NONCE BASE (24) | SALT (16)
//!   | TIME_COST (4, LE) | MEM_COST_KIB (4, LE) | LANES (1) | ZERO (11)
//! ```

use super::{COMMON_LEN, HEADER_LEN, check_padding, read_common, write_common};
use crate::crypto::{Argon2Params, NONCE_LEN, SALT_LEN};
use crate::error::Result;

pub const VERSION_V2: u16 = 2;

const TIME_OFFSET: usize = COMMON_LEN;
const MEM_OFFSET: usize = TIME_OFFSET + 4;
const LANES_OFFSET: usize = MEM_OFFSET + 4;
const PADDING_OFFSET: usize = LANES_OFFSET + 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderV2 {
    pub nonce_base: [u8; NONCE_LEN],
    pub salt: [u8; SALT_LEN],
    pub params: Argon2Params,
}

impl HeaderV2 {
    pub fn new(nonce_base: [u8; NONCE_LEN], salt: [u8; SALT_LEN], params: Argon2Params) -> Self {
        Self {
            nonce_base,
            salt,
            params,
        }
    }

    /// Parses a 64-byte v2 header whose magic and version were already checked.
    ///
    /// Parameters are taken as stored; out-of-range values are rejected when
    /// keys are derived from them.
    pub fn parse(data: &[u8]) -> Result<Self> {
        check_padding(data, PADDING_OFFSET, VERSION_V2)?;
        let (nonce_base, salt) = read_common(data);

        let time_cost = u32::from_le_bytes(le_u32(&data[TIME_OFFSET..MEM_OFFSET]));
        let memory_cost_kib = u32::from_le_bytes(le_u32(&data[MEM_OFFSET..LANES_OFFSET]));
        let lanes = data[LANES_OFFSET];

        Ok(Self {
            nonce_base,
            salt,
            params: Argon2Params::from_raw(time_cost, memory_cost_kib, lanes),
        })
    }

    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        write_common(&mut buf, VERSION_V2, &self.nonce_base, &self.salt);
        buf[TIME_OFFSET..MEM_OFFSET].copy_from_slice(&self.params.time_cost().to_le_bytes());
        buf[MEM_OFFSET..LANES_OFFSET].copy_from_slice(&self.params.memory_cost_kib().to_le_bytes());
        buf[LANES_OFFSET] = self.params.lanes();
        buf
    }
}

fn le_u32(bytes: &[u8]) -> [u8; 4] {
    let mut out = [0u8; 4];
    out.copy_from_slice(bytes);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SaltedError;
    use crate::format::Header;

    #[test]
    fn v2_field_offsets() {
        let params = Argon2Params::new(7, 0x0001_0203, 9).unwrap();
        let bytes = HeaderV2::new([0u8; 24], [0u8; 16], params).to_bytes();

        assert_eq!(&bytes[44..48], &7u32.to_le_bytes());
        assert_eq!(&bytes[48..52], &[0x03, 0x02, 0x01, 0x00]);
        assert_eq!(bytes[52], 9);
        assert!(bytes[53..].iter().all(|b| *b == 0));
    }

    #[test]
    fn v2_arbitrary_params_roundtrip() {
        let params = Argon2Params::new(4, 1 << 20, 8).unwrap();
        let header = HeaderV2::new([0xabu8; 24], [0xcdu8; 16], params);

        let parsed = Header::from_bytes(&header.to_bytes()).unwrap();
        assert_eq!(parsed.params(), params);
        assert_eq!(parsed, Header::V2(header));
    }

    #[test]
    fn v2_nonzero_padding_is_corruption() {
        let header = HeaderV2::new([1u8; 24], [2u8; 16], Argon2Params::LEGACY);
        let mut bytes = header.to_bytes();
        bytes[HEADER_LEN - 1] = 0xff;

        let err = Header::from_bytes(&bytes).unwrap_err();
        assert!(matches!(
            err,
            SaltedError::CorruptHeader {
                version: 2,
                offset: 63
            }
        ));
    }
}
