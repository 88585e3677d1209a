//! On-disk framing of an encrypted file.
//!
//! ```text
//! HEADER (64) | CHUNK (4096) * n | FOOTER (64)
//! ```
//!
//! The header is version-aware; the decoder dispatches on the big-endian
//! version field to the matching per-version module.

use std::io::Read;

use serde::Serialize;

use crate::crypto::{Argon2Params, NONCE_LEN, SALT_LEN};
use crate::error::{Result, SaltedError};

pub mod footer;
pub mod v1;
pub mod v2;

pub use footer::Footer;

/// Magic bytes identifying an encrypted file.
pub const MAGIC: [u8; MAGIC_LEN] = [0x44, 0x43];
/// Length of magic bytes.
pub const MAGIC_LEN: usize = 2;
/// Length of version field.
pub const VER_LEN: usize = 2;
/// Size of the header on disk.
pub const HEADER_LEN: usize = 64;
/// Offset of the nonce base within the header.
pub const NONCE_OFFSET: usize = MAGIC_LEN + VER_LEN;
/// Offset of the salt within the header.
pub const SALT_OFFSET: usize = NONCE_OFFSET + NONCE_LEN;
/// First byte after the fields every version shares.
pub const COMMON_LEN: usize = SALT_OFFSET + SALT_LEN;
/// Version written for new files.
pub const CURRENT_VERSION: u16 = v2::VERSION_V2;

/// A parsed file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Header {
    V1(v1::HeaderV1),
    V2(v2::HeaderV2),
}

impl Header {
    /// Header for a new file, always in the current version.
    pub fn new(nonce_base: [u8; NONCE_LEN], salt: [u8; SALT_LEN], params: Argon2Params) -> Self {
        Header::V2(v2::HeaderV2::new(nonce_base, salt, params))
    }

    pub fn version(&self) -> u16 {
        match self {
            Header::V1(_) => v1::VERSION_V1,
            Header::V2(_) => v2::VERSION_V2,
        }
    }

    pub fn nonce_base(&self) -> &[u8; NONCE_LEN] {
        match self {
            Header::V1(h) => &h.nonce_base,
            Header::V2(h) => &h.nonce_base,
        }
    }

    pub fn salt(&self) -> &[u8; SALT_LEN] {
        match self {
            Header::V1(h) => &h.salt,
            Header::V2(h) => &h.salt,
        }
    }

    /// Key derivation parameters: stored for v2, the fixed legacy set for v1.
    pub fn params(&self) -> Argon2Params {
        match self {
            Header::V1(_) => Argon2Params::LEGACY,
            Header::V2(h) => h.params,
        }
    }

    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        match self {
            Header::V1(h) => h.to_bytes(),
            Header::V2(h) => h.to_bytes(),
        }
    }

    /// Parses a header, dispatching on its version field.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The data is shorter than [`HEADER_LEN`]
    /// - The magic bytes are invalid
    /// - The version is unsupported
    /// - The version's padding is not all zero
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_LEN {
            return Err(SaltedError::ShortHeader(data.len()));
        }

        if data[..MAGIC_LEN] != MAGIC {
            return Err(SaltedError::BadMagic([data[0], data[1]]));
        }

        let version = u16::from_be_bytes([data[MAGIC_LEN], data[MAGIC_LEN + 1]]);
        let data = &data[..HEADER_LEN];

        match version {
            v1::VERSION_V1 => v1::HeaderV1::parse(data).map(Header::V1),
            v2::VERSION_V2 => v2::HeaderV2::parse(data).map(Header::V2),
            other => Err(SaltedError::UnsupportedVersion(other)),
        }
    }

    /// Summary suitable for display or JSON output.
    pub fn info(&self) -> HeaderInfo {
        HeaderInfo {
            version: self.version(),
            params: self.params(),
            nonce_base: hex::encode(self.nonce_base()),
            salt: hex::encode(self.salt()),
        }
    }
}

/// Public, non-secret description of a header.
#[derive(Debug, Clone, Serialize)]
pub struct HeaderInfo {
    pub version: u16,
    pub params: Argon2Params,
    pub nonce_base: String,
    pub salt: String,
}

impl std::fmt::Display for HeaderInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "format version:  {}", self.version)?;
        writeln!(f, "argon2 time:     {}", self.params.time_cost())?;
        writeln!(f, "argon2 memory:   {} KiB", self.params.memory_cost_kib())?;
        writeln!(f, "argon2 lanes:    {}", self.params.lanes())?;
        writeln!(f, "nonce base:      {}", self.nonce_base)?;
        write!(f, "salt:            {}", self.salt)
    }
}

/// Reads and parses the header at the start of `reader`.
pub fn read_header<R: Read>(reader: &mut R) -> Result<Header> {
    let mut buf = [0u8; HEADER_LEN];
    let n = crate::stream::read_full(reader, &mut buf)?;
    Header::from_bytes(&buf[..n])
}

/// Writes the fields shared by every version into `buf`.
pub(crate) fn write_common(
    buf: &mut [u8; HEADER_LEN],
    version: u16,
    nonce_base: &[u8; NONCE_LEN],
    salt: &[u8; SALT_LEN],
) {
    buf[..MAGIC_LEN].copy_from_slice(&MAGIC);
    buf[MAGIC_LEN..NONCE_OFFSET].copy_from_slice(&version.to_be_bytes());
    buf[NONCE_OFFSET..SALT_OFFSET].copy_from_slice(nonce_base);
    buf[SALT_OFFSET..COMMON_LEN].copy_from_slice(salt);
}

/// Reads the nonce base and salt shared by every version.
pub(crate) fn read_common(data: &[u8]) -> ([u8; NONCE_LEN], [u8; SALT_LEN]) {
    let mut nonce_base = [0u8; NONCE_LEN];
    nonce_base.copy_from_slice(&data[NONCE_OFFSET..SALT_OFFSET]);
    let mut salt = [0u8; SALT_LEN];
    salt.copy_from_slice(&data[SALT_OFFSET..COMMON_LEN]);
    (nonce_base, salt)
}

/// Checks that `data[from..]` is zero padding.
pub(crate) fn check_padding(data: &[u8], from: usize, version: u16) -> Result<()> {
    match data[from..].iter().position(|b| *b != 0) {
        Some(pos) => Err(SaltedError::CorruptHeader {
            version,
            offset: from + pos,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn sample() -> Header {
        Header::new([2u8; 24], [1u8; 16], Argon2Params::new(3, 65536, 2).unwrap())
    }

    #[test]
    fn new_headers_are_current_version() {
        let header = sample();
        assert_eq!(header.version(), CURRENT_VERSION);

        let bytes = header.to_bytes();
        assert_eq!(&bytes[..4], &[0x44, 0x43, 0x00, 0x02]);
    }

    #[test]
    fn header_roundtrip() {
        let header = sample();
        let parsed = Header::from_bytes(&header.to_bytes()).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(parsed.params().memory_cost_kib(), 65536);
    }

    #[test]
    fn header_invalid_magic_fails() {
        let mut data = sample().to_bytes();
        data[..2].copy_from_slice(b"KN");

        let err = Header::from_bytes(&data).unwrap_err();
        assert!(matches!(err, SaltedError::BadMagic(_)));
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn header_unsupported_version_fails() {
        let mut data = sample().to_bytes();
        data[2..4].copy_from_slice(&3u16.to_be_bytes());

        let err = Header::from_bytes(&data).unwrap_err();
        assert!(matches!(err, SaltedError::UnsupportedVersion(3)));
    }

    #[test]
    fn version_is_big_endian() {
        let mut data = sample().to_bytes();
        data[2..4].copy_from_slice(&[0x02, 0x00]);

        assert!(matches!(
            Header::from_bytes(&data),
            Err(SaltedError::UnsupportedVersion(0x0200))
        ));
    }

    #[test]
    fn header_too_short_fails() {
        let data = sample().to_bytes();
        let err = Header::from_bytes(&data[..HEADER_LEN - 1]).unwrap_err();
        assert!(matches!(err, SaltedError::ShortHeader(63)));
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn read_header_consumes_exactly_header_len() {
        let mut data = sample().to_bytes().to_vec();
        data.extend_from_slice(b"rest");

        let mut cursor = std::io::Cursor::new(data);
        let header = read_header(&mut cursor).unwrap();

        assert_eq!(header, sample());
        assert_eq!(cursor.position(), HEADER_LEN as u64);
    }

    #[test]
    fn info_exposes_no_keys() {
        let info = sample().info();
        assert_eq!(info.version, 2);
        assert_eq!(info.salt, "01".repeat(16));

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["params"]["time_cost"], 3);
        assert_eq!(json["params"]["lanes"], 2);
    }
}
