//! Streaming encrypt and decrypt pipelines.
//!
//! Both sides process chunks strictly in order: the nonce counter and the
//! running MAC carry state from one chunk to the next.

use std::io::{self, Read};

use serde::Serialize;

use crate::crypto::Argon2Params;

pub mod decrypt;
pub mod encrypt;

pub use decrypt::StreamDecryptor;
pub use encrypt::StreamEncryptor;

/// Outcome of a completed encrypt or decrypt session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Header version of the file written or read.
    pub version: u16,
    /// Key derivation parameters in effect.
    pub params: Argon2Params,
    /// Number of chunks processed.
    pub chunks: u64,
}

/// Reads until `buf` is full or the reader is exhausted.
///
/// Returns the number of bytes read; anything short of `buf.len()` means end
/// of stream. Unlike a single `read` call this never returns a short count
/// mid-stream.
pub fn read_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hands out at most `step` bytes per read.
    struct Trickle<'a> {
        data: &'a [u8],
        step: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.step.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn read_full_joins_short_reads() {
        let data: Vec<u8> = (0..100).collect();
        let mut reader = Trickle {
            data: &data,
            step: 7,
        };

        let mut buf = [0u8; 64];
        assert_eq!(read_full(&mut reader, &mut buf).unwrap(), 64);
        assert_eq!(&buf[..], &data[..64]);

        assert_eq!(read_full(&mut reader, &mut buf).unwrap(), 36);
        assert_eq!(&buf[..36], &data[64..]);

        assert_eq!(read_full(&mut reader, &mut buf).unwrap(), 0);
    }
}
