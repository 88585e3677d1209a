use std::io::{Read, Write};

use tracing::{debug, trace, warn};

use super::{Summary, read_full};
use crate::crypto::{CHUNK_LEN, KeyMaterial, MacAccumulator, NonceCounter, derive_keys, open_chunk};
use crate::error::{Result, SaltedError};
use crate::format::footer::FOOTER_LEN;
use crate::format::{Footer, Header, read_header};

/// Decrypting session over one input source.
///
/// [`start`](Self::start) reads the header and derives keys with the
/// parameters it names; [`finish`](Self::finish) decrypts every chunk into a
/// sink and verifies the footer. Plaintext is written as chunks open, before
/// the footer is checked: output is only trustworthy once `finish` returns
/// `Ok`.
pub struct StreamDecryptor<R: Read> {
    reader: R,
    header: Header,
    keys: KeyMaterial,
    nonces: NonceCounter,
    mac: MacAccumulator,
    chunks: u64,
    verbose: bool,
}

/// What one block read from the stream turned out to be.
enum Block {
    Chunk(usize),
    Footer(Footer),
}

impl<R: Read> StreamDecryptor<R> {
    pub fn start(passphrase: &[u8], mut reader: R, verbose: bool) -> Result<Self> {
        let header = read_header(&mut reader)?;

        if verbose {
            debug!(
                version = header.version(),
                time_cost = header.params().time_cost(),
                memory_cost_kib = header.params().memory_cost_kib(),
                lanes = header.params().lanes(),
                nonce_base = %hex::encode(header.nonce_base()),
                salt = %hex::encode(header.salt()),
                "read header"
            );
        }

        let keys = derive_keys(passphrase, header.salt(), header.params())?;

        Ok(Self {
            reader,
            nonces: NonceCounter::new(*header.nonce_base()),
            mac: MacAccumulator::new(keys.signing_key()),
            header,
            keys,
            chunks: 0,
            verbose,
        })
    }

    /// The header read by [`start`](Self::start).
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Decrypts the remaining chunks into `writer`, then checks the footer's
    /// chunk count and MAC.
    pub fn finish<W: Write>(mut self, mut writer: W) -> Result<Summary> {
        let mut block = [0u8; CHUNK_LEN];

        let footer = loop {
            match self.next_block(&mut block)? {
                Block::Footer(footer) => break footer,
                Block::Chunk(n) => {
                    let data = &block[..n];
                    self.mac.update(data);

                    let nonce = self.nonces.next();
                    let plaintext =
                        open_chunk(self.keys.encryption_key(), &nonce, data, self.chunks)?;
                    writer.write_all(&plaintext)?;

                    if self.verbose {
                        trace!(chunk = self.chunks, len = plaintext.len(), "chunk opened");
                    }
                    self.chunks += 1;
                }
            }
        };

        if footer.chunk_count() != self.chunks {
            if self.verbose {
                warn!(declared = footer.chunk_count(), actual = self.chunks, "chunk count mismatch");
            }
            return Err(SaltedError::ChunkCountMismatch {
                declared: footer.chunk_count(),
                actual: self.chunks,
            });
        }

        if !self.mac.verify(footer.mac()) {
            return Err(SaltedError::IntegrityFailure);
        }

        writer.flush()?;

        if self.verbose {
            debug!(chunks = self.chunks, "footer verified");
        }
        Ok(Summary {
            version: self.header.version(),
            params: self.header.params(),
            chunks: self.chunks,
        })
    }

    /// Reads the next block and classifies it.
    ///
    /// A block that begins with the expected nonce is always a chunk, so a
    /// nonce base that happens to start with the footer sentinel cannot end
    /// the stream early. A footer must be the last 64 bytes of the input.
    fn next_block(&mut self, block: &mut [u8; CHUNK_LEN]) -> Result<Block> {
        let n = read_full(&mut self.reader, block)?;
        if n == 0 {
            return Err(SaltedError::Truncated { chunk: self.chunks });
        }

        let data = &block[..n];
        if !data.starts_with(self.nonces.peek()) && Footer::is_footer(data) {
            if n > FOOTER_LEN {
                return Err(SaltedError::TrailingData);
            }
            return Footer::from_bytes(data, self.chunks).map(Block::Footer);
        }

        Ok(Block::Chunk(n))
    }
}

/// Decrypts a complete encrypted stream from `reader` into `writer`.
pub fn decrypt_stream<R: Read, W: Write>(
    passphrase: &[u8],
    reader: R,
    writer: W,
    verbose: bool,
) -> Result<Summary> {
    StreamDecryptor::start(passphrase, reader, verbose)?.finish(writer)
}
