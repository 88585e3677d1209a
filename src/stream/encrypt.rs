use std::io::{Read, Write};

use tracing::{debug, trace};
use zeroize::Zeroizing;

use super::{Summary, read_full};
use crate::crypto::{
    Argon2Params, KeyMaterial, MAX_PAYLOAD_LEN, MacAccumulator, NonceCounter, derive_keys,
    random_array, seal_chunk,
};
use crate::error::Result;
use crate::format::{Footer, Header};

/// Encrypting session over one output sink.
///
/// Created by [`start`](Self::start), which writes the header; fed with
/// [`write_chunk`](Self::write_chunk); closed by [`finish`](Self::finish),
/// which writes the footer. Consuming `finish` means no chunk can follow the
/// footer.
pub struct StreamEncryptor<W: Write> {
    writer: W,
    header: Header,
    keys: KeyMaterial,
    nonces: NonceCounter,
    mac: MacAccumulator,
    chunks: u64,
    verbose: bool,
}

impl<W: Write> StreamEncryptor<W> {
    /// Picks a fresh nonce base and salt, derives keys and writes the header.
    pub fn start(passphrase: &[u8], params: Argon2Params, writer: W, verbose: bool) -> Result<Self> {
        params.validate()?;
        let header = Header::new(random_array()?, random_array()?, params);
        Self::with_header(passphrase, header, writer, verbose)
    }

    /// Starts a session under an explicit header, which may be a legacy v1
    /// header.
    pub(crate) fn with_header(
        passphrase: &[u8],
        header: Header,
        mut writer: W,
        verbose: bool,
    ) -> Result<Self> {
        let keys = derive_keys(passphrase, header.salt(), header.params())?;

        if verbose {
            debug!(
                version = header.version(),
                time_cost = header.params().time_cost(),
                memory_cost_kib = header.params().memory_cost_kib(),
                lanes = header.params().lanes(),
                nonce_base = %hex::encode(header.nonce_base()),
                salt = %hex::encode(header.salt()),
                "writing header"
            );
        }

        // the header is not part of the running MAC
        writer.write_all(&header.to_bytes())?;

        Ok(Self {
            writer,
            nonces: NonceCounter::new(*header.nonce_base()),
            mac: MacAccumulator::new(keys.signing_key()),
            header,
            keys,
            chunks: 0,
            verbose,
        })
    }

    /// Seals up to [`MAX_PAYLOAD_LEN`] bytes as the next chunk.
    ///
    /// A payload that fails to seal leaves the session unchanged.
    pub fn write_chunk(&mut self, plaintext: &[u8]) -> Result<()> {
        let chunk = seal_chunk(self.keys.encryption_key(), self.nonces.peek(), plaintext)?;
        self.nonces.next();

        self.mac.update(&chunk);
        self.writer.write_all(&chunk)?;

        if self.verbose {
            trace!(chunk = self.chunks, len = plaintext.len(), "chunk sealed");
        }
        self.chunks += 1;
        Ok(())
    }

    /// Writes the footer and flushes the sink.
    pub fn finish(mut self) -> Result<(Summary, W)> {
        let footer = Footer::new(self.chunks, self.mac.finalize());
        self.writer.write_all(&footer.to_bytes())?;
        self.writer.flush()?;

        let summary = Summary {
            version: self.header.version(),
            params: self.header.params(),
            chunks: self.chunks,
        };
        if self.verbose {
            debug!(chunks = summary.chunks, "footer written");
        }
        Ok((summary, self.writer))
    }
}

/// Encrypts everything `reader` yields into `writer`.
pub fn encrypt_stream<R: Read, W: Write>(
    passphrase: &[u8],
    params: Argon2Params,
    reader: R,
    writer: W,
    verbose: bool,
) -> Result<Summary> {
    let session = StreamEncryptor::start(passphrase, params, writer, verbose)?;
    pump(session, reader)
}

pub(crate) fn pump<R: Read, W: Write>(
    mut session: StreamEncryptor<W>,
    mut reader: R,
) -> Result<Summary> {
    let mut buf = Zeroizing::new([0u8; MAX_PAYLOAD_LEN]);
    loop {
        let n = read_full(&mut reader, &mut buf[..])?;
        if n == 0 {
            break;
        }
        session.write_chunk(&buf[..n])?;
        if n < MAX_PAYLOAD_LEN {
            break;
        }
    }

    let (summary, _) = session.finish()?;
    Ok(summary)
}
