//! Streaming, passphrase-based file encryption.
//!
//! A file is a 64-byte header, a run of 4096-byte XChaCha20-Poly1305 chunks
//! under sequential nonces, and a 64-byte footer carrying the chunk count and
//! an HMAC-SHA-256 over every chunk. Keys come from Argon2id; its cost
//! parameters are stored in the header so old files stay readable when the
//! defaults change.

mod crypto;
mod error;
mod format;
mod output;
mod stream;

pub use crate::crypto::{Argon2Params, CHUNK_LEN, MAX_PAYLOAD_LEN};
pub use crate::error::{ErrorKind, Result, SaltedError};
pub use crate::format::footer::FOOTER_LEN;
pub use crate::format::{HEADER_LEN, Header, HeaderInfo, read_header};
pub use crate::output::AtomicOutput;
pub use crate::stream::{StreamDecryptor, StreamEncryptor, Summary};

use anyhow::Context;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Path meaning stdin (as input) or stdout (as output).
pub const STDIO_PATH: &str = "-";

/// Direction of an operation, used to pick default file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Encrypt,
    Decrypt,
}

/// Encrypts `reader` into `writer` with the default Argon2 parameters.
pub fn encrypt<R: Read, W: Write>(
    passphrase: &str,
    reader: R,
    writer: W,
    verbose: bool,
) -> Result<Summary> {
    encrypt_with_params(passphrase, Argon2Params::default(), reader, writer, verbose)
}

/// Encrypts `reader` into `writer`, recording `params` in the header.
pub fn encrypt_with_params<R: Read, W: Write>(
    passphrase: &str,
    params: Argon2Params,
    reader: R,
    writer: W,
    verbose: bool,
) -> Result<Summary> {
    stream::encrypt::encrypt_stream(passphrase.as_bytes(), params, reader, writer, verbose)
}

/// Decrypts `reader` into `writer` and verifies the footer.
///
/// Plaintext reaches `writer` as chunks are opened; it must be discarded
/// unless this returns `Ok`.
pub fn decrypt<R: Read, W: Write>(
    passphrase: &str,
    reader: R,
    writer: W,
    verbose: bool,
) -> Result<Summary> {
    stream::decrypt::decrypt_stream(passphrase.as_bytes(), reader, writer, verbose)
}

/// Encrypts the file at `input` into `output`. Either may be `-`.
///
/// File outputs are written atomically: nothing appears at `output` unless
/// the whole operation succeeds.
pub fn encrypt_file(
    input: &Path,
    output: &Path,
    passphrase: &str,
    params: Argon2Params,
    verbose: bool,
) -> anyhow::Result<Summary> {
    let reader = open_input(input)?;
    let summary = with_output(output, |writer| {
        encrypt_with_params(passphrase, params, reader, writer, verbose)
    })
    .with_context(|| format!("failed to encrypt {}", input.display()))?;

    if verbose {
        info!(chunks = summary.chunks, output = %output.display(), "encrypted");
    }
    Ok(summary)
}

/// Decrypts the file at `input` into `output`. Either may be `-`.
///
/// File outputs are written atomically, so a file that fails verification
/// leaves no plaintext behind. With `-` as output, plaintext already written
/// to stdout cannot be withdrawn.
pub fn decrypt_file(
    input: &Path,
    output: &Path,
    passphrase: &str,
    verbose: bool,
) -> anyhow::Result<Summary> {
    let reader = open_input(input)?;
    let summary = with_output(output, |writer| decrypt(passphrase, reader, writer, verbose))
        .with_context(|| format!("failed to decrypt {}", input.display()))?;

    if verbose {
        info!(chunks = summary.chunks, output = %output.display(), "decrypted");
    }
    Ok(summary)
}

/// Reads the header of an encrypted file without needing the passphrase.
pub fn inspect_file(input: &Path) -> anyhow::Result<Header> {
    let mut reader = open_input(input)?;
    let header = read_header(&mut reader)
        .with_context(|| format!("failed to read header of {}", input.display()))?;
    Ok(header)
}

/// Output name used when none is given: `<input>.salted` when encrypting,
/// `<input>.decrypted` when decrypting, `out.*` for stdin.
pub fn default_output_path(input: &Path, mode: Mode) -> PathBuf {
    let suffix = match mode {
        Mode::Encrypt => "salted",
        Mode::Decrypt => "decrypted",
    };

    if input == Path::new(STDIO_PATH) {
        return PathBuf::from(format!("out.{suffix}"));
    }

    let mut name = input.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

fn open_input(input: &Path) -> anyhow::Result<Box<dyn Read>> {
    if input == Path::new(STDIO_PATH) {
        return Ok(Box::new(io::stdin().lock()));
    }

    let file =
        File::open(input).with_context(|| format!("cannot open input {}", input.display()))?;
    Ok(Box::new(BufReader::new(file)))
}

fn with_output<F>(output: &Path, run: F) -> anyhow::Result<Summary>
where
    F: FnOnce(&mut dyn Write) -> Result<Summary>,
{
    if output == Path::new(STDIO_PATH) {
        let mut stdout = BufWriter::new(io::stdout().lock());
        return Ok(run(&mut stdout)?);
    }

    let mut sink = AtomicOutput::create(output)
        .with_context(|| format!("cannot create output {}", output.display()))?;
    let summary = run(&mut sink)?;
    sink.commit()
        .with_context(|| format!("cannot write output {}", output.display()))?;
    Ok(summary)
}
