use thiserror::Error;

/// Broad classification of a [`SaltedError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad magic, version, padding or parameters in the header.
    Format,
    /// The stream as a whole does not verify (count, MAC, truncation).
    Corruption,
    /// A single chunk failed to open.
    Crypto,
    /// The underlying reader or writer failed.
    Io,
    /// Memory or randomness could not be obtained.
    Resource,
}

#[derive(Error, Debug)]
pub enum SaltedError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("header too short: {0} of 64 bytes")]
    ShortHeader(usize),

    #[error("invalid magic number {0:02x?}")]
    BadMagic([u8; 2]),

    #[error("unsupported format version {0}")]
    UnsupportedVersion(u16),

    #[error("corrupted v{version} header: non-zero padding at byte {offset}")]
    CorruptHeader { version: u16, offset: usize },

    #[error("invalid argon2 parameters: {0}")]
    InvalidParams(String),

    #[error("chunk count mismatch: footer declares {declared}, stream holds {actual}")]
    ChunkCountMismatch { declared: u64, actual: u64 },

    #[error("integrity check failed: file MAC does not match")]
    IntegrityFailure,

    #[error("stream truncated at chunk {chunk}")]
    Truncated { chunk: u64 },

    #[error("unexpected data after footer")]
    TrailingData,

    #[error("authentication failed at chunk {chunk}")]
    AuthenticationFailed { chunk: u64 },

    #[error("incorrect nonce at chunk {chunk}: expected {expected}, found {found}")]
    NonceMismatch {
        chunk: u64,
        expected: String,
        found: String,
    },

    #[error("invalid chunk size {size} at chunk {chunk} (max {max})")]
    InvalidChunkSize { chunk: u64, size: u32, max: usize },

    #[error("chunk encryption failed")]
    Encryption,

    #[error("key derivation needs {kib} KiB of memory which could not be allocated")]
    Resource { kib: u32 },

    #[error("OS random generator unavailable")]
    Random,
}

impl SaltedError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SaltedError::Io(_) => ErrorKind::Io,
            SaltedError::ShortHeader(_)
            | SaltedError::BadMagic(_)
            | SaltedError::UnsupportedVersion(_)
            | SaltedError::CorruptHeader { .. }
            | SaltedError::InvalidParams(_) => ErrorKind::Format,
            SaltedError::ChunkCountMismatch { .. }
            | SaltedError::IntegrityFailure
            | SaltedError::Truncated { .. }
            | SaltedError::TrailingData => ErrorKind::Corruption,
            SaltedError::AuthenticationFailed { .. }
            | SaltedError::NonceMismatch { .. }
            | SaltedError::InvalidChunkSize { .. }
            | SaltedError::Encryption => ErrorKind::Crypto,
            SaltedError::Resource { .. } | SaltedError::Random => ErrorKind::Resource,
        }
    }
}

pub type Result<T> = std::result::Result<T, SaltedError>;
