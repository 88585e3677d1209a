use chacha20poly1305::{
    Key, XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit, Payload},
};
use getrandom::fill;
use zeroize::Zeroizing;

use super::{CHUNK_LEN, CHUNK_PREFIX_LEN, KEY_LEN, MAX_PAYLOAD_LEN, NONCE_LEN};
use crate::error::{Result, SaltedError};

/// Fill an array with cryptographically secure random bytes
pub fn random_array<const N: usize>() -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    fill(&mut buf).map_err(|_| SaltedError::Random)?;
    Ok(buf)
}

/// Seal one chunk.
///
/// Layout: `nonce (24) | payload length (u32 LE) | ciphertext + tag (4068)`.
/// The payload is zero-filled to [`MAX_PAYLOAD_LEN`] before encryption so
/// every chunk has the same size; the 28-byte prefix is authenticated as
/// associated data.
pub fn seal_chunk(
    key: &[u8; KEY_LEN],
    nonce: &[u8; NONCE_LEN],
    plaintext: &[u8],
) -> Result<[u8; CHUNK_LEN]> {
    if plaintext.len() > MAX_PAYLOAD_LEN {
        return Err(SaltedError::Encryption);
    }

    let mut chunk = [0u8; CHUNK_LEN];
    chunk[..NONCE_LEN].copy_from_slice(nonce);
    chunk[NONCE_LEN..CHUNK_PREFIX_LEN].copy_from_slice(&(plaintext.len() as u32).to_le_bytes());

    let mut padded = Zeroizing::new([0u8; MAX_PAYLOAD_LEN]);
    padded[..plaintext.len()].copy_from_slice(plaintext);

    let cipher = XChaCha20Poly1305::new(Key::from_slice(key));
    let sealed = cipher
        .encrypt(
            XNonce::from_slice(nonce),
            Payload {
                msg: &padded[..],
                aad: &chunk[..CHUNK_PREFIX_LEN],
            },
        )
        .map_err(|_| SaltedError::Encryption)?;

    debug_assert_eq!(sealed.len(), CHUNK_LEN - CHUNK_PREFIX_LEN);
    chunk[CHUNK_PREFIX_LEN..].copy_from_slice(&sealed);
    Ok(chunk)
}

/// Open one chunk that is expected to carry `expected_nonce`.
///
/// `index` only feeds error context.
pub fn open_chunk(
    key: &[u8; KEY_LEN],
    expected_nonce: &[u8; NONCE_LEN],
    chunk: &[u8],
    index: u64,
) -> Result<Zeroizing<Vec<u8>>> {
    if chunk.len() != CHUNK_LEN {
        return Err(SaltedError::Truncated { chunk: index });
    }

    let (prefix, sealed) = chunk.split_at(CHUNK_PREFIX_LEN);
    let found = &prefix[..NONCE_LEN];
    if found != expected_nonce {
        return Err(SaltedError::NonceMismatch {
            chunk: index,
            expected: hex::encode(expected_nonce),
            found: hex::encode(found),
        });
    }

    let cipher = XChaCha20Poly1305::new(Key::from_slice(key));
    let mut plaintext = Zeroizing::new(
        cipher
            .decrypt(
                XNonce::from_slice(expected_nonce),
                Payload {
                    msg: sealed,
                    aad: prefix,
                },
            )
            .map_err(|_| SaltedError::AuthenticationFailed { chunk: index })?,
    );

    let mut len = [0u8; 4];
    len.copy_from_slice(&prefix[NONCE_LEN..]);
    let len = u32::from_le_bytes(len);
    if len as usize > MAX_PAYLOAD_LEN {
        return Err(SaltedError::InvalidChunkSize {
            chunk: index,
            size: len,
            max: MAX_PAYLOAD_LEN,
        });
    }

    plaintext.truncate(len as usize);
    Ok(plaintext)
}
