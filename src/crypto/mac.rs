use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::{KEY_LEN, MAC_LEN};

type HmacSha256 = Hmac<Sha256>;

/// Running HMAC-SHA-256 over every on-wire chunk of one file.
pub struct MacAccumulator {
    inner: HmacSha256,
}

impl MacAccumulator {
    pub fn new(signing_key: &[u8; KEY_LEN]) -> Self {
        Self {
            inner: HmacSha256::new_from_slice(signing_key).expect("HMAC can take key of any size"),
        }
    }

    pub fn update(&mut self, chunk: &[u8]) {
        self.inner.update(chunk);
    }

    pub fn finalize(self) -> [u8; MAC_LEN] {
        self.inner.finalize().into_bytes().into()
    }

    /// Constant-time comparison against the digest stored in a footer.
    pub fn verify(self, expected: &[u8; MAC_LEN]) -> bool {
        self.inner.verify_slice(expected).is_ok()
    }
}
