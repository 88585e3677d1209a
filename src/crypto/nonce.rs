use super::NONCE_LEN;

const COUNTER_OFFSET: usize = NONCE_LEN - 8;

/// Per-file nonce sequence.
///
/// Starts at the random nonce base from the header; the trailing 8 bytes are
/// treated as a little-endian counter and bumped once per chunk. Encryption
/// and decryption advance it in lockstep.
#[derive(Debug, Clone)]
pub struct NonceCounter {
    current: [u8; NONCE_LEN],
}

impl NonceCounter {
    pub fn new(base: [u8; NONCE_LEN]) -> Self {
        Self { current: base }
    }

    /// The nonce the next call to [`next`](Self::next) will hand out.
    pub fn peek(&self) -> &[u8; NONCE_LEN] {
        &self.current
    }

    /// Returns the current nonce and advances the counter.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> [u8; NONCE_LEN] {
        let nonce = self.current;

        let mut ctr = [0u8; 8];
        ctr.copy_from_slice(&self.current[COUNTER_OFFSET..]);
        let ctr = u64::from_le_bytes(ctr).wrapping_add(1);
        self.current[COUNTER_OFFSET..].copy_from_slice(&ctr.to_le_bytes());

        nonce
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_nonce_is_the_base() {
        let base = [9u8; NONCE_LEN];
        let mut seq = NonceCounter::new(base);
        assert_eq!(seq.next(), base);
    }

    #[test]
    fn increments_trailing_little_endian_counter() {
        let mut seq = NonceCounter::new([0u8; NONCE_LEN]);
        seq.next();
        let second = seq.next();

        assert_eq!(second[COUNTER_OFFSET], 1);
        assert!(second[..COUNTER_OFFSET].iter().all(|b| *b == 0));
        assert_eq!(seq.peek()[COUNTER_OFFSET], 2);
    }

    #[test]
    fn carry_stays_within_counter() {
        let mut base = [0u8; NONCE_LEN];
        base[COUNTER_OFFSET] = 0xff;
        base[COUNTER_OFFSET - 1] = 0xaa;

        let mut seq = NonceCounter::new(base);
        seq.next();

        let next = seq.peek();
        assert_eq!(next[COUNTER_OFFSET], 0x00);
        assert_eq!(next[COUNTER_OFFSET + 1], 0x01);
        assert_eq!(next[COUNTER_OFFSET - 1], 0xaa);
    }

    #[test]
    fn counter_wraps_without_touching_prefix() {
        let mut base = [0xffu8; NONCE_LEN];
        base[0] = 0x11;

        let mut seq = NonceCounter::new(base);
        seq.next();

        let next = seq.peek();
        assert_eq!(next[0], 0x11);
        assert!(next[COUNTER_OFFSET..].iter().all(|b| *b == 0));
    }
}
