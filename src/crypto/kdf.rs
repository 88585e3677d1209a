use argon2::{Algorithm, Argon2, Block, Params, Version};
use serde::Serialize;
use zeroize::Zeroize;

use super::{KEY_LEN, SALT_LEN};
use crate::error::{Result, SaltedError};

/// Argon2id cost parameters stored in (or implied by) a file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Argon2Params {
    time_cost: u32,
    memory_cost_kib: u32,
    lanes: u8,
}

impl Default for Argon2Params {
    fn default() -> Self {
        // RFC 9106, first recommended option
        Self {
            time_cost: 1,
            memory_cost_kib: 2048 * 1024, // 2 GiB
            lanes: 4,
        }
    }
}

impl Argon2Params {
    /// Parameters implied by every version 1 header.
    pub const LEGACY: Self = Self {
        time_cost: 1,
        memory_cost_kib: 64 * 1024,
        lanes: 4,
    };

    pub fn new(time_cost: u32, memory_cost_kib: u32, lanes: u8) -> Result<Self> {
        let params = Self::from_raw(time_cost, memory_cost_kib, lanes);
        params.validate()?;
        Ok(params)
    }

    /// Builds parameters without validation; used by the header decoders,
    /// which defer validation to key derivation.
    pub(crate) const fn from_raw(time_cost: u32, memory_cost_kib: u32, lanes: u8) -> Self {
        Self {
            time_cost,
            memory_cost_kib,
            lanes,
        }
    }

    pub fn time_cost(&self) -> u32 {
        self.time_cost
    }

    pub fn memory_cost_kib(&self) -> u32 {
        self.memory_cost_kib
    }

    pub fn lanes(&self) -> u8 {
        self.lanes
    }

    pub fn validate(&self) -> Result<()> {
        if self.time_cost < 1 {
            return Err(SaltedError::InvalidParams(
                "time cost must be >= 1".into(),
            ));
        }
        if self.lanes < 1 {
            return Err(SaltedError::InvalidParams("lanes must be >= 1".into()));
        }
        if u64::from(self.memory_cost_kib) < 8 * u64::from(self.lanes) {
            return Err(SaltedError::InvalidParams(
                "memory cost must be at least 8 * lanes".into(),
            ));
        }
        Ok(())
    }
}

/// The two keys of one session. Wiped when dropped.
pub struct KeyMaterial {
    encryption_key: [u8; KEY_LEN],
    signing_key: [u8; KEY_LEN],
}

impl Drop for KeyMaterial {
    fn drop(&mut self) {
        self.encryption_key.zeroize();
        self.signing_key.zeroize();
    }
}

impl KeyMaterial {
    pub fn encryption_key(&self) -> &[u8; KEY_LEN] {
        &self.encryption_key
    }

    pub fn signing_key(&self) -> &[u8; KEY_LEN] {
        &self.signing_key
    }
}

/// Stretch `passphrase` into an encryption key and a signing key.
///
/// Argon2id (v0x13) produces 64 bytes: the first half is the encryption key,
/// the second half the signing key. The working memory is reserved up front
/// so that an oversized memory cost surfaces as [`SaltedError::Resource`]
/// instead of aborting the process.
pub fn derive_keys(
    passphrase: &[u8],
    salt: &[u8; SALT_LEN],
    params: Argon2Params,
) -> Result<KeyMaterial> {
    params.validate()?;

    let argon_params = Params::new(
        params.memory_cost_kib,
        params.time_cost,
        u32::from(params.lanes),
        Some(2 * KEY_LEN),
    )
    .map_err(|e| SaltedError::InvalidParams(e.to_string()))?;

    let mut blocks = reserve_blocks(argon_params.block_count(), params.memory_cost_kib)?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon_params);

    let mut okm = [0u8; 2 * KEY_LEN];
    argon2
        .hash_password_into_with_memory(passphrase, salt, &mut okm, &mut blocks)
        .map_err(|e| SaltedError::InvalidParams(e.to_string()))?;
    drop(blocks);

    let mut keys = KeyMaterial {
        encryption_key: [0u8; KEY_LEN],
        signing_key: [0u8; KEY_LEN],
    };
    keys.encryption_key.copy_from_slice(&okm[..KEY_LEN]);
    keys.signing_key.copy_from_slice(&okm[KEY_LEN..]);
    okm.zeroize();

    Ok(keys)
}

/// Allocates the Argon2 working memory without aborting on failure.
fn reserve_blocks(count: usize, kib: u32) -> Result<Vec<Block>> {
    let mut blocks: Vec<Block> = Vec::new();
    blocks
        .try_reserve_exact(count)
        .map_err(|_| SaltedError::Resource { kib })?;
    blocks.resize(count, Block::default());
    Ok(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> Argon2Params {
        Argon2Params::new(1, 64, 1).unwrap()
    }

    #[test]
    fn kdf_is_deterministic() {
        let salt = [42u8; 16];

        let k1 = derive_keys(b"password", &salt, cheap()).unwrap();
        let k2 = derive_keys(b"password", &salt, cheap()).unwrap();

        assert_eq!(k1.encryption_key(), k2.encryption_key());
        assert_eq!(k1.signing_key(), k2.signing_key());
    }

    #[test]
    fn encryption_and_signing_keys_differ() {
        let keys = derive_keys(b"pw", &[1u8; 16], cheap()).unwrap();
        assert_ne!(keys.encryption_key(), keys.signing_key());
    }

    #[test]
    fn kdf_params_affect_output() {
        let salt = [7u8; 16];

        let k1 = derive_keys(b"pw", &salt, Argon2Params::new(1, 64, 1).unwrap()).unwrap();
        let k2 = derive_keys(b"pw", &salt, Argon2Params::new(2, 64, 1).unwrap()).unwrap();

        assert_ne!(k1.encryption_key(), k2.encryption_key());
    }

    #[test]
    fn salt_affects_output() {
        let k1 = derive_keys(b"pw", &[1u8; 16], cheap()).unwrap();
        let k2 = derive_keys(b"pw", &[2u8; 16], cheap()).unwrap();

        assert_ne!(k1.encryption_key(), k2.encryption_key());
    }

    #[test]
    fn kdf_invalid_params_fail_gracefully() {
        assert!(Argon2Params::new(0, 64, 1).is_err());
        assert!(Argon2Params::new(1, 64, 0).is_err());
        assert!(Argon2Params::new(1, 8, 4).is_err());
    }

    #[test]
    fn unvalidated_params_are_rejected_at_derivation() {
        let params = Argon2Params::from_raw(1, 0, 4);
        let err = derive_keys(b"pw", &[0u8; 16], params).err().unwrap();
        assert!(matches!(err, SaltedError::InvalidParams(_)));
    }

    #[test]
    fn unallocatable_memory_is_a_resource_error() {
        let err = reserve_blocks(usize::MAX, u32::MAX).err().unwrap();

        assert!(matches!(err, SaltedError::Resource { kib: u32::MAX }));
        assert_eq!(err.kind(), crate::error::ErrorKind::Resource);
    }

    #[test]
    fn working_memory_matches_block_count() {
        let blocks = reserve_blocks(64, 64).unwrap();
        assert_eq!(blocks.len(), 64);
    }

    #[test]
    fn defaults_match_rfc_9106() {
        let params = Argon2Params::default();
        assert_eq!(params.time_cost(), 1);
        assert_eq!(params.memory_cost_kib(), 2 * 1024 * 1024);
        assert_eq!(params.lanes(), 4);
    }
}
