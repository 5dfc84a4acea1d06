//! AES-256 keystream block function.

use aes::cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit};
use aes::Aes256;

/// Cipher key size in bytes.
pub const KEY_LEN: usize = 32;

/// Cipher block size in bytes.
pub const BLOCK_LEN: usize = 16;

/// AES-256 keyed once and used to encrypt counter values.
///
/// The key schedule is computed in [`CounterCipher::new`], so a generator
/// producing many blocks under one key pays for it once per request.
pub struct CounterCipher {
    inner: Aes256,
}

impl CounterCipher {
    /// Expands `key` into an AES-256 key schedule.
    pub fn new(key: &[u8; KEY_LEN]) -> Self {
        Self {
            inner: Aes256::new(GenericArray::from_slice(key)),
        }
    }

    /// Encrypts the 16-byte little-endian encoding of `counter`.
    pub fn encrypt_counter(&self, counter: u128) -> [u8; BLOCK_LEN] {
        let mut block = GenericArray::from(counter.to_le_bytes());
        self.inner.encrypt_block(&mut block);
        let mut out = [0u8; BLOCK_LEN];
        out.copy_from_slice(&block);
        out
    }
}

impl std::fmt::Debug for CounterCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CounterCipher").finish_non_exhaustive()
    }
}
