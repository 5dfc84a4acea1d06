//! AES-256 counter-mode generator with forced rekeying.
//!
//! # Reseeding Model
//!
//! A reseed replaces the key with `SHAd256(key || seed)` and advances the
//! counter, so a later key never reveals an earlier one.
//!
//! # Output Model
//!
//! Each request encrypts successive counter values, truncates the blocks to
//! the requested length, then consumes two further blocks as the next key.
//! Compromising the new key does not allow recomputing the bytes already
//! returned.

use crate::error::{GeneratorError, UsageError};
use crate::primitives::{CounterCipher, DoubleHasher, BLOCK_LEN, KEY_LEN};
use zeroize::{Zeroize, Zeroizing};

/// Largest request one key epoch may serve (1 MiB).
pub const MAX_REQUEST_BYTES: usize = 1 << 20;

/// Blocks consumed as the replacement key after each request.
const REKEY_BLOCKS: usize = KEY_LEN / BLOCK_LEN;

/// Fortuna generator state.
///
/// Starts with an all-zero key and counter 0. A counter of 0 means the
/// generator has never been reseeded and refuses to produce output.
///
/// # Security Model
///
/// - A `(key, counter)` pair produces output at most once
/// - The key is never exposed and is wiped when replaced or dropped
/// - Output size per key is capped at [`MAX_REQUEST_BYTES`]
pub struct Generator {
    /// Current AES-256 key.
    key: Zeroizing<[u8; KEY_LEN]>,
    /// Block counter, incremented for every block and every reseed.
    counter: u128,
}

impl Generator {
    /// Creates an unseeded generator.
    pub fn new() -> Self {
        Self {
            key: Zeroizing::new([0u8; KEY_LEN]),
            counter: 0,
        }
    }

    /// Mixes `seed` into the key and advances the counter.
    pub fn reseed(&mut self, seed: &[u8]) {
        let mut hasher = DoubleHasher::new();
        hasher.update(&self.key[..]);
        hasher.update(seed);
        let mut new_key = hasher.finalize();

        self.key.copy_from_slice(&new_key);
        new_key.zeroize();
        self.counter += 1;

        tracing::debug!(
            seed_len = seed.len(),
            counter = self.counter,
            "Generator reseeded"
        );
    }

    /// Encrypts the next `blocks` counter values.
    ///
    /// Fails with [`GeneratorError::NotSeeded`] before the first reseed.
    pub fn generate_blocks(&mut self, blocks: usize) -> Result<Vec<u8>, GeneratorError> {
        self.ensure_seeded()?;

        let cipher = CounterCipher::new(&self.key);
        let mut out = Vec::with_capacity(blocks * BLOCK_LEN);
        for _ in 0..blocks {
            out.extend_from_slice(&cipher.encrypt_counter(self.counter));
            self.counter += 1;
        }
        Ok(out)
    }

    /// Returns `nbytes` of keystream and rotates the key.
    ///
    /// `nbytes` may be anywhere in `0..=MAX_REQUEST_BYTES`; the key is
    /// replaced even for a zero-length request.
    pub fn pseudo_randomdata(&mut self, nbytes: usize) -> Result<Vec<u8>, GeneratorError> {
        if nbytes > MAX_REQUEST_BYTES {
            return Err(UsageError::RequestTooLarge {
                requested: nbytes,
                max: MAX_REQUEST_BYTES,
            }
            .into());
        }

        let mut out = self.generate_blocks(nbytes.div_ceil(BLOCK_LEN))?;
        out.truncate(nbytes);
        self.rekey()?;

        tracing::trace!(bytes = nbytes, counter = self.counter, "Generated keystream");

        Ok(out)
    }

    /// Returns true once at least one reseed has happened.
    pub fn is_seeded(&self) -> bool {
        self.counter > 0
    }

    /// Returns the current block counter.
    pub fn counter(&self) -> u128 {
        self.counter
    }

    /// Returns the current key (for tests only).
    #[cfg(test)]
    pub(crate) fn key_for_testing(&self) -> [u8; KEY_LEN] {
        *self.key
    }

    fn ensure_seeded(&self) -> Result<(), GeneratorError> {
        if self.is_seeded() {
            Ok(())
        } else {
            Err(GeneratorError::NotSeeded)
        }
    }

    fn rekey(&mut self) -> Result<(), GeneratorError> {
        let new_key = Zeroizing::new(self.generate_blocks(REKEY_BLOCKS)?);
        self.key.copy_from_slice(&new_key);
        Ok(())
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("counter", &self.counter)
            .finish_non_exhaustive()
    }
}
