//! Double SHA-256.
//!
//! `SHA-256(SHA-256(x))` compresses arbitrary-length pool contents and
//! seed material into a fixed 32-byte value.

use sha2::{Digest, Sha256};

/// Output size of the double hash in bytes.
pub const DIGEST_LEN: usize = 32;

/// Hashes `data` twice with SHA-256.
pub fn double_sha256(data: &[u8]) -> [u8; DIGEST_LEN] {
    let mut hasher = DoubleHasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Incremental double SHA-256 over several input pieces.
///
/// Used where the input is a concatenation (`key || seed`) so the pieces
/// never have to be copied into one buffer.
#[derive(Clone, Default)]
pub struct DoubleHasher {
    inner: Sha256,
}

impl DoubleHasher {
    /// Creates an empty hasher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Absorbs another piece of input.
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    /// Returns `SHA-256(SHA-256(input))`.
    pub fn finalize(self) -> [u8; DIGEST_LEN] {
        let first = self.inner.finalize();
        Sha256::digest(first).into()
    }
}
