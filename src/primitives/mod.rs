//! Cryptographic building blocks.
//!
//! The generator uses AES-256 purely as a keystream function over a
//! little-endian block counter, and a double SHA-256 to compress seed
//! material into key updates.

mod cipher;
mod hash;

pub use cipher::{CounterCipher, BLOCK_LEN, KEY_LEN};
pub use hash::{double_sha256, DoubleHasher, DIGEST_LEN};
