//! Error taxonomy.
//!
//! Usage errors are caller bugs and are never coerced into valid input.
//! `NotSeeded` is recoverable: add entropy or load a seed file, then retry.
//! Seed-file errors separate the expected first-run case (`Empty`) from
//! corrupted or foreign state.

use thiserror::Error;

/// Out-of-range arguments supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    /// Pool index outside `0..32`.
    #[error("invalid pool index {pool} (must be 0-{max})")]
    InvalidPool {
        /// The rejected index.
        pool: usize,
        /// Largest valid index.
        max: usize,
    },
    /// Event payload outside `1..=32` bytes.
    #[error("invalid event length {len} (must be 1-32 bytes)")]
    InvalidEventLength {
        /// The rejected length.
        len: usize,
    },
    /// Output request larger than one key epoch may produce.
    #[error("request of {requested} bytes exceeds the {max} byte limit")]
    RequestTooLarge {
        /// The requested byte count.
        requested: usize,
        /// The per-request ceiling.
        max: usize,
    },
}

/// Errors raised by the generator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneratorError {
    /// No reseed has happened yet.
    #[error("generate error, PRNG not seeded yet")]
    NotSeeded,
    /// Invalid request size.
    #[error(transparent)]
    Usage(#[from] UsageError),
}

/// Errors raised while reading or rewriting the seed file.
#[derive(Debug, Error)]
pub enum SeedFileError {
    /// The stream holds no prior state (expected on first run).
    #[error("seed file is empty")]
    Empty,
    /// The stream holds something other than a 64-byte state blob.
    #[error("seed file size is {len} instead of 64")]
    InvalidLength {
        /// Observed stream length.
        len: u64,
    },
    /// A rewrite did not land at offset 0 (for example an append-mode
    /// file), so the previous blob is still in place.
    #[error("seed file write ended at offset {position} instead of {expected}; stream may be in append mode")]
    MisplacedWrite {
        /// Stream position after the write.
        position: u64,
        /// Position a write from offset 0 would end at.
        expected: u64,
    },
    /// No seed stream was attached to the accumulator.
    #[error("no seed file attached")]
    NotAttached,
    /// The underlying stream failed.
    #[error("seed file I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl SeedFileError {
    /// Returns true for the first-run case of a zero-length stream.
    pub fn is_empty(&self) -> bool {
        matches!(self, SeedFileError::Empty)
    }
}

/// Crate-level error returned by accumulator operations.
#[derive(Debug, Error)]
pub enum FortunaError {
    /// Caller passed out-of-range arguments.
    #[error(transparent)]
    Usage(#[from] UsageError),
    /// The generator has never been reseeded.
    #[error("generate error, PRNG not seeded yet")]
    NotSeeded,
    /// Seed-file validation or I/O failure.
    #[error(transparent)]
    SeedFile(#[from] SeedFileError),
}

impl From<GeneratorError> for FortunaError {
    fn from(err: GeneratorError) -> Self {
        match err {
            GeneratorError::NotSeeded => FortunaError::NotSeeded,
            GeneratorError::Usage(usage) => FortunaError::Usage(usage),
        }
    }
}

impl FortunaError {
    /// Returns true if the caller can recover by supplying entropy.
    pub fn is_not_seeded(&self) -> bool {
        matches!(self, FortunaError::NotSeeded)
    }
}
