//! Fortuna CSPRNG Library
//!
//! An implementation of the Fortuna design: an entropy accumulator with
//! 32 pools feeding a deterministic AES-256 counter-mode generator, plus a
//! seed-file protocol that carries generator state across restarts.
//!
//! # Architecture
//!
//! The system follows an explicit data flow:
//!
//! ```text
//! entropy sources → pools → (reseed policy) → generator → caller
//!                                  ↑               ↓
//!                           seed file (64 bytes, read at start, rewritten)
//! ```
//!
//! # Design Principles
//!
//! - **Fail-closed**: an unseeded generator never produces output
//! - **Forward secrecy**: the generator rekeys after every request
//! - **Staggered pool decay**: pool `i` is folded every `2^i` reseeds
//! - **Strict seed files**: exactly 0 or 64 bytes, never repaired
//!
//! # Example
//!
//! ```
//! use fortuna_rng::{Accumulator, FortunaError};
//!
//! let mut fortuna = Accumulator::new();
//! assert!(matches!(fortuna.random_data(16), Err(FortunaError::NotSeeded)));
//!
//! // Pool 0 needs 64 bytes before the first reseed.
//! for pool in 0..32 {
//!     fortuna.add_random_event(7, pool, &[0xA5; 32]).unwrap();
//!     fortuna.add_random_event(7, pool, &[0x5A; 32]).unwrap();
//! }
//!
//! let bytes = fortuna.random_data(16).unwrap();
//! assert_eq!(bytes.len(), 16);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod accumulator;
pub mod config;
pub mod error;
pub mod generator;
pub mod observe;
pub mod primitives;
pub mod seed_file;

// Re-export commonly used types at crate root
pub use accumulator::{
    Accumulator, Clock, EntropyEvent, EntropyPool, ManualClock, PoolCursor, ReseedPolicy,
    SystemClock, NUM_POOLS,
};
pub use config::{ConfigError, FortunaConfig};
pub use error::{FortunaError, GeneratorError, SeedFileError, UsageError};
pub use generator::{Generator, MAX_REQUEST_BYTES};
pub use observe::{EventSink, FortunaEvent, NullSink, RecordingSink, TracingSink};
pub use seed_file::{SeedFileStore, SeedStream, SEED_FILE_LEN};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
