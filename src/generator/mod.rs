//! Keystream generator.
//!
//! This module provides the deterministic output stage: AES-256 over an
//! incrementing counter, rekeyed after every request.

mod keystream;

pub use keystream::{Generator, MAX_REQUEST_BYTES};
