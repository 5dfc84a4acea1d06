//! Seed-file persistence.
//!
//! The seed file carries generator state across restarts. It holds either
//! nothing (first run) or exactly one 64-byte blob; anything else is
//! corrupted or foreign state and is reported, never repaired. Every read
//! and write starts at offset 0, and a consumed blob is overwritten
//! immediately so the same state is never replayed.

use crate::error::{FortunaError, SeedFileError};
use crate::generator::Generator;
use std::fs::{File, OpenOptions};
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;
use zeroize::Zeroizing;

/// Size of a valid seed file in bytes.
pub const SEED_FILE_LEN: usize = 64;

/// A seekable byte stream that can also be cut to length.
///
/// Truncation keeps the stream at exactly 64 bytes after a rewrite even if
/// it previously held something longer.
pub trait SeedStream: Read + Write + Seek + Send {
    /// Resizes the stream to `len` bytes.
    fn set_len(&mut self, len: u64) -> io::Result<()>;
}

impl SeedStream for File {
    fn set_len(&mut self, len: u64) -> io::Result<()> {
        File::set_len(self, len)
    }
}

impl SeedStream for Cursor<Vec<u8>> {
    fn set_len(&mut self, len: u64) -> io::Result<()> {
        let len = usize::try_from(len)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "length overflows usize"))?;
        self.get_mut().resize(len, 0);
        Ok(())
    }
}

impl<T: SeedStream + ?Sized> SeedStream for Box<T> {
    fn set_len(&mut self, len: u64) -> io::Result<()> {
        (**self).set_len(len)
    }
}

/// Reads and rewrites the 64-byte seed blob on an owned stream.
///
/// The store does not decide when to run; the owner of the stream calls
/// [`SeedFileStore::update_seed_file`] at startup and
/// [`SeedFileStore::write_seed_file`] at clean shutdown.
pub struct SeedFileStore<S> {
    stream: S,
}

impl SeedFileStore<File> {
    /// Opens (creating if missing) a seed file for reading and writing.
    ///
    /// The file is opened without append mode so writes land at offset 0.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SeedFileError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path.as_ref())?;
        tracing::debug!(path = %path.as_ref().display(), "Opened seed file");
        Ok(Self::new(file))
    }
}

impl<S: SeedStream> SeedFileStore<S> {
    /// Wraps an already-open stream.
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    /// Reads and validates the stored blob.
    ///
    /// The length is measured by seeking to the end before anything is
    /// read, so an oversized foreign file is rejected without loading it.
    pub fn read_state(&mut self) -> Result<Zeroizing<Vec<u8>>, SeedFileError> {
        let len = self.stream.seek(SeekFrom::End(0))?;
        if len == 0 {
            return Err(SeedFileError::Empty);
        }
        if len != SEED_FILE_LEN as u64 {
            tracing::warn!(len, "Seed file has unexpected size");
            return Err(SeedFileError::InvalidLength { len });
        }

        self.stream.seek(SeekFrom::Start(0))?;
        let mut contents = Zeroizing::new(vec![0u8; SEED_FILE_LEN]);
        self.stream.read_exact(&mut contents)?;
        Ok(contents)
    }

    /// Replaces the stream contents with `blob`.
    ///
    /// Fails with [`SeedFileError::MisplacedWrite`] if the bytes did not
    /// land at offset 0, as happens with a file opened in append mode. The
    /// stream is not truncated in that case, so the stale blob it still
    /// holds fails validation on the next load instead of being replayed.
    pub fn write_state(&mut self, blob: &[u8]) -> Result<(), SeedFileError> {
        self.stream.seek(SeekFrom::Start(0))?;
        self.stream.write_all(blob)?;

        let expected = blob.len() as u64;
        let position = self.stream.stream_position()?;
        if position != expected {
            tracing::warn!(position, expected, "Seed file write did not start at offset 0");
            return Err(SeedFileError::MisplacedWrite { position, expected });
        }

        self.stream.set_len(expected)?;
        self.stream.flush()?;
        Ok(())
    }

    /// Reseeds `generator` from the stored blob, then overwrites it.
    ///
    /// An empty stream yields [`SeedFileError::Empty`] and leaves the
    /// generator untouched.
    ///
    /// If the rewrite fails, the generator has already been reseeded from a
    /// blob that is still stored, and a restart would reproduce its state.
    /// The generator must then be discarded rather than used for output.
    pub fn update_seed_file(&mut self, generator: &mut Generator) -> Result<(), FortunaError> {
        let contents = self.read_state()?;
        generator.reseed(&contents);
        self.write_seed_file(generator)
    }

    /// Overwrites the stream with 64 fresh bytes from `generator`.
    ///
    /// Fails with [`FortunaError::NotSeeded`] without touching the stream
    /// if the generator has never been seeded.
    pub fn write_seed_file(&mut self, generator: &mut Generator) -> Result<(), FortunaError> {
        let blob = Zeroizing::new(generator.pseudo_randomdata(SEED_FILE_LEN)?);
        self.write_state(&blob)?;
        Ok(())
    }

    /// Returns a reference to the underlying stream.
    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Consumes the store, returning the stream.
    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S> std::fmt::Debug for SeedFileStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedFileStore").finish_non_exhaustive()
    }
}
