//! Entropy accumulation and reseed scheduling.
//!
//! The accumulator owns 32 pools and one generator. External sources
//! append events to pools; each output request first checks the reseed
//! policy, folds a prefix of the pools into the generator key when due,
//! and then draws keystream from the generator.

mod clock;
mod policy;
mod pool;

pub use clock::{Clock, ManualClock, SystemClock};
pub use policy::{pools_to_fold, ReseedPolicy};
pub use pool::{EntropyEvent, EntropyPool, PoolCursor, MAX_EVENT_LEN, NUM_POOLS};

use crate::error::{FortunaError, SeedFileError};
use crate::generator::Generator;
use crate::observe::{EventSink, FortunaEvent, TracingSink};
use crate::primitives::DIGEST_LEN;
use crate::seed_file::{SeedFileStore, SeedStream, SEED_FILE_LEN};
use std::time::Instant;
use zeroize::Zeroizing;

/// Seed stream type held by an accumulator.
pub type BoxedSeedStream = Box<dyn SeedStream>;

/// Fortuna accumulator.
///
/// Not internally synchronized: callers sharing one instance across
/// threads must serialize access themselves (for example behind a
/// `Mutex`).
pub struct Accumulator<C: Clock = SystemClock> {
    /// The 32 entropy pools.
    pools: [EntropyPool; NUM_POOLS],
    /// Reseeds performed; 0 means never seeded through the pools.
    reseed_count: u64,
    /// Time of the last pool reseed.
    last_reseed: Option<Instant>,
    /// Output stage.
    generator: Generator,
    /// Reseed thresholds.
    policy: ReseedPolicy,
    /// Time source for the throttle.
    clock: C,
    /// Observability hook.
    sink: Box<dyn EventSink>,
    /// Seed file, if one was attached.
    seed_file: Option<SeedFileStore<BoxedSeedStream>>,
}

impl Accumulator<SystemClock> {
    /// Creates an unseeded accumulator using the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for Accumulator<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Accumulator<C> {
    /// Creates an unseeded accumulator reading time from `clock`.
    pub fn with_clock(clock: C) -> Self {
        Self {
            pools: std::array::from_fn(|_| EntropyPool::new()),
            reseed_count: 0,
            last_reseed: None,
            generator: Generator::new(),
            policy: ReseedPolicy::default(),
            clock,
            sink: Box::new(TracingSink),
            seed_file: None,
        }
    }

    /// Replaces the reseed thresholds.
    pub fn with_policy(mut self, policy: ReseedPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replaces the event sink.
    pub fn with_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Attaches a seed stream and loads it.
    ///
    /// An empty stream is the normal first-run case: it is logged and the
    /// accumulator stays unseeded. A stream of the wrong size fails
    /// construction, and so does a failed rewrite of the consumed blob:
    /// the accumulator is dropped with the error, so output derived from a
    /// blob still on disk is never handed out.
    pub fn with_seed_file(mut self, stream: impl SeedStream + 'static) -> Result<Self, FortunaError> {
        let stream: BoxedSeedStream = Box::new(stream);
        self.seed_file = Some(SeedFileStore::new(stream));
        match self.update_seed_file() {
            Ok(()) => {}
            Err(FortunaError::SeedFile(SeedFileError::Empty)) => {
                tracing::info!("Given seed file is empty");
            }
            Err(e) => return Err(e),
        }
        Ok(self)
    }

    /// Appends an entropy event to pool `pool`.
    ///
    /// Rejects pool indices outside `0..32` and payloads outside 1-32
    /// bytes. No hashing happens here.
    pub fn add_random_event(&mut self, source: u8, pool: usize, data: &[u8]) -> Result<(), FortunaError> {
        let event = EntropyEvent::new(source, pool, data)?;
        let target = &mut self.pools[event.pool()];
        target.append(&event);

        let pool_len = target.len();
        self.sink.record(&FortunaEvent::EventAdded {
            source,
            pool,
            pool_len,
        });
        Ok(())
    }

    /// Returns `nbytes` of random data, reseeding first if due.
    ///
    /// Fails with [`FortunaError::NotSeeded`] until the first reseed and
    /// with a usage error if `nbytes` exceeds
    /// [`MAX_REQUEST_BYTES`](crate::MAX_REQUEST_BYTES).
    pub fn random_data(&mut self, nbytes: usize) -> Result<Vec<u8>, FortunaError> {
        self.reseed_if_due();

        let out = self.generator.pseudo_randomdata(nbytes)?;
        self.sink.record(&FortunaEvent::Generated {
            bytes: out.len(),
            counter: self.generator.counter(),
        });
        Ok(out)
    }

    /// Runs the reseed policy once. Returns true if a reseed happened.
    ///
    /// [`Accumulator::random_data`] calls this before every request;
    /// sources may also call it directly after feeding a batch of events.
    pub fn reseed_if_due(&mut self) -> bool {
        let now = self.clock.now();
        if !self.policy.is_due(self.pools[0].len(), self.last_reseed, now) {
            return false;
        }

        self.reseed_count += 1;
        let folded = pools_to_fold(self.reseed_count);

        let mut seed = Zeroizing::new(Vec::with_capacity(folded * DIGEST_LEN));
        for pool in &mut self.pools[..folded] {
            seed.extend_from_slice(&pool.drain_digest());
        }
        self.generator.reseed(&seed);
        self.last_reseed = Some(now);

        self.sink.record(&FortunaEvent::Reseeded {
            reseed_count: self.reseed_count,
            pools_folded: folded,
        });
        true
    }

    /// Reloads the attached seed file into the generator and rewrites it.
    ///
    /// An error after the reload means the blob may still be on disk and a
    /// restart would reproduce the current generator state; treat it as
    /// fatal and discard the accumulator.
    pub fn update_seed_file(&mut self) -> Result<(), FortunaError> {
        let store = self.seed_file.as_mut().ok_or(SeedFileError::NotAttached)?;
        store.update_seed_file(&mut self.generator)?;

        self.sink.record(&FortunaEvent::SeedFileLoaded);
        self.sink.record(&FortunaEvent::SeedFileWritten {
            bytes: SEED_FILE_LEN,
        });
        Ok(())
    }

    /// Overwrites the attached seed file with fresh generator output.
    pub fn write_seed_file(&mut self) -> Result<(), FortunaError> {
        let store = self.seed_file.as_mut().ok_or(SeedFileError::NotAttached)?;
        store.write_seed_file(&mut self.generator)?;

        self.sink.record(&FortunaEvent::SeedFileWritten {
            bytes: SEED_FILE_LEN,
        });
        Ok(())
    }

    /// Detaches and returns the seed stream, if any.
    pub fn take_seed_file(&mut self) -> Option<BoxedSeedStream> {
        self.seed_file.take().map(SeedFileStore::into_inner)
    }

    /// Returns true once the generator has been seeded.
    pub fn is_seeded(&self) -> bool {
        self.generator.is_seeded()
    }

    /// Returns the number of pool reseeds performed.
    pub fn reseed_count(&self) -> u64 {
        self.reseed_count
    }

    /// Returns the size of pool `pool` in bytes, or `None` if out of range.
    pub fn pool_len(&self, pool: usize) -> Option<usize> {
        self.pools.get(pool).map(EntropyPool::len)
    }

    /// Returns all pools (for inspection and display).
    pub fn pools(&self) -> &[EntropyPool; NUM_POOLS] {
        &self.pools
    }

    /// Returns the generator.
    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    /// Returns the active reseed policy.
    pub fn policy(&self) -> &ReseedPolicy {
        &self.policy
    }
}

impl<C: Clock> std::fmt::Debug for Accumulator<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Accumulator")
            .field("reseed_count", &self.reseed_count)
            .field("generator", &self.generator)
            .field("policy", &self.policy)
            .field("has_seed_file", &self.seed_file.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observe::RecordingSink;
    use std::io::Cursor;
    use std::time::Duration;

    fn manual() -> (Accumulator<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        (Accumulator::with_clock(clock.clone()), clock)
    }

    fn fill_all_pools(acc: &mut Accumulator<impl Clock>, rounds: usize) {
        for _ in 0..rounds {
            for pool in 0..NUM_POOLS {
                acc.add_random_event(42, pool, &[b'X'; 32]).unwrap();
            }
        }
    }

    #[test]
    fn test_golden_vector() {
        let (mut acc, _clock) = manual();

        assert!(acc.random_data(1).unwrap_err().is_not_seeded());

        fill_all_pools(&mut acc, 1);
        for pool in 0..NUM_POOLS {
            assert_eq!(acc.pool_len(pool), Some(34));
        }
        // 34 bytes in pool 0 is below the threshold
        assert!(acc.random_data(1).unwrap_err().is_not_seeded());

        fill_all_pools(&mut acc, 1);
        assert_eq!(acc.generator().counter(), 0);

        let out = acc.random_data(32).unwrap();

        assert_eq!(hex::encode(&out[..16]), "b7b86bd9a27d96d7bb4add1b6b10d157");
        assert_eq!(hex::encode(&out[16..]), "2350b1c61253db2f8da233be726dc15f");
        assert_eq!(acc.generator().counter(), 5);
        assert_eq!(
            hex::encode(acc.generator().key_for_testing()),
            "f23ad749f33066ff53d307914fbf5b21da9667c7e86ba247655c9490e9d94a7c"
        );
        assert_eq!(acc.reseed_count(), 1);
        assert_eq!(acc.pool_len(0), Some(0));
        assert_eq!(acc.pool_len(1), Some(68));
    }

    #[test]
    fn test_add_event_only_touches_target_pool() {
        let (mut acc, _clock) = manual();
        acc.add_random_event(0, 7, &[1, 2, 3]).unwrap();

        for pool in 0..NUM_POOLS {
            let expected = if pool == 7 { 5 } else { 0 };
            assert_eq!(acc.pool_len(pool), Some(expected));
        }
    }

    #[test]
    fn test_invalid_events_rejected() {
        let (mut acc, _clock) = manual();
        assert!(matches!(
            acc.add_random_event(0, 32, &[1]),
            Err(FortunaError::Usage(_))
        ));
        assert!(matches!(
            acc.add_random_event(0, 0, &[]),
            Err(FortunaError::Usage(_))
        ));
        assert!(matches!(
            acc.add_random_event(0, 0, &[0; 33]),
            Err(FortunaError::Usage(_))
        ));
        assert!(acc.pools().iter().all(EntropyPool::is_empty));
    }

    #[test]
    fn test_reseed_throttled_by_interval() {
        let (mut acc, clock) = manual();
        fill_all_pools(&mut acc, 2);
        acc.random_data(16).unwrap();
        assert_eq!(acc.reseed_count(), 1);

        fill_all_pools(&mut acc, 2);
        clock.advance(Duration::from_millis(50));
        acc.random_data(16).unwrap();
        assert_eq!(acc.reseed_count(), 1);

        clock.advance(Duration::from_millis(60));
        acc.random_data(16).unwrap();
        assert_eq!(acc.reseed_count(), 2);
    }

    #[test]
    fn test_staggered_fold_schedule() {
        let recorder = RecordingSink::new();
        let clock = ManualClock::new();
        let mut acc = Accumulator::with_clock(clock.clone()).with_sink(recorder.clone());

        for _ in 0..8 {
            fill_all_pools(&mut acc, 2);
            acc.random_data(0).unwrap();
            clock.advance(Duration::from_millis(101));
        }

        let folded: Vec<usize> = recorder.reseeds().into_iter().map(|(_, n)| n).collect();
        assert_eq!(folded, vec![1, 2, 1, 3, 1, 2, 1, 4]);

        let counts: Vec<u64> = recorder.reseeds().into_iter().map(|(c, _)| c).collect();
        assert_eq!(counts, (1..=8).collect::<Vec<u64>>());

        // pool 3 was folded once (reseed 8); pool 4 never
        assert_eq!(acc.pools()[3].total_drains(), 1);
        assert_eq!(acc.pools()[4].total_drains(), 0);
        assert_eq!(acc.pool_len(4), Some(68 * 8));
    }

    #[test]
    fn test_consecutive_outputs_differ() {
        let (mut acc, _clock) = manual();
        fill_all_pools(&mut acc, 2);

        let a = acc.random_data(32).unwrap();
        let b = acc.random_data(32).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_request_limit() {
        let (mut acc, _clock) = manual();
        fill_all_pools(&mut acc, 2);

        assert_eq!(acc.random_data(1 << 20).unwrap().len(), 1 << 20);
        assert!(matches!(
            acc.random_data((1 << 20) + 1),
            Err(FortunaError::Usage(_))
        ));
    }

    #[test]
    fn test_seed_file_loaded_at_construction() {
        let acc = Accumulator::with_clock(ManualClock::new())
            .with_seed_file(Cursor::new(vec![0u8; SEED_FILE_LEN]))
            .unwrap();

        assert!(acc.is_seeded());
        // a seed file does not count as a pool reseed
        assert_eq!(acc.reseed_count(), 0);
    }

    #[test]
    fn test_empty_seed_file_is_not_fatal() {
        let mut acc = Accumulator::with_clock(ManualClock::new())
            .with_seed_file(Cursor::new(Vec::new()))
            .unwrap();

        assert!(!acc.is_seeded());
        assert!(acc.random_data(8).unwrap_err().is_not_seeded());
    }

    #[test]
    fn test_corrupt_seed_file_fails_construction() {
        let result = Accumulator::with_clock(ManualClock::new())
            .with_seed_file(Cursor::new(vec![0u8; 10]));

        assert!(matches!(
            result,
            Err(FortunaError::SeedFile(SeedFileError::InvalidLength { len: 10 }))
        ));
    }

    #[test]
    fn test_seed_file_operations_require_attachment() {
        let (mut acc, _clock) = manual();
        assert!(matches!(
            acc.update_seed_file(),
            Err(FortunaError::SeedFile(SeedFileError::NotAttached))
        ));
        assert!(matches!(
            acc.write_seed_file(),
            Err(FortunaError::SeedFile(SeedFileError::NotAttached))
        ));
    }

    #[test]
    fn test_write_seed_file_keeps_64_bytes() {
        let mut acc = Accumulator::with_clock(ManualClock::new())
            .with_seed_file(Cursor::new(vec![7u8; SEED_FILE_LEN]))
            .unwrap();

        acc.write_seed_file().unwrap();
        acc.write_seed_file().unwrap();

        let mut stream = acc.take_seed_file().unwrap();
        let mut contents = Vec::new();
        std::io::Seek::rewind(&mut stream).unwrap();
        std::io::Read::read_to_end(&mut stream, &mut contents).unwrap();
        assert_eq!(contents.len(), SEED_FILE_LEN);
        assert_ne!(contents, vec![7u8; SEED_FILE_LEN]);
    }
}
