//! Observability hook.
//!
//! The accumulator reports state transitions to an injected [`EventSink`]
//! instead of any process-wide state. Events carry sizes and counters only;
//! key material and generated bytes never leave the core.

use std::sync::{Arc, Mutex, PoisonError};

/// A state transition inside the accumulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FortunaEvent {
    /// An entropy event was appended to a pool.
    EventAdded {
        /// Source identifier supplied by the caller.
        source: u8,
        /// Pool index the event went to.
        pool: usize,
        /// Pool length after the append.
        pool_len: usize,
    },
    /// Pools `0..pools_folded` were folded into the generator key.
    Reseeded {
        /// Reseed counter after this reseed.
        reseed_count: u64,
        /// Number of pools folded (always a prefix).
        pools_folded: usize,
    },
    /// Output was produced for a caller.
    Generated {
        /// Bytes returned.
        bytes: usize,
        /// Generator counter after rekeying.
        counter: u128,
    },
    /// A 64-byte seed file was consumed into the generator.
    SeedFileLoaded,
    /// A fresh seed blob was written to the seed file.
    SeedFileWritten {
        /// Bytes written.
        bytes: usize,
    },
}

/// Receiver for [`FortunaEvent`]s.
pub trait EventSink: Send {
    /// Handles one event.
    fn record(&mut self, event: &FortunaEvent);
}

/// Forwards events to `tracing`. This is the default sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&mut self, event: &FortunaEvent) {
        match event {
            FortunaEvent::EventAdded {
                source,
                pool,
                pool_len,
            } => {
                tracing::trace!(source, pool, pool_len, "Added entropy event");
            }
            FortunaEvent::Reseeded {
                reseed_count,
                pools_folded,
            } => {
                tracing::info!(reseed_count, pools_folded, "Accumulator reseeded");
            }
            FortunaEvent::Generated { bytes, counter } => {
                tracing::debug!(bytes, counter = %counter, "Random data generated");
            }
            FortunaEvent::SeedFileLoaded => {
                tracing::info!("Seed file loaded into generator");
            }
            FortunaEvent::SeedFileWritten { bytes } => {
                tracing::debug!(bytes, "Seed file rewritten");
            }
        }
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&mut self, _event: &FortunaEvent) {}
}

/// Keeps every event in memory.
///
/// Clones share the same buffer, so a test can hand one clone to the
/// accumulator and inspect the other.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<FortunaEvent>>>,
}

impl RecordingSink {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything recorded so far.
    pub fn events(&self) -> Vec<FortunaEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns only the reseed events.
    pub fn reseeds(&self) -> Vec<(u64, usize)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                FortunaEvent::Reseeded {
                    reseed_count,
                    pools_folded,
                } => Some((reseed_count, pools_folded)),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn record(&mut self, event: &FortunaEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_shares_buffer() {
        let recorder = RecordingSink::new();
        let mut handle = recorder.clone();

        handle.record(&FortunaEvent::SeedFileLoaded);
        handle.record(&FortunaEvent::Reseeded {
            reseed_count: 4,
            pools_folded: 3,
        });

        assert_eq!(recorder.events().len(), 2);
        assert_eq!(recorder.reseeds(), vec![(4, 3)]);
    }

    #[test]
    fn test_null_and_tracing_sinks_accept_events() {
        let event = FortunaEvent::Generated {
            bytes: 32,
            counter: 5,
        };
        NullSink.record(&event);
        TracingSink.record(&event);
    }
}
