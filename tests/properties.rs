use fortuna_rng::accumulator::pools_to_fold;
use fortuna_rng::{Accumulator, ManualClock, RecordingSink, NUM_POOLS};
use proptest::prelude::*;
use std::time::Duration;

proptest! {
    #[test]
    fn add_event_grows_only_target_pool(
        source in any::<u8>(),
        pool in 0..NUM_POOLS,
        data in proptest::collection::vec(any::<u8>(), 1..=32)
    ) {
        let mut acc = Accumulator::with_clock(ManualClock::new());
        acc.add_random_event(0, (pool + 1) % NUM_POOLS, &[0xFF]).unwrap();
        let before: Vec<usize> = (0..NUM_POOLS).map(|i| acc.pool_len(i).unwrap()).collect();

        acc.add_random_event(source, pool, &data).unwrap();

        for i in 0..NUM_POOLS {
            let expected = if i == pool { before[i] + data.len() + 2 } else { before[i] };
            prop_assert_eq!(acc.pool_len(i).unwrap(), expected);
        }
    }

    #[test]
    fn folded_pools_form_a_prefix(reseed_count in 1u64..) {
        let folded = pools_to_fold(reseed_count);
        prop_assert!(folded >= 1 && folded <= NUM_POOLS);
        for i in 0..folded {
            prop_assert_eq!(reseed_count % (1u64 << i), 0);
        }
        if folded < NUM_POOLS {
            prop_assert_ne!(reseed_count % (1u64 << folded), 0);
        }
    }

    #[test]
    fn output_has_requested_length(n in 0usize..4096) {
        let mut acc = Accumulator::with_clock(ManualClock::new());
        for pool in 0..NUM_POOLS {
            acc.add_random_event(3, pool, &[0x5A; 32]).unwrap();
            acc.add_random_event(3, pool, &[0xA5; 32]).unwrap();
        }
        prop_assert_eq!(acc.random_data(n).unwrap().len(), n);
    }

    #[test]
    fn reseeds_drain_exactly_the_folded_prefix(rounds in 1usize..24) {
        let clock = ManualClock::new();
        let recorder = RecordingSink::new();
        let mut acc = Accumulator::with_clock(clock.clone()).with_sink(recorder.clone());

        for _ in 0..rounds {
            for pool in 0..NUM_POOLS {
                acc.add_random_event(1, pool, &[0x33; 32]).unwrap();
                acc.add_random_event(1, pool, &[0x44; 32]).unwrap();
            }
            acc.random_data(0).unwrap();

            let (_, folded) = *recorder.reseeds().last().unwrap();
            for pool in 0..NUM_POOLS {
                prop_assert_eq!(acc.pool_len(pool).unwrap() == 0, pool < folded);
            }
            clock.advance(Duration::from_millis(101));
        }
    }
}
