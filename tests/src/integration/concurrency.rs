//! At-most-once issuance under contention.
//!
//! The lock arena is the only thing standing between concurrent callers and
//! a duplicated freshness value, so these tests hammer it from plain OS
//! threads the way multiple server connections would.

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    use fvm_core::FreshnessApi;
    use fvm_types::{SignalId, SignalRole, Verdict};

    use crate::integration::{build_manager, signal_config};

    #[test]
    fn test_no_value_issued_twice_across_threads() {
        let manager = build_manager(
            &[(SignalId(1), signal_config(SignalRole::Transmit))],
            &[],
        );

        let threads = 8;
        let per_thread = 50;
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let manager = Arc::clone(&manager);
                thread::spawn(move || {
                    (0..per_thread)
                        .map(|_| {
                            manager
                                .get_freshness_for_transmit(SignalId(1))
                                .unwrap()
                                .full_value
                        })
                        .collect::<Vec<u64>>()
                })
            })
            .collect();

        let mut all: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();

        let unique: HashSet<u64> = all.iter().copied().collect();
        assert_eq!(unique.len(), all.len(), "a freshness value was issued twice");

        all.sort_unstable();
        let expected: Vec<u64> = (1..=(threads * per_thread) as u64).collect();
        assert_eq!(all, expected, "issuance skipped or repeated a value");
    }

    #[test]
    fn test_contended_signals_do_not_cross_talk() {
        let manager = build_manager(
            &[
                (SignalId(1), signal_config(SignalRole::Transmit)),
                (SignalId(2), signal_config(SignalRole::Transmit)),
            ],
            &[],
        );

        let handles: Vec<_> = [SignalId(1), SignalId(2), SignalId(1), SignalId(2)]
            .into_iter()
            .map(|id| {
                let manager = Arc::clone(&manager);
                thread::spawn(move || {
                    for _ in 0..100 {
                        manager.get_freshness_for_transmit(id).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        // each signal saw exactly its own 200 issuances
        assert_eq!(manager.sync_status(SignalId(1)).unwrap().last_value, Some(200));
        assert_eq!(manager.sync_status(SignalId(2)).unwrap().last_value, Some(200));
    }

    #[test]
    fn test_concurrent_validations_accept_each_value_once() {
        let manager = build_manager(
            &[(SignalId(1), signal_config(SignalRole::Receive))],
            &[(SignalId(1), 0)],
        );

        // four threads race to validate the same stream of truncated values;
        // every value must be accepted by exactly one of them
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let manager = Arc::clone(&manager);
                thread::spawn(move || {
                    let mut accepted = 0u64;
                    for value in 1..=100u64 {
                        let verdict = manager
                            .verify_freshness_on_receive(SignalId(1), value & 0xFF)
                            .unwrap();
                        if let Verdict::Accepted { .. } = verdict {
                            accepted += 1;
                        }
                    }
                    accepted
                })
            })
            .collect();

        let total: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total, 100, "each value must be accepted exactly once");
        assert_eq!(manager.sync_status(SignalId(1)).unwrap().last_value, Some(100));
    }
}
