//! End-to-end freshness flows through the manager API.
//!
//! Covers the transmit and receive paths a pair of ECUs would exercise: a
//! sender draining its counter, a receiver reconstructing truncated values,
//! drift past the window, and recovery through an authorized reset.

#[cfg(test)]
mod tests {
    use fvm_core::FreshnessApi;
    use fvm_types::{FvmError, RejectReason, SignalId, SignalRole, SyncState, Verdict};

    use crate::integration::{build_manager, signal_config, RESET_TOKEN};

    #[test]
    fn test_transmit_sequence_is_strictly_incrementing() {
        let manager = build_manager(
            &[(SignalId(1), signal_config(SignalRole::Transmit))],
            &[],
        );

        for expected in 1..=20u64 {
            let issued = manager.get_freshness_for_transmit(SignalId(1)).unwrap();
            assert_eq!(issued.full_value, expected);
            assert_eq!(issued.truncated, expected & 0xFF);
        }
    }

    #[test]
    fn test_receiver_reconstructs_across_truncation_wrap() {
        // last accepted 250; wire carries 2; the only candidate >= 251
        // congruent to 2 mod 256 is 258, distance 8, inside the window.
        let manager = build_manager(
            &[(SignalId(1), signal_config(SignalRole::Receive))],
            &[(SignalId(1), 250)],
        );

        let verdict = manager.verify_freshness_on_receive(SignalId(1), 2).unwrap();
        assert_eq!(verdict, Verdict::Accepted { full_value: 258 });
    }

    #[test]
    fn test_accepted_value_replayed_is_always_stale() {
        let manager = build_manager(
            &[(SignalId(1), signal_config(SignalRole::Receive))],
            &[(SignalId(1), 100)],
        );

        assert!(manager
            .verify_freshness_on_receive(SignalId(1), 110)
            .unwrap()
            .is_accepted());

        for _ in 0..3 {
            let verdict = manager.verify_freshness_on_receive(SignalId(1), 110).unwrap();
            assert_eq!(
                verdict,
                Verdict::Rejected {
                    reason: RejectReason::Stale
                }
            );
        }
        // the counter is still synchronized and newer values still flow
        assert!(manager
            .verify_freshness_on_receive(SignalId(1), 111)
            .unwrap()
            .is_accepted());
    }

    #[test]
    fn test_drift_past_window_locks_until_authorized_reset() {
        // last accepted 100, T = 8, window = 16: truncated 130 yields
        // candidates 130 (distance 30) and 386 (distance 286), both outside.
        let manager = build_manager(
            &[(SignalId(1), signal_config(SignalRole::Receive))],
            &[(SignalId(1), 100)],
        );

        let verdict = manager.verify_freshness_on_receive(SignalId(1), 130).unwrap();
        assert_eq!(
            verdict,
            Verdict::Rejected {
                reason: RejectReason::OutOfWindow
            }
        );
        assert_eq!(
            manager.sync_status(SignalId(1)).unwrap().sync_state,
            Some(SyncState::OutOfWindow)
        );

        // everything is rejected now, even values that would have been fine
        let verdict = manager.verify_freshness_on_receive(SignalId(1), 101).unwrap();
        assert_eq!(
            verdict,
            Verdict::Rejected {
                reason: RejectReason::OutOfWindow
            }
        );

        // an unauthorized reset does not recover the counter
        let err = manager
            .reset_signal(SignalId(1), 384, b"guessed_token")
            .unwrap_err();
        assert_eq!(err, FvmError::Unauthorized);

        // the authorized reset does
        manager.reset_signal(SignalId(1), 384, RESET_TOKEN).unwrap();
        let verdict = manager.verify_freshness_on_receive(SignalId(1), 130).unwrap();
        assert_eq!(verdict, Verdict::Accepted { full_value: 386 });
    }

    #[test]
    fn test_unsynchronized_receiver_bootstraps_from_first_value() {
        let manager = build_manager(
            &[(SignalId(1), signal_config(SignalRole::Receive))],
            &[],
        );
        assert_eq!(
            manager.sync_status(SignalId(1)).unwrap().sync_state,
            Some(SyncState::Unsynchronized)
        );

        let verdict = manager.verify_freshness_on_receive(SignalId(1), 37).unwrap();
        assert_eq!(verdict, Verdict::Accepted { full_value: 37 });

        // the bootstrap value itself cannot be replayed
        let verdict = manager.verify_freshness_on_receive(SignalId(1), 37).unwrap();
        assert_eq!(
            verdict,
            Verdict::Rejected {
                reason: RejectReason::Stale
            }
        );
    }

    #[test]
    fn test_role_and_identity_errors() {
        let manager = build_manager(
            &[
                (SignalId(1), signal_config(SignalRole::Transmit)),
                (SignalId(2), signal_config(SignalRole::Receive)),
            ],
            &[],
        );

        assert_eq!(
            manager.get_freshness_for_transmit(SignalId(9)).unwrap_err(),
            FvmError::UnknownSignal(SignalId(9))
        );
        assert!(matches!(
            manager.get_freshness_for_transmit(SignalId(2)),
            Err(FvmError::RoleMismatch { .. })
        ));
        assert!(matches!(
            manager.verify_freshness_on_receive(SignalId(1), 5),
            Err(FvmError::RoleMismatch { .. })
        ));
        // validate input wider than T bits
        assert!(matches!(
            manager.verify_freshness_on_receive(SignalId(2), 300),
            Err(FvmError::TruncationMismatch { .. })
        ));
    }

    #[test]
    fn test_signals_are_independent() {
        let manager = build_manager(
            &[
                (SignalId(1), signal_config(SignalRole::Transmit)),
                (SignalId(2), signal_config(SignalRole::Transmit)),
            ],
            &[(SignalId(2), 500)],
        );

        assert_eq!(
            manager.get_freshness_for_transmit(SignalId(1)).unwrap().full_value,
            1
        );
        assert_eq!(
            manager.get_freshness_for_transmit(SignalId(2)).unwrap().full_value,
            501
        );
        assert_eq!(
            manager.get_freshness_for_transmit(SignalId(1)).unwrap().full_value,
            2
        );
    }

    #[test]
    fn test_diagnostics_reflect_the_whole_session() {
        let manager = build_manager(
            &[
                (SignalId(1), signal_config(SignalRole::Transmit)),
                (SignalId(2), signal_config(SignalRole::Receive)),
            ],
            &[(SignalId(2), 100)],
        );

        manager.get_freshness_for_transmit(SignalId(1)).unwrap();
        manager.verify_freshness_on_receive(SignalId(2), 105).unwrap();
        manager.verify_freshness_on_receive(SignalId(2), 105).unwrap();
        manager.verify_freshness_on_receive(SignalId(2), 200).unwrap();
        manager.reset_signal(SignalId(2), 500, RESET_TOKEN).unwrap();

        let diag = manager.diagnostics();
        assert_eq!(diag.issued, 1);
        assert_eq!(diag.accepted, 1);
        assert_eq!(diag.rejected_stale, 1);
        assert_eq!(diag.rejected_out_of_window, 1);
        assert_eq!(diag.resets, 1);
    }
}
