//! Truncated-counter reconstruction arithmetic.
//!
//! The wire carries only the low `T` bits of a `W`-bit counter. Candidates
//! for the full value are spaced `2^T` apart; because configuration enforces
//! `sync_window < 2^T`, at most one candidate can fall inside the window, so
//! examining the smallest forward candidate is exact.

use fvm_types::{FreshnessValue, SignalFreshnessConfig};

/// Outcome of reconstructing a truncated value against `last_accepted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconstruction {
    /// The smallest candidate `>= last_accepted + 1` congruent to the
    /// truncation lies within the synchronization window.
    InWindow(FreshnessValue),
    /// The truncation matches a counter value `<= last_accepted`: ordinary
    /// staleness or replay.
    Stale,
    /// The nearest forward candidate exceeds the window (or the counter
    /// range) and no stale interpretation exists: unrecoverable drift.
    OutOfWindow,
}

/// Reconstructs the full freshness value for `truncated`, received while the
/// counter stands at `last_accepted`.
///
/// Boundary rules:
/// - the window check is inclusive: `candidate - last_accepted <= sync_window`
///   is accepted;
/// - a forward candidate beyond the window (or beyond `2^W - 1`) is `Stale`
///   when the backward candidate `candidate - 2^T` is a representable counter
///   value, otherwise `OutOfWindow`.
///
/// The caller must have rejected truncations wider than `T` already.
#[must_use]
pub fn reconstruct(
    last_accepted: FreshnessValue,
    truncated: u64,
    config: &SignalFreshnessConfig,
) -> Reconstruction {
    let max_value = config.max_value();

    // A saturated counter has no newer value left to accept.
    if last_accepted >= max_value {
        return Reconstruction::Stale;
    }

    // T == 64: the wire carries the full value, no reconstruction needed.
    if config.truncated_bits >= 64 {
        if truncated <= last_accepted {
            return Reconstruction::Stale;
        }
        return if truncated - last_accepted <= config.sync_window {
            Reconstruction::InWindow(truncated)
        } else {
            Reconstruction::OutOfWindow
        };
    }

    let modulus = config.truncation_modulus();
    let base = last_accepted + 1;

    // Smallest value >= base congruent to `truncated` mod 2^T.
    let offset = (truncated + modulus - (base % modulus)) % modulus;
    let candidate = match base.checked_add(offset) {
        Some(c) if c <= max_value => c,
        // Forward candidate beyond the counter range: only a stale
        // interpretation can remain.
        Some(c) => return stale_or_out_of_window(c, modulus),
        // The true candidate exceeds `u64::MAX >= 2^T`, so the backward
        // candidate is always representable.
        None => return Reconstruction::Stale,
    };

    if candidate - last_accepted <= config.sync_window {
        Reconstruction::InWindow(candidate)
    } else {
        stale_or_out_of_window(candidate, modulus)
    }
}

/// The forward candidate was unacceptable; classify via the backward
/// candidate. `candidate - 2^T` is always `<= last_accepted` when it exists,
/// so a representable backward candidate means the truncation matched an
/// already-consumed counter value.
fn stale_or_out_of_window(candidate: u64, modulus: u64) -> Reconstruction {
    if candidate >= modulus {
        Reconstruction::Stale
    } else {
        Reconstruction::OutOfWindow
    }
}
