//! Lock arena: one mutex per configured signal.
//!
//! The entry map is immutable after construction, so lookups never take a
//! coarse lock and operations on distinct signals never contend. Issuance,
//! validation, and administrative resets on the same signal all serialize on
//! the same entry mutex, which is what makes at-most-once issuance hold
//! across every caller, including cross-process ones behind the server.

use std::collections::HashMap;

use parking_lot::Mutex;

use fvm_types::{FvmError, SignalId};

use super::signal_state::SignalCounterState;

/// Arena of per-signal counter states.
pub struct SignalArena {
    entries: HashMap<SignalId, Mutex<SignalCounterState>>,
}

impl SignalArena {
    /// Builds the arena from fully-constructed counter states.
    pub fn new(states: HashMap<SignalId, SignalCounterState>) -> Self {
        let entries = states
            .into_iter()
            .map(|(id, state)| (id, Mutex::new(state)))
            .collect();
        Self { entries }
    }

    /// Runs `f` under the signal's mutex.
    ///
    /// # Errors
    /// `UnknownSignal` if the id is not configured.
    pub fn with_entry<R>(
        &self,
        id: SignalId,
        f: impl FnOnce(&mut SignalCounterState) -> R,
    ) -> Result<R, FvmError> {
        let entry = self.entries.get(&id).ok_or(FvmError::UnknownSignal(id))?;
        let mut state = entry.lock();
        Ok(f(&mut state))
    }

    /// All configured signal ids, in unspecified order.
    pub fn signal_ids(&self) -> Vec<SignalId> {
        self.entries.keys().copied().collect()
    }

    /// Number of configured signals.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no signals are configured.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
