//! Internal factory: assembles a fully-validated manager from its ports.
//!
//! All construction-time checks happen here, so a manager that exists is a
//! manager whose configuration is consistent, whose keys are provisioned, and
//! whose counters were restored from the attribute store. Request paths never
//! re-check any of this.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use fvm_types::FvmError;

use crate::domain::{SignalArena, SignalCounterState};
use crate::ports::outbound::{ConfigAccessor, CryptoServiceAccessor, RuntimeAttributesStore};
use crate::service::FreshnessValueManager;

/// Builder of [`FreshnessValueManager`] instances.
pub struct FvmFactory;

impl FvmFactory {
    /// Validates the configuration against the crypto service, restores
    /// persisted counters, and assembles the manager.
    ///
    /// # Errors
    /// - `ConfigurationInconsistent`: a signal's bit-widths or window are
    ///   invalid, its key is not provisioned, or a persisted value does not
    ///   fit the configured counter width
    /// - `PersistenceFailure`: the attribute store could not be read
    pub fn assemble(
        config: Arc<dyn ConfigAccessor>,
        store: Arc<dyn RuntimeAttributesStore>,
        crypto: Arc<dyn CryptoServiceAccessor>,
    ) -> Result<FreshnessValueManager, FvmError> {
        let signal_ids = config.signal_ids();
        if signal_ids.is_empty() {
            return Err(FvmError::ConfigurationInconsistent(
                "no signals configured".to_string(),
            ));
        }

        let mut states = HashMap::with_capacity(signal_ids.len());
        for id in signal_ids {
            let cfg = config
                .signal_config(id)
                .ok_or(FvmError::UnknownSignal(id))?;
            cfg.validate(id)?;

            if !crypto.key_exists(cfg.key_id) {
                return Err(FvmError::ConfigurationInconsistent(format!(
                    "{id}: key {} not provisioned in the crypto service",
                    cfg.key_id.0
                )));
            }

            let persisted = store.load_value(id)?;
            if let Some(value) = persisted {
                // A snapshot value wider than W means the snapshot belongs to
                // a different configuration; resuming from it would corrupt
                // the counter.
                if value > cfg.max_value() {
                    return Err(FvmError::ConfigurationInconsistent(format!(
                        "{id}: persisted value {value} exceeds the {}-bit counter range",
                        cfg.counter_bits
                    )));
                }
                debug!(%id, value, "counter restored from attribute store");
            }

            states.insert(id, SignalCounterState::new(id, cfg, persisted));
        }

        info!("[fvm] manager assembled, {} signal(s)", states.len());
        Ok(FreshnessValueManager::new(
            SignalArena::new(states),
            store,
            config.reset_token().to_vec(),
        ))
    }
}
