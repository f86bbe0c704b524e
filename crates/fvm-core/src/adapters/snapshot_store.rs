//! File-backed counter snapshot store.
//!
//! Binary format: magic `FVMS`, format version (u16 LE), then one
//! `[signal_id: u32 LE][value: u64 LE]` record per signal. Every persist
//! rewrites the whole snapshot to a temporary file and renames it into
//! place, so the snapshot is either the old state or the new state, never a
//! torn write.
//!
//! An exclusive advisory lock is taken on the snapshot for the store's
//! lifetime: one authority per counter space. A second process opening the
//! same snapshot fails at construction instead of silently double-issuing.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use fvm_types::{FreshnessValue, FvmError, SignalId};

use crate::ports::outbound::RuntimeAttributesStore;

const MAGIC: &[u8; 4] = b"FVMS";
const FORMAT_VERSION: u16 = 1;
const RECORD_LEN: usize = 4 + 8;

/// Durable attribute store backed by a single snapshot file.
pub struct FileSnapshotStore {
    path: PathBuf,
    /// Guards both the in-memory map and the rewrite of the snapshot file,
    /// keeping record order stable across concurrent persists.
    values: Mutex<HashMap<SignalId, FreshnessValue>>,
    /// Held open for the process lifetime to keep the advisory lock.
    _lock_file: File,
}

impl FileSnapshotStore {
    /// Opens (or creates) a snapshot at `path` and takes the exclusive lock.
    ///
    /// # Errors
    /// `PersistenceFailure` if the file cannot be opened, locked, or parsed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FvmError> {
        let path = path.as_ref().to_path_buf();

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| FvmError::PersistenceFailure(format!("open {}: {e}", path.display())))?;

        lock_file.try_lock_exclusive().map_err(|e| {
            FvmError::PersistenceFailure(format!(
                "snapshot {} is locked by another freshness authority: {e}",
                path.display()
            ))
        })?;

        let values = Self::load(&path)?;
        if values.is_empty() {
            info!("[fvm] no counter snapshot at {}, starting fresh", path.display());
        } else {
            info!(
                "[fvm] restored {} counter(s) from {}",
                values.len(),
                path.display()
            );
        }

        Ok(Self {
            path,
            values: Mutex::new(values),
            _lock_file: lock_file,
        })
    }

    fn load(path: &Path) -> Result<HashMap<SignalId, FreshnessValue>, FvmError> {
        let mut file = match File::open(path) {
            Ok(f) => f,
            Err(_) => return Ok(HashMap::new()),
        };
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|e| FvmError::PersistenceFailure(format!("read {}: {e}", path.display())))?;

        if bytes.is_empty() {
            return Ok(HashMap::new());
        }
        if bytes.len() < 6 || &bytes[..4] != MAGIC {
            return Err(FvmError::PersistenceFailure(format!(
                "{} is not a counter snapshot",
                path.display()
            )));
        }
        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != FORMAT_VERSION {
            return Err(FvmError::PersistenceFailure(format!(
                "snapshot format version {version} unsupported (expected {FORMAT_VERSION})"
            )));
        }

        let body = &bytes[6..];
        if body.len() % RECORD_LEN != 0 {
            // A torn snapshot must not silently drop counters: refusing to
            // start is the replay-safe response.
            return Err(FvmError::PersistenceFailure(format!(
                "snapshot {} is truncated ({} trailing bytes)",
                path.display(),
                body.len() % RECORD_LEN
            )));
        }

        let mut values = HashMap::new();
        for record in body.chunks_exact(RECORD_LEN) {
            let id = u32::from_le_bytes(record[..4].try_into().expect("record layout"));
            let value = u64::from_le_bytes(record[4..].try_into().expect("record layout"));
            values.insert(SignalId(id), value);
        }
        debug!("[fvm] snapshot loaded, {} record(s)", values.len());
        Ok(values)
    }

    fn write_snapshot(
        &self,
        values: &HashMap<SignalId, FreshnessValue>,
    ) -> Result<(), FvmError> {
        let mut bytes = Vec::with_capacity(6 + values.len() * RECORD_LEN);
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        for (id, value) in values {
            bytes.extend_from_slice(&id.0.to_le_bytes());
            bytes.extend_from_slice(&value.to_le_bytes());
        }

        let tmp = self.path.with_extension("tmp");
        let mut file = File::create(&tmp)
            .map_err(|e| FvmError::PersistenceFailure(format!("create {}: {e}", tmp.display())))?;
        file.write_all(&bytes)
            .and_then(|_| file.sync_all())
            .map_err(|e| FvmError::PersistenceFailure(format!("write {}: {e}", tmp.display())))?;
        drop(file);

        std::fs::rename(&tmp, &self.path).map_err(|e| {
            warn!("[fvm] snapshot rename failed: {e}");
            FvmError::PersistenceFailure(format!("rename into {}: {e}", self.path.display()))
        })
    }
}

impl RuntimeAttributesStore for FileSnapshotStore {
    fn load_value(&self, signal_id: SignalId) -> Result<Option<FreshnessValue>, FvmError> {
        Ok(self.values.lock().get(&signal_id).copied())
    }

    fn persist_value(&self, signal_id: SignalId, value: FreshnessValue) -> Result<(), FvmError> {
        let mut values = self.values.lock();
        let previous = values.insert(signal_id, value);
        match self.write_snapshot(&values) {
            Ok(()) => Ok(()),
            Err(e) => {
                // Roll the map back so memory never claims more than disk.
                match previous {
                    Some(p) => values.insert(signal_id, p),
                    None => values.remove(&signal_id),
                };
                Err(e)
            }
        }
    }
}
