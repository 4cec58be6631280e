//! Process-wide key material cache.
//!
//! Loading and cross-checking the proving key dominates the cost of a request,
//! so each artifact directory is loaded at most once per process. Concurrent
//! first loads of the same directory wait on a single initialization. A failed
//! load is not remembered, the next request tries again. At most
//! [`MAX_CACHED_DIRS`] directories are held; the oldest entry makes room for a
//! new one.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use once_cell::sync::{Lazy, OnceCell};
use tracing::{debug, info};

use crate::artifacts::{KeyMaterial, LoadError};
use crate::config::VerifierConfig;

/// Upper bound on the number of artifact directories kept in one cache.
pub const MAX_CACHED_DIRS: usize = 8;

type Slot = Arc<OnceCell<Arc<KeyMaterial>>>;

#[derive(Debug, Default)]
struct Slots {
    entries: HashMap<PathBuf, (u64, Slot)>,
    next_seq: u64,
}

#[derive(Debug, Default)]
pub struct KeyCache {
    slots: Mutex<Slots>,
}

static GLOBAL: Lazy<KeyCache> = Lazy::new(KeyCache::default);

impl KeyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cache shared by every entry point in this process.
    pub fn global() -> &'static KeyCache {
        &GLOBAL
    }

    // Every mutation leaves the map consistent, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn slot(&self, config: &VerifierConfig) -> Slot {
        let mut slots = self.lock();
        if let Some((_, slot)) = slots.entries.get(&config.artifact_dir) {
            return Arc::clone(slot);
        }
        while slots.entries.len() >= MAX_CACHED_DIRS {
            let oldest = slots
                .entries
                .iter()
                .min_by_key(|(_, (seq, _))| *seq)
                .map(|(dir, _)| dir.clone());
            match oldest {
                Some(dir) => {
                    debug!(dir = %dir.display(), "evicting cached key material");
                    slots.entries.remove(&dir);
                }
                None => break,
            }
        }
        let seq = slots.next_seq;
        slots.next_seq += 1;
        let slot = Slot::default();
        slots
            .entries
            .insert(config.artifact_dir.clone(), (seq, Arc::clone(&slot)));
        slot
    }

    /// Drop `slot` if it is still the entry for `config` and never loaded.
    fn forget_failed(&self, config: &VerifierConfig, slot: &Slot) {
        let mut slots = self.lock();
        let stale = slots
            .entries
            .get(&config.artifact_dir)
            .is_some_and(|(_, current)| Arc::ptr_eq(current, slot) && current.get().is_none());
        if stale {
            slots.entries.remove(&config.artifact_dir);
        }
    }

    pub fn get_or_load(&self, config: &VerifierConfig) -> Result<Arc<KeyMaterial>, LoadError> {
        let slot = self.slot(config);
        let result = slot.get_or_try_init(|| {
            let material = KeyMaterial::load(&config.paths())?;
            info!(
                dir = %config.artifact_dir.display(),
                constraints = material.matrices.num_constraints,
                "key material loaded"
            );
            Ok::<_, LoadError>(Arc::new(material))
        });
        match result {
            Ok(material) => Ok(Arc::clone(material)),
            Err(err) => {
                self.forget_failed(config, &slot);
                Err(err)
            }
        }
    }

    /// Whether `config`'s directory has been loaded successfully.
    pub fn is_loaded(&self, config: &VerifierConfig) -> bool {
        self.lock()
            .entries
            .get(&config.artifact_dir)
            .is_some_and(|(_, slot)| slot.get().is_some())
    }

    /// Number of directories with an entry.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
