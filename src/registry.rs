//! Insertion-ordered registry of timer records
//!
//! Records are appended on first reference and never removed while the
//! program runs, so indices stay valid. [`Registry::reset`] exists for test
//! isolation only.

use crate::record::{RecordHandle, TimerRecord};
use fnv::FnvHashMap;
use std::sync::{Arc, RwLock};

#[derive(Debug, Default)]
struct Inner {
    records: Vec<RecordHandle>,
    by_name: FnvHashMap<String, usize>,
}

/// Owner of every timer record in a profiler
#[derive(Debug, Default)]
pub struct Registry {
    inner: RwLock<Inner>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing record for `name`, or a freshly registered zeroed one
    pub fn get_or_create(&self, name: &str) -> RecordHandle {
        if let Some(record) = self.get(name) {
            return record;
        }

        let mut inner = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // Another thread may have registered it between the two locks.
        if let Some(&index) = inner.by_name.get(name) {
            return Arc::clone(&inner.records[index]);
        }

        let index = inner.records.len();
        let record = Arc::new(TimerRecord::new(name.to_string(), index));
        inner.records.push(Arc::clone(&record));
        inner.by_name.insert(name.to_string(), index);
        tracing::debug!("Registered timer {:?} at index {}", name, index);
        record
    }

    pub fn get(&self, name: &str) -> Option<RecordHandle> {
        let inner = self
            .inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        inner
            .by_name
            .get(name)
            .map(|&index| Arc::clone(&inner.records[index]))
    }

    /// Copy of the registration order; sorting it leaves the registry untouched
    pub fn snapshot(&self) -> Vec<RecordHandle> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .records
            .clone()
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .records
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget every record. Handles already given out keep working but are
    /// no longer reported.
    pub fn reset(&self) {
        let mut inner = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        inner.records.clear();
        inner.by_name.clear();
    }
}
