//! # Local Ledger
//!
//! Volatile, insertion-ordered copy of every accepted scan. Serves reads when
//! the remote store is down. Gone on restart, never reconciled with the
//! remote side.
//!
//! Ids are `len + 1` at append time, computed under the same lock as the
//! push, so concurrent scans never share one. They restart at 1 after a
//! clear.
use parking_lot::Mutex;

use crate::attendance::AttendanceRecord;

#[derive(Default)]
pub struct Ledger {
    records: Mutex<Vec<AttendanceRecord>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_with<F>(&self, build: F) -> AttendanceRecord
    where
        F: FnOnce(u64) -> AttendanceRecord,
    {
        let mut records = self.records.lock();

        let record = build(records.len() as u64 + 1);
        records.push(record.clone());

        record
    }

    pub fn all(&self) -> Vec<AttendanceRecord> {
        self.records.lock().clone()
    }

    /// Most recent first.
    pub fn latest(&self, n: usize) -> Vec<AttendanceRecord> {
        self.records.lock().iter().rev().take(n).cloned().collect()
    }

    pub fn clear(&self) -> usize {
        let mut records = self.records.lock();
        let cleared = records.len();
        records.clear();

        cleared
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
