//! Result accumulator shared by every count task of one pipeline run.

use crate::record::DeleteCountRecord;
use parking_lot::Mutex;

/// Append-only multiset of records.
///
/// Insertion order carries no meaning and duplicates are kept; de-duplication happens
/// when the report is aggregated.
#[derive(Debug, Default)]
pub struct ResultAccumulator {
    records: Mutex<Vec<DeleteCountRecord>>,
}

impl ResultAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, record: DeleteCountRecord) {
        self.records.lock().push(record);
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take everything collected so far, leaving the accumulator empty.
    pub fn take(&self) -> Vec<DeleteCountRecord> {
        std::mem::take(&mut *self.records.lock())
    }
}
