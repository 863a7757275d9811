//! Report aggregation
//!
//! The persisted report keeps every count record ever produced (`results`, append-only)
//! and a per-date summary (`lastRunCount`) that is always recomputed from the full history.

mod store;

pub use store::{ExportOutcome, ReportStore};

use crate::record::DeleteCountRecord;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, warn};

/// Date format used for `lastRunCount` entries.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Persisted report state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportData {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub results: Vec<DeleteCountRecord>,
    #[serde(rename = "lastRunCount", default, deserialize_with = "null_as_empty")]
    pub last_run_count: Vec<LastCount>,
}

/// Total orphaned records counted on one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastCount {
    pub date: String,
    pub count: u64,
}

impl LastCount {
    pub fn new(date: NaiveDate, count: u64) -> Self {
        Self {
            date: date.format(DATE_FORMAT).to_string(),
            count,
        }
    }
}

/// Reports written by older tooling may carry `null` instead of an empty list.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ExportData {
    /// Append a new batch after the existing history and recompute the summary.
    pub fn merge(mut self, batch: Vec<DeleteCountRecord>, today: NaiveDate) -> Self {
        debug!(
            existing = self.results.len(),
            new = batch.len(),
            "Merging records into report"
        );
        self.results.extend(batch);
        self.last_run_count = current_counts(&self.results, today);
        self
    }
}

/// Per-date totals over the whole history.
///
/// Records are bucketed by the UTC calendar date of their timestamp, never the host's
/// local date, so reports written from different time zones agree. Within a date each
/// qualified API name contributes once, from the first record seen for it. With no
/// records at all the result is a single zero entry for `today`, which callers should
/// also take in UTC. Entries are ordered by date.
pub fn current_counts(records: &[DeleteCountRecord], today: NaiveDate) -> Vec<LastCount> {
    if records.is_empty() {
        info!(date = %today, "No records found, setting count to 0");
        return vec![LastCount::new(today, 0)];
    }

    let mut totals: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    let mut seen: HashSet<(NaiveDate, &str)> = HashSet::new();
    for record in records {
        let Some(date) =
            DateTime::<Utc>::from_timestamp(record.timestamp, 0).map(|dt| dt.date_naive())
        else {
            warn!(
                timestamp = record.timestamp,
                qualified_api_name = %record.qualified_api_name,
                "Skipping record with out-of-range timestamp"
            );
            continue;
        };
        let total = totals.entry(date).or_insert(0);
        if seen.insert((date, record.qualified_api_name.as_str())) {
            *total += record.count;
        }
    }

    totals
        .into_iter()
        .map(|(date, count)| {
            info!(date = %date, count = count, "Count for date");
            LastCount::new(date, count)
        })
        .collect()
}
