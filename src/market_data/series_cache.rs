// =============================================================================
// Series Cache — resolved daily series keyed by (ticker, as_of, lookback)
// =============================================================================
//
// Entries are only valid for the calendar day they were fetched on.  Inserting
// a key with a newer `as_of` purges everything older.
// =============================================================================

use std::collections::HashMap;

use chrono::NaiveDate;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::market_data::Lookback;
use crate::types::PriceSeries;

// ---------------------------------------------------------------------------
// Key
// ---------------------------------------------------------------------------

/// Identifies one resolved daily series: the same ticker and lookback fetched
/// on the same calendar day is served from cache.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct SeriesKey {
    pub ticker: String,
    pub as_of: NaiveDate,
    pub lookback: Lookback,
}

impl std::fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}/{}", self.ticker, self.as_of, self.lookback.as_range())
    }
}

// ---------------------------------------------------------------------------
// SeriesCache -- thread-safe map of resolved series
// ---------------------------------------------------------------------------

/// Thread-safe cache of fetched series.  Inserting an entry for a newer
/// `as_of` date evicts every entry from earlier dates, so the map never holds
/// more than one trading day's worth of lookups.
pub struct SeriesCache {
    entries: RwLock<HashMap<SeriesKey, PriceSeries>>,
}

impl SeriesCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Cached series for `key`, if any.
    pub fn get(&self, key: &SeriesKey) -> Option<PriceSeries> {
        self.entries.read().get(key).cloned()
    }

    /// Store `series` under `key` and purge entries older than `key.as_of`.
    pub fn insert(&self, key: SeriesKey, series: PriceSeries) {
        let mut map = self.entries.write();
        let before = map.len();
        map.retain(|k, _| k.as_of >= key.as_of);
        let evicted = before - map.len();
        if evicted > 0 {
            debug!(evicted, as_of = %key.as_of, "purged stale series");
        }
        debug!(key = %key, bars = series.len(), "series cached");
        map.insert(key, series);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl Default for SeriesCache {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
