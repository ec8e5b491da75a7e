// =============================================================================
// Trade Log — append-only journal of entry/stop/current snapshots
// =============================================================================
//
// The log is owned outside the evaluation core.  The core only defines the
// record shape; the service layer writes through a `TradeLogSink` it was
// handed at startup.
// =============================================================================

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One journal entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub timestamp: DateTime<Utc>,
    pub entry_price: f64,
    pub stop_price: f64,
    pub current_price: f64,
}

impl TradeRecord {
    /// Record stamped with the current time.
    pub fn now(entry_price: f64, stop_price: f64, current_price: f64) -> Self {
        Self {
            timestamp: Utc::now(),
            entry_price,
            stop_price,
            current_price,
        }
    }
}

/// Write-only destination for trade records.
pub trait TradeLogSink: Send + Sync {
    fn append(&self, record: TradeRecord) -> Result<()>;

    /// Records in insertion order, for sinks that can read back.
    fn records(&self) -> Result<Vec<TradeRecord>>;
}

// ---------------------------------------------------------------------------
// In-memory journal
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryTradeLog {
    records: RwLock<Vec<TradeRecord>>,
}

impl MemoryTradeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl TradeLogSink for MemoryTradeLog {
    fn append(&self, record: TradeRecord) -> Result<()> {
        let mut records = self.records.write();
        records.push(record);
        debug!(count = records.len(), "trade record appended");
        Ok(())
    }

    fn records(&self) -> Result<Vec<TradeRecord>> {
        Ok(self.records.read().clone())
    }
}

// ---------------------------------------------------------------------------
// JSON-lines file journal
// ---------------------------------------------------------------------------

/// One JSON object per line, opened in append mode for every write.
pub struct JsonlTradeLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlTradeLog {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        info!(path = %path.display(), "trade log opened");
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TradeLogSink for JsonlTradeLog {
    fn append(&self, record: TradeRecord) -> Result<()> {
        let mut line = serde_json::to_string(&record).context("failed to serialise trade record")?;
        line.push('\n');

        let _guard = self.write_lock.lock();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open trade log {}", self.path.display()))?;
        file.write_all(line.as_bytes())
            .with_context(|| format!("failed to append to trade log {}", self.path.display()))?;

        debug!(path = %self.path.display(), "trade record appended");
        Ok(())
    }

    fn records(&self) -> Result<Vec<TradeRecord>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("failed to read trade log {}", self.path.display())
                })
            }
        };

        content
            .lines()
            .filter(|l| !l.trim().is_empty())
            .enumerate()
            .map(|(i, line)| {
                serde_json::from_str(line).with_context(|| {
                    format!("malformed trade log line {} in {}", i + 1, self.path.display())
                })
            })
            .collect()
    }
}
