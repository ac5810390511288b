//! Persisted list of completed work sessions.
//!
//! The whole collection lives under one key as a JSON array of millisecond
//! timestamps and is rewritten on every change. There is no incremental
//! append at the storage layer, so two writers racing on `append` can lose
//! an entry; pomotrack runs one engine per store.

use serde_json::Value;

use crate::clock::Timestamp;
use crate::error::StorageError;
use crate::storage::KeyValueStore;

/// Key holding the JSON-encoded history array.
pub const HISTORY_KEY: &str = "intervalData";

/// Days of history kept by the startup prune, not counting today.
pub const RETENTION_DAYS: u64 = 7;

/// Cutoff for the startup prune: start of the local day seven days before
/// the day of `now`.
pub fn startup_prune_cutoff(now: Timestamp) -> Timestamp {
    now.start_of_day_days_ago(RETENTION_DAYS)
}

pub struct HistoryStore {
    store: Box<dyn KeyValueStore>,
}

impl HistoryStore {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// Read the full collection.
    ///
    /// A missing key, a failed read or a value that is not a JSON array all
    /// yield an empty collection.
    pub fn load(&self) -> Vec<Timestamp> {
        match self.store.get_item(HISTORY_KEY) {
            Ok(Some(raw)) => decode(&raw),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "history read failed, treating as empty");
                Vec::new()
            }
        }
    }

    /// Overwrite the persisted collection.
    pub fn save(&self, collection: &[Timestamp]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(collection)
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;
        self.store.set_item(HISTORY_KEY, &raw)
    }

    /// `save(load() + [entry])`.
    pub fn append(&self, entry: Timestamp) -> Result<(), StorageError> {
        let mut collection = self.load();
        collection.push(entry);
        self.save(&collection)?;
        tracing::info!(at = %entry, total = collection.len(), "recorded work session");
        Ok(())
    }

    /// Drop entries strictly older than `cutoff`, keeping order.
    ///
    /// Returns how many entries were removed.
    pub fn prune_older_than(&self, cutoff: Timestamp) -> Result<usize, StorageError> {
        let collection = self.load();
        let before = collection.len();
        let kept: Vec<Timestamp> = collection.into_iter().filter(|t| *t >= cutoff).collect();
        let removed = before - kept.len();
        self.save(&kept)?;
        if removed > 0 {
            tracing::info!(removed, cutoff = %cutoff, "pruned old history");
        }
        Ok(removed)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.save(&[])
    }
}

/// Accepts integers and integer strings, the shapes older writers produced.
fn decode(raw: &str) -> Vec<Timestamp> {
    let values: Vec<Value> = match serde_json::from_str(raw) {
        Ok(values) => values,
        Err(e) => {
            tracing::warn!(error = %e, "history is not a JSON array, treating as empty");
            return Vec::new();
        }
    };

    let total = values.len();
    let entries: Vec<Timestamp> = values
        .into_iter()
        .filter_map(|value| match value {
            Value::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            }),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        })
        .map(Timestamp::from_millis)
        .collect();

    if entries.len() < total {
        tracing::warn!(
            dropped = total - entries.len(),
            "ignored history entries that are not timestamps"
        );
    }
    entries
}
