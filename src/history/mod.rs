//! Capped, newest-first log of completed predictions.
//!
//! The whole log is one JSON array under [`HISTORY_KEY`]. Every append replaces
//! it in a single write, computed from whatever is stored at that moment.

use anyhow::{Context, Result};

use crate::{
    db::KeyValueStore,
    log_warn,
    models::PredictionRecord,
};

const ENABLE_LOGS: bool = true;

pub const HISTORY_KEY: &str = "cropPredictions";
pub const HISTORY_LIMIT: usize = 5;

#[derive(Debug, Clone)]
pub struct HistoryStore<S> {
    store: S,
}

impl<S: KeyValueStore> HistoryStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn backend(&self) -> &S {
        &self.store
    }

    /// Prepend `record` and drop everything past the newest [`HISTORY_LIMIT`].
    pub async fn append(&self, record: PredictionRecord) -> Result<()> {
        self.store
            .update(HISTORY_KEY, move |current| {
                let mut log = decode_log(current.as_deref());
                log.insert(0, record);
                log.truncate(HISTORY_LIMIT);
                serde_json::to_string(&log).context("failed to serialize prediction history")
            })
            .await
            .map(|_| ())
    }

    /// The persisted log, newest first. Missing or corrupt data reads as empty.
    pub async fn all(&self) -> Vec<PredictionRecord> {
        match self.store.get(HISTORY_KEY).await {
            Ok(raw) => decode_log(raw.as_deref()),
            Err(err) => {
                log_warn!("Failed to read prediction history, treating as empty: {err:#}");
                Vec::new()
            }
        }
    }

    pub async fn latest(&self) -> Option<PredictionRecord> {
        self.all().await.into_iter().next()
    }
}

fn decode_log(raw: Option<&str>) -> Vec<PredictionRecord> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    match serde_json::from_str::<Vec<PredictionRecord>>(raw) {
        Ok(mut log) => {
            log.truncate(HISTORY_LIMIT);
            log
        }
        Err(err) => {
            log_warn!("Stored prediction history is corrupt, treating as empty: {err}");
            Vec::new()
        }
    }
}
