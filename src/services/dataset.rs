//! Data sources and the live record store.
//!
//! The config document is fetched once at startup; the record document is
//! re-fetched on a fixed polling interval and wholesale-replaces the
//! working set. A failed refresh retains the last successfully loaded data
//! and records the error instead of clearing state.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::models::{ConfigSchema, Record};

/// Documented default polling cadence for the record document.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Where a JSON document is fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Url(String),
    File(PathBuf),
}

impl Source {
    /// A URL wins over a file path when both are supplied.
    pub fn from_options(url: Option<String>, path: Option<String>) -> Option<Source> {
        match (url, path) {
            (Some(url), _) => Some(Source::Url(url)),
            (None, Some(path)) => Some(Source::File(PathBuf::from(path))),
            (None, None) => None,
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Url(url) => write!(f, "{}", url),
            Source::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Failure at the fetch boundary. The engines themselves never fail; this
/// is the system's entire failure surface.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

async fn fetch_text(source: &Source) -> Result<String, FetchError> {
    match source {
        Source::Url(url) => {
            let response = reqwest::get(url).await?;
            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status(status.as_u16()));
            }
            Ok(response.text().await?)
        }
        Source::File(path) => Ok(tokio::fs::read_to_string(path).await?),
    }
}

/// Fetch and parse the field configuration document.
pub async fn fetch_config(source: &Source) -> Result<ConfigSchema, FetchError> {
    let body = fetch_text(source).await?;
    Ok(serde_json::from_str(&body)?)
}

/// Fetch and parse the record document. Returns the records together with
/// the payload checksum used to detect unchanged refreshes.
pub async fn fetch_records(source: &Source) -> Result<(Vec<Record>, String), FetchError> {
    let body = fetch_text(source).await?;
    let records: Vec<Record> = serde_json::from_str(&body)?;
    let checksum = compute_checksum(&body);
    Ok((records, checksum))
}

/// SHA-256 checksum of a fetched payload, hex encoded.
pub fn compute_checksum(payload: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    hex::encode(hasher.finalize())
}

/// The live record snapshot shared between the poller and the handlers.
///
/// Readers clone an `Arc` under a short read lock; the poller swaps the
/// whole snapshot under a short write lock. There is no incremental merge.
#[derive(Debug, Default)]
pub struct DataStore {
    records: RwLock<Arc<Vec<Record>>>,
    checksum: RwLock<Option<String>>,
    last_updated: RwLock<Option<DateTime<Utc>>>,
    last_error: RwLock<Option<String>>,
}

impl DataStore {
    pub fn new() -> Self {
        DataStore::default()
    }

    /// The current record set. Cheap; safe to hold across engine calls.
    pub fn snapshot(&self) -> Arc<Vec<Record>> {
        Arc::clone(&self.records.read())
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    pub fn checksum(&self) -> Option<String> {
        self.checksum.read().clone()
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        *self.last_updated.read()
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().clone()
    }

    /// Apply a successful fetch: clear the error state and replace the
    /// snapshot unless the checksum shows the payload is unchanged.
    /// Returns whether the snapshot was actually replaced.
    pub fn apply_fetch(&self, records: Vec<Record>, checksum: String) -> bool {
        *self.last_error.write() = None;
        *self.last_updated.write() = Some(Utc::now());
        if self.checksum.read().as_deref() == Some(checksum.as_str()) {
            return false;
        }
        *self.records.write() = Arc::new(records);
        *self.checksum.write() = Some(checksum);
        true
    }

    /// Record a failed fetch. The previous snapshot is retained.
    pub fn record_failure(&self, error: &FetchError) {
        *self.last_error.write() = Some(error.to_string());
    }
}

/// Spawn the polling task: re-fetch the record document on a fixed
/// interval and apply the result to the store.
pub fn spawn_poller(
    source: Source,
    store: Arc<DataStore>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match fetch_records(&source).await {
                Ok((records, checksum)) => {
                    let count = records.len();
                    if store.apply_fetch(records, checksum) {
                        tracing::debug!(count, %source, "record set replaced");
                    }
                }
                Err(error) => {
                    store.record_failure(&error);
                    tracing::warn!(%error, %source, "record fetch failed, retaining last good data");
                }
            }
        }
    })
}
