// src/history.rs

//! Bounded record of notices that have already been acted upon.
//!
//! The record is a newest-first list capped at [`MAX_HISTORY`] entries and
//! is always rewritten in full. Reads never fail: a missing record and an
//! unreadable one both come back as an empty history, which at worst means
//! re-notifying notices that were already seen.

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::Notice;
use crate::storage::HistoryBackend;

/// Default number of notices kept in history.
pub const MAX_HISTORY: usize = 50;

/// On-disk layout of the history record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryRecord {
    /// Seen notices, newest first
    #[serde(default)]
    pub notices: Vec<Notice>,

    /// ISO 8601 time of the last write
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// Outcome of reading the history record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryLoad {
    /// The record was read and parsed.
    Loaded(HistoryRecord),
    /// No record has been written yet.
    Missing,
    /// The record exists but could not be read or parsed.
    Unreadable(String),
}

impl HistoryLoad {
    /// Collapse the outcome into a notice list, treating every failure as
    /// "no history yet".
    pub fn into_notices(self) -> Vec<Notice> {
        match self {
            HistoryLoad::Loaded(record) => record.notices,
            HistoryLoad::Missing | HistoryLoad::Unreadable(_) => Vec::new(),
        }
    }
}

/// Durable, bounded history of seen notices.
#[derive(Debug)]
pub struct HistoryStore<B> {
    backend: B,
    max_entries: usize,
}

impl<B: HistoryBackend> HistoryStore<B> {
    /// Create a store with the default bound of [`MAX_HISTORY`].
    pub fn new(backend: B) -> Self {
        Self::with_max_entries(backend, MAX_HISTORY)
    }

    /// Create a store keeping at most `max_entries` notices.
    pub fn with_max_entries(backend: B, max_entries: usize) -> Self {
        Self {
            backend,
            max_entries: max_entries.max(1),
        }
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    #[cfg(test)]
    fn backend(&self) -> &B {
        &self.backend
    }

    /// Read the record and report why it is empty, if it is.
    pub async fn load_record(&self) -> HistoryLoad {
        let bytes = match self.backend.read().await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return HistoryLoad::Missing,
            Err(e) => return HistoryLoad::Unreadable(e.to_string()),
        };

        match serde_json::from_slice::<HistoryRecord>(&bytes) {
            Ok(record) => HistoryLoad::Loaded(record),
            Err(e) => HistoryLoad::Unreadable(e.to_string()),
        }
    }

    /// Return the persisted notices, or an empty list if there are none or
    /// the record is unreadable.
    pub async fn load(&self) -> Vec<Notice> {
        let outcome = self.load_record().await;
        if let HistoryLoad::Unreadable(reason) = &outcome {
            log::error!(
                "History at {} is unreadable, treating as empty: {}",
                self.backend.location(),
                reason
            );
        }
        outcome.into_notices()
    }

    /// Overwrite the record with `notices`, stamping the current time.
    ///
    /// Does not apply the length bound. A failed write is logged and
    /// reported through the return value, never raised.
    pub async fn save(&self, notices: &[Notice]) -> bool {
        match self.write_record(notices).await {
            Ok(()) => {
                log::info!("History saved: {} notices", notices.len());
                true
            }
            Err(e) => {
                log::error!(
                    "Failed to save history to {}: {}",
                    self.backend.location(),
                    e
                );
                false
            }
        }
    }

    /// Put `new_notices` in front of the current history, cut the result to
    /// the bound and write it.
    pub async fn append_bounded(&self, new_notices: &[Notice]) -> bool {
        let current = self.load().await;

        let mut updated = Vec::with_capacity(new_notices.len() + current.len());
        updated.extend_from_slice(new_notices);
        updated.extend(current);
        updated.truncate(self.max_entries);

        self.save(&updated).await
    }

    async fn write_record(&self, notices: &[Notice]) -> Result<()> {
        let record = HistoryRecord {
            notices: notices.to_vec(),
            last_updated: Some(Local::now().to_rfc3339()),
        };
        let bytes = serde_json::to_vec_pretty(&record)?;
        self.backend.write(&bytes).await
    }
}
