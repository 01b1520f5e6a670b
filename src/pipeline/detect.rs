//! Change detection against the seen-notice history.
//!
//! Decides which of the currently visible notices are new and records them
//! in history in the same pass, so a crash after detection cannot report
//! them twice.
//!
//! Precondition: `observed` is newest-first with unique URLs, as produced by
//! the board collector. The detector keeps that order and never re-sorts.

use std::collections::HashSet;

use crate::history::HistoryStore;
use crate::models::Notice;
use crate::storage::HistoryBackend;

/// What a detection pass found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    /// History was empty; everything observed was recorded as already known.
    Bootstrap { recorded: usize },
    /// Nothing observed is missing from history.
    Unchanged,
    /// Notices absent from history, in observed order.
    New(Vec<Notice>),
}

impl Detection {
    /// The notices to act on. Empty for bootstrap and unchanged passes.
    pub fn into_new(self) -> Vec<Notice> {
        match self {
            Detection::New(notices) => notices,
            Detection::Bootstrap { .. } | Detection::Unchanged => Vec::new(),
        }
    }
}

/// Return the notices in `observed` whose URL is not in `known`.
pub fn unseen(known: &[Notice], observed: &[Notice]) -> Vec<Notice> {
    let known_urls: HashSet<&str> = known.iter().map(|n| n.url.as_str()).collect();

    observed
        .iter()
        .filter(|n| !known_urls.contains(n.url.as_str()))
        .cloned()
        .collect()
}

/// Owner of the history record and the only code that mutates it.
#[derive(Debug)]
pub struct ChangeDetector<B> {
    history: HistoryStore<B>,
}

impl<B: HistoryBackend> ChangeDetector<B> {
    pub fn new(history: HistoryStore<B>) -> Self {
        Self { history }
    }

    /// Currently known notices, newest first.
    pub async fn known(&self) -> Vec<Notice> {
        self.history.load().await
    }

    /// Compare `observed` with history and record anything new.
    pub async fn detect(&self, observed: &[Notice]) -> Detection {
        let known = self.history.load().await;

        if known.is_empty() {
            log::info!(
                "First run: recording {} notices as already known",
                observed.len()
            );
            self.history.append_bounded(observed).await;
            return Detection::Bootstrap {
                recorded: observed.len().min(self.history.max_entries()),
            };
        }

        let new_notices = unseen(&known, observed);
        log::info!(
            "{} of {} observed notices are new",
            new_notices.len(),
            observed.len()
        );

        if new_notices.is_empty() {
            return Detection::Unchanged;
        }

        self.history.append_bounded(&new_notices).await;
        Detection::New(new_notices)
    }

    /// Return the new notices in `observed`, most recent first.
    pub async fn get_new_notices(&self, observed: &[Notice]) -> Vec<Notice> {
        self.detect(observed).await.into_new()
    }
}
