//! Structured result of a single check run.

use serde::{Deserialize, Serialize};

/// Overall status handed to the scheduler.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Error,
}

/// Delivery tally for one channel kind.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeliveryStats {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl DeliveryStats {
    /// Record a single delivery attempt.
    pub fn record(&mut self, ok: bool) {
        self.attempted += 1;
        if ok {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }

    /// Fold another tally into this one.
    pub fn merge(&mut self, other: DeliveryStats) {
        self.attempted += other.attempted;
        self.succeeded += other.succeeded;
        self.failed += other.failed;
    }
}

/// How a run ended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The board had nothing that is not already in history.
    NoNewNotices,
    /// New notices were summarised but nobody is subscribed.
    NoActiveSubscribers { processed: usize },
    /// Notifications were sent.
    Delivered {
        processed: usize,
        email: DeliveryStats,
        chat: DeliveryStats,
    },
    /// The run failed before notifications could be sent.
    Failed { reason: String },
}

/// Result of `check_and_notify`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunReport {
    pub status: RunStatus,
    pub message: String,
    pub count: usize,
    pub outcome: RunOutcome,
}

impl RunReport {
    pub fn no_new_notices() -> Self {
        Self {
            status: RunStatus::Success,
            message: "새로운 공지사항 없음".to_string(),
            count: 0,
            outcome: RunOutcome::NoNewNotices,
        }
    }

    pub fn no_active_subscribers(processed: usize) -> Self {
        Self {
            status: RunStatus::Success,
            message: "활성 구독자가 없습니다.".to_string(),
            count: processed,
            outcome: RunOutcome::NoActiveSubscribers { processed },
        }
    }

    pub fn delivered(processed: usize, email: DeliveryStats, chat: DeliveryStats) -> Self {
        Self {
            status: RunStatus::Success,
            message: format!("{processed}개 공지사항 처리 완료"),
            count: processed,
            outcome: RunOutcome::Delivered {
                processed,
                email,
                chat,
            },
        }
    }

    pub fn error(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            status: RunStatus::Error,
            message: reason.clone(),
            count: 0,
            outcome: RunOutcome::Failed { reason },
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Success
    }
}
