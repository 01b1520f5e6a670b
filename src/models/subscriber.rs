//! Subscriber records.

use serde::{Deserialize, Serialize};

/// An email subscriber.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subscriber {
    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscribed_at: Option<String>,

    /// Opted-in flag; records without it count as active
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Subscriber {
    /// Create an active subscriber.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            subscribed_at: None,
            active: true,
        }
    }
}

/// On-disk layout of the subscriber file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubscriberFile {
    #[serde(default)]
    pub subscribers: Vec<Subscriber>,
}
