// src/services/subscribers.rs

//! File-backed subscriber registry.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Subscriber, SubscriberFile};
use crate::services::SubscriberRegistry;

/// Reads subscribers from a JSON file shaped like
/// `{"subscribers": [{"email": ..., "active": true}]}`.
#[derive(Debug, Clone)]
pub struct FileSubscriberRegistry {
    path: PathBuf,
}

impl FileSubscriberRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load every subscriber, active or not.
    pub async fn load_all(&self) -> Result<Vec<Subscriber>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice::<SubscriberFile>(&bytes)?.subscribers),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl SubscriberRegistry for FileSubscriberRegistry {
    async fn get_active_subscribers(&self) -> Vec<Subscriber> {
        match self.load_all().await {
            Ok(subscribers) => subscribers.into_iter().filter(|s| s.active).collect(),
            Err(e) => {
                log::error!(
                    "Failed to load subscribers from {}: {}",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
        }
    }
}
