//! Storage backends for the notice history record.
//!
//! A backend only moves bytes. Parsing, bounding and the degrade-to-empty
//! read policy live in [`crate::history::HistoryStore`], so every backend
//! gets the same semantics.
//!
//! ## Directory Structure
//!
//! ```text
//! storage/
//! ├── config.toml           # Notifier configuration
//! ├── history.json          # Seen notices, newest first (max 50)
//! └── subscribers.json      # Email subscribers
//! ```

pub mod local;
pub mod memory;

use async_trait::async_trait;

use crate::error::Result;

// Re-export for convenience
pub use local::LocalStorage;
pub use memory::MemoryStorage;

/// Byte-level persistence for a single record.
#[async_trait]
pub trait HistoryBackend: Send + Sync {
    /// Read the record, returning `None` if it has never been written.
    async fn read(&self) -> Result<Option<Vec<u8>>>;

    /// Replace the record with `bytes`.
    async fn write(&self, bytes: &[u8]) -> Result<()>;

    /// Human-readable location, for logs.
    fn location(&self) -> String;
}

#[async_trait]
impl<T: HistoryBackend + ?Sized> HistoryBackend for std::sync::Arc<T> {
    async fn read(&self) -> Result<Option<Vec<u8>>> {
        (**self).read().await
    }

    async fn write(&self, bytes: &[u8]) -> Result<()> {
        (**self).write(bytes).await
    }

    fn location(&self) -> String {
        (**self).location()
    }
}
