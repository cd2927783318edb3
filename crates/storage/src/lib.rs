//! Durable key-value settings for FocusMeow.
//!
//! The rule store holds the mode and the two rule lists as JSON values and
//! broadcasts a `StoreChange` for every write that alters a value. Settings
//! surfaces write here; the authority re-reads on every recomputation.

mod memory;
mod settings;
mod sqlite;

pub use memory::MemoryRuleStore;
pub use settings::{
    load_mode, load_patterns, load_rules, save_mode, save_patterns, save_rules, StoredSettings,
    ALLOW_KEY, DENY_KEY, MODE_KEY,
};
pub use sqlite::SqliteRuleStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Capacity of the change notification channel. Slow subscribers that fall
/// further behind than this see `RecvError::Lagged`.
pub const CHANGE_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Notification that a key's value changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreChange {
    pub key: String,
    /// `None` when the key was previously absent.
    #[serde(default)]
    pub old_value: Option<Value>,
    pub new_value: Value,
}

impl StoreChange {
    /// Whether this change can alter the computed mood.
    pub fn affects_mood(&self) -> bool {
        matches!(self.key.as_str(), MODE_KEY | ALLOW_KEY | DENY_KEY)
    }
}

/// Async key-value store with change notifications.
#[async_trait]
pub trait RuleStore: Send + Sync {
    /// Read a key. `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Write a key. Emits a `StoreChange` when the value differs from the
    /// stored one.
    async fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Subscribe to changes made after this call.
    fn subscribe(&self) -> broadcast::Receiver<StoreChange>;
}

/// Type alias for shared rule store reference.
pub type RuleStoreRef = Arc<dyn RuleStore>;

pub(crate) fn notify(tx: &broadcast::Sender<StoreChange>, change: StoreChange) {
    tracing::debug!(key = %change.key, "store value changed");
    // No subscribers is fine
    let _ = tx.send(change);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_affects_mood() {
        let change = |key: &str| StoreChange {
            key: key.to_string(),
            old_value: None,
            new_value: json!(null),
        };
        assert!(change("mode").affects_mood());
        assert!(change("allow").affects_mood());
        assert!(change("deny").affects_mood());
        assert!(!change("customFaceDataUrl").affects_mood());
    }
}
