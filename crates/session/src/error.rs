use focusmeow_storage::StorageError;
use serde::{Serialize, Serializer};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Invalid pattern: {0:?}")]
    InvalidPattern(String),

    #[error("Event router is not running")]
    RouterClosed,
}

impl Serialize for SessionError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
