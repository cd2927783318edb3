//! Host configuration from the environment.

use focusmeow_session::DEFAULT_QUEUE_CAPACITY;
use std::path::PathBuf;

/// Path to the settings database, or `:memory:`.
pub const DB_ENV: &str = "FOCUSMEOW_DB";

/// Router input queue capacity.
pub const QUEUE_CAPACITY_ENV: &str = "FOCUSMEOW_QUEUE_CAPACITY";

const MEMORY_DB: &str = ":memory:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    Memory,
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    pub store: StoreLocation,
    pub queue_capacity: usize,
}

impl HostConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(get: impl Fn(&str) -> Option<String>) -> Self {
        let store = match get(DB_ENV).map(|v| v.trim().to_string()) {
            Some(v) if v == MEMORY_DB => StoreLocation::Memory,
            Some(v) if !v.is_empty() => StoreLocation::File(PathBuf::from(v)),
            _ => match default_db_path() {
                Some(path) => StoreLocation::File(path),
                None => {
                    tracing::warn!("no data directory available, settings will not persist");
                    StoreLocation::Memory
                }
            },
        };

        let queue_capacity = match get(QUEUE_CAPACITY_ENV) {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    tracing::warn!(value = %raw, "invalid {QUEUE_CAPACITY_ENV}, using default");
                    DEFAULT_QUEUE_CAPACITY
                }
            },
            None => DEFAULT_QUEUE_CAPACITY,
        };

        Self {
            store,
            queue_capacity,
        }
    }
}

/// `<data_local_dir>/focusmeow/settings.db`
pub fn default_db_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("focusmeow").join("settings.db"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> HostConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        HostConfig::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_memory_store() {
        assert_eq!(config(&[(DB_ENV, ":memory:")]).store, StoreLocation::Memory);
    }

    #[test]
    fn test_explicit_path() {
        assert_eq!(
            config(&[(DB_ENV, "/tmp/meow.db")]).store,
            StoreLocation::File(PathBuf::from("/tmp/meow.db"))
        );
    }

    #[test]
    fn test_default_path_when_unset() {
        let cfg = config(&[]);
        match default_db_path() {
            Some(path) => assert_eq!(cfg.store, StoreLocation::File(path)),
            None => assert_eq!(cfg.store, StoreLocation::Memory),
        }
        assert_eq!(cfg.queue_capacity, DEFAULT_QUEUE_CAPACITY);
    }

    #[test]
    fn test_queue_capacity() {
        assert_eq!(config(&[(QUEUE_CAPACITY_ENV, "8")]).queue_capacity, 8);
        assert_eq!(
            config(&[(QUEUE_CAPACITY_ENV, "0")]).queue_capacity,
            DEFAULT_QUEUE_CAPACITY
        );
        assert_eq!(
            config(&[(QUEUE_CAPACITY_ENV, "lots")]).queue_capacity,
            DEFAULT_QUEUE_CAPACITY
        );
    }
}
