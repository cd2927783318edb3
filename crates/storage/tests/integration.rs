//! Integration tests for the storage crate.
//!
//! Uses in-memory SQLite for fast, isolated tests.

use focusmeow_context::{Mode, RuleList, RuleSet};
use focusmeow_storage::{
    load_mode, load_patterns, load_rules, save_mode, save_patterns, RuleStore, SqliteRuleStore,
    StoreChange, StoredSettings, ALLOW_KEY, MODE_KEY,
};
use serde_json::json;

fn create_test_store() -> SqliteRuleStore {
    SqliteRuleStore::open_in_memory().expect("Failed to create in-memory store")
}

// =============================================================================
// Store Initialization Tests
// =============================================================================

mod initialization {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_open_in_memory() {
        let store = SqliteRuleStore::open_in_memory();
        assert!(store.is_ok(), "Should create in-memory store");
    }

    #[test]
    fn test_open_file_store() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("settings.db");

        let store = SqliteRuleStore::open(&db_path);
        assert!(store.is_ok(), "Should create file-based store");
        assert!(db_path.exists(), "Database file should exist");
    }

    #[tokio::test]
    async fn test_reopen_existing_store() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("settings.db");

        {
            let store = SqliteRuleStore::open(&db_path).unwrap();
            save_mode(&store, Mode::Work).await.unwrap();
        }

        {
            let store = SqliteRuleStore::open(&db_path).unwrap();
            let mode = load_mode(&store, Mode::Leisure).await.unwrap();
            assert_eq!(mode, Mode::Work, "Mode should persist after reopen");
        }
    }

    #[test]
    fn test_invalid_path_fails() {
        let result = SqliteRuleStore::open(&PathBuf::from("/nonexistent/path/db.sqlite"));
        assert!(result.is_err(), "Should fail with invalid path");
    }
}

// =============================================================================
// Key-Value Tests
// =============================================================================

mod values {
    use super::*;

    #[tokio::test]
    async fn test_get_missing_key() {
        let store = create_test_store();
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let store = create_test_store();
        store.set("mode", json!("work")).await.unwrap();
        assert_eq!(store.get("mode").await.unwrap(), Some(json!("work")));
    }

    #[tokio::test]
    async fn test_overwrite_keeps_single_row() {
        let store = create_test_store();
        store.set("allow", json!(["a.com"])).await.unwrap();
        store.set("allow", json!(["b.com"])).await.unwrap();

        assert_eq!(store.get("allow").await.unwrap(), Some(json!(["b.com"])));
        assert_eq!(store.keys().unwrap(), vec!["allow".to_string()]);
    }

    #[tokio::test]
    async fn test_typed_defaults_on_empty_store() {
        let store = create_test_store();
        let settings = StoredSettings::load(&store, Mode::Leisure).await.unwrap();
        assert_eq!(settings.mode, Mode::Leisure);
        assert_eq!(settings.rules, RuleSet::defaults());
    }

    #[tokio::test]
    async fn test_replace_whole_list() {
        let store = create_test_store();
        let mut rules = load_rules(&store).await.unwrap();
        rules.add(RuleList::Deny, "reddit.com");
        save_patterns(&store, RuleList::Deny, &rules.deny)
            .await
            .unwrap();

        let deny = load_patterns(&store, RuleList::Deny).await.unwrap();
        assert_eq!(deny, rules.deny);
        assert_eq!(deny.last().map(|p| p.as_str()), Some("reddit.com"));
    }
}

// =============================================================================
// Change Notification Tests
// =============================================================================

mod notifications {
    use super::*;

    #[tokio::test]
    async fn test_change_carries_old_and_new() {
        let store = create_test_store();
        let mut changes = store.subscribe();

        store.set(MODE_KEY, json!("leisure")).await.unwrap();
        store.set(MODE_KEY, json!("work")).await.unwrap();

        let first = changes.recv().await.unwrap();
        assert_eq!(
            first,
            StoreChange {
                key: MODE_KEY.to_string(),
                old_value: None,
                new_value: json!("leisure"),
            }
        );

        let second = changes.recv().await.unwrap();
        assert_eq!(second.old_value, Some(json!("leisure")));
        assert_eq!(second.new_value, json!("work"));
        assert!(second.affects_mood());
    }

    #[tokio::test]
    async fn test_unchanged_write_is_silent() {
        let store = create_test_store();
        store.set(ALLOW_KEY, json!(["a.com"])).await.unwrap();

        let mut changes = store.subscribe();
        store.set(ALLOW_KEY, json!(["a.com"])).await.unwrap();

        assert!(changes.try_recv().is_err(), "No change should be emitted");
    }

    #[tokio::test]
    async fn test_unrelated_key_does_not_affect_mood() {
        let store = create_test_store();
        let mut changes = store.subscribe();

        store.set("customFaceDataUrl", json!("data:,")).await.unwrap();

        let change = changes.recv().await.unwrap();
        assert!(!change.affects_mood());
    }

    #[tokio::test]
    async fn test_write_without_subscribers_succeeds() {
        let store = create_test_store();
        assert!(store.set(MODE_KEY, json!("work")).await.is_ok());
    }
}
