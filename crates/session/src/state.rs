//! Authoritative in-memory session.
//!
//! The session is a cache over the rule store: every field is either
//! persisted (mode) or recomputed from persisted state (mood), so a fresh
//! `init()` after a host restart reproduces it.

use crate::error::{Result, SessionError};
use focusmeow_context::{compute_mood_with, CompiledRules, Mode, Mood, RuleList, RuleSet};
use focusmeow_events::{RendererMessage, StateSnapshot, TabId};
use focusmeow_storage::{
    load_rules, save_mode, save_patterns, save_rules, RuleStoreRef, StoreChange, StoredSettings,
    MODE_KEY,
};
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;

/// The (mode, mood, active tab) triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Session {
    pub mode: Mode,
    pub current_mood: Mood,
    pub active_tab_id: Option<TabId>,
}

/// Result of a recomputation, ready to push to a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoodUpdate {
    pub tab_id: TabId,
    pub mood: Mood,
    pub mode: Mode,
}

impl MoodUpdate {
    pub fn message(&self) -> RendererMessage {
        RendererMessage::MoodChange {
            mood: self.mood,
            mode: self.mode,
        }
    }
}

pub struct SessionState {
    store: RuleStoreRef,
    session: RwLock<Session>,
    /// Last rules read from the store, with their compiled form.
    compiled: Mutex<Option<(RuleSet, Arc<CompiledRules>)>>,
}

impl SessionState {
    pub fn new(store: RuleStoreRef) -> Self {
        Self {
            store,
            session: RwLock::new(Session::default()),
            compiled: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &RuleStoreRef {
        &self.store
    }

    /// Rebuild the session from the store and write the effective settings
    /// back, so the store describes itself after first run. Lists that were
    /// missing or undecodable are replaced by their defaults.
    pub async fn init(&self) -> Result<Session> {
        let settings = StoredSettings::load(self.store.as_ref(), Mode::default()).await?;

        if self.store.get(MODE_KEY).await?.is_none() {
            save_mode(self.store.as_ref(), settings.mode).await?;
        }
        save_rules(self.store.as_ref(), &settings.rules).await?;

        let session = Session {
            mode: settings.mode,
            current_mood: Mood::Idle,
            active_tab_id: None,
        };
        *self.session.write().await = session;

        tracing::info!(
            mode = %settings.mode,
            allow = settings.rules.allow.len(),
            deny = settings.rules.deny.len(),
            "session initialized"
        );
        Ok(session)
    }

    pub async fn session(&self) -> Session {
        *self.session.read().await
    }

    /// Current (mode, mood) without recomputing.
    pub async fn snapshot(&self) -> StateSnapshot {
        let session = self.session.read().await;
        StateSnapshot {
            mode: session.mode,
            mood: session.current_mood,
        }
    }

    /// Re-read mode and rules from the store and resolve the mood for `url`.
    pub async fn recompute_for_tab(&self, tab_id: TabId, url: &str) -> Result<MoodUpdate> {
        let fallback_mode = self.session.read().await.mode;
        let settings = StoredSettings::load(self.store.as_ref(), fallback_mode).await?;
        let compiled = self.compiled_rules(&settings.rules);
        let mood = compute_mood_with(url, settings.mode, &compiled);

        *self.session.write().await = Session {
            mode: settings.mode,
            current_mood: mood,
            active_tab_id: Some(tab_id),
        };

        tracing::debug!(tab_id, mood = %mood, mode = %settings.mode, "mood recomputed");
        Ok(MoodUpdate {
            tab_id,
            mood,
            mode: settings.mode,
        })
    }

    /// Compiled form of `rules`, reused until the stored rules change.
    fn compiled_rules(&self, rules: &RuleSet) -> Arc<CompiledRules> {
        let Ok(mut cache) = self.compiled.lock() else {
            return Arc::new(rules.compile());
        };
        if let Some((cached, compiled)) = cache.as_ref() {
            if cached == rules {
                return Arc::clone(compiled);
            }
        }
        let compiled = Arc::new(rules.compile());
        *cache = Some((rules.clone(), Arc::clone(&compiled)));
        tracing::debug!(
            allow = rules.allow.len(),
            deny = rules.deny.len(),
            "rule patterns compiled"
        );
        compiled
    }

    /// No page is active: the pet is neutral.
    pub async fn clear_active_tab(&self) {
        let mut session = self.session.write().await;
        session.active_tab_id = None;
        session.current_mood = Mood::Idle;
    }

    /// The user switched to a tab whose page is unknown. The pet stays
    /// neutral until that tab reports a URL.
    pub async fn activate_unknown_tab(&self, tab_id: TabId) -> MoodUpdate {
        let mut session = self.session.write().await;
        session.active_tab_id = Some(tab_id);
        session.current_mood = Mood::Idle;
        MoodUpdate {
            tab_id,
            mood: Mood::Idle,
            mode: session.mode,
        }
    }

    /// Persist `mode`, then update memory. A failed write leaves the session
    /// untouched.
    pub async fn persist_mode(&self, mode: Mode) -> Result<()> {
        save_mode(self.store.as_ref(), mode).await?;
        let mut session = self.session.write().await;
        if session.mode != mode {
            tracing::info!(from = %session.mode, to = %mode, "mode changed");
        }
        session.mode = mode;
        Ok(())
    }

    /// Persist `mode` and recompute for the active tab, if any.
    ///
    /// Returns the update to push, or `None` when there is no active tab or
    /// the recomputation could not read the store.
    pub async fn set_mode(
        &self,
        mode: Mode,
        active: Option<(TabId, &str)>,
    ) -> Result<Option<MoodUpdate>> {
        self.persist_mode(mode).await?;

        let Some((tab_id, url)) = active else {
            self.clear_active_tab().await;
            return Ok(None);
        };

        match self.recompute_for_tab(tab_id, url).await {
            Ok(update) => Ok(Some(update)),
            Err(e) => {
                tracing::warn!(tab_id, error = %e, "recompute after mode switch failed");
                Ok(None)
            }
        }
    }

    /// Mirror a mode written by another surface.
    pub async fn apply_store_change(&self, change: &StoreChange) {
        if change.key != MODE_KEY {
            return;
        }
        match serde_json::from_value::<Mode>(change.new_value.clone()) {
            Ok(mode) => self.session.write().await.mode = mode,
            Err(e) => tracing::warn!(error = %e, "ignoring undecodable mode change"),
        }
    }

    pub async fn rules(&self) -> Result<RuleSet> {
        Ok(load_rules(self.store.as_ref()).await?)
    }

    /// Append a pattern to one list and write the whole list back.
    /// Duplicates are accepted without a write.
    pub async fn add_rule(&self, list: RuleList, pattern: &str) -> Result<RuleSet> {
        if pattern.trim().is_empty() {
            return Err(SessionError::InvalidPattern(pattern.to_string()));
        }
        let mut rules = self.rules().await?;
        if rules.add(list, pattern) {
            save_patterns(self.store.as_ref(), list, rules.list(list)).await?;
            tracing::info!(list = %list, pattern = pattern.trim(), "rule added");
        }
        Ok(rules)
    }

    /// Remove a pattern by value and write the whole list back.
    pub async fn remove_rule(&self, list: RuleList, pattern: &str) -> Result<RuleSet> {
        let mut rules = self.rules().await?;
        if rules.remove(list, pattern) {
            save_patterns(self.store.as_ref(), list, rules.list(list)).await?;
            tracing::info!(list = %list, pattern = pattern.trim(), "rule removed");
        }
        Ok(rules)
    }

    /// Restore the curated default lists.
    pub async fn reset_rules(&self) -> Result<RuleSet> {
        let rules = RuleSet::defaults();
        save_rules(self.store.as_ref(), &rules).await?;
        tracing::info!("rules reset to defaults");
        Ok(rules)
    }
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionState")
            .field("store", &"RuleStoreRef")
            .field("session", &self.session)
            .finish()
    }
}
