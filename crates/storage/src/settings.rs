//! Typed access to the mood-related keys.
//!
//! Absent keys fall back to documented defaults. Values that are present
//! but do not decode are treated as absent and logged; only store failures
//! are returned as errors.

use crate::{Result, RuleStore};
use focusmeow_context::{Mode, Pattern, RuleList, RuleSet};
use serde::de::DeserializeOwned;

pub const MODE_KEY: &str = "mode";
pub const ALLOW_KEY: &str = "allow";
pub const DENY_KEY: &str = "deny";

async fn load_or<T>(store: &dyn RuleStore, key: &str, default: T) -> Result<T>
where
    T: DeserializeOwned + Send,
{
    let Some(value) = store.get(key).await? else {
        return Ok(default);
    };
    match serde_json::from_value(value) {
        Ok(decoded) => Ok(decoded),
        Err(e) => {
            tracing::warn!(key, error = %e, "stored value does not decode, using default");
            Ok(default)
        }
    }
}

pub async fn load_mode(store: &dyn RuleStore, default: Mode) -> Result<Mode> {
    load_or(store, MODE_KEY, default).await
}

pub async fn save_mode(store: &dyn RuleStore, mode: Mode) -> Result<()> {
    store.set(MODE_KEY, serde_json::to_value(mode)?).await
}

/// Load one list, falling back to its curated default.
pub async fn load_patterns(store: &dyn RuleStore, list: RuleList) -> Result<Vec<Pattern>> {
    let default = RuleSet::defaults().list(list).to_vec();
    load_or(store, list.key(), default).await
}

/// Replace one list wholesale.
pub async fn save_patterns(
    store: &dyn RuleStore,
    list: RuleList,
    patterns: &[Pattern],
) -> Result<()> {
    store.set(list.key(), serde_json::to_value(patterns)?).await
}

pub async fn load_rules(store: &dyn RuleStore) -> Result<RuleSet> {
    let allow = load_patterns(store, RuleList::Allow).await?;
    let deny = load_patterns(store, RuleList::Deny).await?;
    Ok(RuleSet::new(allow, deny))
}

pub async fn save_rules(store: &dyn RuleStore, rules: &RuleSet) -> Result<()> {
    save_patterns(store, RuleList::Allow, &rules.allow).await?;
    save_patterns(store, RuleList::Deny, &rules.deny).await
}

/// Everything the authority needs, read in one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSettings {
    pub mode: Mode,
    pub rules: RuleSet,
}

impl StoredSettings {
    /// `fallback_mode` is used when the store has no mode yet.
    pub async fn load(store: &dyn RuleStore, fallback_mode: Mode) -> Result<Self> {
        Ok(Self {
            mode: load_mode(store, fallback_mode).await?,
            rules: load_rules(store).await?,
        })
    }
}
