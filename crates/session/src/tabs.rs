//! Tab lookup for the event router.
//!
//! The authority never owns tabs. A `TabProvider` answers "which tab is
//! active" and "what URL does this tab show" from whatever the browser last
//! reported.

use focusmeow_events::{TabEvent, TabId};
use std::collections::HashMap;
use std::sync::Mutex;

/// A browser tab as last observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub id: TabId,
    pub url: String,
}

impl Tab {
    pub fn new(id: TabId, url: impl Into<String>) -> Self {
        Self { id, url: url.into() }
    }
}

/// Provider for tab state.
pub trait TabProvider: Send + Sync {
    /// The tab currently focused in the current window.
    fn active_tab(&self) -> Option<Tab>;

    /// Look up a tab by id. `None` when it has been closed.
    fn tab(&self, tab_id: TabId) -> Option<Tab>;

    /// Called by the router, in arrival order, before an event is handled.
    fn observe(&self, _event: &TabEvent) {}
}

#[derive(Debug, Default)]
struct RegistryInner {
    tabs: HashMap<TabId, Tab>,
    active: Option<TabId>,
}

/// Tab provider built from the lifecycle events themselves.
#[derive(Debug, Default)]
pub struct TabRegistry {
    inner: Mutex<RegistryInner>,
}

impl TabRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|i| i.tabs.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TabProvider for TabRegistry {
    fn active_tab(&self) -> Option<Tab> {
        let inner = self.inner.lock().ok()?;
        inner.active.and_then(|id| inner.tabs.get(&id).cloned())
    }

    fn tab(&self, tab_id: TabId) -> Option<Tab> {
        self.inner.lock().ok()?.tabs.get(&tab_id).cloned()
    }

    fn observe(&self, event: &TabEvent) {
        let Ok(mut inner) = self.inner.lock() else {
            tracing::warn!("tab registry lock poisoned, dropping event");
            return;
        };

        match event {
            TabEvent::Updated {
                tab_id,
                url,
                active,
                ..
            } => {
                inner.tabs.insert(*tab_id, Tab::new(*tab_id, url.clone()));
                if *active {
                    inner.active = Some(*tab_id);
                }
            }
            TabEvent::Activated { tab_id, url } => {
                if let Some(url) = url {
                    inner.tabs.insert(*tab_id, Tab::new(*tab_id, url.clone()));
                }
                inner.active = Some(*tab_id);
            }
            TabEvent::Removed { tab_id } => {
                inner.tabs.remove(tab_id);
                if inner.active == Some(*tab_id) {
                    inner.active = None;
                }
            }
        }
    }
}

/// Provider with no tabs at all.
pub struct NullTabProvider;

impl TabProvider for NullTabProvider {
    fn active_tab(&self) -> Option<Tab> {
        None
    }

    fn tab(&self, _tab_id: TabId) -> Option<Tab> {
        None
    }
}
