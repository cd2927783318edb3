//! Renderer channel abstraction for per-tab push delivery.
//!
//! Decouples the router from whatever transport reaches the browser, so the
//! core can be tested without a browser and hosted over stdio.

use crate::{RendererMessage, TabId};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Why a push did not reach a renderer.
///
/// Both cases mean "no such destination". Callers swallow them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("tab {0} has no renderer listening")]
    NoRenderer(TabId),

    #[error("renderer channel closed")]
    Closed,
}

/// Trait for pushing messages to a tab's renderer.
///
/// Delivery is best-effort and must not block: either the message is handed
/// to the transport or an error is returned immediately.
pub trait RendererChannel: Send + Sync {
    fn deliver(&self, tab_id: TabId, message: &RendererMessage) -> Result<(), DeliveryError>;
}

/// Type alias for shared renderer channel reference.
pub type RendererChannelRef = Arc<dyn RendererChannel>;

/// A captured delivery from InMemoryRendererChannel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub tab_id: TabId,
    pub message: RendererMessage,
}

/// In-memory renderer channel for testing.
///
/// Every tab has a renderer unless it was detached; deliveries to detached
/// tabs fail with `NoRenderer` and are not captured.
#[derive(Default)]
pub struct InMemoryRendererChannel {
    deliveries: Mutex<Vec<Delivery>>,
    detached: Mutex<HashSet<TabId>>,
}

impl InMemoryRendererChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a tab without a renderer (closed, internal page, not loaded).
    pub fn detach(&self, tab_id: TabId) {
        self.detached.lock().unwrap().insert(tab_id);
    }

    pub fn attach(&self, tab_id: TabId) {
        self.detached.lock().unwrap().remove(&tab_id);
    }

    /// Get all captured deliveries.
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().unwrap().clone()
    }

    /// Get deliveries for a specific tab.
    pub fn deliveries_for(&self, tab_id: TabId) -> Vec<RendererMessage> {
        self.deliveries
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.tab_id == tab_id)
            .map(|d| d.message.clone())
            .collect()
    }

    /// Latest message delivered to `tab_id`, which is what its renderer shows.
    pub fn last_for(&self, tab_id: TabId) -> Option<RendererMessage> {
        self.deliveries
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|d| d.tab_id == tab_id)
            .map(|d| d.message.clone())
    }

    pub fn clear(&self) {
        self.deliveries.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.deliveries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.deliveries.lock().unwrap().is_empty()
    }
}

impl RendererChannel for InMemoryRendererChannel {
    fn deliver(&self, tab_id: TabId, message: &RendererMessage) -> Result<(), DeliveryError> {
        if self.detached.lock().unwrap().contains(&tab_id) {
            return Err(DeliveryError::NoRenderer(tab_id));
        }
        self.deliveries.lock().unwrap().push(Delivery {
            tab_id,
            message: message.clone(),
        });
        Ok(())
    }
}

/// No-op channel that accepts and discards every message.
pub struct NullRendererChannel;

impl RendererChannel for NullRendererChannel {
    fn deliver(&self, _tab_id: TabId, _message: &RendererMessage) -> Result<(), DeliveryError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use focusmeow_context::{Mode, Mood};

    fn mood_change(mood: Mood) -> RendererMessage {
        RendererMessage::MoodChange {
            mood,
            mode: Mode::Work,
        }
    }

    #[test]
    fn test_in_memory_channel() {
        let channel = InMemoryRendererChannel::new();

        channel.deliver(1, &mood_change(Mood::Focused)).unwrap();
        channel.deliver(2, &RendererMessage::Pet).unwrap();
        channel.deliver(1, &mood_change(Mood::Distracted)).unwrap();

        assert_eq!(channel.len(), 3);
        assert_eq!(channel.deliveries_for(1).len(), 2);
        assert_eq!(channel.last_for(1), Some(mood_change(Mood::Distracted)));
        assert!(channel.deliveries_for(9).is_empty());
    }

    #[test]
    fn test_detached_tab_rejects() {
        let channel = InMemoryRendererChannel::new();
        channel.detach(4);

        let result = channel.deliver(4, &RendererMessage::Pet);
        assert_eq!(result, Err(DeliveryError::NoRenderer(4)));
        assert!(channel.is_empty());

        channel.attach(4);
        assert!(channel.deliver(4, &RendererMessage::Pet).is_ok());
    }

    #[test]
    fn test_clear() {
        let channel = InMemoryRendererChannel::new();
        channel.deliver(1, &RendererMessage::Pet).unwrap();
        channel.clear();
        assert!(channel.is_empty());
    }

    #[test]
    fn test_null_channel() {
        let channel = NullRendererChannel;
        // Should not fail
        assert!(channel.deliver(1, &RendererMessage::Pet).is_ok());
    }
}
