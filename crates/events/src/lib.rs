//! Shared message contracts between the authority, renderers and settings
//! surfaces.
//!
//! Every message kind is a variant of a closed enum so handlers match
//! exhaustively instead of dispatching on `type` strings. The serialized
//! shapes are the wire format spoken with the browser side.
//!
//! Also provides the `RendererChannel` trait for best-effort push delivery.

mod channel;

pub use channel::{
    Delivery, DeliveryError, InMemoryRendererChannel, NullRendererChannel, RendererChannel,
    RendererChannelRef,
};

use focusmeow_context::{Mode, Mood, RuleList, RuleSet};
use serde::{Deserialize, Serialize};

/// Opaque browser tab identifier.
pub type TabId = i64;

/// Message pushed from the authority to a tab's renderer.
///
/// Producers: event router
/// Consumers: per-tab renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RendererMessage {
    /// Renderer cycles leisure animations when `mode` is leisure, otherwise
    /// shows `mood` directly.
    MoodChange { mood: Mood, mode: Mode },
    /// Hide or show the pet on this page.
    ToggleHide { hide: bool },
    /// Play the petting reaction.
    Pet,
}

impl RendererMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            RendererMessage::MoodChange { .. } => "MOOD_CHANGE",
            RendererMessage::ToggleHide { .. } => "TOGGLE_HIDE",
            RendererMessage::Pet => "PET",
        }
    }
}

/// Browser tab loading status reported with update events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabStatus {
    Loading,
    Complete,
}

/// Tab lifecycle event observed from the browser.
///
/// Producers: browser bridge
/// Consumers: event router, tab registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TabEvent {
    /// A tab's URL or loading status changed.
    Updated {
        tab_id: TabId,
        url: String,
        status: TabStatus,
        #[serde(default)]
        active: bool,
    },
    /// The user switched to another tab. `url` is filled in when the bridge
    /// could look the tab up; tabs loaded before the host started are
    /// otherwise unknown.
    Activated {
        tab_id: TabId,
        #[serde(default)]
        url: Option<String>,
    },
    /// The tab was closed.
    Removed { tab_id: TabId },
}

impl TabEvent {
    pub fn tab_id(&self) -> TabId {
        match self {
            TabEvent::Updated { tab_id, .. }
            | TabEvent::Activated { tab_id, .. }
            | TabEvent::Removed { tab_id } => *tab_id,
        }
    }
}

/// Request from a settings surface (popup, options page) to the authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Request {
    /// Snapshot of (mode, mood). Never recomputes.
    GetState,
    /// Persist a new mode and recompute before acknowledging.
    SetMode { mode: Mode },
    GetRules,
    AddRule { list: RuleList, pattern: String },
    RemoveRule { list: RuleList, pattern: String },
    /// Restore the curated default lists.
    ResetRules,
    /// Forwarded to the active tab's renderer.
    ToggleHide { hide: bool },
    /// Forwarded to the active tab's renderer.
    Pet,
}

impl Request {
    pub fn kind(&self) -> &'static str {
        match self {
            Request::GetState => "GET_STATE",
            Request::SetMode { .. } => "SET_MODE",
            Request::GetRules => "GET_RULES",
            Request::AddRule { .. } => "ADD_RULE",
            Request::RemoveRule { .. } => "REMOVE_RULE",
            Request::ResetRules => "RESET_RULES",
            Request::ToggleHide { .. } => "TOGGLE_HIDE",
            Request::Pet => "PET",
        }
    }
}

/// Reply to `GET_STATE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub mode: Mode,
    pub mood: Mood,
}

/// Reply to `SET_MODE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeAck {
    pub ok: bool,
    pub mode: Mode,
}

/// Reply to renderer commands forwarded to the active tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardAck {
    pub ok: bool,
    /// False when no active tab had a renderer listening.
    pub delivered: bool,
}

/// Reply to a rejected request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReply {
    pub ok: bool,
    pub error: String,
}

/// Reply to a `Request`. Serialized without a tag so each reply has exactly
/// the shape its request documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    State(StateSnapshot),
    ModeSet(ModeAck),
    Forwarded(ForwardAck),
    Error(ErrorReply),
    // both fields default, so this must stay last
    Rules(RuleSet),
}

impl Response {
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error(ErrorReply {
            ok: false,
            error: message.into(),
        })
    }
}
