//! The FocusMeow authority: session state and event routing.
//!
//! # Architecture
//!
//! ```text
//!  tab events ──────┐
//!  store changes ───┼──▶ EventRouter ──▶ SessionState ──▶ compute_mood
//!  surface requests ┘        │                 │
//!                            │                 └──▶ RuleStore (re-read every time)
//!                            ▼
//!                 RendererChannel (best effort, per tab)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use focusmeow_session::{EventRouter, RouterConfig, SessionState, TabRegistry};
//! use std::sync::Arc;
//!
//! let session = Arc::new(SessionState::new(store));
//! session.init().await?;
//! let router = Arc::new(EventRouter::new(session, Arc::new(TabRegistry::new()), renderer));
//! let (handle, _task) = router.start(RouterConfig::default());
//! let state = handle.get_state().await?;
//! ```

mod error;
mod router;
mod state;
mod tabs;

pub use error::{Result, SessionError};
pub use router::{EventRouter, RouterConfig, RouterHandle, RouterInput, DEFAULT_QUEUE_CAPACITY};
pub use state::{MoodUpdate, Session, SessionState};
pub use tabs::{NullTabProvider, Tab, TabProvider, TabRegistry};
