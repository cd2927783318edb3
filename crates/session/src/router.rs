//! Event router - the authority's reactor loop.
//!
//! Receives tab lifecycle events, store changes and surface requests,
//! recomputes the mood through `SessionState` and pushes the result to the
//! active tab's renderer.
//!
//! Every input is handled on its own task, so a slow store read never holds
//! up the next event. Two recomputations for the same tab may therefore
//! finish out of order; renderers keep whichever message arrives last.

use crate::error::{Result, SessionError};
use crate::state::SessionState;
use crate::tabs::{Tab, TabProvider};
use focusmeow_events::{
    ForwardAck, ModeAck, RendererChannelRef, RendererMessage, Request, Response, StateSnapshot,
    TabEvent, TabId, TabStatus,
};
use focusmeow_storage::StoreChange;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Default capacity of the router's input queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Inputs buffered before `RouterHandle` senders wait.
    pub queue_capacity: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// One unit of work for the router.
#[derive(Debug)]
pub enum RouterInput {
    Tab(TabEvent),
    StoreChanged(StoreChange),
    Request {
        request: Request,
        reply: oneshot::Sender<Response>,
    },
}

pub struct EventRouter {
    session: Arc<SessionState>,
    tabs: Arc<dyn TabProvider>,
    renderer: RendererChannelRef,
}

impl EventRouter {
    pub fn new(
        session: Arc<SessionState>,
        tabs: Arc<dyn TabProvider>,
        renderer: RendererChannelRef,
    ) -> Self {
        Self {
            session,
            tabs,
            renderer,
        }
    }

    pub fn session(&self) -> &Arc<SessionState> {
        &self.session
    }

    /// Start the reactor. The loop runs until every `RouterHandle` is dropped.
    pub fn start(self: Arc<Self>, config: RouterConfig) -> (RouterHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        // Subscribe before returning so no change written after start is missed
        let changes = self.session.store().subscribe();
        let task = tokio::spawn(self.run(rx, changes));
        (RouterHandle { tx }, task)
    }

    async fn run(
        self: Arc<Self>,
        mut inputs: mpsc::Receiver<RouterInput>,
        mut changes: tokio::sync::broadcast::Receiver<StoreChange>,
    ) {
        tracing::info!("event router started");
        let mut store_open = true;

        loop {
            tokio::select! {
                input = inputs.recv() => match input {
                    Some(input) => self.dispatch(input),
                    None => break,
                },
                change = changes.recv(), if store_open => match change {
                    Ok(change) => self.dispatch(RouterInput::StoreChanged(change)),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "store changes lagged, recomputing active tab");
                        let router = Arc::clone(&self);
                        tokio::spawn(async move { router.refresh_active_tab().await });
                    }
                    Err(RecvError::Closed) => {
                        tracing::debug!("store change stream closed");
                        store_open = false;
                    }
                },
            }
        }

        tracing::info!("event router stopped");
    }

    /// Hand an input to its own task. Tab events are mirrored into the tab
    /// provider first, in arrival order.
    fn dispatch(self: &Arc<Self>, input: RouterInput) {
        let router = Arc::clone(self);
        match input {
            RouterInput::Tab(event) => {
                self.tabs.observe(&event);
                tokio::spawn(async move { router.handle_tab_event(&event).await });
            }
            RouterInput::StoreChanged(change) => {
                tokio::spawn(async move { router.handle_store_change(&change).await });
            }
            RouterInput::Request { request, reply } => {
                tokio::spawn(async move {
                    let response = router.handle_request(request).await;
                    if reply.send(response).is_err() {
                        tracing::debug!("requester went away before the reply");
                    }
                });
            }
        }
    }

    pub async fn handle_tab_event(&self, event: &TabEvent) {
        match event {
            TabEvent::Updated {
                tab_id,
                url,
                status: TabStatus::Complete,
                active: true,
            } => {
                self.recompute_and_push(&Tab::new(*tab_id, url.clone()))
                    .await;
            }
            TabEvent::Updated { .. } => {}
            TabEvent::Activated { tab_id, url } => {
                let tab = match url {
                    Some(url) => Some(Tab::new(*tab_id, url.clone())),
                    None => self.tabs.tab(*tab_id),
                };
                match tab {
                    Some(tab) => self.recompute_and_push(&tab).await,
                    None => {
                        tracing::debug!(tab_id, "activated tab has no known url");
                        let update = self.session.activate_unknown_tab(*tab_id).await;
                        self.push(update.tab_id, &update.message());
                    }
                }
            }
            TabEvent::Removed { tab_id } => {
                tracing::debug!(tab_id, "tab removed");
            }
        }
    }

    pub async fn handle_store_change(&self, change: &StoreChange) {
        if !change.affects_mood() {
            return;
        }
        tracing::debug!(key = %change.key, "settings changed");
        self.session.apply_store_change(change).await;
        self.refresh_active_tab().await;
    }

    pub async fn handle_request(&self, request: Request) -> Response {
        tracing::debug!(kind = request.kind(), "surface request");
        let result = match request {
            Request::GetState => Ok(Response::State(self.session.snapshot().await)),
            Request::SetMode { mode } => self.set_mode(mode).await,
            Request::GetRules => self.session.rules().await.map(Response::Rules),
            Request::AddRule { list, pattern } => {
                self.session.add_rule(list, &pattern).await.map(Response::Rules)
            }
            Request::RemoveRule { list, pattern } => self
                .session
                .remove_rule(list, &pattern)
                .await
                .map(Response::Rules),
            Request::ResetRules => self.session.reset_rules().await.map(Response::Rules),
            Request::ToggleHide { hide } => Ok(self.forward(RendererMessage::ToggleHide { hide })),
            Request::Pet => Ok(self.forward(RendererMessage::Pet)),
        };

        result.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "surface request rejected");
            Response::error(e.to_string())
        })
    }

    async fn set_mode(&self, mode: focusmeow_context::Mode) -> Result<Response> {
        let active = self.tabs.active_tab();
        let update = self
            .session
            .set_mode(mode, active.as_ref().map(|t| (t.id, t.url.as_str())))
            .await?;
        if let Some(update) = update {
            self.push(update.tab_id, &update.message());
        }
        let StateSnapshot { mode, .. } = self.session.snapshot().await;
        Ok(Response::ModeSet(ModeAck { ok: true, mode }))
    }

    async fn refresh_active_tab(&self) {
        match self.tabs.active_tab() {
            Some(tab) => self.recompute_and_push(&tab).await,
            None => self.session.clear_active_tab().await,
        }
    }

    async fn recompute_and_push(&self, tab: &Tab) {
        match self.session.recompute_for_tab(tab.id, &tab.url).await {
            Ok(update) => {
                self.push(update.tab_id, &update.message());
            }
            Err(e) => {
                tracing::warn!(tab_id = tab.id, error = %e, "recompute failed, keeping previous mood");
            }
        }
    }

    fn forward(&self, message: RendererMessage) -> Response {
        let delivered = match self.tabs.active_tab() {
            Some(tab) => self.push(tab.id, &message),
            None => false,
        };
        Response::Forwarded(ForwardAck {
            ok: true,
            delivered,
        })
    }

    /// Best-effort delivery. A tab without a renderer is normal, not a failure.
    fn push(&self, tab_id: TabId, message: &RendererMessage) -> bool {
        match self.renderer.deliver(tab_id, message) {
            Ok(()) => {
                tracing::debug!(tab_id, kind = message.kind(), "pushed to renderer");
                true
            }
            Err(e) => {
                tracing::trace!(tab_id, reason = %e, "no renderer to push to");
                false
            }
        }
    }
}

impl std::fmt::Debug for EventRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRouter")
            .field("session", &self.session)
            .field("tabs", &"TabProvider")
            .field("renderer", &"RendererChannelRef")
            .finish()
    }
}

/// Cloneable sender side of a running router.
#[derive(Debug, Clone)]
pub struct RouterHandle {
    tx: mpsc::Sender<RouterInput>,
}

impl RouterHandle {
    /// Queue a tab lifecycle event.
    pub async fn tab_event(&self, event: TabEvent) -> Result<()> {
        self.tx
            .send(RouterInput::Tab(event))
            .await
            .map_err(|_| SessionError::RouterClosed)
    }

    /// Send a request and wait for its reply.
    pub async fn request(&self, request: Request) -> Result<Response> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(RouterInput::Request { request, reply })
            .await
            .map_err(|_| SessionError::RouterClosed)?;
        rx.await.map_err(|_| SessionError::RouterClosed)
    }

    pub async fn get_state(&self) -> Result<Response> {
        self.request(Request::GetState).await
    }

    pub async fn set_mode(&self, mode: focusmeow_context::Mode) -> Result<Response> {
        self.request(Request::SetMode { mode }).await
    }
}
