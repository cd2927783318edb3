//! Newline-delimited JSON bridge between the browser side and the router.
//!
//! Each stdin line is one `HostInput`; each stdout line is one `HostOutput`.

use focusmeow_context::is_internal_url;
use focusmeow_events::{
    DeliveryError, RendererChannel, RendererMessage, Request, Response, TabEvent, TabId,
};
use focusmeow_session::{RouterHandle, TabProvider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

/// One line read from the browser side.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HostInput {
    Tab { event: TabEvent },
    Request { id: u64, request: Request },
}

/// One line written back.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HostOutput {
    Deliver { tab_id: TabId, message: RendererMessage },
    Response { id: u64, response: Response },
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Option<Result<HostInput, serde_json::Error>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    Some(serde_json::from_str(line))
}

/// Renderer channel that writes deliveries to stdout.
///
/// Only tabs the registry knows about, showing a page a content script can
/// run on, count as having a renderer.
pub struct StdioRenderer {
    out: mpsc::UnboundedSender<HostOutput>,
    tabs: Arc<dyn TabProvider>,
}

impl StdioRenderer {
    pub fn new(out: mpsc::UnboundedSender<HostOutput>, tabs: Arc<dyn TabProvider>) -> Self {
        Self { out, tabs }
    }
}

impl RendererChannel for StdioRenderer {
    fn deliver(&self, tab_id: TabId, message: &RendererMessage) -> Result<(), DeliveryError> {
        match self.tabs.tab(tab_id) {
            Some(tab) if !is_internal_url(&tab.url) => {}
            _ => return Err(DeliveryError::NoRenderer(tab_id)),
        }
        self.out
            .send(HostOutput::Deliver {
                tab_id,
                message: message.clone(),
            })
            .map_err(|_| DeliveryError::Closed)
    }
}

/// Feed stdin lines to the router until EOF.
///
/// Requests are answered on their own tasks so a slow store never stalls
/// the reader.
pub async fn read_inputs<R>(
    reader: R,
    handle: RouterHandle,
    out: mpsc::UnboundedSender<HostOutput>,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let input = match parse_line(&line) {
            None => continue,
            Some(Ok(input)) => input,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "ignoring malformed input line");
                continue;
            }
        };

        match input {
            HostInput::Tab { event } => handle.tab_event(event).await?,
            HostInput::Request { id, request } => {
                let handle = handle.clone();
                let out = out.clone();
                tokio::spawn(async move {
                    let response = handle
                        .request(request)
                        .await
                        .unwrap_or_else(|e| Response::error(e.to_string()));
                    if out.send(HostOutput::Response { id, response }).is_err() {
                        tracing::debug!(id, "output closed before reply");
                    }
                });
            }
        }
    }
    tracing::info!("input closed");
    Ok(())
}

/// Serialize outputs one per line until every sender is gone.
pub async fn write_outputs<W>(
    mut writer: W,
    mut rx: mpsc::UnboundedReceiver<HostOutput>,
) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(output) = rx.recv().await {
        let mut line = serde_json::to_vec(&output)?;
        line.push(b'\n');
        writer.write_all(&line).await?;
        writer.flush().await?;
    }
    Ok(())
}
