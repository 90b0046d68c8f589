//! Messages exchanged with the host process and the transports that carry them.
//!
//! Outbound requests are fire-and-forget; whatever the host decides arrives
//! later as an independent [`HostMessage::Result`]. Nothing correlates the two.

use crate::catalog::{Category, PanelData};
use crate::value::EntryValue;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{
    io::{BufRead, Write},
    sync::mpsc::Sender,
    thread,
};

/// A message pushed by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum HostMessage {
    Open,
    /// `None` when the host sent no snapshot; the current one is kept.
    Populate(Option<PanelData>),
    Result(ActionResult),
}

/// `{ "type": ..., "data": ... }` as it arrives, before the payload is interpreted.
#[derive(Deserialize)]
struct RawMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ActionResult {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl ActionResult {
    /// Toast text, with the generic wording when the host sent no message.
    pub fn display_text(&self) -> String {
        let (icon, fallback) = if self.ok {
            ("\u{2705}", "Done")
        } else {
            ("\u{274C}", "Error")
        };
        let message = self
            .message
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(fallback);
        format!("{icon} {message}")
    }
}

impl HostMessage {
    /// Parses one inbound message. Unknown types and malformed payloads yield `None`.
    pub fn parse(text: &str) -> Option<HostMessage> {
        let raw = match serde_json::from_str::<RawMessage>(text) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!("ignoring host message: {err}");
                return None;
            }
        };
        let data = raw.data.filter(|d| !d.is_null());

        let msg = match raw.kind.as_str() {
            // Any payload on `open` is ignored.
            "open" => Ok(HostMessage::Open),
            "populate" | "allData" => data
                .map(serde_json::from_value::<PanelData>)
                .transpose()
                .map(HostMessage::Populate),
            "result" => data
                .map(serde_json::from_value::<ActionResult>)
                .transpose()
                .map(|r| HostMessage::Result(r.unwrap_or_default())),
            other => {
                tracing::warn!("ignoring unknown host message type {other:?}");
                return None;
            }
        };

        match msg {
            Ok(msg) => Some(msg),
            Err(err) => {
                tracing::warn!("ignoring malformed {:?} message: {err}", raw.kind);
                None
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Add,
    Update,
    Remove,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Add => "add",
            Action::Update => "update",
            Action::Remove => "remove",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformRequest {
    pub entity: Category,
    pub action: Action,
    pub key: String,
    /// Always present on the wire; `null` for removals.
    pub value: Option<EntryValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutboundRequest {
    FetchAll,
    Perform(PerformRequest),
    Close,
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    name: &'a str,
    data: T,
}

#[derive(Serialize)]
struct Empty {}

impl OutboundRequest {
    pub fn name(&self) -> &'static str {
        match self {
            OutboundRequest::FetchAll => "fetchAll",
            OutboundRequest::Perform(_) => "perform",
            OutboundRequest::Close => "close",
        }
    }

    /// One line of the stdio protocol: `{"name": ..., "data": ...}`.
    pub fn to_wire_line(&self) -> serde_json::Result<String> {
        let name = self.name();
        match self {
            OutboundRequest::Perform(req) => serde_json::to_string(&Envelope { name, data: req }),
            OutboundRequest::FetchAll | OutboundRequest::Close => {
                serde_json::to_string(&Envelope { name, data: Empty {} })
            }
        }
    }
}

/// Anything that can carry requests to the host.
pub trait HostBridge {
    fn send(&mut self, request: &OutboundRequest) -> anyhow::Result<()>;
}

/// Writes each request as a JSON line. The host reads the panel's stdout.
pub struct StdioBridge<W: Write> {
    out: W,
}

impl<W: Write> StdioBridge<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl StdioBridge<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> HostBridge for StdioBridge<W> {
    fn send(&mut self, request: &OutboundRequest) -> anyhow::Result<()> {
        let line = request
            .to_wire_line()
            .with_context(|| format!("encoding {} request", request.name()))?;
        writeln!(self.out, "{line}").context("writing to host")?;
        self.out.flush().context("flushing host pipe")?;
        tracing::info!(request = request.name(), "sent to host");
        Ok(())
    }
}

/// Requests kept by a [`MemoryBridge`]; older ones are dropped first.
pub const MEMORY_BRIDGE_CAPACITY: usize = 256;

/// Keeps the most recent requests in memory; used when no host is attached and in tests.
#[derive(Debug, Default)]
pub struct MemoryBridge {
    pub sent: Vec<OutboundRequest>,
}

impl HostBridge for MemoryBridge {
    fn send(&mut self, request: &OutboundRequest) -> anyhow::Result<()> {
        tracing::info!(request = request.name(), "no host attached, request recorded");
        if self.sent.len() >= MEMORY_BRIDGE_CAPACITY {
            self.sent.remove(0);
        }
        self.sent.push(request.clone());
        Ok(())
    }
}

/// Reads host messages line by line on a background thread and forwards them.
/// The thread ends at EOF or once the receiving side is gone.
pub fn spawn_reader<R>(
    input: R,
    tx: Sender<HostMessage>,
) -> std::io::Result<thread::JoinHandle<()>>
where
    R: BufRead + Send + 'static,
{
    thread::Builder::new()
        .name("host-reader".to_string())
        .spawn(move || {
            for line in input.lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(err) => {
                        tracing::warn!("host input closed: {err}");
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                let Some(msg) = HostMessage::parse(&line) else {
                    continue;
                };
                if tx.send(msg).is_err() {
                    break;
                }
            }
            tracing::info!("host reader finished");
        })
}
