use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// `process_update` notification pushed by the backend event stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessUpdate {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting { attempt: u32 },
    Connected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    StateChanged(ConnectionState),
    ProcessUpdate(ProcessUpdate),
    /// Reconnect attempts are exhausted; the connection stays down until
    /// `connect` is called again.
    GaveUp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    Connect(String),
    Closed,
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::Connect(reason) => write!(f, "connect failed: {}", reason),
            BackendError::Closed => write!(f, "connection closed"),
        }
    }
}

impl std::error::Error for BackendError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            initial_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(5000),
        }
    }
}

impl ReconnectPolicy {
    /// Delay after the `failures`-th consecutive failed attempt (1-based):
    /// doubles each time, capped at `max_delay`.
    pub fn delay_for(&self, failures: u32) -> Duration {
        let shift = failures.saturating_sub(1).min(16);
        self.initial_delay
            .saturating_mul(1u32 << shift)
            .min(self.max_delay)
    }
}

/// Raw text frames read from an open event stream. The stream is over when
/// the sender side is dropped.
pub type FrameStream = tokio::sync::mpsc::UnboundedReceiver<String>;

pub type ConnectFuture =
    Pin<Box<dyn Future<Output = Result<FrameStream, BackendError>> + Send + 'static>>;

pub trait Transport: Send + Sync + 'static {
    fn connect(&self, url: &str) -> ConnectFuture;
}

#[derive(Debug, Deserialize)]
struct EventFrame {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

pub const PROCESS_UPDATE_EVENT: &str = "process_update";

/// Parses one frame. Events other than `process_update` yield `Ok(None)`.
pub fn parse_frame(frame: &str) -> Result<Option<ProcessUpdate>, serde_json::Error> {
    let frame: EventFrame = serde_json::from_str(frame)?;
    if frame.event != PROCESS_UPDATE_EVENT {
        return Ok(None);
    }
    serde_json::from_value(frame.data).map(Some)
}
