use serde::Deserialize;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};

use crate::kernel::state::{Tab, WorkspaceId};

use super::ports::PayloadError;

/// "Open this tab in that workspace", published by collaborators that hold
/// no reference to the store (file browser, process log).
#[derive(Debug, Clone, PartialEq)]
pub struct FileOpenRequest {
    pub target: WorkspaceId,
    pub tab: Tab,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFileOpenEvent {
    #[serde(default)]
    target_workspace: Option<String>,
    #[serde(default)]
    file: Option<Tab>,
}

impl FileOpenRequest {
    pub fn new(target: WorkspaceId, tab: Tab) -> Self {
        Self { target, tab }
    }

    /// Parses the `{ targetWorkspace, file }` event shape.
    pub fn from_json(raw: &str) -> Result<Self, PayloadError> {
        let event: RawFileOpenEvent = serde_json::from_str(raw)?;
        let target = event
            .target_workspace
            .ok_or(PayloadError::MissingField("targetWorkspace"))?;
        let target =
            WorkspaceId::parse(&target).ok_or(PayloadError::UnknownWorkspace(target))?;
        let tab = event.file.ok_or(PayloadError::MissingField("file"))?;
        Ok(Self { target, tab })
    }
}

type Subscribers = Arc<Mutex<Vec<Sender<FileOpenRequest>>>>;

/// Broadcast point for file-open requests. Owned by the application root and
/// handed to producers as [`FileOpenPublisher`]s and to consumers as
/// [`FileOpenSubscriber`]s.
#[derive(Clone, Default)]
pub struct FileOpenChannel {
    subscribers: Subscribers,
}

#[derive(Clone)]
pub struct FileOpenPublisher {
    subscribers: Subscribers,
}

pub struct FileOpenSubscriber {
    rx: Receiver<FileOpenRequest>,
}

impl FileOpenChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publisher(&self) -> FileOpenPublisher {
        FileOpenPublisher {
            subscribers: Arc::clone(&self.subscribers),
        }
    }

    pub fn subscribe(&self) -> FileOpenSubscriber {
        let (tx, rx) = mpsc::channel();
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(tx);
        FileOpenSubscriber { rx }
    }
}

impl FileOpenPublisher {
    /// Delivers `request` once to every live subscriber and returns how many
    /// received it. Dropped subscribers are pruned.
    pub fn publish(&self, request: FileOpenRequest) -> usize {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        subscribers.retain(|tx| tx.send(request.clone()).is_ok());
        tracing::debug!(
            target_workspace = %request.target,
            tab = %request.tab.id,
            delivered = subscribers.len(),
            "file open published"
        );
        subscribers.len()
    }

    /// Publishes a raw `{ targetWorkspace, file }` event. Malformed events are
    /// logged and dropped.
    pub fn publish_json(&self, raw: &str) -> usize {
        match FileOpenRequest::from_json(raw) {
            Ok(request) => self.publish(request),
            Err(error) => {
                tracing::warn!(%error, "malformed file open event dropped");
                0
            }
        }
    }
}

impl FileOpenSubscriber {
    pub fn try_recv(&mut self) -> Result<FileOpenRequest, TryRecvError> {
        self.rx.try_recv()
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/services/bus.rs"]
mod tests;
