use serde::{Deserialize, Serialize};

use crate::kernel::registry::ServiceRegistry;
use crate::kernel::services::ports::PayloadError;
use crate::kernel::{Action, WorkspaceId};

/// Type tag the drag payload travels under.
pub const SERVICE_DRAG_TYPE: &str = "application/forgedeck-service";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragPayload {
    pub service_id: String,
    pub service_icon: String,
    pub service_title: String,
}

/// What a drag source hands to the platform: a type tag and the serialized
/// payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragData {
    pub type_tag: &'static str,
    pub payload: String,
}

pub fn begin_drag(registry: &ServiceRegistry, service_id: &str) -> Option<DragData> {
    let service = registry.lookup(service_id)?;
    let payload = DragPayload {
        service_id: service.id.to_string(),
        service_icon: service.icon.to_string(),
        service_title: service.title.to_string(),
    };
    match serde_json::to_string(&payload) {
        Ok(payload) => Some(DragData {
            type_tag: SERVICE_DRAG_TYPE,
            payload,
        }),
        Err(error) => {
            tracing::warn!(service = service_id, %error, "serialize drag payload failed");
            None
        }
    }
}

pub fn parse_payload(raw: &str) -> Result<DragPayload, PayloadError> {
    Ok(serde_json::from_str(raw)?)
}

/// Like `parse_payload`, but first checks that the drop carries the service
/// drag type.
pub fn parse_drop(type_tag: &str, raw: &str) -> Result<DragPayload, PayloadError> {
    if type_tag != SERVICE_DRAG_TYPE {
        return Err(PayloadError::WrongType(type_tag.to_string()));
    }
    parse_payload(raw)
}

/// Turns an accepted drop into the store intent. Bad payloads are logged and
/// produce nothing.
pub fn on_drop_accepted(raw: &str, target: WorkspaceId) -> Option<Action> {
    match parse_payload(raw) {
        Ok(payload) => Some(Action::drop_service(&payload.service_id, target)),
        Err(error) => {
            tracing::warn!(%target, %error, "dropped service payload rejected");
            None
        }
    }
}

/// Per-workspace drop zone. `hovering` only drives visual feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropTarget {
    workspace: WorkspaceId,
    hovering: bool,
}

impl DropTarget {
    pub fn new(workspace: WorkspaceId) -> Self {
        Self {
            workspace,
            hovering: false,
        }
    }

    pub fn workspace(&self) -> WorkspaceId {
        self.workspace
    }

    pub fn is_hovering(&self) -> bool {
        self.hovering
    }

    /// `types` are the type tags offered by the drag in progress.
    pub fn drag_over(&mut self, types: &[&str]) -> bool {
        if types.contains(&SERVICE_DRAG_TYPE) {
            self.hovering = true;
        }
        self.hovering
    }

    pub fn drag_leave(&mut self) {
        self.hovering = false;
    }

    pub fn drop(&mut self, type_tag: &str, raw: &str) -> Option<Action> {
        self.hovering = false;
        match parse_drop(type_tag, raw) {
            Ok(payload) => Some(Action::drop_service(&payload.service_id, self.workspace)),
            Err(PayloadError::WrongType(type_tag)) => {
                tracing::debug!(workspace = %self.workspace, %type_tag, "ignored foreign drop");
                None
            }
            Err(error) => {
                tracing::warn!(
                    workspace = %self.workspace,
                    %error,
                    "dropped service payload rejected"
                );
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/app/docking.rs"]
mod tests;
