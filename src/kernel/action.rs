use compact_str::CompactString;

use super::state::{Tab, WorkspaceId};

/// Every intent the store understands. Renderers, the docking controller and
/// the file-open channel only ever talk to the store through these.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ToggleService {
        service_id: CompactString,
    },
    ActivateTab {
        workspace: WorkspaceId,
        tab_id: CompactString,
    },
    CloseTab {
        workspace: WorkspaceId,
        tab_id: CompactString,
    },
    OpenExternal {
        workspace: WorkspaceId,
        tab: Tab,
    },
    DropService {
        service_id: CompactString,
        workspace: WorkspaceId,
    },
}

impl Action {
    pub fn toggle(service_id: &str) -> Self {
        Self::ToggleService {
            service_id: CompactString::from(service_id),
        }
    }

    pub fn activate(workspace: WorkspaceId, tab_id: &str) -> Self {
        Self::ActivateTab {
            workspace,
            tab_id: CompactString::from(tab_id),
        }
    }

    pub fn close(workspace: WorkspaceId, tab_id: &str) -> Self {
        Self::CloseTab {
            workspace,
            tab_id: CompactString::from(tab_id),
        }
    }

    pub fn drop_service(service_id: &str, workspace: WorkspaceId) -> Self {
        Self::DropService {
            service_id: CompactString::from(service_id),
            workspace,
        }
    }
}
