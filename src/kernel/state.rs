use compact_str::CompactString;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::registry::{ServiceRegistry, FILE_EDITOR, TERMINAL};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkspaceId {
    #[serde(rename = "workspace1")]
    Workspace1,
    #[serde(rename = "workspace2")]
    Workspace2,
    #[serde(rename = "workspace3")]
    Workspace3,
}

impl WorkspaceId {
    pub const ALL: [WorkspaceId; 3] = [
        WorkspaceId::Workspace1,
        WorkspaceId::Workspace2,
        WorkspaceId::Workspace3,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Workspace1 => "workspace1",
            Self::Workspace2 => "workspace2",
            Self::Workspace3 => "workspace3",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "workspace1" => Some(Self::Workspace1),
            "workspace2" => Some(Self::Workspace2),
            "workspace3" => Some(Self::Workspace3),
            _ => None,
        }
    }
}

impl std::fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An open instance of a service, or of a concrete artifact such as a file.
///
/// `data` belongs to whoever renders the tab; the store only moves it around.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub id: CompactString,
    pub service_id: CompactString,
    #[serde(default)]
    pub instance_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Tab {
    pub fn service(
        service_id: &str,
        id: impl Into<CompactString>,
        instance_id: Option<u32>,
    ) -> Self {
        Self {
            id: id.into(),
            service_id: CompactString::from(service_id),
            instance_id,
            title: None,
            data: None,
        }
    }

    /// Tab shape used by every producer that opens a file in the editor.
    pub fn file_editor(
        tab_id: impl Into<CompactString>,
        file_name: &str,
        language: &str,
        content: &str,
    ) -> Self {
        let id = tab_id.into();
        let data = serde_json::json!({
            "fileId": id.as_str(),
            "fileName": file_name,
            "language": language,
            "content": content,
        });
        Self {
            id,
            service_id: CompactString::from(FILE_EDITOR),
            instance_id: None,
            title: Some(file_name.to_string()),
            data: Some(data),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub tabs: Vec<Tab>,
    pub active_tab_id: Option<CompactString>,
}

impl Workspace {
    pub fn contains(&self, tab_id: &str) -> bool {
        self.tabs.iter().any(|tab| tab.id == tab_id)
    }

    pub fn tab(&self, tab_id: &str) -> Option<&Tab> {
        self.tabs.iter().find(|tab| tab.id == tab_id)
    }

    pub fn tab_for_service(&self, service_id: &str) -> Option<&Tab> {
        self.tabs.iter().find(|tab| tab.service_id == service_id)
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.active_tab_id.as_deref().and_then(|id| self.tab(id))
    }

    pub fn is_active(&self, tab_id: &str) -> bool {
        self.active_tab_id.as_deref() == Some(tab_id)
    }

    /// Returns `true` if the active tab changed.
    pub fn activate(&mut self, tab_id: &str) -> bool {
        if !self.contains(tab_id) || self.is_active(tab_id) {
            return false;
        }
        self.active_tab_id = Some(CompactString::from(tab_id));
        true
    }

    pub fn push_active(&mut self, tab: Tab) {
        self.active_tab_id = Some(tab.id.clone());
        self.tabs.push(tab);
    }

    /// Removes `tab_id`. Closing the active tab hands focus to the first
    /// remaining tab in insertion order.
    pub fn remove(&mut self, tab_id: &str) -> Option<Tab> {
        let index = self.tabs.iter().position(|tab| tab.id == tab_id)?;
        let removed = self.tabs.remove(index);
        if self.is_active(tab_id) {
            self.active_tab_id = self.tabs.first().map(|tab| tab.id.clone());
        }
        Some(removed)
    }

    fn check(&self) -> Result<(), String> {
        match self.active_tab_id.as_deref() {
            None if self.tabs.is_empty() => Ok(()),
            None => Err("activeTabId is null while tabs are open".to_string()),
            Some(id) if self.contains(id) => Ok(()),
            Some(id) => Err(format!("activeTabId {id:?} does not name an open tab")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceStoreState {
    pub workspace1: Workspace,
    pub workspace2: Workspace,
    pub workspace3: Workspace,
}

impl WorkspaceStoreState {
    /// Layout used on first start and whenever the persisted state is unusable.
    pub fn default_layout() -> Self {
        let mut state = Self::default();
        state
            .workspace3
            .push_active(Tab::service(TERMINAL, format!("{TERMINAL}-1"), Some(1)));
        state
    }

    pub fn get(&self, id: WorkspaceId) -> &Workspace {
        match id {
            WorkspaceId::Workspace1 => &self.workspace1,
            WorkspaceId::Workspace2 => &self.workspace2,
            WorkspaceId::Workspace3 => &self.workspace3,
        }
    }

    pub fn get_mut(&mut self, id: WorkspaceId) -> &mut Workspace {
        match id {
            WorkspaceId::Workspace1 => &mut self.workspace1,
            WorkspaceId::Workspace2 => &mut self.workspace2,
            WorkspaceId::Workspace3 => &mut self.workspace3,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (WorkspaceId, &Workspace)> {
        WorkspaceId::ALL.into_iter().map(move |id| (id, self.get(id)))
    }

    pub fn find_tab(&self, tab_id: &str) -> Option<(WorkspaceId, &Tab)> {
        self.iter()
            .find_map(|(id, workspace)| workspace.tab(tab_id).map(|tab| (id, tab)))
    }

    pub fn find_service(&self, service_id: &str) -> Option<(WorkspaceId, &Tab)> {
        self.iter().find_map(|(id, workspace)| {
            workspace
                .tab_for_service(service_id)
                .map(|tab| (id, tab))
        })
    }

    pub fn is_service_open(&self, service_id: &str) -> bool {
        self.find_service(service_id).is_some()
    }

    pub fn tab_count(&self) -> usize {
        self.iter().map(|(_, workspace)| workspace.tabs.len()).sum()
    }

    /// Checks the cross-workspace invariants: unique tab ids, a valid active
    /// tab per workspace, and at most one tab per single-instance service.
    pub fn validate(&self, registry: &ServiceRegistry) -> Result<(), String> {
        let mut seen_tabs: FxHashMap<&str, WorkspaceId> = FxHashMap::default();
        let mut seen_singles: FxHashMap<&str, WorkspaceId> = FxHashMap::default();

        for (workspace_id, workspace) in self.iter() {
            workspace
                .check()
                .map_err(|reason| format!("{workspace_id}: {reason}"))?;

            for tab in &workspace.tabs {
                if let Some(first) = seen_tabs.insert(tab.id.as_str(), workspace_id) {
                    return Err(format!(
                        "tab id {:?} appears in both {first} and {workspace_id}",
                        tab.id
                    ));
                }

                let single = registry
                    .lookup(&tab.service_id)
                    .is_some_and(|service| !service.allow_multiple);
                if !single {
                    continue;
                }
                let service = tab.service_id.as_str();
                if let Some(first) = seen_singles.insert(service, workspace_id) {
                    return Err(format!(
                        "single-instance service {service:?} is open in {first} and {workspace_id}"
                    ));
                }
            }
        }

        Ok(())
    }
}

/// Next disambiguator per multi-instance service.
///
/// Derived from the restored tabs on load and never persisted itself. Slots
/// are `u64` so that observing `u32::MAX` leaves the service exhausted instead
/// of pinned on a value that was already handed out.
#[derive(Debug, Clone, Default)]
pub struct InstanceCounters {
    next: FxHashMap<CompactString, u64>,
}

impl InstanceCounters {
    pub fn from_state(state: &WorkspaceStoreState) -> Self {
        let mut counters = Self::default();
        for (_, workspace) in state.iter() {
            for tab in &workspace.tabs {
                if let Some(instance) = tab.instance_id {
                    counters.observe(&tab.service_id, instance);
                }
            }
        }
        counters
    }

    /// Value the next `allocate` would return; `None` once exhausted.
    pub fn peek(&self, service_id: &str) -> Option<u32> {
        let next = self.next.get(service_id).copied().unwrap_or(1);
        u32::try_from(next).ok()
    }

    pub fn allocate(&mut self, service_id: &str) -> Option<u32> {
        let slot = self
            .next
            .entry(CompactString::from(service_id))
            .or_insert(1);
        let value = u32::try_from(*slot).ok()?;
        *slot += 1;
        Some(value)
    }

    /// Ensures `instance` is never handed out again for `service_id`.
    pub fn observe(&mut self, service_id: &str, instance: u32) {
        let slot = self
            .next
            .entry(CompactString::from(service_id))
            .or_insert(1);
        *slot = (*slot).max(u64::from(instance) + 1);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/state.rs"]
mod tests;
