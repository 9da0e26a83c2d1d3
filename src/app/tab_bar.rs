use compact_str::CompactString;

use crate::kernel::registry::ServiceRegistry;
use crate::kernel::{Action, Tab, Workspace, WorkspaceId, WorkspaceStoreState};

const UNKNOWN_TITLE: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabBarEntry {
    pub tab_id: CompactString,
    pub title: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabBarIntent {
    Select(CompactString),
    Close(CompactString),
}

impl TabBarIntent {
    pub fn into_action(self, workspace: WorkspaceId) -> Action {
        match self {
            TabBarIntent::Select(tab_id) => Action::ActivateTab { workspace, tab_id },
            TabBarIntent::Close(tab_id) => Action::CloseTab { workspace, tab_id },
        }
    }
}

/// Explicit title first (file tabs), then `"<title> <n>"` for numbered
/// instances, then the plain service title.
pub fn resolve_title(registry: &ServiceRegistry, tab: &Tab) -> String {
    if let Some(title) = &tab.title {
        return title.clone();
    }
    let Some(service) = registry.lookup(&tab.service_id) else {
        return UNKNOWN_TITLE.to_string();
    };
    match tab.instance_id {
        Some(instance) if service.allow_multiple => format!("{} {}", service.title, instance),
        _ => service.title.to_string(),
    }
}

pub fn tab_bar_entries(registry: &ServiceRegistry, workspace: &Workspace) -> Vec<TabBarEntry> {
    workspace
        .tabs
        .iter()
        .map(|tab| TabBarEntry {
            tab_id: tab.id.clone(),
            title: resolve_title(registry, tab),
            active: workspace.is_active(&tab.id),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherEntry {
    pub service_id: &'static str,
    pub icon: &'static str,
    pub title: &'static str,
    pub open: bool,
}

/// Launcher menu: visible services in registration order, flagged when any
/// workspace hosts one of their tabs.
pub fn launcher_entries(
    registry: &ServiceRegistry,
    state: &WorkspaceStoreState,
) -> Vec<LauncherEntry> {
    registry
        .launchable()
        .map(|service| LauncherEntry {
            service_id: service.id,
            icon: service.icon,
            title: service.title,
            open: state.is_service_open(service.id),
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/app/tab_bar.rs"]
mod tests;
