use super::*;
use crate::kernel::registry::{ServiceRegistry, CHAT};

fn tab(service: &str, id: &str, instance: Option<u32>) -> Tab {
    Tab::service(service, id, instance)
}

#[test]
fn default_layout_has_single_active_terminal_in_workspace3() {
    let state = WorkspaceStoreState::default_layout();

    assert!(state.workspace1.tabs.is_empty());
    assert_eq!(state.workspace1.active_tab_id, None);
    assert!(state.workspace2.tabs.is_empty());
    assert_eq!(state.workspace3.tabs.len(), 1);

    let terminal = &state.workspace3.tabs[0];
    assert_eq!(terminal.id, "terminal-1");
    assert_eq!(terminal.service_id, "terminal");
    assert_eq!(terminal.instance_id, Some(1));
    assert_eq!(state.workspace3.active_tab_id.as_deref(), Some("terminal-1"));
}

#[test]
fn remove_active_tab_activates_first_remaining() {
    let mut workspace = Workspace::default();
    workspace.push_active(tab("a", "a", None));
    workspace.push_active(tab("b", "b", None));
    workspace.push_active(tab("c", "c", None));
    assert!(workspace.is_active("c"));

    assert!(workspace.remove("c").is_some());
    assert_eq!(workspace.active_tab_id.as_deref(), Some("a"));

    assert!(workspace.remove("a").is_some());
    assert_eq!(workspace.active_tab_id.as_deref(), Some("b"));

    assert!(workspace.remove("b").is_some());
    assert_eq!(workspace.active_tab_id, None);
}

#[test]
fn remove_inactive_tab_keeps_active() {
    let mut workspace = Workspace::default();
    workspace.push_active(tab("a", "a", None));
    workspace.push_active(tab("b", "b", None));

    assert!(workspace.remove("a").is_some());
    assert_eq!(workspace.active_tab_id.as_deref(), Some("b"));
    assert!(workspace.remove("missing").is_none());
}

#[test]
fn activate_ignores_unknown_and_already_active_tabs() {
    let mut workspace = Workspace::default();
    workspace.push_active(tab("a", "a", None));
    workspace.push_active(tab("b", "b", None));

    assert!(!workspace.activate("b"));
    assert!(!workspace.activate("zzz"));
    assert!(workspace.activate("a"));
    assert_eq!(workspace.active_tab().map(|t| t.id.as_str()), Some("a"));
}

#[test]
fn serialized_shape_uses_camel_case_and_null_instance() {
    let mut state = WorkspaceStoreState::default();
    state.workspace1.push_active(tab(CHAT, "chat", None));

    let value = serde_json::to_value(&state).unwrap();
    let ws1 = &value["workspace1"];
    assert_eq!(ws1["activeTabId"], "chat");
    assert_eq!(ws1["tabs"][0]["serviceId"], "chat");
    assert!(ws1["tabs"][0]["instanceId"].is_null());
    assert!(ws1["tabs"][0].get("title").is_none());
    assert!(ws1["tabs"][0].get("data").is_none());
    assert!(value["workspace2"]["activeTabId"].is_null());
}

#[test]
fn file_editor_tab_carries_payload() {
    let tab = Tab::file_editor("file-src/main.rs", "main.rs", "rust", "fn main() {}");

    assert_eq!(tab.service_id, "file-editor");
    assert_eq!(tab.title.as_deref(), Some("main.rs"));
    let data = tab.data.unwrap();
    assert_eq!(data["fileId"], "file-src/main.rs");
    assert_eq!(data["fileName"], "main.rs");
    assert_eq!(data["language"], "rust");
    assert_eq!(data["content"], "fn main() {}");
}

#[test]
fn validate_rejects_duplicate_tab_ids_across_workspaces() {
    let registry = ServiceRegistry::builtin();
    let mut state = WorkspaceStoreState::default_layout();
    state
        .workspace1
        .push_active(tab("terminal", "terminal-1", Some(1)));

    assert!(state.validate(&registry).is_err());
}

#[test]
fn validate_rejects_duplicated_single_instance_service() {
    let registry = ServiceRegistry::builtin();
    let mut state = WorkspaceStoreState::default();
    state.workspace1.push_active(tab(CHAT, "chat", None));
    state.workspace2.push_active(tab(CHAT, "chat-2", None));

    assert!(state.validate(&registry).is_err());
}

#[test]
fn validate_rejects_dangling_or_missing_active_tab() {
    let registry = ServiceRegistry::builtin();

    let mut dangling = WorkspaceStoreState::default_layout();
    dangling.workspace3.active_tab_id = Some("terminal-9".into());
    assert!(dangling.validate(&registry).is_err());

    let mut missing = WorkspaceStoreState::default_layout();
    missing.workspace3.active_tab_id = None;
    assert!(missing.validate(&registry).is_err());

    assert!(WorkspaceStoreState::default_layout()
        .validate(&registry)
        .is_ok());
}

#[test]
fn counters_resume_after_highest_restored_instance() {
    let mut state = WorkspaceStoreState::default();
    state
        .workspace3
        .push_active(tab("terminal", "terminal-4", Some(4)));
    state
        .workspace2
        .push_active(tab("terminal", "terminal-2", Some(2)));

    let mut counters = InstanceCounters::from_state(&state);
    assert_eq!(counters.peek("terminal"), Some(5));
    assert_eq!(counters.allocate("terminal"), Some(5));
    assert_eq!(counters.allocate("terminal"), Some(6));
    assert_eq!(counters.peek("file-editor"), Some(1));
}

#[test]
fn counters_observe_never_moves_backwards() {
    let mut counters = InstanceCounters::default();
    counters.observe("terminal", 7);
    counters.observe("terminal", 3);
    assert_eq!(counters.allocate("terminal"), Some(8));
}

#[test]
fn counters_are_exhausted_after_the_largest_instance() {
    let mut counters = InstanceCounters::default();
    counters.observe("terminal", u32::MAX - 1);
    assert_eq!(counters.allocate("terminal"), Some(u32::MAX));
    assert_eq!(counters.allocate("terminal"), None);
    assert_eq!(counters.peek("terminal"), None);

    counters.observe("file-editor", u32::MAX);
    assert_eq!(counters.allocate("file-editor"), None);
    assert_eq!(counters.allocate("file-editor"), None);
}

#[test]
fn workspace_id_parses_known_slots_only() {
    assert_eq!(WorkspaceId::parse("workspace2"), Some(WorkspaceId::Workspace2));
    assert_eq!(WorkspaceId::parse("workspace4"), None);
    assert_eq!(WorkspaceId::Workspace3.to_string(), "workspace3");
}
