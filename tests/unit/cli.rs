use super::*;
use forgedeck::kernel::services::adapters::MemoryStorage;
use forgedeck::kernel::RoutingPolicy;
use tempfile::tempdir;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn parse_args_defaults_to_show() {
    assert_eq!(parse_args(&[]), Ok(CliCommand::Show));
    assert_eq!(parse_args(&args(&["show"])), Ok(CliCommand::Show));
}

#[test]
fn parse_args_reads_workspace_commands() {
    assert_eq!(
        parse_args(&args(&["toggle", "chat"])),
        Ok(CliCommand::Toggle("chat".to_string()))
    );
    assert_eq!(
        parse_args(&args(&["drop", "terminal", "workspace2"])),
        Ok(CliCommand::Drop {
            service: "terminal".to_string(),
            workspace: WorkspaceId::Workspace2,
        })
    );
    assert_eq!(
        parse_args(&args(&["close", "workspace3", "terminal-1"])),
        Ok(CliCommand::Close {
            workspace: WorkspaceId::Workspace3,
            tab: "terminal-1".to_string(),
        })
    );
}

#[test]
fn parse_args_reads_watch() {
    assert_eq!(parse_args(&args(&["watch"])), Ok(CliCommand::Watch));
    assert!(parse_args(&args(&["watch", "now"])).is_err());
}

#[test]
fn parse_args_rejects_unknown_commands_and_workspaces() {
    assert!(parse_args(&args(&["explode"])).is_err());
    assert!(parse_args(&args(&["drop", "chat", "workspace9"])).is_err());
    assert!(parse_args(&args(&["toggle"])).is_err());
}

#[test]
fn file_open_request_reads_content_and_language() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lib.rs");
    std::fs::write(&path, "pub fn lib() {}\n").unwrap();

    let request = file_open_request(WorkspaceId::Workspace2, &path).unwrap();

    assert_eq!(request.target, WorkspaceId::Workspace2);
    assert_eq!(request.tab.title.as_deref(), Some("lib.rs"));
    let data = request.tab.data.unwrap();
    assert_eq!(data["language"], "rust");
    assert_eq!(data["content"], "pub fn lib() {}\n");
}

#[test]
fn file_open_request_fails_for_missing_file() {
    let dir = tempdir().unwrap();
    assert!(file_open_request(WorkspaceId::Workspace1, &dir.path().join("nope.txt")).is_err());
}

#[test]
fn render_marks_active_tabs_and_open_services() {
    let store = Store::new(
        forgedeck::kernel::WorkspaceStoreState::default_layout(),
        ServiceRegistry::builtin(),
        RoutingPolicy::builtin(),
    );
    let channel = FileOpenChannel::new();
    let workbench = Workbench::new(
        store,
        WorkspacePersistence::new(MemoryStorage::new(), "test-workspaces"),
        &channel,
    );

    let out = render(&workbench);

    assert!(out.contains("+💻 terminal"));
    assert!(out.contains(" 💬 chat"));
    assert!(out.contains("workspace3: *Terminal 1 (terminal-1)"));
    assert!(out.contains("workspace1: \n"));
}
