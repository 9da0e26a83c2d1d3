use super::*;

#[test]
fn builtin_catalog_keeps_registration_order() {
    let registry = ServiceRegistry::builtin();
    let ids: Vec<&str> = registry.list_all().iter().map(|s| s.id).collect();
    assert_eq!(
        ids,
        vec![
            CHAT,
            TERMINAL,
            FILE_EDITOR,
            FILE_BROWSER,
            PROCESS,
            METRICS,
            EXPLORER,
            SETTINGS
        ]
    );
}

#[test]
fn lookup_resolves_known_ids_and_misses_unknown() {
    let registry = ServiceRegistry::builtin();

    let terminal = registry.lookup(TERMINAL).unwrap();
    assert!(terminal.allow_multiple);
    assert_eq!(terminal.id_scheme, IdScheme::Counter);
    assert_eq!(terminal.title, "Terminal");

    let chat = registry.lookup(CHAT).unwrap();
    assert!(!chat.allow_multiple);

    assert!(registry.lookup("nope").is_none());
}

#[test]
fn hidden_services_are_not_launchable() {
    let registry = ServiceRegistry::builtin();
    assert!(registry.lookup(FILE_EDITOR).unwrap().hidden);
    assert!(registry.launchable().all(|s| s.id != FILE_EDITOR));
    assert_eq!(registry.launchable().count(), registry.list_all().len() - 1);
}

#[test]
fn duplicate_ids_keep_first_registration() {
    let registry = ServiceRegistry::new([
        ServiceDescriptor::single("a", "First", "1"),
        ServiceDescriptor::single("a", "Second", "2"),
    ]);
    assert_eq!(registry.list_all().len(), 1);
    assert_eq!(registry.lookup("a").unwrap().title, "First");
}

#[test]
fn routing_sends_terminal_to_workspace3_and_defaults_to_workspace1() {
    let routing = RoutingPolicy::builtin();
    assert_eq!(routing.target_for(TERMINAL), WorkspaceId::Workspace3);
    assert_eq!(routing.target_for(CHAT), WorkspaceId::Workspace1);
    assert_eq!(routing.target_for("unknown"), WorkspaceId::Workspace1);
}

#[test]
fn routing_rules_override_builtin_entries() {
    let routing = RoutingPolicy::builtin()
        .with_rule(TERMINAL, WorkspaceId::Workspace2)
        .with_rule(PROCESS, WorkspaceId::Workspace3);
    assert_eq!(routing.target_for(TERMINAL), WorkspaceId::Workspace2);
    assert_eq!(routing.target_for(PROCESS), WorkspaceId::Workspace3);
}
