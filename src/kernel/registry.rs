//! Service catalog and the service -> workspace routing table.

use compact_str::CompactString;
use rustc_hash::FxHashMap;

use super::state::WorkspaceId;

pub const CHAT: &str = "chat";
pub const TERMINAL: &str = "terminal";
pub const FILE_EDITOR: &str = "file-editor";
pub const FILE_BROWSER: &str = "file-browser";
pub const PROCESS: &str = "process";
pub const METRICS: &str = "metrics";
pub const EXPLORER: &str = "explorer";
pub const SETTINGS: &str = "settings";

/// How tab ids are derived for a multi-instance service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdScheme {
    /// `<service>-<instance>`
    Counter,
    /// `<service>-<unix millis>`
    Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceDescriptor {
    pub id: &'static str,
    pub title: &'static str,
    pub icon: &'static str,
    pub allow_multiple: bool,
    /// Left out of the launcher menu; still addressable programmatically.
    pub hidden: bool,
    pub id_scheme: IdScheme,
}

impl ServiceDescriptor {
    pub const fn single(id: &'static str, title: &'static str, icon: &'static str) -> Self {
        Self {
            id,
            title,
            icon,
            allow_multiple: false,
            hidden: false,
            id_scheme: IdScheme::Counter,
        }
    }

    pub const fn multiple(
        id: &'static str,
        title: &'static str,
        icon: &'static str,
        id_scheme: IdScheme,
    ) -> Self {
        Self {
            id,
            title,
            icon,
            allow_multiple: true,
            hidden: false,
            id_scheme,
        }
    }

    pub const fn hidden(self) -> Self {
        Self {
            hidden: true,
            ..self
        }
    }
}

pub const BUILTIN_SERVICES: &[ServiceDescriptor] = &[
    ServiceDescriptor::single(CHAT, "Chat", "💬"),
    ServiceDescriptor::multiple(TERMINAL, "Terminal", "💻", IdScheme::Counter),
    ServiceDescriptor::multiple(FILE_EDITOR, "Editor", "📝", IdScheme::Timestamp).hidden(),
    ServiceDescriptor::single(FILE_BROWSER, "Files", "📁"),
    ServiceDescriptor::single(PROCESS, "Process", "🔮"),
    ServiceDescriptor::single(METRICS, "Metrics", "📊"),
    ServiceDescriptor::single(EXPLORER, "Explorer", "🔍"),
    ServiceDescriptor::single(SETTINGS, "Settings", "⚙️"),
];

/// Immutable catalog, built once at startup. Iteration order is
/// registration order.
#[derive(Debug, Clone)]
pub struct ServiceRegistry {
    services: Vec<ServiceDescriptor>,
}

impl ServiceRegistry {
    pub fn new(services: impl IntoIterator<Item = ServiceDescriptor>) -> Self {
        let mut unique: Vec<ServiceDescriptor> = Vec::new();
        for service in services {
            if unique.iter().any(|s| s.id == service.id) {
                tracing::warn!(service = service.id, "duplicate service id ignored");
                continue;
            }
            unique.push(service);
        }
        Self { services: unique }
    }

    pub fn builtin() -> Self {
        Self::new(BUILTIN_SERVICES.iter().copied())
    }

    pub fn lookup(&self, id: &str) -> Option<&ServiceDescriptor> {
        self.services.iter().find(|service| service.id == id)
    }

    pub fn list_all(&self) -> &[ServiceDescriptor] {
        &self.services
    }

    pub fn launchable(&self) -> impl Iterator<Item = &ServiceDescriptor> {
        self.services.iter().filter(|service| !service.hidden)
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Where `toggleService` opens a new tab. Anything without a rule lands in
/// the default workspace.
#[derive(Debug, Clone)]
pub struct RoutingPolicy {
    rules: FxHashMap<CompactString, WorkspaceId>,
    fallback: WorkspaceId,
}

impl RoutingPolicy {
    pub fn new(fallback: WorkspaceId) -> Self {
        Self {
            rules: FxHashMap::default(),
            fallback,
        }
    }

    pub fn builtin() -> Self {
        Self::new(WorkspaceId::Workspace1).with_rule(TERMINAL, WorkspaceId::Workspace3)
    }

    pub fn with_rule(mut self, service_id: &str, workspace: WorkspaceId) -> Self {
        self.rules.insert(CompactString::from(service_id), workspace);
        self
    }

    pub fn target_for(&self, service_id: &str) -> WorkspaceId {
        self.rules
            .get(service_id)
            .copied()
            .unwrap_or(self.fallback)
    }
}

impl Default for RoutingPolicy {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/registry.rs"]
mod tests;
