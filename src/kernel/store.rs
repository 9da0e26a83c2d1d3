use compact_str::{format_compact, CompactString};
use std::time::{SystemTime, UNIX_EPOCH};

use super::registry::{IdScheme, RoutingPolicy, ServiceDescriptor, ServiceRegistry};
use super::state::{InstanceCounters, Tab, WorkspaceId, WorkspaceStoreState};
use super::{Action, Effect};

pub struct DispatchResult {
    pub effects: Vec<Effect>,
    pub state_changed: bool,
}

impl DispatchResult {
    fn unchanged() -> Self {
        Self {
            effects: Vec::new(),
            state_changed: false,
        }
    }

    fn changed(state_changed: bool) -> Self {
        if !state_changed {
            return Self::unchanged();
        }
        Self {
            effects: vec![Effect::PersistState],
            state_changed: true,
        }
    }
}

pub trait Clock: Send {
    fn now_millis(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Sole owner and writer of the workspace state.
pub struct Store {
    state: WorkspaceStoreState,
    registry: ServiceRegistry,
    routing: RoutingPolicy,
    counters: InstanceCounters,
    clock: Box<dyn Clock>,
}

impl Store {
    /// Counters are rebuilt from whatever tabs `state` already holds, so a
    /// restored session never reuses a disambiguator.
    pub fn new(
        state: WorkspaceStoreState,
        registry: ServiceRegistry,
        routing: RoutingPolicy,
    ) -> Self {
        let counters = InstanceCounters::from_state(&state);
        Self {
            state,
            registry,
            routing,
            counters,
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn state(&self) -> &WorkspaceStoreState {
        &self.state
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    pub fn counters(&self) -> &InstanceCounters {
        &self.counters
    }

    pub fn dispatch(&mut self, action: Action) -> DispatchResult {
        match action {
            Action::ToggleService { service_id } => self.toggle_service(&service_id),
            Action::ActivateTab { workspace, tab_id } => {
                DispatchResult::changed(self.state.get_mut(workspace).activate(&tab_id))
            }
            Action::CloseTab { workspace, tab_id } => {
                let removed = self.state.get_mut(workspace).remove(&tab_id);
                if removed.is_none() {
                    tracing::debug!(%workspace, tab = %tab_id, "close: unknown tab");
                }
                DispatchResult::changed(removed.is_some())
            }
            Action::OpenExternal { workspace, tab } => self.open_external(workspace, tab),
            Action::DropService {
                service_id,
                workspace,
            } => self.drop_service(&service_id, workspace),
        }
    }

    fn toggle_service(&mut self, service_id: &str) -> DispatchResult {
        let Some(service) = self.registry.lookup(service_id).copied() else {
            tracing::debug!(service = service_id, "toggle: unknown service");
            return DispatchResult::unchanged();
        };

        if !service.allow_multiple {
            if let Some(result) = self.focus_existing(service_id) {
                return result;
            }
        }

        let workspace = self.routing.target_for(service_id);
        self.open_new(service, workspace)
    }

    fn drop_service(&mut self, service_id: &str, workspace: WorkspaceId) -> DispatchResult {
        let Some(service) = self.registry.lookup(service_id).copied() else {
            tracing::debug!(service = service_id, "drop: unknown service");
            return DispatchResult::unchanged();
        };

        let target = self.state.get_mut(workspace);
        if let Some(tab_id) = target.tab_for_service(service_id).map(|tab| tab.id.clone()) {
            return DispatchResult::changed(target.activate(&tab_id));
        }

        if !service.allow_multiple {
            if let Some(result) = self.focus_existing(service_id) {
                return result;
            }
        }

        self.open_new(service, workspace)
    }

    fn open_external(&mut self, workspace: WorkspaceId, tab: Tab) -> DispatchResult {
        let Some(service) = self.registry.lookup(&tab.service_id).copied() else {
            tracing::debug!(service = %tab.service_id, tab = %tab.id, "open: unknown service");
            return DispatchResult::unchanged();
        };

        if let Some((owner, _)) = self.state.find_tab(&tab.id) {
            if owner != workspace {
                tracing::debug!(
                    tab = %tab.id,
                    %owner,
                    requested = %workspace,
                    "open: tab lives elsewhere"
                );
            }
            return DispatchResult::changed(self.state.get_mut(owner).activate(&tab.id));
        }

        if !service.allow_multiple {
            if let Some(result) = self.focus_existing(service.id) {
                return result;
            }
        }

        if let Some(instance) = tab.instance_id {
            self.counters.observe(&tab.service_id, instance);
        }
        self.state.get_mut(workspace).push_active(tab);
        DispatchResult::changed(true)
    }

    fn focus_existing(&mut self, service_id: &str) -> Option<DispatchResult> {
        let (workspace, tab_id) = self
            .state
            .find_service(service_id)
            .map(|(workspace, tab)| (workspace, tab.id.clone()))?;
        Some(DispatchResult::changed(
            self.state.get_mut(workspace).activate(&tab_id),
        ))
    }

    fn open_new(&mut self, service: ServiceDescriptor, workspace: WorkspaceId) -> DispatchResult {
        let tab = if service.allow_multiple {
            let Some((id, instance)) = self.next_instance_id(service) else {
                tracing::warn!(service = service.id, "open: instance numbers exhausted");
                return DispatchResult::unchanged();
            };
            Tab::service(service.id, id, Some(instance))
        } else {
            if let Some((owner, tab)) = self.state.find_tab(service.id) {
                tracing::warn!(
                    service = service.id,
                    %owner,
                    holder = %tab.service_id,
                    "open: tab id already taken by another service"
                );
                return DispatchResult::unchanged();
            }
            Tab::service(service.id, service.id, None)
        };

        tracing::debug!(service = service.id, tab = %tab.id, %workspace, "open tab");
        self.state.get_mut(workspace).push_active(tab);
        DispatchResult::changed(true)
    }

    /// Allocates instance numbers until the resulting id is free. Externally
    /// opened tabs may already hold a counter-shaped id without an instance.
    fn next_instance_id(&mut self, service: ServiceDescriptor) -> Option<(CompactString, u32)> {
        loop {
            let instance = self.counters.allocate(service.id)?;
            let id = match service.id_scheme {
                IdScheme::Counter => format_compact!("{}-{}", service.id, instance),
                IdScheme::Timestamp => self.timestamp_id(service.id),
            };
            if self.state.find_tab(&id).is_none() {
                return Some((id, instance));
            }
        }
    }

    fn timestamp_id(&self, service_id: &str) -> CompactString {
        let mut millis = self.clock.now_millis();
        loop {
            let id = format_compact!("{}-{}", service_id, millis);
            if self.state.find_tab(&id).is_none() {
                return id;
            }
            millis = millis.wrapping_add(1);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/store.rs"]
mod tests;
