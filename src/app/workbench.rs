use std::sync::mpsc::{Receiver, TryRecvError};

use crate::kernel::services::adapters::WorkspacePersistence;
use crate::kernel::services::ports::{BackendEvent, ConnectionState, StateStorage};
use crate::kernel::services::{FileOpenChannel, FileOpenPublisher, FileOpenSubscriber};
use crate::kernel::{Action, Effect, Store, WorkspaceId};

use super::docking::DropTarget;
use super::process_log::ProcessLog;
use super::tab_bar::{launcher_entries, tab_bar_entries, LauncherEntry, TabBarEntry, TabBarIntent};

/// Application root. Owns the store and everything that feeds it, and runs
/// one intent at a time to completion (state change, then persistence).
pub struct Workbench<S> {
    store: Store,
    persistence: WorkspacePersistence<S>,
    file_open_rx: FileOpenSubscriber,
    publisher: FileOpenPublisher,
    backend_rx: Option<Receiver<BackendEvent>>,
    backend_state: ConnectionState,
    backend_gave_up: bool,
    process_log: ProcessLog,
    drop_targets: [DropTarget; 3],
}

impl<S: StateStorage> Workbench<S> {
    pub fn new(
        store: Store,
        persistence: WorkspacePersistence<S>,
        channel: &FileOpenChannel,
    ) -> Self {
        Self {
            store,
            persistence,
            file_open_rx: channel.subscribe(),
            publisher: channel.publisher(),
            backend_rx: None,
            backend_state: ConnectionState::Disconnected,
            backend_gave_up: false,
            process_log: ProcessLog::new(),
            drop_targets: WorkspaceId::ALL.map(DropTarget::new),
        }
    }

    pub fn with_backend_events(mut self, rx: Receiver<BackendEvent>) -> Self {
        self.backend_rx = Some(rx);
        self
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn persistence(&self) -> &WorkspacePersistence<S> {
        &self.persistence
    }

    pub fn process_log(&self) -> &ProcessLog {
        &self.process_log
    }

    pub fn backend_state(&self) -> ConnectionState {
        self.backend_state
    }

    /// `true` once the connection ran out of reconnect attempts, until it
    /// connects again.
    pub fn backend_gave_up(&self) -> bool {
        self.backend_gave_up
    }

    pub fn publisher(&self) -> FileOpenPublisher {
        self.publisher.clone()
    }

    /// Returns `true` if the state changed.
    pub fn handle(&mut self, action: Action) -> bool {
        let result = self.store.dispatch(action);
        for effect in result.effects {
            self.run_effect(effect);
        }
        result.state_changed
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::PersistState => {
                self.persistence.save(self.store.state());
            }
        }
    }

    pub fn handle_tab_bar(&mut self, workspace: WorkspaceId, intent: TabBarIntent) -> bool {
        self.handle(intent.into_action(workspace))
    }

    pub fn drop_target(&mut self, workspace: WorkspaceId) -> &mut DropTarget {
        let index = WorkspaceId::ALL
            .iter()
            .position(|id| *id == workspace)
            .unwrap_or(0);
        &mut self.drop_targets[index]
    }

    /// Completes a drop on `workspace`'s drop zone.
    pub fn drop_on(&mut self, workspace: WorkspaceId, type_tag: &str, raw: &str) -> bool {
        match self.drop_target(workspace).drop(type_tag, raw) {
            Some(action) => self.handle(action),
            None => false,
        }
    }

    /// Publishes the editor request for a file the process log knows about.
    pub fn view_process_file(&self, path: &str) -> usize {
        self.publisher.publish(self.process_log.view_file(path))
    }

    /// Drains pending file-open requests and backend events. Returns the
    /// number of messages handled.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;

        loop {
            match self.file_open_rx.try_recv() {
                Ok(request) => {
                    handled += 1;
                    self.handle(Action::OpenExternal {
                        workspace: request.target,
                        tab: request.tab,
                    });
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        let mut backend_closed = false;
        if let Some(rx) = &self.backend_rx {
            loop {
                match rx.try_recv() {
                    Ok(event) => {
                        handled += 1;
                        match event {
                            BackendEvent::StateChanged(state) => {
                                if state == ConnectionState::Connected {
                                    self.backend_gave_up = false;
                                }
                                self.backend_state = state;
                            }
                            BackendEvent::ProcessUpdate(update) => self.process_log.apply(update),
                            BackendEvent::GaveUp => {
                                self.backend_gave_up = true;
                                tracing::warn!("backend unreachable, process updates paused");
                            }
                        }
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        backend_closed = true;
                        break;
                    }
                }
            }
        }
        if backend_closed {
            self.backend_rx = None;
            self.backend_state = ConnectionState::Disconnected;
        }

        handled
    }

    pub fn tab_bar(&self, workspace: WorkspaceId) -> Vec<TabBarEntry> {
        tab_bar_entries(self.store.registry(), self.store.state().get(workspace))
    }

    pub fn launcher(&self) -> Vec<LauncherEntry> {
        launcher_entries(self.store.registry(), self.store.state())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/app/workbench.rs"]
mod tests;
