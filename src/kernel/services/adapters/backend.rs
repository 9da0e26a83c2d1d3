use std::io;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;

use crate::kernel::services::ports::backend::{
    parse_frame, BackendEvent, ConnectionState, ReconnectPolicy, Transport,
};

/// Explicitly owned connection to the backend event stream.
///
/// Runs the `Disconnected -> Connecting -> Connected -> Disconnected` cycle on
/// its own runtime and reports every transition and `process_update` through
/// `tx`. Dropping the connection stops the task.
pub struct BackendConnection {
    runtime: tokio::runtime::Runtime,
    transport: Arc<dyn Transport>,
    url: String,
    policy: ReconnectPolicy,
    tx: Sender<BackendEvent>,
    state: Arc<Mutex<ConnectionState>>,
    task: Option<JoinHandle<()>>,
}

impl BackendConnection {
    pub fn new(
        url: impl Into<String>,
        policy: ReconnectPolicy,
        transport: Arc<dyn Transport>,
        tx: Sender<BackendEvent>,
    ) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .or_else(|e| {
                tracing::error!(
                    error = %e,
                    "Failed to create multi-thread tokio runtime, falling back to current-thread"
                );
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
            })?;
        Ok(Self {
            runtime,
            transport,
            url: url.into(),
            policy,
            tx,
            state: Arc::new(Mutex::new(ConnectionState::Disconnected)),
            task: None,
        })
    }

    pub fn state(&self) -> ConnectionState {
        *self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Starts the connect loop unless one is already running.
    pub fn connect(&mut self) {
        if self.is_running() {
            return;
        }
        tracing::info!(url = %self.url, "backend connect");
        let task = run_connection(
            Arc::clone(&self.transport),
            self.url.clone(),
            self.policy,
            self.tx.clone(),
            Arc::clone(&self.state),
        );
        self.task = Some(self.runtime.spawn(task));
    }

    pub fn disconnect(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };
        task.abort();
        if set_state(&self.state, &self.tx, ConnectionState::Disconnected) {
            tracing::info!(url = %self.url, "backend disconnected");
        }
    }

    pub fn reconnect(&mut self) {
        self.disconnect();
        self.connect();
    }
}

impl Drop for BackendConnection {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Records `next` and reports it. Returns `false` when the state did not
/// change.
fn set_state(
    state: &Mutex<ConnectionState>,
    tx: &Sender<BackendEvent>,
    next: ConnectionState,
) -> bool {
    let mut current = state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if *current == next {
        return false;
    }
    *current = next;
    drop(current);
    let _ = tx.send(BackendEvent::StateChanged(next));
    true
}

async fn run_connection(
    transport: Arc<dyn Transport>,
    url: String,
    policy: ReconnectPolicy,
    tx: Sender<BackendEvent>,
    state: Arc<Mutex<ConnectionState>>,
) {
    let mut failures: u32 = 0;
    loop {
        set_state(
            &state,
            &tx,
            ConnectionState::Connecting {
                attempt: failures + 1,
            },
        );

        match transport.connect(&url).await {
            Ok(mut frames) => {
                failures = 0;
                set_state(&state, &tx, ConnectionState::Connected);

                while let Some(frame) = frames.recv().await {
                    match parse_frame(&frame) {
                        Ok(Some(update)) => {
                            if tx.send(BackendEvent::ProcessUpdate(update)).is_err() {
                                return;
                            }
                        }
                        Ok(None) => {}
                        Err(error) => tracing::warn!(%error, "malformed backend frame"),
                    }
                }

                set_state(&state, &tx, ConnectionState::Disconnected);
                tracing::info!(url = %url, "backend stream closed, reconnecting");
                tokio::time::sleep(policy.delay_for(1)).await;
            }
            Err(error) => {
                failures += 1;
                tracing::warn!(url = %url, attempt = failures, %error, "backend connect failed");
                set_state(&state, &tx, ConnectionState::Disconnected);
                if failures >= policy.max_attempts {
                    tracing::error!(
                        url = %url,
                        attempts = failures,
                        "backend reconnect attempts exhausted"
                    );
                    let _ = tx.send(BackendEvent::GaveUp);
                    return;
                }
                tokio::time::sleep(policy.delay_for(failures)).await;
            }
        }
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/backend.rs"]
mod tests;
