use super::*;
use crate::kernel::services::ports::backend::{BackendError, ConnectFuture, ProcessUpdate};
use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

/// Each `connect` pops the next scripted outcome; an exhausted script fails.
struct ScriptedTransport {
    script: Mutex<VecDeque<Result<Vec<String>, BackendError>>>,
}

impl ScriptedTransport {
    fn new(script: Vec<Result<Vec<String>, BackendError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
        })
    }
}

impl Transport for ScriptedTransport {
    fn connect(&self, _url: &str) -> ConnectFuture {
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::Connect("refused".to_string())));
        Box::pin(async move {
            let frames = match next {
                Ok(frames) => frames,
                Err(e) => return Err(e),
            };
            let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
            for frame in frames {
                let _ = tx.send(frame);
            }
            Ok(rx)
        })
    }
}

fn fast_policy(max_attempts: u32) -> ReconnectPolicy {
    ReconnectPolicy {
        max_attempts,
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(2),
    }
}

fn collect_until_gave_up(rx: &Receiver<BackendEvent>) -> Vec<BackendEvent> {
    let mut events = Vec::new();
    loop {
        let event = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("backend event");
        let done = event == BackendEvent::GaveUp;
        events.push(event);
        if done {
            return events;
        }
    }
}

#[test]
fn connect_relays_process_updates_then_gives_up_after_failures() {
    let transport = ScriptedTransport::new(vec![Ok(vec![
        r#"{"event":"process_update","data":{"type":"info","message":"started"}}"#.to_string(),
        "garbage".to_string(),
        r#"{"event":"other","data":{}}"#.to_string(),
    ])]);
    let (tx, rx) = mpsc::channel();
    let mut connection =
        BackendConnection::new("http://backend", fast_policy(2), transport, tx).unwrap();

    connection.connect();
    let events = collect_until_gave_up(&rx);

    assert_eq!(
        &events[..3],
        &[
            BackendEvent::StateChanged(ConnectionState::Connecting { attempt: 1 }),
            BackendEvent::StateChanged(ConnectionState::Connected),
            BackendEvent::ProcessUpdate(ProcessUpdate {
                kind: "info".to_string(),
                message: "started".to_string(),
                path: None,
            }),
        ]
    );
    let updates = events
        .iter()
        .filter(|e| matches!(e, BackendEvent::ProcessUpdate(_)))
        .count();
    assert_eq!(updates, 1);
    assert!(events.contains(&BackendEvent::StateChanged(ConnectionState::Connecting {
        attempt: 2
    })));
    assert_eq!(connection.state(), ConnectionState::Disconnected);
}

#[test]
fn unreachable_backend_gives_up_after_max_attempts() {
    let transport = ScriptedTransport::new(Vec::new());
    let (tx, rx) = mpsc::channel();
    let mut connection =
        BackendConnection::new("http://backend", fast_policy(3), transport, tx).unwrap();

    connection.connect();
    let events = collect_until_gave_up(&rx);

    let attempts: Vec<u32> = events
        .iter()
        .filter_map(|e| match e {
            BackendEvent::StateChanged(ConnectionState::Connecting { attempt }) => Some(*attempt),
            _ => None,
        })
        .collect();
    assert_eq!(attempts, vec![1, 2, 3]);
    assert!(!events.contains(&BackendEvent::StateChanged(ConnectionState::Connected)));
}

#[test]
fn disconnect_without_connect_is_a_no_op() {
    let (tx, rx) = mpsc::channel();
    let mut connection = BackendConnection::new(
        "http://backend",
        fast_policy(1),
        ScriptedTransport::new(Vec::new()),
        tx,
    )
    .unwrap();

    connection.disconnect();

    assert_eq!(connection.state(), ConnectionState::Disconnected);
    assert!(rx.try_recv().is_err());
    assert!(!connection.is_running());
}
