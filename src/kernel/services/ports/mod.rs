//! Service ports: traits + data contracts.

pub mod backend;
pub mod payload;
pub mod settings;
pub mod storage;

pub use backend::{
    parse_frame, BackendError, BackendEvent, ConnectFuture, ConnectionState, FrameStream,
    ProcessUpdate, ReconnectPolicy, Transport,
};
pub use payload::PayloadError;
pub use settings::{BackendSettings, RoutingRule, Settings};
pub use storage::{Result as StorageResult, StateStorage, StorageError};

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/ports.rs"]
mod tests;
