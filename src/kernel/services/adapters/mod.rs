//! Service adapters: OS/runtime specific implementations (IO/async).

pub mod backend;
pub mod paths;
pub mod persistence;
pub mod settings;
pub mod transport;

pub use backend::BackendConnection;
pub use paths::{ensure_log_dir, ensure_state_dir, get_config_dir, get_log_dir, get_state_dir};
pub use persistence::{FileStorage, MemoryStorage, WorkspacePersistence};
pub use settings::{ensure_settings_file, get_settings_path, load_settings, load_settings_from};
pub use transport::TcpLineTransport;
