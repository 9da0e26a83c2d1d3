use std::io;

pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Debug)]
pub enum StorageError {
    Io(io::Error),
    Serialize(serde_json::Error),
    Parse(serde_json::Error),
    Schema(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "IO error: {}", e),
            StorageError::Serialize(e) => write!(f, "serialize failed: {}", e),
            StorageError::Parse(e) => write!(f, "parse failed: {}", e),
            StorageError::Schema(reason) => write!(f, "schema mismatch: {}", reason),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<io::Error> for StorageError {
    fn from(e: io::Error) -> Self {
        StorageError::Io(e)
    }
}

/// Durable key/value storage for serialized client state.
pub trait StateStorage {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&mut self, key: &str, value: &str) -> Result<()>;
}
