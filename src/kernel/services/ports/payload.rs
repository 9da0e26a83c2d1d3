/// A payload that crossed a loose boundary (drag data, file-open event) and
/// could not be turned into an intent.
#[derive(Debug)]
pub enum PayloadError {
    Json(serde_json::Error),
    MissingField(&'static str),
    UnknownWorkspace(String),
    WrongType(String),
}

impl std::fmt::Display for PayloadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayloadError::Json(e) => write!(f, "invalid json: {}", e),
            PayloadError::MissingField(name) => write!(f, "missing field: {}", name),
            PayloadError::UnknownWorkspace(id) => write!(f, "unknown workspace: {}", id),
            PayloadError::WrongType(ty) => write!(f, "unexpected payload type: {}", ty),
        }
    }
}

impl std::error::Error for PayloadError {}

impl From<serde_json::Error> for PayloadError {
    fn from(e: serde_json::Error) -> Self {
        PayloadError::Json(e)
    }
}
