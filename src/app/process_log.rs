use rustc_hash::FxHashMap;

use crate::kernel::services::ports::ProcessUpdate;
use crate::kernel::services::FileOpenRequest;
use crate::kernel::{Tab, WorkspaceId};

const CODE_UPDATE: &str = "code";
const MISSING_CONTENT: &str = "// No content available";

/// Log of backend `process_update`s plus the latest generated content per
/// file path.
#[derive(Debug, Default)]
pub struct ProcessLog {
    entries: Vec<ProcessUpdate>,
    files: FxHashMap<String, String>,
}

impl ProcessLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, update: ProcessUpdate) {
        if update.kind == CODE_UPDATE {
            if let Some(path) = &update.path {
                self.files.insert(path.clone(), update.message.clone());
            }
        }
        self.entries.push(update);
    }

    pub fn entries(&self) -> &[ProcessUpdate] {
        &self.entries
    }

    pub fn file_content(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Request that opens `path` in the editor workspace.
    pub fn view_file(&self, path: &str) -> FileOpenRequest {
        let file_name = path.rsplit('/').next().unwrap_or(path);
        let language = if path.ends_with(".sol") {
            "solidity"
        } else {
            "javascript"
        };
        let content = self.file_content(path).unwrap_or(MISSING_CONTENT);
        FileOpenRequest::new(
            WorkspaceId::Workspace2,
            Tab::file_editor(format!("file-{path}"), file_name, language, content),
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/app/process_log.rs"]
mod tests;
