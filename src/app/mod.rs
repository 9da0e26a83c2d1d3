//! Application layer: the workbench root and the collaborators that turn
//! user gestures into store intents.

pub mod docking;
pub mod process_log;
pub mod tab_bar;
pub mod workbench;

pub use docking::{DragData, DragPayload, DropTarget, SERVICE_DRAG_TYPE};
pub use process_log::ProcessLog;
pub use tab_bar::{LauncherEntry, TabBarEntry, TabBarIntent};
pub use workbench::Workbench;
