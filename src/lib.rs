//! forgedeck - workspace/tab orchestration core for a multi-panel dashboard.
//!
//! Module layout:
//! - kernel: state, actions, the store, and the services layer (ports + adapters)
//! - app: workbench root, docking, tab bar, process log

pub mod app;
pub mod kernel;
