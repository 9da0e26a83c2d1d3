use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::kernel::registry::RoutingPolicy;
use crate::kernel::state::WorkspaceId;

use super::backend::ReconnectPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<PathBuf>,
    #[serde(default)]
    pub routing: Vec<RoutingRule>,
    #[serde(default)]
    pub backend: BackendSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingRule {
    pub service: String,
    pub workspace: WorkspaceId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSettings {
    #[serde(default = "default_backend_url")]
    pub url: String,
    #[serde(default = "default_reconnect_attempts")]
    pub reconnect_attempts: u32,
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    #[serde(default = "default_reconnect_delay_max_ms")]
    pub reconnect_delay_max_ms: u64,
}

fn default_app_name() -> String {
    "forgedeck".to_string()
}

fn default_backend_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_reconnect_attempts() -> u32 {
    10
}

fn default_reconnect_delay_ms() -> u64 {
    1000
}

fn default_reconnect_delay_max_ms() -> u64 {
    5000
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            state_dir: None,
            routing: Vec::new(),
            backend: BackendSettings::default(),
        }
    }
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            reconnect_attempts: default_reconnect_attempts(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            reconnect_delay_max_ms: default_reconnect_delay_max_ms(),
        }
    }
}

impl Settings {
    /// Storage key for the persisted workspace layout.
    pub fn state_key(&self) -> String {
        format!("{}-workspaces", self.app_name)
    }

    /// Built-in routing with the configured rules layered on top.
    pub fn routing_policy(&self) -> RoutingPolicy {
        self.routing
            .iter()
            .fold(RoutingPolicy::builtin(), |policy, rule| {
                policy.with_rule(&rule.service, rule.workspace)
            })
    }
}

impl BackendSettings {
    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        let max_delay_ms = self.reconnect_delay_max_ms.max(self.reconnect_delay_ms);
        ReconnectPolicy {
            max_attempts: self.reconnect_attempts.max(1),
            initial_delay: Duration::from_millis(self.reconnect_delay_ms),
            max_delay: Duration::from_millis(max_delay_ms),
        }
    }
}
