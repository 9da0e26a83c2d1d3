//! Headless workspace core (state/action/effect).

pub mod action;
pub mod effect;
pub mod registry;
pub mod services;
pub mod state;
pub mod store;

pub use action::Action;
pub use effect::Effect;
pub use registry::{IdScheme, RoutingPolicy, ServiceDescriptor, ServiceRegistry};
pub use state::{InstanceCounters, Tab, Workspace, WorkspaceId, WorkspaceStoreState};
pub use store::{Clock, DispatchResult, Store, SystemClock};
