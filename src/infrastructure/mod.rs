// Infrastructure module - background services for the feed client
pub mod heartbeat;
pub mod reconnect;
pub mod task_manager;

pub use heartbeat::HeartbeatMonitor;
pub use reconnect::{ReconnectDecision, ReconnectPolicy, ReconnectState};
pub use task_manager::TaskManager;
