mod controller;
mod events;
mod monitor;
mod process;
mod prober;
mod service;
mod state;
mod stats;
mod status;
mod traits;


pub use controller::{FunnelController, FunnelInfo, FunnelStatus};
pub use events::{EventSink, HOSTNAME_CHANGED_EVENT, HostnameChange, LogEventSink, MemoryEventSink};
pub use monitor::{CallbackRegistry, HostnameCallback, HostnameMonitor};
pub use process::TailscaleCli;
pub use prober::Prober;
pub use service::{FUNNEL_EXTENSION, FunnelApi, FunnelFuture, FunnelService};
pub use state::{
    ActiveFunnel, Availability, FunnelState, SharedState, new_shared_state, normalize_path,
    public_url_for,
};
pub use stats::{FunnelStats, StatsSnapshot, format_uptime};
pub use status::{AgentStatus, RUNNING_STATE, SelfNode, TailnetInfo};
pub use traits::{AgentFuture, AgentRunner};
