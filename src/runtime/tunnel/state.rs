use std::sync::{Arc, Mutex, MutexGuard};

/// Cached verdict of the availability probe.
///
/// `Unknown` until the first probe; afterwards the variant is sticky for the
/// life of the service (only `reset` returns to `Unknown`). A running agent
/// that has not been assigned a DNS name yet is `Available { hostname: None }`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Availability {
    #[default]
    Unknown,
    Unavailable,
    Available { hostname: Option<String> },
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available { .. })
    }

    pub fn hostname(&self) -> Option<&str> {
        match self {
            Self::Available { hostname } => hostname.as_deref(),
            _ => None,
        }
    }
}

/// The single live exposure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveFunnel {
    pub port: u16,
    pub path: String,
    pub public_url: String,
    /// Always true while the record exists.
    pub active: bool,
    /// Pid of the detached `funnel` process, used only for best-effort SIGTERM.
    pub pid: Option<u32>,
}

#[derive(Debug, Default)]
pub struct FunnelState {
    pub availability: Availability,
    pub active: Option<ActiveFunnel>,
}

/// State shared by the prober, controller and monitor.
///
/// The lock is only ever held for plain reads and writes, never across an
/// `.await`.
pub type SharedState = Arc<Mutex<FunnelState>>;

pub fn new_shared_state() -> SharedState {
    Arc::new(Mutex::new(FunnelState::default()))
}

pub(crate) fn lock(state: &SharedState) -> MutexGuard<'_, FunnelState> {
    state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// `https://{hostname}` plus the path unless it is the root.
pub fn public_url_for(hostname: &str, path: &str) -> String {
    if path == "/" {
        format!("https://{hostname}")
    } else {
        format!("https://{hostname}{path}")
    }
}

/// Empty paths become `/`; relative paths gain a leading slash.
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        "/".into()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}
