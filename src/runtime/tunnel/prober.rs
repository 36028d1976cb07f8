use super::state::{Availability, SharedState, lock};
use super::stats::FunnelStats;
use super::status::AgentStatus;
use super::traits::AgentRunner;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;

/// Decides once per process whether the agent is usable and caches the
/// node's hostname.
pub struct Prober {
    runner: Arc<dyn AgentRunner>,
    state: SharedState,
    stats: Arc<FunnelStats>,
    timeout: Duration,
    /// Serializes first probes so concurrent callers share one status query.
    gate: AsyncMutex<()>,
}

impl Prober {
    pub fn new(
        runner: Arc<dyn AgentRunner>,
        state: SharedState,
        stats: Arc<FunnelStats>,
        timeout: Duration,
    ) -> Self {
        Self {
            runner,
            state,
            stats,
            timeout,
            gate: AsyncMutex::new(()),
        }
    }

    fn cached_verdict(&self) -> Option<bool> {
        match lock(&self.state).availability {
            Availability::Unknown => None,
            Availability::Unavailable => Some(false),
            Availability::Available { .. } => Some(true),
        }
    }

    /// Probe the agent at most once; later calls return the cached verdict.
    pub async fn probe(&self) -> bool {
        if let Some(verdict) = self.cached_verdict() {
            return verdict;
        }

        let _gate = self.gate.lock().await;
        if let Some(verdict) = self.cached_verdict() {
            return verdict;
        }

        let verdict = self.query_availability().await;
        let available = verdict.is_available();
        {
            let mut state = lock(&self.state);
            // A monitor tick may have adopted a hostname while we were waiting.
            if state.availability == Availability::Unknown {
                state.availability = verdict;
            }
        }
        match lock(&self.state).availability.hostname() {
            Some(hostname) => tracing::info!(hostname, "Funnel agent available"),
            None if available => tracing::warn!("Funnel agent running but has no DNS name yet"),
            None => {}
        }
        self.cached_verdict().unwrap_or(available)
    }

    async fn query_availability(&self) -> Availability {
        if !self.runner.locate().await {
            tracing::warn!(agent = self.runner.name(), "Agent executable not found; funnel unavailable");
            return Availability::Unavailable;
        }

        match self.read_status().await {
            Some(status) if status.is_running() => Availability::Available {
                hostname: status.hostname(),
            },
            Some(status) => {
                tracing::warn!(
                    backend_state = %status.backend_state,
                    "Agent backend is not running; funnel unavailable"
                );
                Availability::Unavailable
            }
            None => Availability::Unavailable,
        }
    }

    /// Run the agent's status query, bypassing the cache. Failures are logged
    /// and yield `None`.
    pub async fn fetch_raw_status(&self) -> Option<String> {
        self.stats.record_status_check();
        let args = vec!["status".to_string(), "--json".to_string()];
        match self.runner.run(args, self.timeout).await {
            Ok(raw) => Some(raw),
            Err(e) => {
                tracing::warn!("Agent status query failed: {e}");
                None
            }
        }
    }

    /// Fresh, parsed status read. Malformed output yields `None`.
    pub async fn read_status(&self) -> Option<AgentStatus> {
        let raw = self.fetch_raw_status().await?;
        match AgentStatus::parse(&raw) {
            Ok(status) => Some(status),
            Err(e) => {
                tracing::warn!("Agent status output is not valid JSON: {e}");
                None
            }
        }
    }

    /// Cached hostname, probing once if nothing is cached yet.
    pub async fn hostname(&self) -> Option<String> {
        if let Some(hostname) = self.cached_hostname() {
            return Some(hostname);
        }
        self.probe().await;
        self.cached_hostname()
    }

    pub fn cached_hostname(&self) -> Option<String> {
        lock(&self.state).availability.hostname().map(str::to_string)
    }

    pub fn is_available(&self) -> bool {
        lock(&self.state).availability.is_available()
    }

    /// Forget the cached verdict and hostname.
    pub fn reset(&self) {
        lock(&self.state).availability = Availability::Unknown;
    }
}
