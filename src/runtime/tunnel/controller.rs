use super::prober::Prober;
use super::state::{ActiveFunnel, SharedState, lock, normalize_path, public_url_for};
use super::stats::FunnelStats;
use super::traits::AgentRunner;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;

/// Public view of the active exposure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelInfo {
    pub port: u16,
    pub path: String,
    pub public_url: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelStatus {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    pub funnels: Vec<FunnelInfo>,
}

/// Owns the single exposure slot.
///
/// The controller tracks intent: a record exists once the `funnel` process
/// was launched and disappears once teardown was attempted, regardless of
/// what the agent reports afterwards.
pub struct FunnelController {
    runner: Arc<dyn AgentRunner>,
    prober: Arc<Prober>,
    state: SharedState,
    stats: Arc<FunnelStats>,
    timeout: Duration,
    /// Serializes expose/unexpose so a port switch is retire-then-spawn.
    ops: AsyncMutex<()>,
    /// Set by `shutdown`; checked under `ops` so no exposure starts after it.
    closed: AtomicBool,
}

impl FunnelController {
    pub fn new(
        runner: Arc<dyn AgentRunner>,
        prober: Arc<Prober>,
        state: SharedState,
        stats: Arc<FunnelStats>,
        timeout: Duration,
    ) -> Self {
        Self {
            runner,
            prober,
            state,
            stats,
            timeout,
            ops: AsyncMutex::new(()),
            closed: AtomicBool::new(false),
        }
    }

    /// Expose `port` publicly. Returns the public URL, or `None` when the
    /// agent is unavailable or the launch failed.
    pub async fn expose(&self, port: u16, path: &str) -> Option<String> {
        if port == 0 {
            tracing::warn!("Refusing to expose port 0");
            return None;
        }

        let _op = self.ops.lock().await;
        if self.closed.load(Ordering::SeqCst) {
            tracing::debug!(port, "Controller shut down; not exposing");
            return None;
        }

        if !self.prober.probe().await {
            tracing::debug!(port, "Funnel unavailable; not exposing");
            return None;
        }
        let Some(hostname) = self.prober.cached_hostname() else {
            tracing::warn!(port, "Funnel agent has no hostname; not exposing");
            return None;
        };

        let current = lock(&self.state)
            .active
            .as_ref()
            .map(|f| (f.port, f.public_url.clone()));
        match current {
            Some((active_port, url)) if active_port == port => {
                tracing::debug!(port, "Funnel already active");
                return Some(url);
            }
            Some((active_port, _)) => {
                tracing::info!(from = active_port, to = port, "Replacing active funnel");
                self.retire(active_port).await;
            }
            None => {}
        }

        let path = normalize_path(path);
        let args = vec!["funnel".to_string(), port.to_string()];
        match self.runner.spawn_detached(args).await {
            Ok(pid) => {
                // Re-read the hostname: a monitor tick may have rotated it while
                // the spawn was in flight.
                let hostname = self.prober.cached_hostname().unwrap_or(hostname);
                let public_url = public_url_for(&hostname, &path);
                lock(&self.state).active = Some(ActiveFunnel {
                    port,
                    path,
                    public_url: public_url.clone(),
                    active: true,
                    pid,
                });
                self.stats.record_exposure_started();
                tracing::info!(port, url = %public_url, pid = ?pid, "Funnel exposed");
                Some(public_url)
            }
            Err(e) => {
                lock(&self.state).active = None;
                tracing::warn!(port, "Failed to launch funnel process: {e}");
                None
            }
        }
    }

    /// Stop exposing `port`. Returns false when nothing is active on it.
    pub async fn unexpose(&self, port: u16) -> bool {
        let _op = self.ops.lock().await;
        self.retire(port).await
    }

    /// Refuse further exposures and retire whatever is active. Waits for an
    /// in-flight `expose` to settle first, so its record is retired too.
    pub async fn shutdown(&self) {
        self.closed.store(true, Ordering::SeqCst);
        let _op = self.ops.lock().await;
        let port = lock(&self.state).active.as_ref().map(|a| a.port);
        if let Some(port) = port {
            self.retire(port).await;
        }
    }

    /// Full stop sequence. Caller must hold `ops`.
    async fn retire(&self, port: u16) -> bool {
        let pid = match lock(&self.state).active.as_ref() {
            Some(active) if active.port == port => active.pid,
            _ => return false,
        };

        let args = vec!["funnel".to_string(), port.to_string(), "off".to_string()];
        if let Err(e) = self.runner.run(args, self.timeout).await {
            tracing::warn!(port, "Funnel turn-off command failed: {e}");
        }

        if let Some(pid) = pid
            && let Err(e) = self.runner.signal(pid).await
        {
            tracing::debug!(port, pid, "Funnel process already gone: {e}");
        }

        {
            let mut state = lock(&self.state);
            if state.active.as_ref().is_some_and(|a| a.port == port) {
                state.active = None;
            }
        }
        self.stats.record_exposure_stopped();
        tracing::info!(port, "Funnel stopped");
        true
    }

    /// Public URL of `port` if it is the active exposure.
    pub fn url(&self, port: u16) -> Option<String> {
        lock(&self.state)
            .active
            .as_ref()
            .filter(|a| a.port == port)
            .map(|a| a.public_url.clone())
    }

    pub fn port(&self) -> Option<u16> {
        lock(&self.state).active.as_ref().map(|a| a.port)
    }

    pub fn active(&self) -> Option<ActiveFunnel> {
        lock(&self.state).active.clone()
    }

    pub fn status(&self) -> FunnelStatus {
        let state = lock(&self.state);
        FunnelStatus {
            available: state.availability.is_available(),
            hostname: state.availability.hostname().map(str::to_string),
            funnels: state
                .active
                .iter()
                .map(|a| FunnelInfo {
                    port: a.port,
                    path: a.path.clone(),
                    public_url: a.public_url.clone(),
                    active: a.active,
                })
                .collect(),
        }
    }
}
